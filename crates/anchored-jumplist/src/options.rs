use std::f64::consts::E;

use thiserror::Error;

use crate::node_heights::MAX_LEVEL_LIMIT;


/// Construction-time tunables for a [`Jumplist`]: the maximum tower height and the
/// per-level probability decay factor. Both are fixed for the lifetime of the list.
///
/// ```
/// use anchored_jumplist::{Jumplist, JumplistOptions};
///
/// let options = JumplistOptions::new().max_level(24).ratio(0.25);
/// let list: Jumplist<&str> = Jumplist::with_options(options)?;
/// # Ok::<(), anchored_jumplist::OptionsError>(())
/// ```
///
/// [`Jumplist`]: crate::Jumplist
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumplistOptions {
    max_level: usize,
    ratio:     f64,
}

impl JumplistOptions {
    /// The maximum tower height of lists built with default options.
    ///
    /// `e^18` is about 66 million; with the default ratio of `1/e`, lists up to that many
    /// elements keep their expected search cost logarithmic.
    pub const DEFAULT_MAX_LEVEL: usize = 18;

    /// The per-level probability decay factor of lists built with default options: `1/e`.
    pub const DEFAULT_RATIO: f64 = 1.0 / E;

    /// The greatest permitted maximum level, `64`.
    pub const MAX_LEVEL_LIMIT: usize = MAX_LEVEL_LIMIT;

    /// Default options: maximum level [`DEFAULT_MAX_LEVEL`], ratio [`DEFAULT_RATIO`].
    ///
    /// [`DEFAULT_MAX_LEVEL`]: Self::DEFAULT_MAX_LEVEL
    /// [`DEFAULT_RATIO`]: Self::DEFAULT_RATIO
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_level: Self::DEFAULT_MAX_LEVEL,
            ratio:     Self::DEFAULT_RATIO,
        }
    }

    /// Set the maximum tower height. Must be in `1..=64`; validated at construction.
    #[inline]
    #[must_use]
    pub const fn max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    /// Set the per-level probability decay factor. Must be strictly between `0` and `1`;
    /// validated at construction. Smaller ratios make tall towers rarer, trading search
    /// cost for memory.
    #[inline]
    #[must_use]
    pub const fn ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    /// Check both tunables, returning them as a `(max_level, ratio)` pair.
    pub(crate) fn validate(self) -> Result<(usize, f64), OptionsError> {
        if self.max_level < 1 || self.max_level > Self::MAX_LEVEL_LIMIT {
            return Err(OptionsError::MaxLevel { max_level: self.max_level });
        }

        // Exclusive on both ends; this also rejects a NaN ratio.
        if !(self.ratio > 0.0 && self.ratio < 1.0) {
            return Err(OptionsError::Ratio { ratio: self.ratio });
        }

        Ok((self.max_level, self.ratio))
    }
}

impl Default for JumplistOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}


/// Rejected [`JumplistOptions`]. A jumplist is never constructed from invalid options.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum OptionsError {
    /// The maximum level must be a positive integer of at most
    /// [`MAX_LEVEL_LIMIT`](JumplistOptions::MAX_LEVEL_LIMIT).
    #[error("the maximum level of a jumplist must be in 1..=64, but was {max_level}")]
    MaxLevel {
        max_level: usize,
    },
    /// The decay ratio must be strictly between `0` and `1`.
    #[error("the level ratio of a jumplist must be strictly between 0 and 1, but was {ratio}")]
    Ratio {
        ratio: f64,
    },
}


#[cfg(test)]
mod tests {
    use super::{JumplistOptions, OptionsError};


    #[test]
    fn default_options_validate() {
        let (max_level, ratio) = JumplistOptions::new().validate().unwrap();
        assert_eq!(max_level, 18);
        assert!(0.36 < ratio && ratio < 0.37);
    }

    #[test]
    fn max_level_bounds_are_inclusive() {
        assert!(JumplistOptions::new().max_level(1).validate().is_ok());
        assert!(JumplistOptions::new().max_level(64).validate().is_ok());

        assert_eq!(
            JumplistOptions::new().max_level(0).validate(),
            Err(OptionsError::MaxLevel { max_level: 0 }),
        );
        assert_eq!(
            JumplistOptions::new().max_level(65).validate(),
            Err(OptionsError::MaxLevel { max_level: 65 }),
        );
    }

    #[test]
    fn ratio_bounds_are_exclusive() {
        assert!(JumplistOptions::new().ratio(0.5).validate().is_ok());

        for bad_ratio in [0.0, 1.0, -0.25, 1.5, f64::NAN] {
            assert!(JumplistOptions::new().ratio(bad_ratio).validate().is_err());
        }
    }
}
