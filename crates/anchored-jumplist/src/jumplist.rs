use std::sync::PoisonError;

use crate::{
    arena::NodeId,
    list_inner::InnerList,
    maybe_loom::{Arc, Mutex, MutexGuard},
    node_heights::ProbabilityTable,
    options::{JumplistOptions, OptionsError},
};


/// The seed used when the operating system's entropy source is unavailable.
const FALLBACK_SEED: u64 = 0x_9E37_79B9_7F4A_7C15;

fn entropy_seed() -> u64 {
    match getrandom::u64() {
        Ok(seed) => seed,
        Err(err) => {
            tracing::warn!(
                "no OS entropy for a jumplist seed, falling back to a fixed seed: {err}",
            );
            FALLBACK_SEED
        }
    }
}


// ================================
//  List
// ================================

#[derive(Debug)]
struct SharedList<V> {
    /// One lock for the entire structure: head sentinel, every tower, the probability
    /// table, the finger scratch buffer, and the PRNG. Every operation — pure lookups
    /// included — holds it for its whole duration.
    inner: Mutex<InnerList<V>>,
}

/// A concurrent ordered map over `f64` keys: a skiplist whose every operation is a single
/// top-down finger sweep, guarded by one list-wide lock.
///
/// Keys are ordered and compared with [`f64::total_cmp`]: exact, bit-level, with no
/// tolerance. In particular `-0.0` and `+0.0` are distinct keys, and NaN keys are admitted
/// and ordered (positive NaN sorts after every other key) rather than rejected.
///
/// Handles are reference-counted: [`refcounted_clone`] returns another handle to the same
/// list, and a `Jumplist<V>` is `Send` and `Sync` whenever `V: Send`. Operations from any
/// number of threads are linearizable — each acquires the list's exclusive lock, observes
/// a consistent snapshot, and blocks (without timeout) until the lock is available.
///
/// # Panics or Deadlocks
/// [`insert`] and [`get`] return an [`EntryRef`] which keeps holding the list's lock.
/// Calling any other operation on the same list (through any handle) from the same thread
/// before dropping the `EntryRef` will deadlock.
///
/// If a thread panics while operating on the list, the lock is poisoned and later
/// operations from other handles will panic.
///
/// [`refcounted_clone`]: Jumplist::refcounted_clone
/// [`insert`]: Jumplist::insert
/// [`get`]: Jumplist::get
#[derive(Debug)]
pub struct Jumplist<V> {
    shared: Arc<SharedList<V>>,
}

impl<V> Jumplist<V> {
    /// Create an empty jumplist with default options (maximum level 18, ratio `1/e`),
    /// seeded from the operating system's entropy source.
    #[must_use]
    pub fn new() -> Self {
        Self::new_seeded(entropy_seed())
    }

    /// Create an empty jumplist with default options and the provided PRNG seed.
    ///
    /// Two lists built with the same seed receive identical tower heights for the same
    /// sequence of insertions, which makes tests reproducible.
    #[must_use]
    pub fn new_seeded(seed: u64) -> Self {
        Self::from_parts(
            JumplistOptions::DEFAULT_MAX_LEVEL,
            JumplistOptions::DEFAULT_RATIO,
            seed,
        )
    }

    /// Create an empty jumplist with the provided options, seeded from the operating
    /// system's entropy source.
    pub fn with_options(options: JumplistOptions) -> Result<Self, OptionsError> {
        Self::with_options_seeded(options, entropy_seed())
    }

    /// Create an empty jumplist with the provided options and PRNG seed.
    pub fn with_options_seeded(options: JumplistOptions, seed: u64) -> Result<Self, OptionsError> {
        let (max_level, ratio) = options.validate()?;
        Ok(Self::from_parts(max_level, ratio, seed))
    }

    /// Create an empty jumplist with the provided maximum level and otherwise-default
    /// options.
    ///
    /// # Panics
    /// Panics if `max_level` is not in `1..=64`. [`with_options`](Self::with_options) is
    /// the non-panicking equivalent.
    #[must_use]
    pub fn with_max_level(max_level: usize) -> Self {
        match Self::with_options(JumplistOptions::new().max_level(max_level)) {
            Ok(list) => list,
            Err(err) => panic!("{err}"),
        }
    }

    /// `max_level` and `ratio` must already be validated.
    fn from_parts(max_level: usize, ratio: f64, seed: u64) -> Self {
        let table = ProbabilityTable::new(max_level, ratio);
        Self {
            shared: Arc::new(SharedList {
                inner: Mutex::new(InnerList::new(table, seed)),
            }),
        }
    }

    /// Get another reference-counted handle to the same jumplist.
    #[inline]
    #[must_use]
    pub fn refcounted_clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }

    fn lock_inner(&self) -> MutexGuard<'_, InnerList<V>> {
        let maybe_poison: Result<_, PoisonError<_>> = self.shared.inner.lock();
        #[expect(clippy::unwrap_used, reason = "poison errors can only occur after/during a panic")]
        maybe_poison.unwrap()
    }

    // ================================
    //  Operations
    // ================================

    /// Insert `value` under `key`, or overwrite the value of the element already stored
    /// under a key exactly equal to `key` (the list's shape is untouched in that case).
    ///
    /// Returns a reference to the stored element. The reference holds the list's
    /// exclusive lock; the lock is released when it is dropped, so drop it before
    /// operating on the list again from this thread.
    ///
    /// # Panics or Deadlocks
    /// See [`Jumplist`].
    pub fn insert(&self, key: f64, value: V) -> EntryRef<'_, V> {
        let mut inner = self.lock_inner();
        let node = inner.insert(key, value);
        EntryRef { inner, node }
    }

    /// Look up the element stored under a key exactly equal to `key`.
    ///
    /// An absent key is a normal outcome, not an error. A found element is returned as an
    /// [`EntryRef`], which holds the list's exclusive lock until dropped; on the absent
    /// path the lock is released before returning.
    ///
    /// # Panics or Deadlocks
    /// See [`Jumplist`].
    #[must_use]
    pub fn get(&self, key: f64) -> Option<EntryRef<'_, V>> {
        let inner = self.lock_inner();
        let node = inner.locate(key)?;
        Some(EntryRef { inner, node })
    }

    /// Remove the element stored under a key exactly equal to `key`, returning its key
    /// and value. An absent key is a normal outcome and leaves the list untouched.
    ///
    /// # Panics or Deadlocks
    /// See [`Jumplist`].
    pub fn remove(&self, key: f64) -> Option<(f64, V)> {
        self.lock_inner().remove(key)
    }

    /// The number of stored elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_inner().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The maximum tower height this list was configured with.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.lock_inner().max_level()
    }
}

impl<V> Default for Jumplist<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}


// ================================
//  Entry references
// ================================

/// A reference to one element stored in a [`Jumplist`].
///
/// The reference holds the list's exclusive lock: the element cannot be removed or moved
/// while the reference exists, and every other operation on the list (through any handle)
/// blocks until the reference is dropped, which releases the lock.
///
/// # Deadlocks
/// Calling any operation on the owning [`Jumplist`] from the same thread while an
/// `EntryRef` into it is alive will deadlock.
#[derive(Debug)]
pub struct EntryRef<'a, V> {
    /// Exclusive guard over the whole list; released exactly when `self` drops.
    inner: MutexGuard<'a, InnerList<V>>,
    node:  NodeId,
}

impl<V> EntryRef<'_, V> {
    /// The element's key. Keys never change after insertion.
    #[must_use]
    pub fn key(&self) -> f64 {
        self.inner.node(self.node).key()
    }

    /// Shared access to the element's value.
    #[must_use]
    pub fn value(&self) -> &V {
        self.inner.node(self.node).value()
    }

    /// Exclusive access to the element's value, for mutating it in place.
    #[must_use]
    pub fn value_mut(&mut self) -> &mut V {
        self.inner.node_mut(self.node).value_mut()
    }
}
