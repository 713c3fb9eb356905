//! Concurrent ordered maps over `f64` keys, implemented as finger-search skiplists.
//!
//! The entry point is [`Jumplist`]; construction-time tunables live in
//! [`JumplistOptions`].

mod arena;
mod jumplist;
mod list_inner;
mod options;

mod node_heights;


mod maybe_loom;


pub use self::{
    jumplist::{EntryRef, Jumplist},
    options::{JumplistOptions, OptionsError},
};
