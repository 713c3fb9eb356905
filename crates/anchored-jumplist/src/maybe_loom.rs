#[cfg(jumplist_loom)]
pub(crate) use loom::sync::Arc as Arc;
#[cfg(jumplist_loom)]
pub(crate) use loom::sync::Mutex as Mutex;
#[cfg(jumplist_loom)]
pub(crate) use loom::sync::MutexGuard as MutexGuard;

#[cfg(not(jumplist_loom))]
pub(crate) use std::sync::Arc as Arc;
#[cfg(not(jumplist_loom))]
pub(crate) use std::sync::Mutex as Mutex;
#[cfg(not(jumplist_loom))]
pub(crate) use std::sync::MutexGuard as MutexGuard;
