//! Memoization with explicit, instance-scoped caches.
//!
//! The crate's core is [`MemoizedSum`], addition cached by ordered argument
//! pair. It is built on [`Memo`], which caches any function of a hashable
//! input. [`SyncMemo`] is the variant that can be shared between threads,
//! [`Slot`] remembers one value for as long as its dependencies stay equal,
//! and the [`memoize`] attribute caches free functions.

mod cache;
mod error;
mod hash;
mod key;
mod memo;
mod slot;
mod sum;
mod sync;

#[cfg(feature = "testing")]
pub mod testing;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::key::{Operand, PairKey};
pub use crate::memo::{Config, Memo, Stats};
pub use crate::slot::Slot;
pub use crate::sum::MemoizedSum;
pub use crate::sync::SyncMemo;

#[cfg(feature = "macros")]
pub use pairmemo_macros::memoize;

/// These are implementation details. Do not rely on them!
#[doc(hidden)]
pub mod internal {
    pub use crate::cache::{FnCache, assert_hashable, memoized};
    pub use crate::hash::hash;
}
