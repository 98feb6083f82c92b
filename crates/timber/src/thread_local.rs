//! crates/timber/src/thread_local.rs
//! Thread-local storage for one-shot explicit tags.
//!
//! Each thread owns one map from tree id to pending tag, so a `tag()` on one
//! thread is never observed or consumed by a log call on another.
//!
//! An entry is removed when its tree logs on that thread, when the tree is
//! uprooted or dropped on that thread, or when the thread exits. A tag set
//! on one thread for a tree dropped on another stays until the first
//! thread exits, so each thread holds at most one entry per tree it tagged.

use super::tree::TreeId;
use rustc_hash::FxHashMap;
use std::cell::RefCell;

thread_local! {
    static EXPLICIT_TAGS: RefCell<FxHashMap<TreeId, String>> = RefCell::new(FxHashMap::default());
}

/// Stores `tag` as the pending tag of `tree` on the current thread.
pub(crate) fn set(tree: TreeId, tag: String) {
    let _ = EXPLICIT_TAGS.try_with(|tags| {
        tags.borrow_mut().insert(tree, tag);
    });
}

/// Removes and returns the pending tag of `tree` on the current thread.
///
/// Returns `None` during thread teardown, when the slot is already gone.
pub(crate) fn take(tree: TreeId) -> Option<String> {
    EXPLICIT_TAGS
        .try_with(|tags| tags.borrow_mut().remove(&tree))
        .ok()
        .flatten()
}

/// Reports whether `tree` has a pending tag on the current thread.
pub(crate) fn is_pending(tree: TreeId) -> bool {
    EXPLICIT_TAGS
        .try_with(|tags| tags.borrow().contains_key(&tree))
        .unwrap_or(false)
}
