//! crates/timber/src/forest.rs
//! The registry of planted trees and the broadcast logger over them.
//!
//! Mutations take a mutex, rebuild an immutable snapshot and publish it
//! through an [`ArcSwap`]. Dispatch loads the current snapshot once and
//! iterates it without locking, so a log call racing with `plant`/`uproot`
//! may still see the previous set of trees.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use tracing::{debug, warn};

use super::error::{LogError, PlantError};
use super::logger::{Logger, Record};
use super::severity::Severity;
use super::tree::Tree;

/// An ordered collection of planted [`Tree`]s that is itself a [`Logger`].
///
/// Planting the same tree twice is permitted; it then receives every call
/// twice. Trees are compared by identity when uprooting.
///
/// # Examples
///
/// ```
/// use std::error::Error;
/// use std::io;
/// use std::sync::Arc;
/// use timber::{ConsecutiveLevels, Forest, LogSink, Logger, Tree};
///
/// struct Discard;
///
/// impl LogSink for Discard {
///     fn emit(&self, _: i32, _: &str, _: &str, _: Option<&(dyn Error + 'static)>) -> io::Result<()> {
///         Ok(())
///     }
/// }
///
/// let forest = Forest::new();
/// let tree = Arc::new(Tree::new(ConsecutiveLevels, Discard));
/// forest.plant(tree.clone());
/// assert_eq!(forest.tree_count(), 1);
///
/// forest.tag("Boot").info("ready", &[])?;
/// forest.uproot(&tree)?;
/// assert!(forest.forest().is_empty());
/// # Ok::<(), Box<dyn Error>>(())
/// ```
pub struct Forest {
    trees: Mutex<Vec<Arc<Tree>>>,
    snapshot: ArcSwap<Vec<Arc<Tree>>>,
}

impl Forest {
    /// Creates an empty forest.
    pub fn new() -> Self {
        Self {
            trees: Mutex::new(Vec::new()),
            snapshot: ArcSwap::from_pointee(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Tree>>> {
        self.trees.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, trees: &[Arc<Tree>]) {
        self.snapshot.store(Arc::new(trees.to_vec()));
    }

    /// Adds a tree.
    pub fn plant(&self, tree: Arc<Tree>) {
        let mut trees = self.lock();
        debug!(target: "timber::forest", tree = %tree.id(), "planting tree");
        trees.push(tree);
        self.publish(&trees);
    }

    /// Adds several trees, preserving their order, in one snapshot update.
    pub fn plant_all<I>(&self, trees: I)
    where
        I: IntoIterator<Item = Arc<Tree>>,
    {
        let batch: Vec<Arc<Tree>> = trees.into_iter().collect();
        let mut trees = self.lock();
        debug!(target: "timber::forest", count = batch.len(), "planting trees");
        trees.extend(batch);
        self.publish(&trees);
    }

    /// Removes the first planted occurrence of `tree`.
    ///
    /// Once the last occurrence is gone, the tree's pending tag on the
    /// calling thread is discarded. Tags pending on other threads are left
    /// until the tree logs there or is dropped.
    pub fn uproot(&self, tree: &Tree) -> Result<(), PlantError> {
        let mut trees = self.lock();
        let position = trees
            .iter()
            .position(|planted| planted.id() == tree.id())
            .ok_or(PlantError::NotPlanted(tree.id()))?;
        trees.remove(position);
        debug!(target: "timber::forest", tree = %tree.id(), "uprooted tree");
        self.publish(&trees);
        if !trees.iter().any(|planted| planted.id() == tree.id()) {
            tree.clear_tag();
        }
        Ok(())
    }

    /// Removes every tree, discarding their pending tags on the calling thread.
    pub fn uproot_all(&self) {
        let mut trees = self.lock();
        for tree in trees.drain(..) {
            tree.clear_tag();
        }
        debug!(target: "timber::forest", "uprooted all trees");
        self.snapshot.store(Arc::new(Vec::new()));
    }

    /// Point-in-time copy of the planted trees, in planting order.
    pub fn forest(&self) -> Vec<Arc<Tree>> {
        self.lock().clone()
    }

    /// Number of planted trees.
    pub fn tree_count(&self) -> usize {
        self.lock().len()
    }

    /// Sets a one-time tag on every planted tree for the next call on this thread.
    ///
    /// Whichever tree handles the next call from this thread consumes its
    /// copy; a broadcast call consumes all of them.
    pub fn tag(&self, tag: &str) -> &Self {
        for tree in self.snapshot.load().iter() {
            tree.tag(tag);
        }
        self
    }

    /// This forest as a single injectable logger.
    pub fn as_tree(&self) -> &dyn Logger {
        self
    }

    fn broadcast<F>(&self, record: Record<'_>, priority_of: F) -> Result<(), LogError>
    where
        F: Fn(&Tree) -> i32,
    {
        let trees = self.snapshot.load_full();
        for (index, tree) in trees.iter().enumerate() {
            match tree.log_priority(priority_of(tree), record) {
                Ok(()) => {}
                Err(LogError::Sink(error)) => {
                    warn!(
                        target: "timber::forest",
                        tree = %tree.id(),
                        %error,
                        "sink failed; continuing with remaining trees"
                    );
                }
                Err(other) => {
                    // Trees after the failing one still owe this call their tag.
                    for rest in &trees[index + 1..] {
                        rest.clear_tag();
                    }
                    return Err(other);
                }
            }
        }
        Ok(())
    }
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Forest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forest")
            .field("trees", &self.snapshot.load().len())
            .finish()
    }
}

impl Logger for Forest {
    fn log_severity(&self, severity: Severity, record: Record<'_>) -> Result<(), LogError> {
        self.broadcast(record, |tree| tree.levels().priority(severity))
    }

    fn log_priority(&self, priority: i32, record: Record<'_>) -> Result<(), LogError> {
        self.broadcast(record, |_| priority)
    }
}
