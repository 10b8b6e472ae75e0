use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of crawl targets that have been scheduled or completed
///
/// Shared by every crawl branch. The only mutation is [`VisitedSet::insert`],
/// which checks and inserts under one lock so two branches racing on the
/// same target cannot both win.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a target as visited
    ///
    /// # Returns
    ///
    /// * `true` - The caller is the first to claim this target
    /// * `false` - The target was already claimed
    pub fn insert(&self, target: &str) -> bool {
        let mut set = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if set.contains(target) {
            return false;
        }
        set.insert(target.to_string())
    }

    /// Returns whether a target has been claimed
    pub fn contains(&self, target: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(target)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
