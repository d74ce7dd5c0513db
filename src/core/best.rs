use crate::core::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Shared slot holding the best complete path found so far
///
/// Publishing is a check-and-replace under the mutex, so concurrent
/// publishers cannot lose each other's updates. The score is mirrored into an
/// atomic (offset by one, zero meaning empty) so branches can poll it without
/// taking the lock.
#[derive(Debug, Default)]
pub struct BestSlot {
    path: Mutex<Option<Path>>,
    score: AtomicUsize,
}

impl BestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `path` if it is complete and strictly beats the current best
    pub fn offer(&self, path: &Path) -> bool {
        if !path.is_complete() {
            return false;
        }

        let mut slot = self.path.lock().unwrap_or_else(PoisonError::into_inner);
        let improves = match slot.as_ref() {
            Some(current) => path.valid_pairs() > current.valid_pairs(),
            None => true,
        };

        if improves {
            *slot = Some(path.clone());
            self.score.store(path.valid_pairs() + 1, Ordering::Release);
        }

        improves
    }

    /// Score of the current best, `None` while empty
    pub fn score(&self) -> Option<usize> {
        match self.score.load(Ordering::Acquire) {
            0 => None,
            stored => Some(stored - 1),
        }
    }

    /// Whether the best path already reaches `max_score`
    pub fn is_optimal(&self, max_score: usize) -> bool {
        self.score() == Some(max_score)
    }

    pub fn into_inner(self) -> Option<Path> {
        self.path.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
