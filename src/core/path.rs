use crate::core::compatibility::is_compatible;
use crate::models::Participant;

/// A partial or complete ordering under exploration
///
/// Positions index into the participant slice of the current run. The seen
/// flags travel with the ordering so a branch can list unused participants
/// without scanning. Extending always produces a fresh copy; siblings never
/// share state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    order: Vec<usize>,
    seen: Vec<bool>,
    valid_pairs: usize,
}

impl Path {
    /// Ordering over zero participants, complete by definition
    pub fn empty() -> Self {
        Self {
            order: Vec::new(),
            seen: Vec::new(),
            valid_pairs: 0,
        }
    }

    /// Single-element path starting at `start`
    pub fn seed(start: usize, total: usize) -> Self {
        let mut seen = vec![false; total];
        seen[start] = true;

        Self {
            order: vec![start],
            seen,
            valid_pairs: 0,
        }
    }

    /// Copy this path with `next` appended, scoring the pair it completes
    pub fn extend(&self, next: usize, participants: &[Participant]) -> Self {
        debug_assert!(!self.seen[next], "participant {} visited twice", next);

        let mut path = self.clone();
        path.order.push(next);
        path.seen[next] = true;

        if path.order.len() % 2 == 0 {
            let first = &participants[path.order[path.order.len() - 2]];
            let second = &participants[next];
            if is_compatible(first, second) {
                path.valid_pairs += 1;
            }
        }

        path
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.order.len() == self.seen.len()
    }

    pub fn valid_pairs(&self) -> usize {
        self.valid_pairs
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn into_order(self) -> Vec<usize> {
        self.order
    }

    /// Indices not yet placed on this path
    pub fn unvisited(&self) -> impl Iterator<Item = usize> + '_ {
        self.seen
            .iter()
            .enumerate()
            .filter(|(_, seen)| !**seen)
            .map(|(idx, _)| idx)
    }

    /// Best score any completion of this path could reach
    pub fn upper_bound(&self) -> usize {
        let max_pairs = self.seen.len() / 2;
        let completed = self.order.len() / 2;
        self.valid_pairs + (max_pairs - completed)
    }
}
