use crate::core::{best::BestSlot, partition::partition, path::Path};
use crate::models::{Pairing, Participant};
use crossbeam_channel::{unbounded, Receiver};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use thiserror::Error;

/// Errors raised by the matching engine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The caller's stop flag was raised before any complete ordering was
    /// published. Without a stop the first complete path always lands in the
    /// slot, since bound pruning only starts once the slot is non-empty.
    #[error("Search cancelled before a complete ordering was found")]
    Cancelled,
}

/// Counters collected while exploring the permutation tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_expanded: u64,
    pub paths_offered: u64,
    /// Subtree roots taken off the work queue
    pub subtrees_explored: u64,
}

impl std::ops::AddAssign for SearchStats {
    fn add_assign(&mut self, other: Self) {
        self.nodes_expanded += other.nodes_expanded;
        self.paths_offered += other.paths_offered;
        self.subtrees_explored += other.subtrees_explored;
    }
}

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    /// Winning ordering, a permutation of the input
    pub order: Vec<Participant>,
    /// Valid adjacent pairs at even boundaries of `order`
    pub valid_pairs: usize,
    pub pairing: Pairing,
    pub stats: SearchStats,
    /// The stop flag was raised before `floor(N/2)` was reached, so `order`
    /// is the best found so far rather than a proven optimum
    pub cancelled: bool,
}

/// Read-only state shared by every worker of one search
struct SearchContext<'a> {
    participants: &'a [Participant],
    best: &'a BestSlot,
    max_score: usize,
    stop: &'a AtomicBool,
}

impl SearchContext<'_> {
    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed) || self.best.is_optimal(self.max_score)
    }
}

/// Exhaustive parallel search for the ordering with the most valid pairs
///
/// # Search
/// 1. The top of the permutation tree is expanded breadth-first down to
///    `split_depth`, one seed per participant.
/// 2. A fixed pool of scoped worker threads pulls those subtree roots off a
///    shared channel and explores each depth-first.
/// 3. Complete paths are offered to a single mutex-guarded best slot.
/// 4. Branches stop expanding once the slot holds `floor(N/2)` valid pairs,
///    when they can no longer beat it, or when the caller raises its stop flag.
///
/// The branch count grows factorially with the number of participants. The
/// engine owns no timeout; callers bound the wall clock through
/// [`Matcher::find_matches_until`].
#[derive(Debug, Clone)]
pub struct Matcher {
    workers: usize,
    split_depth: usize,
}

impl Matcher {
    pub fn new(workers: usize, split_depth: usize) -> Self {
        Self {
            workers: workers.max(1),
            split_depth: split_depth.max(1),
        }
    }

    pub fn with_default_settings() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(workers, 2)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn split_depth(&self) -> usize {
        self.split_depth
    }

    /// Run the search and partition the winning ordering
    ///
    /// # Arguments
    /// * `participants` - Today's opted-in participants
    ///
    /// # Returns
    /// MatchResult with the winning ordering, its score and the delivered pairs
    pub fn find_matches(&self, participants: Vec<Participant>) -> Result<MatchResult, EngineError> {
        self.find_matches_until(participants, &AtomicBool::new(false))
    }

    /// Same as [`Matcher::find_matches`], but gives up once `stop` is raised
    ///
    /// Workers poll the flag before every node, so the search returns shortly
    /// after it is set with the best complete ordering published so far.
    /// Fails with [`EngineError::Cancelled`] if none was published yet.
    pub fn find_matches_until(
        &self,
        participants: Vec<Participant>,
        stop: &AtomicBool,
    ) -> Result<MatchResult, EngineError> {
        let (path, stats) = self.find_best_path(&participants, stop)?;
        let valid_pairs = path.valid_pairs();
        let cancelled = stop.load(Ordering::Relaxed) && valid_pairs < participants.len() / 2;

        let mut slots: Vec<Option<Participant>> = participants.into_iter().map(Some).collect();
        let order: Vec<Participant> = path
            .into_order()
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect();

        let pairing = partition(order.clone());

        Ok(MatchResult {
            order,
            valid_pairs,
            pairing,
            stats,
            cancelled,
        })
    }

    /// Find a complete path maximizing the number of valid pairs
    pub fn find_best_path(
        &self,
        participants: &[Participant],
        stop: &AtomicBool,
    ) -> Result<(Path, SearchStats), EngineError> {
        validate(participants)?;

        let total = participants.len();
        if total == 0 {
            return Ok((Path::empty(), SearchStats::default()));
        }

        let max_score = total / 2;
        let best = BestSlot::new();
        let ctx = SearchContext {
            participants,
            best: &best,
            max_score,
            stop,
        };

        let mut stats = SearchStats::default();
        let frontier = self.expand_frontier(&ctx, &mut stats);
        let workers = self.workers.min(frontier.len()).max(1);

        tracing::debug!(
            "Searching {} participants: {} subtrees across {} workers (max score {})",
            total,
            frontier.len(),
            workers,
            max_score
        );

        // Every root is queued up front; once the sender is gone an empty
        // channel reads as disconnected and workers exit
        let (sender, queue) = unbounded();
        for root in frontier {
            // The receiver is still alive here
            let _ = sender.send(root);
        }
        drop(sender);

        let worker_stats: Vec<SearchStats> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let queue = &queue;
                    let ctx = &ctx;
                    scope.spawn(move || run_worker(queue, ctx))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        for worker in worker_stats {
            stats += worker;
        }

        let path = match best.into_inner() {
            Some(path) => path,
            None => {
                tracing::warn!("Search over {} participants stopped before any complete ordering", total);
                return Err(EngineError::Cancelled);
            }
        };

        if stop.load(Ordering::Relaxed) && path.valid_pairs() < max_score {
            tracing::warn!(
                "Search stopped by caller with {} of {} possible valid pairs",
                path.valid_pairs(),
                max_score
            );
        }

        tracing::debug!(
            "Search done: {} valid pairs of {} possible ({} nodes, {} complete paths offered)",
            path.valid_pairs(),
            max_score,
            stats.nodes_expanded,
            stats.paths_offered
        );

        Ok((path, stats))
    }

    /// Expand seeds breadth-first until every queued path reaches the split depth
    fn expand_frontier(&self, ctx: &SearchContext<'_>, stats: &mut SearchStats) -> VecDeque<Path> {
        let total = ctx.participants.len();
        let depth = self.split_depth.min(total);

        let mut frontier: VecDeque<Path> = (0..total).map(|start| Path::seed(start, total)).collect();
        while frontier.front().is_some_and(|path| path.len() < depth) {
            let Some(path) = frontier.pop_front() else {
                break;
            };
            stats.nodes_expanded += 1;
            for next in path.unvisited() {
                frontier.push_back(path.extend(next, ctx.participants));
            }
        }

        frontier
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_settings()
    }
}

/// Reject input the search cannot handle before any work starts
fn validate(participants: &[Participant]) -> Result<(), EngineError> {
    let mut ids = HashSet::with_capacity(participants.len());

    for participant in participants {
        if participant.pairing_difficulty.is_empty() {
            return Err(EngineError::InvalidInput(format!(
                "participant {} has no pairing difficulty",
                participant.id
            )));
        }
        if !ids.insert(participant.id.as_str()) {
            return Err(EngineError::InvalidInput(format!(
                "duplicate participant id {}",
                participant.id
            )));
        }
    }

    Ok(())
}

/// Pull subtree roots until the queue drains, the optimum is reached or the
/// caller stops the search
fn run_worker(queue: &Receiver<Path>, ctx: &SearchContext<'_>) -> SearchStats {
    let mut stats = SearchStats::default();

    while !ctx.should_stop() {
        match queue.recv() {
            Ok(path) => {
                stats.subtrees_explored += 1;
                explore(path, ctx, &mut stats);
            }
            Err(_) => break,
        }
    }

    stats
}

fn explore(path: Path, ctx: &SearchContext<'_>, stats: &mut SearchStats) {
    // Cooperative stop: floor(N/2) already reached, or the caller gave up
    if ctx.should_stop() {
        return;
    }

    if path.is_complete() {
        stats.paths_offered += 1;
        ctx.best.offer(&path);
        return;
    }

    if ctx.best.score().is_some_and(|best| path.upper_bound() <= best) {
        return;
    }

    stats.nodes_expanded += 1;
    for next in path.unvisited() {
        explore(path.extend(next, ctx.participants), ctx, stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compatibility::is_compatible;
    use crate::models::Level;

    fn participant(id: &str, experience: Level, prefs: &[Level]) -> Participant {
        Participant::new(id, format!("{}@example.com", id), experience, prefs.iter().copied())
    }

    fn count_valid(order: &[Participant]) -> usize {
        order
            .chunks_exact(2)
            .filter(|pair| is_compatible(&pair[0], &pair[1]))
            .count()
    }

    #[test]
    fn test_empty_input() {
        let matcher = Matcher::new(2, 2);
        let result = matcher.find_matches(vec![]).unwrap();

        assert!(result.order.is_empty());
        assert_eq!(result.valid_pairs, 0);
        assert!(result.pairing.pairs.is_empty());
        assert!(result.pairing.leftover.is_none());
    }

    #[test]
    fn test_single_participant() {
        let matcher = Matcher::new(2, 2);
        let result = matcher
            .find_matches(vec![participant("a", Level::Medium, &[Level::Easy])])
            .unwrap();

        assert_eq!(result.order.len(), 1);
        assert_eq!(result.valid_pairs, 0);
        assert_eq!(result.pairing.leftover.map(|p| p.id), Some("a".to_string()));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let matcher = Matcher::new(2, 2);
        let err = matcher
            .find_matches(vec![
                participant("a", Level::Medium, &[Level::Easy]),
                participant("a", Level::Hard, &[Level::Easy]),
            ])
            .unwrap_err();

        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_preferences_rejected() {
        let matcher = Matcher::new(2, 2);
        let err = matcher
            .find_matches(vec![
                participant("a", Level::Medium, &[Level::Easy]),
                participant("b", Level::Medium, &[]),
            ])
            .unwrap_err();

        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_finds_optimal_split() {
        // Only a-b and c-d are compatible; most orderings score less than 2
        let people = vec![
            participant("a", Level::Hard, &[Level::Hard]),
            participant("c", Level::Easy, &[Level::Easy]),
            participant("b", Level::Hard, &[Level::Hard]),
            participant("d", Level::Easy, &[Level::Easy]),
        ];

        let result = Matcher::new(4, 2).find_matches(people).unwrap();

        assert_eq!(result.valid_pairs, 2);
        assert_eq!(count_valid(&result.order), 2);
        assert!(result.pairing.pairs.iter().all(|p| p.compatible));
    }

    #[test]
    fn test_no_valid_pairs_still_returns_ordering() {
        let people = vec![
            participant("a", Level::Easy, &[Level::Hard]),
            participant("b", Level::Easy, &[Level::Hard]),
            participant("c", Level::Easy, &[Level::Hard]),
        ];

        let result = Matcher::new(2, 2).find_matches(people).unwrap();

        assert_eq!(result.valid_pairs, 0);
        assert_eq!(result.order.len(), 3);
        assert_eq!(result.pairing.pairs.len(), 1);
        assert!(result.pairing.leftover.is_some());
    }

    #[test]
    fn test_split_depth_beyond_population() {
        let people = vec![
            participant("a", Level::Hard, &[Level::Hard]),
            participant("b", Level::Hard, &[Level::Hard]),
        ];

        // Frontier expansion alone reaches complete paths
        let result = Matcher::new(1, 10).find_matches(people).unwrap();

        assert_eq!(result.valid_pairs, 1);
        assert_eq!(result.order.len(), 2);
    }

    #[test]
    fn test_single_worker_matches_parallel_score() {
        let people: Vec<Participant> = [
            (Level::Hard, Level::Hard),
            (Level::Easy, Level::Medium),
            (Level::Medium, Level::Easy),
            (Level::Hard, Level::Medium),
            (Level::Easy, Level::Easy),
            (Level::Medium, Level::Hard),
        ]
        .iter()
        .enumerate()
        .map(|(i, (exp, pref))| participant(&i.to_string(), *exp, &[*pref]))
        .collect();

        let sequential = Matcher::new(1, 1).find_matches(people.clone()).unwrap();
        let parallel = Matcher::new(8, 3).find_matches(people).unwrap();

        assert_eq!(sequential.valid_pairs, parallel.valid_pairs);
    }

    /// n-1 participants who accept each other plus one nobody can satisfy,
    /// so floor(N/2) is never reached and the optimum never stops the search
    fn unsatisfiable_population(count: usize) -> Vec<Participant> {
        let mut people: Vec<Participant> = (1..count)
            .map(|i| participant(&format!("p{}", i), Level::Medium, &[Level::Easy]))
            .collect();
        people.push(participant("picky", Level::Easy, &[Level::Hard]));
        people
    }

    #[test]
    fn test_stops_once_optimum_reached() {
        // Every ordering is perfect, so the first complete path ends the search
        let people: Vec<Participant> = (0..10)
            .map(|i| participant(&i.to_string(), Level::Medium, &[Level::Easy]))
            .collect();

        let result = Matcher::new(1, 1).find_matches(people).unwrap();

        assert_eq!(result.valid_pairs, 5);
        assert!(!result.cancelled);
        assert_eq!(result.stats.paths_offered, 1);
        // One root-to-leaf descent, not 10! orderings
        assert_eq!(result.stats.subtrees_explored, 1);
        assert!(result.stats.nodes_expanded < 100, "expanded {}", result.stats.nodes_expanded);
    }

    #[test]
    fn test_raised_stop_before_search_is_cancelled() {
        let stop = AtomicBool::new(true);
        let err = Matcher::new(2, 2)
            .find_matches_until(unsatisfiable_population(6), &stop)
            .unwrap_err();

        assert_eq!(err, EngineError::Cancelled);
    }

    #[test]
    fn test_stop_returns_best_found_so_far() {
        let stop = AtomicBool::new(false);
        let started = std::time::Instant::now();

        // Exhausting 12! orderings takes minutes; the flag cuts it short
        let result = thread::scope(|scope| {
            scope.spawn(|| {
                thread::sleep(std::time::Duration::from_millis(50));
                stop.store(true, Ordering::Relaxed);
            });
            Matcher::new(2, 2).find_matches_until(unsatisfiable_population(12), &stop)
        })
        .unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(20));
        assert!(result.cancelled);
        assert_eq!(result.order.len(), 12);
        assert!(result.valid_pairs <= 5);
        assert_eq!(result.valid_pairs, count_valid(&result.order));
    }

    #[test]
    fn test_unraised_stop_runs_to_completion() {
        let stop = AtomicBool::new(false);
        let result = Matcher::new(2, 2)
            .find_matches_until(unsatisfiable_population(6), &stop)
            .unwrap();

        assert!(!result.cancelled);
        assert_eq!(result.valid_pairs, 2);
    }

    #[test]
    fn test_settings_clamped() {
        let matcher = Matcher::new(0, 0);
        assert_eq!(matcher.workers(), 1);
        assert_eq!(matcher.split_depth(), 1);
    }
}
