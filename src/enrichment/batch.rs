/*!
 * Round-based batch execution with bounded concurrency.
 *
 * A batch runs one task over a working set of terms. Each round dispatches
 * every pending term to a pool of at most `concurrency` in-flight tasks and
 * waits for all of them to settle. Terms whose task failed are dispatched
 * again in the next round with the retry flag set, up to `max_retry` extra
 * rounds. Terms that never succeed are returned unchanged.
 */

use futures::stream::{self, StreamExt};
use log::{info, warn};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use crate::errors::TaskError;
use crate::glossary::term::{Term, TermKey};

/// Retry rounds after the first one
pub const MAX_RETRY: usize = 2;

/// Called with (settled, total) as tasks of a round settle
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Result of a batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Terms in input order; succeeded ones replaced by the task output
    pub terms: Vec<Term>,
    /// Keys of dispatched terms whose task succeeded
    pub succeeded: HashSet<TermKey>,
    /// Keys of dispatched terms still failing after the last round
    pub failed: HashSet<TermKey>,
    /// Rounds actually run
    pub rounds: usize,
}

/// Runs a task over terms in settle-all rounds
#[derive(Clone)]
pub struct BatchRunner {
    /// Maximum number of tasks in flight
    concurrency: usize,
    max_retry: usize,
    progress: Option<ProgressCallback>,
}

impl BatchRunner {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            max_retry: MAX_RETRY,
            progress: None,
        }
    }

    pub fn with_max_retry(mut self, max_retry: usize) -> Self {
        self.max_retry = max_retry;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run `task` over `terms`.
    ///
    /// # Arguments
    /// * `label` - Task name used in log messages
    /// * `terms` - Working set; keys are taken before the first dispatch
    /// * `task` - Maps a term and the retry flag to the enriched term
    ///
    /// # Returns
    /// * `BatchOutcome` - Never fails; per-term failures end up in `failed`
    pub async fn run<F, Fut>(&self, label: &str, terms: Vec<Term>, task: F) -> BatchOutcome
    where
        F: Fn(Term, bool) -> Fut,
        Fut: Future<Output = Result<Term, TaskError>>,
    {
        let keys: Vec<TermKey> = terms.iter().map(Term::key).collect();
        let mut results = terms;
        let mut succeeded: HashSet<TermKey> = HashSet::new();
        let mut pending: Vec<usize> = (0..results.len()).collect();
        let mut rounds = 0;

        while !pending.is_empty() && rounds <= self.max_retry {
            rounds += 1;
            let retry = rounds > 1;
            if retry {
                warn!("{}: starting retry round {} / {} for {} term(s)", label, rounds - 1, self.max_retry, pending.len());
            }

            let total = pending.len();
            let mut settled = Vec::with_capacity(total);
            {
                let mut in_flight = stream::iter(pending.iter().copied())
                    .map(|index| {
                        let request = task(results[index].clone(), retry);
                        async move { (index, request.await) }
                    })
                    .buffer_unordered(self.concurrency);

                while let Some(outcome) = in_flight.next().await {
                    settled.push(outcome);
                    if let Some(progress) = &self.progress {
                        progress(settled.len(), total);
                    }
                }
            }

            for (index, outcome) in settled {
                match outcome {
                    Ok(term) => {
                        results[index] = term;
                        succeeded.insert(keys[index].clone());
                    }
                    Err(e) => warn!("{}: task failed for {} ({}): {}", label, keys[index].surface, keys[index].entity_type, e),
                }
            }

            pending.retain(|index| !succeeded.contains(&keys[*index]));
        }

        let failed: HashSet<TermKey> = keys.iter().filter(|key| !succeeded.contains(*key)).cloned().collect();
        if failed.is_empty() {
            info!("{}: {} term(s) done in {} round(s)", label, succeeded.len(), rounds);
        } else {
            warn!(
                "{}: {} term(s) done, {} still failing after {} round(s)",
                label,
                succeeded.len(),
                failed.len(),
                rounds
            );
        }

        BatchOutcome {
            terms: results,
            succeeded,
            failed,
            rounds,
        }
    }
}
