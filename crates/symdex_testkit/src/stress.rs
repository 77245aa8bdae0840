//! Stress tests for symdex.
//!
//! These tests verify index invariants under heavy load and concurrent
//! access through the indexer facade.

use crate::entities::Pet;
use crate::fixtures::scenarios;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use symdex_core::Indexer;

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Logs a summary of the run.
    pub fn log_summary(&self, name: &str) {
        tracing::info!(
            name,
            total = self.total_ops,
            successful = self.successful_ops,
            failed = self.failed_ops,
            duration = ?self.duration,
            ops_per_second = self.ops_per_second,
            "stress run finished"
        );
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct values contended for.
    pub value_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 4,
            value_count: 16,
        }
    }
}

/// Every thread tries to claim every name on the unique `Name` index.
///
/// Exactly one add per name may succeed; all others must fail with
/// `AlreadyExists`. Returns successes and failures. The indexer must have
/// the pet indices registered.
pub fn stress_unique_contention(indexer: Arc<Indexer>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let indexer = Arc::clone(&indexer);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let value_count = config.value_count;

            thread::spawn(move || {
                for v in 0..value_count {
                    let pet = Pet::new(&format!("t{t}v{v}"), &format!("name{v}"), "", "Dog");
                    match indexer.add(&pet) {
                        Ok(_) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(err) => {
                            assert!(err.is_already_exists(), "unexpected error: {err}");
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// A writer recolors pets while readers look colors up.
///
/// Lookups hold the type's read lock, so a reader never lists a value
/// directory while the writer is emptying it. Every lookup must succeed and
/// return only known pets. Returns the number of clean and failed lookups.
pub fn stress_readers_and_writers(
    indexer: Arc<Indexer>,
    config: &StressConfig,
) -> StressTestResult {
    let pets: Vec<Pet> = (0..config.value_count)
        .map(|i| Pet::new(&format!("p{i}"), &format!("pet{i}"), "Green", "Dog"))
        .collect();
    for pet in &pets {
        indexer.add(pet).expect("Failed to add pet");
    }
    let pets = Arc::new(pets);
    let type_name = Pet::type_name_of();

    let consistent = Arc::new(AtomicUsize::new(0));
    let inconsistent = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let writer = {
        let indexer = Arc::clone(&indexer);
        let pets = Arc::clone(&pets);
        let operations = config.operations;
        thread::spawn(move || {
            let mut current: Vec<Pet> = pets.to_vec();
            for i in 0..operations {
                let slot = i % current.len();
                let next_color = if current[slot].color == "Green" { "White" } else { "Green" };
                let next = current[slot].with_color(next_color);
                indexer.update(&current[slot], &next).expect("Failed to recolor");
                current[slot] = next;
            }
        })
    };

    let readers: Vec<_> = (0..config.threads)
        .map(|_| {
            let indexer = Arc::clone(&indexer);
            let consistent = Arc::clone(&consistent);
            let inconsistent = Arc::clone(&inconsistent);
            let type_name = type_name.clone();
            let operations = config.operations;
            let known: Vec<String> = pets.iter().map(|p| p.id.clone()).collect();
            thread::spawn(move || {
                for i in 0..operations {
                    let color = if i % 2 == 0 { "Green" } else { "White" };
                    match indexer.find_by(&type_name, "Color", color) {
                        Ok(found) if found.iter().all(|pk| known.contains(pk)) => {
                            consistent.fetch_add(1, Ordering::Relaxed);
                        }
                        _ => {
                            inconsistent.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    writer.join().expect("Writer panicked");
    for reader in readers {
        reader.join().expect("Reader panicked");
    }

    StressTestResult::new(
        consistent.load(Ordering::Relaxed),
        inconsistent.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Registers the pet indices on `indexer` and shares it.
pub fn shared_pet_indexer(indexer: Indexer) -> Arc<Indexer> {
    scenarios::pet_indices(&indexer);
    Arc::new(indexer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestIndexer;

    fn small() -> StressConfig {
        StressConfig {
            operations: 40,
            threads: 3,
            value_count: 8,
        }
    }

    #[test]
    fn unique_contention_has_one_winner_per_value() {
        let test = TestIndexer::remote();
        let config = small();
        let indexer = shared_pet_indexer(test.indexer);

        let result = stress_unique_contention(Arc::clone(&indexer), &config);
        result.log_summary("unique contention");
        assert_eq!(result.successful_ops, config.value_count);
        assert_eq!(result.failed_ops, config.value_count * (config.threads - 1));
    }

    #[test]
    fn unique_contention_on_disk() {
        let test = TestIndexer::disk();
        let config = small();
        // The temp dir stays alive in the rest of `test`.
        let indexer = shared_pet_indexer(test.indexer);

        let result = stress_unique_contention(indexer, &config);
        assert_eq!(result.successful_ops, config.value_count);
    }

    #[test]
    fn readers_see_whole_updates() {
        let test = TestIndexer::remote();
        let indexer = shared_pet_indexer(test.indexer);

        let config = small();
        let result = stress_readers_and_writers(indexer, &config);
        result.log_summary("readers and writers");
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, config.operations * config.threads);
    }
}
