//! Bounded worker pool with a completion barrier.
//!
//! A fixed number of OS threads pull items from one shared queue and send
//! results back over a channel. [`WorkerPool::run`] returns only when every
//! submitted item has finished, which is what keeps pages strictly ordered:
//! nothing from the next batch is queued until the current one drains.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Mutex;
use thiserror::Error;

/// A job panicked instead of returning. The rest of the batch still runs.
#[derive(Debug, Error)]
#[error("job {index} panicked: {message}")]
pub struct JobPanicked {
    /// Position of the item in the submitted batch.
    pub index: usize,
    pub message: String,
}

pub type JobResult<R> = Result<R, JobPanicked>;

/// Fixed-width pool; at most `width` jobs execute at once.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    width: usize,
}

impl WorkerPool {
    /// Width 0 is treated as 1.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Run `job` over every item and wait for all of them.
    ///
    /// Results come back in completion order. `on_progress(done, total)` is
    /// called on the calling thread after each completion.
    pub fn run<T, R, F, P>(&self, items: Vec<T>, job: F, mut on_progress: P) -> Vec<JobResult<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
        P: FnMut(usize, usize),
    {
        let count = items.len();
        if count == 0 {
            return Vec::new();
        }

        let work: Mutex<VecDeque<(usize, T)>> = Mutex::new(items.into_iter().enumerate().collect());
        let (tx, rx) = mpsc::channel::<JobResult<R>>();
        let num_workers = self.width.min(count);

        std::thread::scope(|s| {
            for _ in 0..num_workers {
                let tx = tx.clone();
                let work = &work;
                let job = &job;
                s.spawn(move || loop {
                    let next = match work.lock() {
                        Ok(mut queue) => queue.pop_front(),
                        Err(poisoned) => poisoned.into_inner().pop_front(),
                    };
                    let Some((index, item)) = next else {
                        break;
                    };
                    let res = panic::catch_unwind(AssertUnwindSafe(|| job(item))).map_err(|p| {
                        JobPanicked {
                            index,
                            message: panic_message(p.as_ref()),
                        }
                    });
                    if tx.send(res).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            let mut results = Vec::with_capacity(count);
            for res in rx.iter() {
                results.push(res);
                on_progress(results.len(), count);
            }
            results
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn runs_every_item_once() {
        let pool = WorkerPool::new(4);
        let mut results: Vec<u32> = pool
            .run((0..50u32).collect(), |x| x * 2, |_, _| {})
            .into_iter()
            .map(Result::unwrap)
            .collect();
        results.sort_unstable();
        assert_eq!(results, (0..50u32).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn never_exceeds_width() {
        let pool = WorkerPool::new(3);
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let results = pool.run(
            (0..24).collect::<Vec<u32>>(),
            |_| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(10));
                active.fetch_sub(1, Ordering::SeqCst);
            },
            |_, _| {},
        );
        assert_eq!(results.len(), 24);
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency {} exceeded width", peak);
        assert!(peak >= 1);
    }

    #[test]
    fn progress_counts_up_to_total() {
        let pool = WorkerPool::new(2);
        let mut seen = Vec::new();
        pool.run(vec![1, 2, 3, 4, 5], |x| x, |done, total| seen.push((done, total)));
        assert_eq!(seen, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
    }

    #[test]
    fn all_items_finish_before_run_returns() {
        let pool = WorkerPool::new(4);
        let finished = AtomicUsize::new(0);
        for batch in 0..3u64 {
            let before = finished.load(Ordering::SeqCst);
            pool.run(
                (0..10u64).collect(),
                |i| {
                    std::thread::sleep(Duration::from_millis((i + batch) % 4));
                    finished.fetch_add(1, Ordering::SeqCst);
                },
                |_, _| {},
            );
            assert_eq!(finished.load(Ordering::SeqCst), before + 10);
        }
    }

    #[test]
    fn panicking_job_does_not_sink_the_batch() {
        let pool = WorkerPool::new(2);
        let results = pool.run(
            vec![1, 2, 3],
            |x| {
                if x == 2 {
                    panic!("boom on {}", x);
                }
                x
            },
            |_, _| {},
        );
        assert_eq!(results.len(), 3);
        let failed: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].index, 1);
        assert!(failed[0].message.contains("boom on 2"));
    }

    #[test]
    fn empty_batch_and_zero_width() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.width(), 1);
        let results: Vec<JobResult<u8>> = pool.run(Vec::<u8>::new(), |x| x, |_, _| {});
        assert!(results.is_empty());
    }
}
