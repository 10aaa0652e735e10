//! Bounded worker pool shared by the scan, metadata and execution phases.
//!
//! Dispatcher + worker design:
//! - the dispatcher feeds jobs, in order, into one bounded queue
//! - a fixed number of workers take the next job when idle and run it on
//!   the blocking thread pool
//! - workers fan `Started`/`Finished` messages into a single completion
//!   channel, observed by the calling thread as they arrive

use crate::types::SyncError;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{mpsc, Mutex};

const QUEUE_CAPACITY: usize = 64;

/// Transition observed by the caller of [`WorkerPool::run`]
#[derive(Debug)]
pub enum PoolEvent<'a, R> {
    /// A worker picked up the job at `index`
    Started { index: usize },

    /// The job at `index` returned; `finished` counts completed jobs so far
    Finished {
        index: usize,
        finished: usize,
        total: usize,
        result: &'a R,
    },
}

enum Message<R> {
    Started(usize),
    Finished(usize, R),
    Panicked(usize, String),
}

/// Fixed-size pool of workers on a dedicated runtime
pub struct WorkerPool {
    runtime: Runtime,
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with `worker_count` workers (at least one)
    pub fn new(worker_count: usize) -> Result<Self, SyncError> {
        let workers = worker_count.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .max_blocking_threads(workers)
            .thread_name("twinsync-worker")
            .enable_all()
            .build()
            .map_err(SyncError::Io)?;

        Ok(Self { runtime, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `work` over every job and block until all jobs finished
    ///
    /// Results come back in job order. `on_event` runs on the calling
    /// thread for every start and completion. A panicking job is reported
    /// as [`SyncError::Internal`] once all other jobs have finished.
    pub fn run<J, R, F, C>(&self, jobs: Vec<J>, work: F, mut on_event: C) -> Result<Vec<R>, SyncError>
    where
        J: Send + 'static,
        R: Send + 'static,
        F: Fn(J) -> R + Send + Sync + 'static,
        C: FnMut(PoolEvent<'_, R>),
    {
        let total = jobs.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let work = Arc::new(work);
        let worker_count = self.workers.min(total);

        self.runtime.block_on(async move {
            let (queue_tx, queue_rx) = mpsc::channel::<(usize, J)>(QUEUE_CAPACITY);
            let queue_rx = Arc::new(Mutex::new(queue_rx));
            let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Message<R>>();

            let mut worker_handles = Vec::with_capacity(worker_count);
            for _ in 0..worker_count {
                worker_handles.push(tokio::spawn(worker_loop(
                    Arc::clone(&queue_rx),
                    Arc::clone(&work),
                    done_tx.clone(),
                )));
            }
            // Only workers hold completion senders now; the channel closes
            // when the last worker exits.
            drop(done_tx);

            let dispatcher_handle = tokio::spawn(dispatcher_loop(jobs, queue_tx));

            let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
            let mut finished = 0usize;
            let mut panics: Vec<String> = Vec::new();

            while let Some(message) = done_rx.recv().await {
                match message {
                    Message::Started(index) => on_event(PoolEvent::Started { index }),
                    Message::Finished(index, result) => {
                        finished += 1;
                        on_event(PoolEvent::Finished {
                            index,
                            finished,
                            total,
                            result: &result,
                        });
                        slots[index] = Some(result);
                    }
                    Message::Panicked(index, reason) => {
                        finished += 1;
                        panics.push(format!("job {}: {}", index, reason));
                    }
                }
            }

            dispatcher_handle.await.map_err(map_join_error)?;
            for handle in worker_handles {
                handle.await.map_err(map_join_error)?;
            }

            if let Some(first) = panics.first() {
                return Err(SyncError::Internal(format!(
                    "{} pool job(s) panicked, first: {}",
                    panics.len(),
                    first
                )));
            }

            slots
                .into_iter()
                .enumerate()
                .map(|(index, slot)| {
                    slot.ok_or_else(|| {
                        SyncError::Internal(format!("pool job {} produced no result", index))
                    })
                })
                .collect()
        })
    }
}

async fn dispatcher_loop<J>(jobs: Vec<J>, queue_tx: mpsc::Sender<(usize, J)>) {
    for (index, job) in jobs.into_iter().enumerate() {
        if queue_tx.send((index, job)).await.is_err() {
            break;
        }
    }
    // queue_tx is dropped here, which lets idle workers exit.
}

async fn worker_loop<J, R, F>(
    queue_rx: Arc<Mutex<mpsc::Receiver<(usize, J)>>>,
    work: Arc<F>,
    done_tx: mpsc::UnboundedSender<Message<R>>,
) where
    J: Send + 'static,
    R: Send + 'static,
    F: Fn(J) -> R + Send + Sync + 'static,
{
    loop {
        let next = queue_rx.lock().await.recv().await;
        let Some((index, job)) = next else {
            break;
        };

        if done_tx.send(Message::Started(index)).is_err() {
            break;
        }

        let work = Arc::clone(&work);
        let message = match tokio::task::spawn_blocking(move || work(job)).await {
            Ok(result) => Message::Finished(index, result),
            Err(error) => Message::Panicked(index, error.to_string()),
        };

        if done_tx.send(message).is_err() {
            break;
        }
    }
}

fn map_join_error(error: tokio::task::JoinError) -> SyncError {
    SyncError::Internal(format!("worker pool task failed: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_results_come_back_in_job_order() {
        let pool = WorkerPool::new(4).expect("create pool");
        let jobs: Vec<u64> = (0..100).collect();

        let results = pool.run(jobs, |n| n * 2, |_| {}).expect("run pool");

        let expected: Vec<u64> = (0..100).map(|n| n * 2).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn test_every_job_reports_start_and_finish() {
        let pool = WorkerPool::new(3).expect("create pool");
        let mut started = HashSet::new();
        let mut finished_counts = Vec::new();

        pool.run(
            (0..20).collect::<Vec<usize>>(),
            |n| n,
            |event| match event {
                PoolEvent::Started { index } => {
                    started.insert(index);
                }
                PoolEvent::Finished {
                    finished, total, ..
                } => {
                    assert_eq!(total, 20);
                    finished_counts.push(finished);
                }
            },
        )
        .expect("run pool");

        assert_eq!(started.len(), 20);
        assert_eq!(finished_counts, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_concurrency_is_bounded_by_worker_count() {
        let pool = WorkerPool::new(2).expect("create pool");
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let job_running = Arc::clone(&running);
        let job_peak = Arc::clone(&peak);
        pool.run(
            (0..12).collect::<Vec<usize>>(),
            move |_| {
                let now = job_running.fetch_add(1, Ordering::SeqCst) + 1;
                job_peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(5));
                job_running.fetch_sub(1, Ordering::SeqCst);
            },
            |_| {},
        )
        .expect("run pool");

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_single_worker_runs_jobs_in_order() {
        let pool = WorkerPool::new(1).expect("create pool");
        let mut order = Vec::new();

        pool.run(
            (0..10).collect::<Vec<usize>>(),
            |n| n,
            |event| {
                if let PoolEvent::Finished { result, .. } = event {
                    order.push(*result);
                }
            },
        )
        .expect("run pool");

        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_enforces_minimum_one_worker() {
        let pool = WorkerPool::new(0).expect("create pool");
        assert_eq!(pool.workers(), 1);

        let results = pool.run(vec![1, 2, 3], |n| n + 1, |_| {}).expect("run pool");
        assert_eq!(results, vec![2, 3, 4]);
    }

    #[test]
    fn test_empty_job_list() {
        let pool = WorkerPool::new(2).expect("create pool");
        let results: Vec<u8> = pool.run(Vec::<u8>::new(), |n| n, |_| {}).expect("run pool");
        assert!(results.is_empty());
    }

    #[test]
    fn test_panicking_job_is_internal_error() {
        let pool = WorkerPool::new(2).expect("create pool");
        let completed = Arc::new(AtomicUsize::new(0));
        let job_completed = Arc::clone(&completed);

        let result = pool.run(
            vec![1, 2, 3, 4],
            move |n| {
                if n == 3 {
                    panic!("boom");
                }
                job_completed.fetch_add(1, Ordering::SeqCst);
                n
            },
            |_| {},
        );

        assert!(matches!(result, Err(SyncError::Internal(_))));
        assert_eq!(completed.load(Ordering::SeqCst), 3);
    }
}
