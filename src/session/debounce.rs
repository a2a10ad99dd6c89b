//! Coalescing of rapid display updates.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Default delay between coalesced renders.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default)]
struct Slot {
    job: Option<Job>,
    last_fired: Option<Instant>,
    /// Bumped by `cancel` so an aborted timer never touches the slot again.
    generation: u64,
    timer_running: bool,
}

/// Single-slot scheduler for rate-limited work.
///
/// Runs are spaced at least `interval` apart, measured from the previous
/// run. The first job runs immediately. Jobs scheduled while a run is
/// pending replace the waiting job, so a burst results in one run
/// carrying the last request, and steady traffic still yields about one
/// run per interval.
pub struct Debouncer {
    interval: Duration,
    slot: Arc<Mutex<Slot>>,
    timer: Option<JoinHandle<()>>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Debouncer {
    /// Create a debouncer with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            slot: Arc::new(Mutex::new(Slot::default())),
            timer: None,
        }
    }

    /// Put `job` in the slot, replacing any job still waiting.
    pub fn schedule<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = lock(&self.slot);
        if slot.job.replace(Box::pin(job)).is_some() {
            trace!("debounce: superseded pending job");
        }
        if slot.timer_running {
            return;
        }
        slot.timer_running = true;

        let first_due = slot
            .last_fired
            .map_or_else(Instant::now, |at| at + self.interval);
        let generation = slot.generation;
        drop(slot);

        let shared = self.slot.clone();
        let interval = self.interval;
        self.timer = Some(tokio::spawn(async move {
            let mut due = first_due;
            loop {
                tokio::time::sleep_until(due).await;

                let job = {
                    let mut slot = lock(&shared);
                    if slot.generation != generation {
                        return;
                    }
                    match slot.job.take() {
                        Some(job) => {
                            slot.last_fired = Some(Instant::now());
                            job
                        }
                        None => {
                            slot.timer_running = false;
                            return;
                        }
                    }
                };
                job.await;
                due = Instant::now() + interval;

                let mut slot = lock(&shared);
                if slot.generation != generation {
                    return;
                }
                if slot.job.is_none() {
                    slot.timer_running = false;
                    return;
                }
            }
        }));
    }

    /// Drop the waiting job and stop the timer. Returns `true` if a job
    /// was still waiting.
    pub fn cancel(&mut self) -> bool {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let mut slot = lock(&self.slot);
        slot.generation = slot.generation.wrapping_add(1);
        slot.timer_running = false;
        slot.job.take().is_some()
    }

    /// Whether a job is waiting to run.
    pub fn has_pending(&self) -> bool {
        lock(&self.slot).job.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Arc<Mutex<Vec<u32>>>;

    fn push(log: &Log, n: u32) -> impl Future<Output = ()> + Send + 'static {
        let log = log.clone();
        async move { log.lock().unwrap().push(n) }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_job_immediate() {
        let log = Log::default();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        debouncer.schedule(push(&log, 1));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(*log.lock().unwrap(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_to_last() {
        let log = Log::default();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        debouncer.schedule(push(&log, 0));
        tokio::time::sleep(Duration::from_millis(1)).await;

        for n in 1..=50 {
            debouncer.schedule(push(&log, n));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(debouncer.has_pending());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*log.lock().unwrap(), vec![0, 50]);
        assert!(!debouncer.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_steady_requests_keep_firing() {
        let log = Log::default();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        for n in 0..20 {
            debouncer.schedule(push(&log, n));
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;

        let fired = log.lock().unwrap().clone();
        assert!((9..=12).contains(&fired.len()), "fired {fired:?}");
        assert_eq!(fired.first(), Some(&0));
        assert_eq!(fired.last(), Some(&19));
        assert!(fired.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_are_spaced_by_interval() {
        let log: Arc<Mutex<Vec<Instant>>> = Arc::default();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..40 {
            let log = log.clone();
            debouncer.schedule(async move { log.lock().unwrap().push(Instant::now()) });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;

        let fired = log.lock().unwrap().clone();
        assert!(fired[0] - start < Duration::from_millis(100));
        for pair in fired.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_fire_has_no_effect() {
        let log = Log::default();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        debouncer.schedule(push(&log, 0));
        tokio::time::sleep(Duration::from_millis(1)).await;
        debouncer.schedule(push(&log, 1));
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(*log.lock().unwrap(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_after_cancel_respects_spacing() {
        let log = Log::default();
        let mut debouncer = Debouncer::new(Duration::from_secs(1));

        debouncer.schedule(push(&log, 0));
        tokio::time::sleep(Duration::from_millis(1)).await;
        debouncer.cancel();

        debouncer.schedule(push(&log, 1));
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(*log.lock().unwrap(), vec![0]);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*log.lock().unwrap(), vec![0, 1]);
    }
}
