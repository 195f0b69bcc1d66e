//! Scheduler supervisor
//!
//! Owns every periodic task the daemon runs. One task per tag: scheduling a
//! tag that is already registered is a no-op, so startup is idempotent no
//! matter how many times it is attempted. A job error is caught and logged
//! without unscheduling the task; the next tick is the retry. `stop()`
//! cancels and deregisters everything and is terminal - a stopped
//! supervisor refuses new work.
//!
//! Aborting between ticks cannot corrupt the registry: every registry
//! mutation is atomic per entity, and a tick abandoned partway is simply
//! re-evaluated from scratch on the next sweep.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Recoverable error raised by one execution of a periodic job
pub type JobError = Box<dyn std::error::Error + Send + Sync>;

/// Process-wide periodic task runner
pub struct Supervisor {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
    stopped: AtomicBool,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            stopped: AtomicBool::new(false),
        }
    }

    /// Register a recurring job under `tag`. Returns `false` without
    /// spawning anything when the tag is already registered or the
    /// supervisor has been stopped.
    pub fn schedule<F, Fut>(&self, tag: &str, every: Duration, job: F) -> bool
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send,
    {
        if self.stopped.load(Ordering::SeqCst) {
            warn!(tag, "Supervisor is stopped; refusing to schedule task");
            return false;
        }

        let mut tasks = self.tasks.lock().expect("supervisor task table poisoned");
        if tasks.contains_key(tag) {
            debug!(tag, "Task already scheduled; skipping");
            return false;
        }

        let task_tag = tag.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = job().await {
                    // Recoverable: the task keeps its schedule
                    error!(tag = %task_tag, error = %e, "Periodic task failed; retrying next tick");
                }
            }
        });

        tasks.insert(tag.to_string(), handle);
        info!(tag, interval_secs = every.as_secs(), "Scheduled periodic task");
        true
    }

    pub fn is_scheduled(&self, tag: &str) -> bool {
        let tasks = self.tasks.lock().expect("supervisor task table poisoned");
        tasks.get(tag).map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// Tags of every currently-running task, for the monitor report
    pub fn running_tags(&self) -> Vec<String> {
        let tasks = self.tasks.lock().expect("supervisor task table poisoned");
        let mut tags: Vec<String> = tasks
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .map(|(tag, _)| tag.clone())
            .collect();
        tags.sort();
        tags
    }

    /// Synchronously cancel and deregister every task. Terminal: tasks are
    /// not auto-restarted and later `schedule` calls are refused.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let mut tasks = self.tasks.lock().expect("supervisor task table poisoned");
        for (tag, handle) in tasks.drain() {
            handle.abort();
            info!(tag, "Stopped periodic task");
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_schedule_is_idempotent_per_tag() {
        let supervisor = Supervisor::new();

        assert!(supervisor.schedule("sweep", Duration::from_secs(60), || async { Ok(()) }));
        assert!(!supervisor.schedule("sweep", Duration::from_secs(60), || async { Ok(()) }));

        assert_eq!(supervisor.running_tags(), vec!["sweep".to_string()]);
        supervisor.stop();
    }

    #[tokio::test]
    async fn test_stop_is_terminal() {
        let supervisor = Supervisor::new();
        assert!(supervisor.schedule("sweep", Duration::from_secs(60), || async { Ok(()) }));

        supervisor.stop();
        assert!(supervisor.running_tags().is_empty());
        assert!(!supervisor.schedule("sweep", Duration::from_secs(60), || async { Ok(()) }));
    }

    #[tokio::test]
    async fn test_failing_job_keeps_firing() {
        let supervisor = Supervisor::new();
        let ticks = Arc::new(AtomicU32::new(0));
        let counter = ticks.clone();

        supervisor.schedule("flaky", Duration::from_millis(10), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), JobError>("boom".into())
            }
        });

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(ticks.load(Ordering::SeqCst) >= 2);
        assert!(supervisor.is_scheduled("flaky"));
        supervisor.stop();
    }
}
