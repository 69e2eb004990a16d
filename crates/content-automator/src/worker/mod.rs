pub mod processor;

pub use processor::{JobProcessor, ProcessOutcome, SweepSummary};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info};

use crate::config::WorkerConfig;
use crate::error::{JobError, WorkerError};
use crate::generator::{ContentGenerator, ModelStatus};
use crate::store::JobStore;

/// Timing knobs for the background loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    /// How long to wait after finding the queue empty.
    pub idle_interval: Duration,
    /// How long to wait after a store error before polling again.
    pub error_backoff: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            idle_interval: Duration::from_secs(2),
            error_backoff: Duration::from_secs(10),
        }
    }
}

impl From<&WorkerConfig> for WorkerSettings {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            idle_interval: Duration::from_millis(config.poll_interval_ms),
            error_backoff: Duration::from_millis(config.error_backoff_ms),
        }
    }
}

/// Single background consumer of the job queue.
///
/// `start` runs the polling loop on a dedicated thread; `process_all_pending`
/// runs a forced sweep on the caller's thread. Both claim jobs atomically, so
/// they can run at the same time without processing a job twice.
pub struct ContentWorker {
    processor: JobProcessor,
    settings: WorkerSettings,
    running: Arc<AtomicBool>,
    wake_sender: Sender<()>,
    wake_receiver: Receiver<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ContentWorker {
    pub fn new(
        store: JobStore,
        generator: Arc<dyn ContentGenerator>,
        settings: WorkerSettings,
    ) -> Self {
        let (wake_sender, wake_receiver) = bounded(1);
        Self {
            processor: JobProcessor::new(store, generator),
            settings,
            running: Arc::new(AtomicBool::new(false)),
            wake_sender,
            wake_receiver,
            handle: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &JobStore {
        self.processor.store()
    }

    pub fn model_status(&self) -> ModelStatus {
        self.processor.generator().model_status()
    }

    /// Launches the polling loop on a background thread.
    ///
    /// If a previously stopped loop is still finishing its in-flight job,
    /// this waits for it first so the worker never runs two loops.
    pub fn start(&self) -> Result<(), WorkerError> {
        let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());

        if self.running.load(Ordering::SeqCst) {
            return Err(WorkerError::AlreadyRunning);
        }

        // The old loop sees `running == false` and exits after its current job.
        if let Some(previous) = handle.take() {
            if previous.join().is_err() {
                error!("Previous worker loop panicked");
            }
        }

        self.running.store(true, Ordering::SeqCst);

        let processor = self.processor.clone();
        let settings = self.settings;
        let running = Arc::clone(&self.running);
        let wake = self.wake_receiver.clone();

        let spawned = thread::Builder::new()
            .name("content-worker".to_string())
            .spawn(move || run_loop(processor, settings, running, wake));

        match spawned {
            Ok(join) => {
                *handle = Some(join);
                info!("Content worker started");
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(WorkerError::Spawn(e))
            }
        }
    }

    /// Asks the loop to exit. A job already being processed still finishes.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.notify();
            info!("Content worker stopped");
        }
    }

    /// Blocks until the loop thread has exited. Call after [`stop`](Self::stop).
    pub fn wait(&self) {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Worker loop panicked");
            } else {
                debug!("Worker loop joined");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Wakes an idle loop so it polls immediately, e.g. after a job insert.
    pub fn notify(&self) {
        // A full channel already holds a pending wake-up.
        let _ = self.wake_sender.try_send(());
    }

    /// Processes a snapshot of all pending jobs on the calling thread.
    pub fn process_all_pending(&self) -> Result<SweepSummary, JobError> {
        self.processor.process_all_pending()
    }
}

impl Drop for ContentWorker {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn run_loop(
    processor: JobProcessor,
    settings: WorkerSettings,
    running: Arc<AtomicBool>,
    wake: Receiver<()>,
) {
    info!("Worker loop started");

    while running.load(Ordering::SeqCst) {
        let wait = match processor.process_next() {
            Ok(Some(_)) => continue,
            Ok(None) => settings.idle_interval,
            Err(e) => {
                error!("Error getting pending job: {}", e);
                settings.error_backoff
            }
        };

        match wake.recv_timeout(wait) {
            Ok(()) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("Worker wake channel disconnected");
                break;
            }
        }
    }

    info!("Worker loop stopped");
}
