//! Shared test utilities for content-automator integration tests.
//!
//! `TestHarness` owns a file-backed database in a temp directory and a
//! worker with short poll intervals.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use content_automator::{
    ContentGenerator, ContentWorker, Database, GenerateError, JobStore, ModelStatus,
    TemplateGenerator, WorkerSettings,
};

pub struct TestHarness {
    pub worker: Arc<ContentWorker>,
    _temp_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_generator(Arc::new(TemplateGenerator::fallback()))
    }

    pub fn with_generator(generator: Arc<dyn ContentGenerator>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open(&temp_dir.path().join("content.db"))
            .expect("Failed to open test database");
        let worker = ContentWorker::new(
            JobStore::new(db),
            generator,
            WorkerSettings {
                idle_interval: Duration::from_millis(10),
                error_backoff: Duration::from_millis(10),
            },
        );

        Self {
            worker: Arc::new(worker),
            _temp_dir: temp_dir,
        }
    }

    pub fn store(&self) -> &JobStore {
        self.worker.store()
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.worker.stop();
        self.worker.wait();
    }
}

/// Polls `check` until it holds or ten seconds pass.
pub fn wait_until<F: FnMut() -> bool>(mut check: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

/// Records every topic it is asked to generate, in call order.
#[derive(Default)]
pub struct CountingGenerator {
    topics: Mutex<Vec<String>>,
    delay: Duration,
}

impl CountingGenerator {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            topics: Mutex::new(Vec::new()),
            delay,
        }
    }

    /// Number of generate calls per topic.
    pub fn calls(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for topic in self.topics.lock().unwrap().iter() {
            *counts.entry(topic.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn order(&self) -> Vec<String> {
        self.topics.lock().unwrap().clone()
    }
}

impl ContentGenerator for CountingGenerator {
    fn generate(&self, topic: &str) -> Result<String, GenerateError> {
        self.topics.lock().unwrap().push(topic.to_string());
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(format!("Article about {}", topic))
    }

    fn model_status(&self) -> ModelStatus {
        ModelStatus::from_model_path(None)
    }
}
