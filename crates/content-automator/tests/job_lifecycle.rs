//! End-to-end tests for the job lifecycle: store, worker loop and forced
//! sweeps working against the same file-backed database.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{wait_until, CountingGenerator, TestHarness};
use content_automator::{JobError, JobStatus};

#[test]
fn test_create_process_delete_scenario() {
    let harness = TestHarness::new();
    let store = harness.store();

    let job = store.create("rust ownership", "").unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.output, "");
    assert_eq!(job.created_at, job.updated_at);

    let summary = harness.worker.process_all_pending().unwrap();
    assert_eq!(summary.completed, 1);

    let done = store.get(job.id).unwrap();
    assert_eq!(done.status, JobStatus::Completed);
    assert!(done.output.contains("rust ownership"));
    assert!(!done.output.is_empty());
    assert!(done.updated_at >= done.created_at);
    assert_eq!(done.created_at, job.created_at);

    store.delete(job.id).unwrap();
    assert!(matches!(store.get(job.id), Err(JobError::NotFound(id)) if id == job.id));
}

#[test]
fn test_blank_topic_is_rejected_without_persisting() {
    let harness = TestHarness::new();
    let store = harness.store();
    store.create("existing", "").unwrap();
    let before = store.list().unwrap().len();

    assert!(matches!(store.create("", ""), Err(JobError::Validation(_))));
    assert_eq!(store.list().unwrap().len(), before);
}

#[test]
fn test_list_is_newest_first() {
    let harness = TestHarness::new();
    let store = harness.store();
    let first = store.create("first", "").unwrap();
    let second = store.create("second", "").unwrap();

    let ids: Vec<i64> = store.list().unwrap().iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[test]
fn test_sweep_without_pending_jobs_is_a_no_op() {
    let harness = TestHarness::new();
    let summary = harness.worker.process_all_pending().unwrap();
    assert_eq!(summary.snapshot, 0);
    assert!(harness.store().list().unwrap().is_empty());
}

#[test]
fn test_loop_drains_queue_in_creation_order() {
    let generator = Arc::new(CountingGenerator::default());
    let harness = TestHarness::with_generator(generator.clone());
    let store = harness.store();

    let topics: Vec<String> = (0..5).map(|i| format!("topic {}", i)).collect();
    for topic in &topics {
        store.create(topic, "").unwrap();
    }

    harness.worker.start().unwrap();
    assert!(wait_until(|| {
        store
            .list()
            .unwrap()
            .iter()
            .all(|j| j.status.is_terminal())
    }));
    harness.worker.stop();
    harness.worker.wait();

    assert_eq!(generator.order(), topics);
}

#[test]
fn test_sweep_processes_snapshot_oldest_first() {
    let generator = Arc::new(CountingGenerator::default());
    let harness = TestHarness::with_generator(generator.clone());
    let store = harness.store();

    let topics: Vec<String> = ["t1", "t2", "t3"].iter().map(|t| t.to_string()).collect();
    let mut previous = None;
    for topic in &topics {
        let job = store.create(topic, "").unwrap();
        if let Some(created_at) = previous {
            assert!(job.created_at >= created_at);
        }
        previous = Some(job.created_at);
    }

    let summary = harness.worker.process_all_pending().unwrap();
    assert_eq!(summary.snapshot, 3);
    assert_eq!(summary.completed, 3);
    assert_eq!(generator.order(), topics);
}

#[test]
fn test_loop_and_sweep_never_process_a_job_twice() {
    let generator = Arc::new(CountingGenerator::with_delay(Duration::from_millis(1)));
    let harness = TestHarness::with_generator(generator.clone());
    let store = harness.store().clone();

    let total = 40;
    for i in 0..total {
        store.create(&format!("job {}", i), "").unwrap();
    }

    harness.worker.start().unwrap();
    let sweeps: Vec<_> = (0..2)
        .map(|_| {
            let worker = Arc::clone(&harness.worker);
            thread::spawn(move || worker.process_all_pending().unwrap())
        })
        .collect();
    let swept: usize = sweeps
        .into_iter()
        .map(|h| h.join().unwrap().completed)
        .sum();

    assert!(wait_until(|| {
        store
            .list()
            .unwrap()
            .iter()
            .all(|j| j.status == JobStatus::Completed)
    }));

    let calls = generator.calls();
    assert_eq!(calls.len(), total);
    assert!(calls.values().all(|&n| n == 1), "duplicate processing: {:?}", calls);
    assert!(swept <= total);
}

#[test]
fn test_jobs_created_during_sweep_are_left_for_the_loop() {
    let harness = TestHarness::new();
    let store = harness.store();
    let early = store.create("early", "").unwrap();

    let summary = harness.worker.process_all_pending().unwrap();
    let late = store.create("late", "").unwrap();

    assert_eq!(summary.snapshot, 1);
    assert_eq!(store.get(early.id).unwrap().status, JobStatus::Completed);
    assert_eq!(store.get(late.id).unwrap().status, JobStatus::Pending);

    harness.worker.start().unwrap();
    harness.worker.notify();
    assert!(wait_until(|| {
        store.get(late.id).unwrap().status == JobStatus::Completed
    }));
}

#[test]
fn test_deleting_a_pending_job_removes_it_from_the_queue() {
    let harness = TestHarness::new();
    let store = harness.store();
    let gone = store.create("gone", "").unwrap();
    let kept = store.create("kept", "").unwrap();

    store.delete(gone.id).unwrap();
    assert_eq!(store.next_pending().unwrap().unwrap().id, kept.id);

    let summary = harness.worker.process_all_pending().unwrap();
    assert_eq!(summary.completed, 1);
}
