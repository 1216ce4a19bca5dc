use crate::helpers::{DropTracker, RECV_TIMEOUT};
use delay_scheduler::{
    Config, Dispatcher, DispatcherConfig, ExecutionFacility, ScheduledTask, TaskScheduler,
    create_scheduler_task,
};
use std::sync::Arc;
use std::time::Duration;

fn pipeline(expiration_ms: u64) -> (TaskScheduler, Arc<Dispatcher>) {
    let mut config = Config::default();
    config.dispatcher = DispatcherConfig {
        thread_name: "pipeline-dispatcher".to_owned(),
        task_expiration_ms: expiration_ms,
    };
    let dispatcher = Arc::new(Dispatcher::start(&config.dispatcher).expect("dispatcher"));
    let facility: Arc<dyn ExecutionFacility> = dispatcher.clone();
    let scheduler = TaskScheduler::start(&config.scheduler, facility).expect("scheduler");
    (scheduler, dispatcher)
}

#[test]
fn scheduled_bodies_run_on_dispatcher_in_deadline_order() {
    let (scheduler, dispatcher) = pipeline(0);
    let (tx, rx) = crossbeam_channel::unbounded();

    for (label, delay) in [("c", 45), ("a", 5), ("b", 25)] {
        let tx = tx.clone();
        scheduler.add_event(create_scheduler_task(delay, move || {
            let _ = tx.send(label);
        }));
    }

    let order: Vec<&str> = (0..3)
        .map(|_| rx.recv_timeout(RECV_TIMEOUT).expect("body ran"))
        .collect();
    assert_eq!(order, vec!["a", "b", "c"]);

    scheduler.shutdown();
    scheduler.join();
    dispatcher.shutdown();
    dispatcher.join();
    assert_eq!(dispatcher.executed_count(), 3);
}

#[test]
fn scheduled_tasks_survive_dispatcher_backlog() {
    let (scheduler, dispatcher) = pipeline(5);
    let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
    let (tx, rx) = crossbeam_channel::unbounded();

    // Hold the dispatcher busy well past its expiry window.
    dispatcher.add_task(move || {
        let _ = gate_rx.recv_timeout(RECV_TIMEOUT);
    });
    scheduler.add_event(create_scheduler_task(1, move || {
        let _ = tx.send(());
    }));

    std::thread::sleep(Duration::from_millis(40));
    gate_tx.send(()).expect("release gate");

    rx.recv_timeout(RECV_TIMEOUT)
        .expect("scheduled task must not expire in the dispatcher queue");
    assert_eq!(dispatcher.expired_count(), 0);
}

#[test]
fn cancelled_event_never_reaches_dispatcher() {
    let (scheduler, dispatcher) = pipeline(0);
    let tracker = DropTracker::default();
    let id = scheduler.add_event(ScheduledTask::new(Duration::from_millis(30), tracker.body()));
    assert!(scheduler.stop_event(id));

    std::thread::sleep(Duration::from_millis(80));
    assert_eq!(tracker.ran(), 0);
    assert_eq!(tracker.dropped(), 1);
    assert_eq!(dispatcher.executed_count(), 0);
}

#[test]
fn dispatcher_shutdown_after_scheduler_discards_backlog() {
    let (scheduler, dispatcher) = pipeline(0);
    let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
    let tracker = DropTracker::default();

    dispatcher.add_task(move || {
        let _ = gate_rx.recv_timeout(RECV_TIMEOUT);
    });
    scheduler.add_event(ScheduledTask::new(Duration::from_millis(1), tracker.body()));
    std::thread::sleep(Duration::from_millis(30));

    scheduler.shutdown();
    scheduler.join();
    dispatcher.shutdown();
    let _ = gate_tx.send(());
    dispatcher.join();

    assert_eq!(tracker.ran(), 0);
    assert_eq!(tracker.dropped(), 1);
}
