use blob_dynamics::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn seeded_world() -> BlobWorld {
    BlobWorld::new(BlobConfig::new().with_blob(BlobParameters::default().with_seed(3)))
        .expect("valid default config")
}

#[test]
fn test_world_and_handle_are_sync_and_send() {
    fn assert_sync_send<T: Sync + Send>() {}
    assert_sync_send::<BlobWorld>();
    assert_sync_send::<SchedulerHandle>();
    assert_sync_send::<FrameSignal>();
    assert_sync_send::<EventLog>();
}

#[test]
fn test_scheduler_ticks_and_signals_frames() {
    let sink = Arc::new(EventLog::new());
    let frames = Arc::new(FrameSignal::new());
    let mut scheduler =
        SimulationScheduler::spawn(seeded_world(), sink.clone(), frames.clone()).expect("spawn");
    let handle = scheduler.handle();

    thread::sleep(Duration::from_millis(100));
    assert!(handle.is_running());

    let pending = frames.take_pending();
    assert!(pending.is_some());
    let snapshot = handle.snapshot();
    assert!(snapshot.version >= pending.unwrap_or(0));
    assert_eq!(snapshot.positions.len(), 24);

    scheduler.stop();
    assert!(!scheduler.is_running());
    assert!(sink.diagnostics().is_empty());

    // nothing ticks after the join
    let stopped_at = handle.snapshot().version;
    thread::sleep(Duration::from_millis(30));
    assert_eq!(handle.snapshot().version, stopped_at);
}

#[test]
fn test_stop_interrupts_a_long_tick_interval() {
    let config = BlobConfig::new()
        .with_blob(BlobParameters::default().with_seed(3))
        .with_timing(TimingParameters::default().with_tick_interval_us(5_000_000));
    let world = BlobWorld::new(config).expect("valid config");
    let mut scheduler = SimulationScheduler::spawn(
        world,
        Arc::new(EventLog::new()),
        Arc::new(FrameSignal::new()),
    )
    .expect("spawn");

    thread::sleep(Duration::from_millis(50));
    assert!(scheduler.is_running());

    let started = Instant::now();
    scheduler.stop();
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "stop took {:?}",
        started.elapsed()
    );
    assert!(!scheduler.is_running());
}

#[test]
fn test_tick_failures_reach_the_sink() {
    let sink = Arc::new(EventLog::new());
    let frames = Arc::new(FrameSignal::new());
    let scheduler =
        SimulationScheduler::spawn(seeded_world(), sink.clone(), frames.clone()).expect("spawn");
    let handle = scheduler.handle();

    handle.with_world(|world| {
        world.shape_mut().velocities.pop();
    });
    thread::sleep(Duration::from_millis(60));

    let diagnostics = sink.diagnostics();
    assert!(!diagnostics.is_empty());
    assert!(handle.is_running());

    let frozen = handle.snapshot().version;
    thread::sleep(Duration::from_millis(30));
    assert_eq!(handle.snapshot().version, frozen);
    drop(scheduler);
    assert!(!handle.is_running());
}

#[test]
fn test_host_threads_feed_samples_concurrently() {
    let sink = Arc::new(EventLog::new());
    let frames = Arc::new(FrameSignal::new());
    let scheduler =
        SimulationScheduler::spawn(seeded_world(), sink.clone(), frames).expect("spawn");
    let handle = scheduler.handle();

    let mut workers = vec![];
    for lane in 0..4u64 {
        let handle = handle.clone();
        workers.push(thread::spawn(move || {
            for step in 0..20u64 {
                let x = (step * 10) as f32;
                handle.push_window_sample_at(Vec2::new(x, lane as f32), 1 + step * 16 + lane);
                let _ = handle.snapshot();
            }
        }));
    }
    for worker in workers {
        worker.join().expect("sample thread");
    }

    let buffered = handle.with_world(|world| world.tracker().len());
    assert!(buffered <= 10);
    drop(scheduler);
}

#[test]
fn test_shared_world_across_threads() {
    let world = Arc::new(Mutex::new(seeded_world()));

    let mut handles = vec![];
    for i in 0..4u64 {
        let world = Arc::clone(&world);
        handles.push(thread::spawn(move || {
            world.lock().tick(i * 8).map(|report| report.version)
        }));
    }

    for handle in handles {
        assert!(handle.join().expect("tick thread").is_ok());
    }
    assert_eq!(world.lock().version(), 4);
}
