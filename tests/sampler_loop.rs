use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use event_pulse::{config::DashboardConfig, counter::EventCounter, sampler::Sampler};
use tokio_util::sync::CancellationToken;

const SPEED_MS: u64 = 250;

fn ticks(n: u64) -> Duration {
    // Land mid-interval so no timer shares the deadline.
    Duration::from_millis(SPEED_MS * n + SPEED_MS / 2)
}

#[tokio::test(start_paused = true)]
async fn polls_on_every_tenth_tick() {
    let config = DashboardConfig::default();
    let (sampler, _snapshots) = Sampler::new(&config, EventCounter::new());
    let polls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&polls);
    let cancel = CancellationToken::new();

    let task = tokio::spawn(sampler.run(move |seq| seen.lock().unwrap().push(seq), cancel.clone()));
    tokio::time::sleep(ticks(25)).await;
    cancel.cancel();
    let state = task.await.unwrap();

    assert_eq!(*polls.lock().unwrap(), vec![10, 20]);
    // Cycle 26 had begun and was waiting when cancelled.
    assert_eq!(state.ticks, 26);
    assert_eq!(state.window.len(), 30);
}

#[tokio::test(start_paused = true)]
async fn events_between_ticks_become_one_sample() {
    let config = DashboardConfig::default();
    let counter = EventCounter::new();
    let (sampler, snapshots) = Sampler::new(&config, counter.clone());
    let cancel = CancellationToken::new();
    let task = tokio::spawn(sampler.run(|_| {}, cancel.clone()));

    for _ in 0..3 {
        counter.increment();
    }
    tokio::time::sleep(ticks(1)).await;
    {
        let snap = snapshots.borrow();
        assert_eq!(snap.latest(), Some(3));
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.samples.len(), 20);
    }

    tokio::time::sleep(Duration::from_millis(SPEED_MS)).await;
    assert_eq!(snapshots.borrow().latest(), Some(0));

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn window_widens_when_data_reaches_left_edge() {
    let config = DashboardConfig::default();
    let (sampler, snapshots) = Sampler::new(&config, EventCounter::new());
    let cancel = CancellationToken::new();
    let task = tokio::spawn(sampler.run(|_| {}, cancel.clone()));

    tokio::time::sleep(ticks(19)).await;
    assert_eq!(snapshots.borrow().scale, 1);
    assert_eq!(snapshots.borrow().samples.len(), 20);

    tokio::time::sleep(Duration::from_millis(SPEED_MS)).await;
    assert_eq!(snapshots.borrow().scale, 2);
    assert_eq!(snapshots.borrow().samples.len(), 30);

    // Three widens in total, then the window stays at 50.
    tokio::time::sleep(ticks(60)).await;
    assert_eq!(snapshots.borrow().scale, 4);
    assert_eq!(snapshots.borrow().samples.len(), 50);

    cancel.cancel();
    task.await.unwrap();
}
