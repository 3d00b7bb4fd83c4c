use std::error::Error;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use event_pulse::{
    app::App,
    config::DashboardConfig,
    counter::EventCounter,
    headless, logging,
    poller::StatusPoller,
    push::PushClient,
    sampler::{self, Sampler},
    ui,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = DashboardConfig::from_env()?;
    logging::init(config.headless);
    info!(push = %config.push_url, status = %config.status_url, samples = config.samples, "starting dashboard");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    ctrlc::set_handler(move || on_signal.cancel())?;

    let counter = EventCounter::new();
    let push = PushClient::spawn(&config.push_url, config.speed, counter.clone(), cancel.child_token());

    let poller = StatusPoller::new(&config.status_url, config.poll_timeout)?;
    let (status_tx, status_rx) = mpsc::channel(16);
    let (sampler, snapshots) = Sampler::new(&config, counter);
    let sampler_task = tokio::spawn(sampler.run(
        move |seq| {
            poller.spawn_poll(seq, status_tx.clone());
        },
        cancel.child_token(),
    ));

    let app = App::new(snapshots.borrow().clone(), config.speed);
    let res = if config.headless {
        headless::run(app, snapshots, push.state(), status_rx, cancel.clone()).await
    } else {
        ui::run(app, snapshots, push.state(), status_rx, cancel.clone()).await
    };

    cancel.cancel();
    push.shutdown().await;
    sampler::join(sampler_task).await;

    if let Err(err) = res {
        eprintln!("Error: {err}");
        return Err(err.into());
    }
    Ok(())
}
