//! Live event-rate dashboard.
//!
//! A websocket push channel feeds an [`counter::EventCounter`]; the
//! [`sampler::Sampler`] folds it into a [`window::SlidingWindow`] at a fixed
//! cadence and periodically triggers a [`poller::StatusPoller`]. Front-ends
//! in [`ui`] and [`headless`] consume the results.

pub mod app;
pub mod config;
pub mod constants;
pub mod counter;
pub mod error;
pub mod headless;
pub mod logging;
pub mod poller;
pub mod push;
pub mod sampler;
pub mod status;
pub mod ui;
pub mod util;
pub mod window;

pub use error::{DashboardError, Result};
