pub const SAMPLES: usize = 20; // slots on screen at scale 1
pub const SPEED_MS: u64 = 250; // sample cadence, also the reconnect delay
pub const MAX_SCALE: u32 = 4;
pub const WIDEN_STEP: usize = 10; // placeholders added per widen
pub const POLL_EVERY: u64 = 10; // status poll every Nth tick
pub const POLL_TIMEOUT_MS: u64 = 2000;
pub const HANDSHAKE_TIMEOUT_MS: u64 = 2000; // floor for the websocket upgrade deadline

// Upper bounds accepted from the environment
pub const SAMPLES_LIMIT: usize = 10_000;
pub const SPEED_MS_LIMIT: u64 = 3_600_000;

pub const PUSH_URL: &str = "ws://127.0.0.1:8765/";
pub const STATUS_URL: &str = "http://127.0.0.1:9000/api";
