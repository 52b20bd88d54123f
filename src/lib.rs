pub mod core;

pub use crate::core::{
    config::QueueConfig,
    error::{ConfigError, InsertError, QueueError, QueueResult},
    queue::BoundedBlockingQueue,
    stats::{StatsSnapshot, append_snapshots},
};
