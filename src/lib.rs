//! PollDaemon - bounded-concurrency endpoint poller
//!
//! PollDaemon repeatedly polls a single HTTP JSON endpoint in batches and
//! captures every response, success or failure, as a timestamped record in
//! rotating newline-delimited JSON files capped at 100 records each.
//!
//! # Core Concepts
//!
//! - **Every response is a record**: failures become `{error, timestamp}`
//!   records instead of aborting the batch
//! - **State on disk**: the writer re-discovers the current output file by
//!   scanning the filesystem, never by trusting an in-memory counter
//! - **Bounded fan-out**: a semaphore caps in-flight requests while results
//!   keep submission order
//!
//! # Modules
//!
//! - [`record`] - the persisted record type
//! - [`fetcher`] - single HTTP GET to Record conversion
//! - [`batch`] - gate-bounded batch scheduling
//! - [`writer`] - rotating, capped NDJSON files
//! - [`engine`] - the endless poll loop
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod batch;
pub mod cli;
pub mod config;
pub mod engine;
pub mod fetcher;
pub mod record;
pub mod writer;

// Re-export commonly used types
pub use batch::{fetch_batch, run_bounded};
pub use cli::Cli;
pub use config::{BatchConfig, Config, EndpointConfig, PacingConfig, StorageConfig};
pub use engine::{BatchOutcome, PollEngine, PollStatus};
pub use fetcher::Fetcher;
pub use record::Record;
pub use writer::{MAX_RECORDS_PER_FILE, ResultWriter};
