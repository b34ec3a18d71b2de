//! # Insert Strings
//!
//! Several producer threads insert random strings into a bounded buffer
//! while a single consumer thread takes them out.
//!
//! ## Pieces
//!
//! 1. **`BoundedBuffer`** - monitor-style FIFO (`Mutex` + two `Condvar`s)
//!    with blocking, cancellable `deposit` / `fetch`
//! 2. **`Coordinator`** - hands out exactly `target_count` production permits
//! 3. **`CancellationToken`** - wakes threads parked inside the buffer
//! 4. **`workload::run`** - spawns, joins and cancels the threads
//!
//! ## Running
//!
//! ```bash
//! cargo run --bin insert_strings
//! INSERT_STRINGS_CONFIG=run.toml cargo run --bin insert_strings
//! ```
//!
//! ## Key Dependencies
//!
//! - `thiserror` - error enums
//! - `serde` + `toml` - configuration file
//! - `rand` - random item suffixes
//! - `log` + `colored` - diagnostics on stderr

pub mod buffer;
pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod item;
pub mod logger;
pub mod workload;

pub use buffer::BoundedBuffer;
pub use cancel::{CancellationToken, PanicGuard};
pub use config::Config;
pub use coordinator::Coordinator;
pub use error::{Cancelled, DepositCancelled, Error, Result};
pub use item::Item;
pub use workload::{run, EventSink, Report, Stdout};
