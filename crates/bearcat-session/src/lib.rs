//! Scanner Session Engine
//!
//! This crate drives a Uniden scanner through a programming-mode session:
//! one command in flight at a time, replies matched by order, and a
//! sequential task queue that always tears the session down.
//!
//! # Architecture
//!
//! - [`transport`]: line transport over a serial port or any async stream
//! - [`codec`]: single-slot command/reply exchange
//! - [`session`]: programming-mode state machine
//! - [`queue`]: FIFO executor with guaranteed teardown
//! - [`dump`]: the version/model and frequency dumps
//!
//! # Example
//!
//! ```rust,no_run
//! use bearcat_session::{run_dumps, Dump, SessionConfig};
//!
//! # async fn example() -> Result<(), bearcat_session::SessionError> {
//! let transport = SessionConfig::new("/dev/ttyACM0").open()?;
//! let mut stdout = std::io::stdout();
//! run_dumps(transport, &[Dump::VersionModel], &mut stdout).await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod dump;
pub mod error;
pub mod queue;
pub mod session;
pub mod transport;

pub use codec::CommandCodec;
pub use config::SessionConfig;
pub use dump::{run_dumps, run_frequency_dump, run_version_model_dump, Dump};
pub use error::{ErrorKind, SessionError};
pub use queue::{Operation, TaskQueue};
pub use session::{Session, SessionState};
pub use transport::{LineTransport, Transport};
