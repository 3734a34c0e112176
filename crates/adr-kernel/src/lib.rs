//! ADR Kernel (adr-kernel)
//!
//! Runs the dispute pipeline as a live session:
//! 1. **Session**: authoritative record collection, user intents, ticks
//! 2. **Driver**: tokio task serializing timer ticks and intents
//! 3. **Test harness**: seeded batch simulator with invariant checks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use adr_kernel::prelude::*;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! # async fn demo() -> Result<(), KernelError> {
//! let session = Session::new(SimulationConfig::default());
//! let handle = driver::spawn(session, StdRng::seed_from_u64(7));
//! handle.send(Intent::Spawn { industry: Industry::Finance, priority: None }).await?;
//! handle.send(Intent::TogglePlay).await?;
//!
//! let session = handle.shutdown().await?;
//! println!("{} records", session.records().len());
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]

pub mod driver;
pub mod error;
pub mod session;

// Test harness
pub mod test_harness;

pub use driver::{Command, DriverHandle};
pub use error::KernelError;
pub use session::{Intent, Session, SessionView, TickReport};

/// Common imports for driving a session
pub mod prelude {
    pub use crate::driver::{self, DriverHandle};
    pub use crate::error::KernelError;
    pub use crate::session::{Intent, Session, SessionView, TickReport};
    pub use adr_core::{Industry, Priority, RecordId, SimulationConfig, Status};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
