//! Kernel error types

use adr_core::ConfigError;

/// Errors surfaced by the kernel's async edges
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// Configuration could not be loaded or validated
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The driver task is gone
    #[error("driver channel closed")]
    DriverClosed,

    /// The driver task panicked or was cancelled
    #[error("driver task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
