//! Unified error type for homepanel.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Modem link
    /// The Wi-Fi co-processor answered a command with an error.
    Modem(ModemError),

    /// Joining the configured Wi-Fi network failed.
    WifiJoinFailed,

    /// The MQTT broker refused or never answered the connection.
    BrokerUnavailable,

    /// Publish attempted while the broker link is down.
    NotConnected,

    /// Outbound publish queue is full.
    QueueFull,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,

    /// Operation timed out.
    Timeout,
}

/// Subset of modem failures we propagate (keeps the enum `Copy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemError {
    /// Command answered with `ERROR`.
    CommandRejected,
    /// Modem reported `busy p...` and dropped the command.
    Busy,
    /// A response line could not be parsed.
    Malformed,
}

impl Error {
    /// A failed modem command that means the broker link is gone.
    ///
    /// Local failures (full queue, oversized command) leave the link as is.
    pub fn is_link_lost(&self) -> bool {
        matches!(self, Error::Modem(_) | Error::Timeout | Error::NotConnected)
    }
}

// Convenience conversions

impl From<ModemError> for Error {
    fn from(e: ModemError) -> Self {
        Error::Modem(e)
    }
}
