//! Document store access.
//!
//! Content lives in named collections of JSON documents. Handlers only need
//! two reads, so the store is a small trait with a Postgres implementation
//! for production and an in-memory one for tests and local runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgContentStore;

use {crate::Result, serde_json::Value, std::fmt, std::future::Future};

///
/// Read access to collections of JSON documents.
///
/// Documents come back in insertion order.
///
pub trait ContentStore: Send + Sync + 'static {
    /// First document of `collection`, or `None` when it is empty.
    fn find_one(&self, collection: &str) -> impl Future<Output = Result<Option<Value>>> + Send;

    /// Every document of `collection`.
    fn find(&self, collection: &str) -> impl Future<Output = Result<Vec<Value>>> + Send;

    /// Current connection state.
    fn status(&self) -> ConnectionState;

    /// Releases the store's connections once the server has drained.
    /// Reads after this fail.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Lifecycle of a store connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connected = 1,
    Connecting = 2,
    Disconnecting = 3,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connected => "connected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Disconnecting => "disconnecting",
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connected,
            2 => ConnectionState::Connecting,
            3 => ConnectionState::Disconnecting,
            _ => ConnectionState::Disconnected,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trips_through_u8() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connected,
            ConnectionState::Connecting,
            ConnectionState::Disconnecting,
        ] {
            assert_eq!(ConnectionState::from_u8(state as u8), state);
        }
        assert_eq!(ConnectionState::from_u8(42), ConnectionState::Disconnected);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
    }
}
