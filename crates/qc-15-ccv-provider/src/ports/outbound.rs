//! # Outbound Ports
//!
//! Collaborators the provider core depends on: the transition-scoped store,
//! the channel/connection transport and the capability authority.

use crate::domain::{
    ChannelEnd, ChannelId, ClientId, ConnectionEnd, ConnectionId, KvStoreError, LightClientState,
    PortId,
};
use thiserror::Error;

/// Ordered key-value store scoped to the current transition.
///
/// The host rolls back every write of a transition that returns an error.
/// `prefix_scan` MUST return entries in ascending key order; iteration order
/// is part of the replicated state machine.
pub trait KeyValueStore {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KvStoreError>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), KvStoreError>;

    /// Execute an atomic batch write: all operations apply, or none do.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KvStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KvStoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// All entries whose key starts with `prefix`, ascending by key.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put {
        /// Key.
        key: Vec<u8>,
        /// Value.
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete {
        /// Key.
        key: Vec<u8>,
    },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Read access to verified handshake state held by the transport.
///
/// Everything returned here has already been proven by light-client
/// verification; the provider trusts it as identity.
pub trait ConnectionLookup: Send + Sync {
    /// Channel end on `port`, if the transport knows it.
    fn channel(&self, port: &PortId, channel_id: &ChannelId) -> Option<ChannelEnd>;

    /// Connection end, if the transport knows it.
    fn connection(&self, connection_id: &ConnectionId) -> Option<ConnectionEnd>;

    /// Counterparty light-client state, if the client exists.
    fn client_state(&self, client_id: &ClientId) -> Option<LightClientState>;
}

/// Opaque authorization to act on a channel.
///
/// Issued by a [`CapabilityProvider`]; the core only ever borrows it.
#[derive(Debug, PartialEq, Eq)]
pub struct CapabilityTicket {
    index: u64,
}

impl CapabilityTicket {
    /// Mint a ticket. Only authorization collaborators should call this.
    pub fn issue(index: u64) -> Self {
        Self { index }
    }

    /// Authority-assigned index.
    pub fn index(&self) -> u64 {
        self.index
    }
}

/// Authority that hands out channel capabilities.
pub trait CapabilityProvider: Send + Sync {
    /// Ticket for `(port, channel)`, if the provider module owns one.
    fn channel_capability(&self, port: &PortId, channel_id: &ChannelId)
        -> Option<CapabilityTicket>;
}

/// Close request failures. Always non-fatal for the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelCloseError {
    /// Transport refused the request.
    #[error("Close rejected for {channel_id}: {reason}")]
    Rejected {
        /// Channel.
        channel_id: ChannelId,
        /// Transport reason.
        reason: String,
    },
    /// Capability did not authenticate.
    #[error("Capability not authenticated for {channel_id}")]
    Unauthorized {
        /// Channel.
        channel_id: ChannelId,
    },
}

/// Channel transport accepting close requests.
pub trait ChannelCloser: Send + Sync {
    /// Begin closing `channel_id`. Best-effort from the provider's view.
    fn close_init(
        &self,
        port: &PortId,
        channel_id: &ChannelId,
        capability: &CapabilityTicket,
    ) -> Result<(), ChannelCloseError>;
}
