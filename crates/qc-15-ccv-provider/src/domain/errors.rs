//! # Domain Errors
//!
//! Error types for the CCV provider.
//!
//! Every failure is a pure rejection except `DuplicateRegistration`, which is
//! surfaced after a best-effort close request on the losing channel.

use super::value_objects::{ChainId, ChannelId, ChannelStatus, ClientId, ConnectionId};
use thiserror::Error;

/// Validator-set update id (monotonic version counter value).
pub type ValsetUpdateId = u64;

/// Unbonding entry id, supplied by the staking lifecycle.
pub type UnbondingEntryId = u64;

/// Provider block height.
pub type BlockHeight = u64;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IoError {
        /// Underlying failure.
        message: String,
    },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// Underlying failure.
        message: String,
    },
}

/// Error taxonomy class, used by hosts to decide how to react.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed handshake shape, rejected before any mutation.
    Validation,
    /// Light-client or chain identity mismatch.
    IdentityMismatch,
    /// Second bind against an already bound chain.
    DuplicateRegistration,
    /// Unknown channel, connection or client.
    NotFound,
    /// Persisted state is inconsistent. Halts the transition.
    InvariantViolation,
    /// Request conflicts with existing state.
    Conflict,
    /// Backing store failure.
    Storage,
}

/// CCV provider errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Channel is not a direct (single-hop) connection to the consumer.
    #[error("Invalid connection hops: expected 1, got {got}")]
    InvalidHopCount {
        /// Number of hops presented.
        got: usize,
    },

    /// Channel is not in the status required by the handshake stage.
    #[error("Invalid status for channel {channel_id}: expected {expected}, got {actual}")]
    InvalidStatus {
        /// Channel being checked.
        channel_id: ChannelId,
        /// Required status.
        expected: ChannelStatus,
        /// Stored status.
        actual: ChannelStatus,
    },

    /// Light client backing the connection is not a supported client type.
    #[error("Invalid client type for {client_id}: {client_type}")]
    InvalidClientType {
        /// Client id.
        client_id: ClientId,
        /// Reported client type.
        client_type: String,
    },

    /// The channel is not built on the client registered for the chain.
    #[error("Client mismatch for chain {chain_id}: expected {expected:?}, got {actual}")]
    ClientMismatch {
        /// Claimed consumer chain.
        chain_id: ChainId,
        /// Client registered by the provider for this chain, if any.
        expected: Option<ClientId>,
        /// Client underlying the channel's connection.
        actual: ClientId,
    },

    /// The chain is already bound to a different channel.
    #[error("CCV channel {existing} already bound for chain {chain_id}, rejecting {rejected}")]
    DuplicateRegistration {
        /// Consumer chain.
        chain_id: ChainId,
        /// Channel that holds the binding.
        existing: ChannelId,
        /// Channel that lost the race.
        rejected: ChannelId,
    },

    /// Channel unknown to the transport.
    #[error("Channel not found: {channel_id}")]
    ChannelNotFound {
        /// Channel id.
        channel_id: ChannelId,
    },

    /// Connection unknown to the transport.
    #[error("Connection not found: {connection_id}")]
    ConnectionNotFound {
        /// Connection id.
        connection_id: ConnectionId,
    },

    /// Light client unknown to the transport.
    #[error("Client not found: {client_id}")]
    ClientNotFound {
        /// Client id.
        client_id: ClientId,
    },

    /// Persisted state contradicts an invariant. Never repaired silently.
    #[error("Invariant violation: {reason}")]
    InvariantViolation {
        /// What was found.
        reason: String,
    },

    /// An unbonding entry with this id is already tracked.
    #[error("Unbonding entry {entry_id} already exists")]
    DuplicateEntry {
        /// Entry id.
        entry_id: UnbondingEntryId,
    },

    /// The validator-set version counter cannot advance further.
    #[error("Validator set update id overflow at {current}")]
    VersionOverflow {
        /// Counter value that could not be incremented.
        current: ValsetUpdateId,
    },

    /// Backing store failure.
    #[error(transparent)]
    Store(#[from] KvStoreError),
}

impl ProviderError {
    /// Build an invariant violation from any message.
    pub fn invariant(reason: impl Into<String>) -> Self {
        ProviderError::InvariantViolation {
            reason: reason.into(),
        }
    }

    /// Taxonomy class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            ProviderError::InvalidHopCount { .. }
            | ProviderError::InvalidStatus { .. }
            | ProviderError::InvalidClientType { .. } => ErrorClass::Validation,
            ProviderError::ClientMismatch { .. } => ErrorClass::IdentityMismatch,
            ProviderError::DuplicateRegistration { .. } => ErrorClass::DuplicateRegistration,
            ProviderError::ChannelNotFound { .. }
            | ProviderError::ConnectionNotFound { .. }
            | ProviderError::ClientNotFound { .. } => ErrorClass::NotFound,
            ProviderError::InvariantViolation { .. } => ErrorClass::InvariantViolation,
            ProviderError::DuplicateEntry { .. } | ProviderError::VersionOverflow { .. } => {
                ErrorClass::Conflict
            }
            ProviderError::Store(_) => ErrorClass::Storage,
        }
    }

    /// Whether the host must halt rather than treat this as a rejected message.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProviderError::InvariantViolation { .. }
                | ProviderError::Store(KvStoreError::CorruptionError { .. })
        )
    }
}
