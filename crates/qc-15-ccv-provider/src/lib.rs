//! # QC-15 CCV Provider
//!
//! Provider side of cross-chain validation: lends the provider chain's
//! validator set to consumer chains over authenticated channels.
//!
//! **Subsystem ID:** 15  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Bind exactly one CCV channel per consumer chain, keyed by verified
//!   light-client identity
//! - Version the validator set and correlate versions with block heights
//! - Hold unbonding entries until every bound consumer acknowledged the
//!   validator set they were created under
//! - Queue slash acknowledgements for outbound dispatch
//!
//! ## Guarantees
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | One VALIDATING channel per chain | verify at try, re-check at confirm |
//! | Version advances by exactly one | checked increment, overflow rejected |
//! | Bucket ids always resolve | dangling id halts the transition |
//! | Duplicate acks are harmless | drained buckets are deleted |
//!
//! ## Module Structure
//!
//! ```text
//! qc-15-ccv-provider/
//! ├── domain/          # ids, entities, config, errors, invariants, store keys
//! ├── ports/           # ProviderApi, StakingHooks, KeyValueStore, transport
//! ├── adapters/        # in-memory store, write overlay, codec, mocks
//! └── service/         # registry, versioning, unbonding, slash acks, bridge
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    CachedStore, InMemoryKVStore, MockConnectionLookup, RecordCodec, RecordingChannelCloser,
    StaticCapabilityProvider,
};
pub use domain::{
    BlockHeight, ChainId, ChannelEnd, ChannelId, ChannelStatus, ClientId, ClientType, ConfigError,
    ConnectionEnd, ConnectionId, ConsumerChain, ConsumerRegistration, ErrorClass, KvStoreError,
    LightClientState, MaturityAcknowledgement, PortId, ProviderConfig, ProviderError,
    ProviderGenesis, ProviderResult, UnbondingEntry, UnbondingEntryCreated, UnbondingEntryId,
    ValsetUpdateId, PROVIDER_PORT_ID,
};
pub use ports::{
    BatchOperation, CapabilityProvider, CapabilityTicket, ChannelCloseError, ChannelCloser,
    ConnectionLookup, KeyValueStore, ProviderApi, StakingHooks,
};
pub use service::{
    ChannelRegistry, ProviderService, SlashAckLedger, StakingEventBridge, UnbondingCoordinator,
    ValidatorSetVersioning,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
