//! # Adapters Module
//!
//! Store, codec and in-memory collaborator implementations.

pub mod cached_store;
pub mod codec;
pub mod memory_store;
pub mod mock_ibc;

pub use cached_store::CachedStore;
pub use codec::RecordCodec;
pub use memory_store::InMemoryKVStore;
pub use mock_ibc::{MockConnectionLookup, RecordingChannelCloser, StaticCapabilityProvider};
