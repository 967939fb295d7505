//! # Domain Invariants
//!
//! Business rules for binding consumer channels and versioning validator sets.

use super::entities::LightClientState;
use super::errors::{ProviderError, ValsetUpdateId};
use super::value_objects::{ChainId, ChannelId, ChannelStatus, ClientId, ClientType, ConnectionId};

/// Invariant: the CCV channel is a direct connection to the consumer.
///
/// Multi-hop relay paths are rejected; returns the single hop.
pub fn invariant_single_hop(hops: &[ConnectionId]) -> Result<&ConnectionId, ProviderError> {
    match hops {
        [hop] => Ok(hop),
        _ => Err(ProviderError::InvalidHopCount { got: hops.len() }),
    }
}

/// Invariant: CCV channels are only built on Tendermint light clients.
pub fn invariant_tendermint_client(
    client_id: &ClientId,
    state: &LightClientState,
) -> Result<(), ProviderError> {
    match &state.client_type {
        ClientType::Tendermint => Ok(()),
        other => Err(ProviderError::InvalidClientType {
            client_id: client_id.clone(),
            client_type: other.to_string(),
        }),
    }
}

/// Invariant: the connection's light client is the one the provider
/// registered for the claimed chain, and tracks that chain.
pub fn invariant_client_matches(
    claimed: &ChainId,
    registered: Option<&ClientId>,
    actual: &ClientId,
    state: &LightClientState,
) -> Result<(), ProviderError> {
    if registered != Some(actual) || &state.chain_id != claimed {
        return Err(ProviderError::ClientMismatch {
            chain_id: claimed.clone(),
            expected: registered.cloned(),
            actual: actual.clone(),
        });
    }
    Ok(())
}

/// Invariant: at most one VALIDATING channel per consumer chain.
///
/// `bound` is the chain's current binding and that channel's status.
pub fn invariant_no_validating_channel(
    chain_id: &ChainId,
    candidate: &ChannelId,
    bound: Option<(&ChannelId, ChannelStatus)>,
) -> Result<(), ProviderError> {
    match bound {
        Some((existing, ChannelStatus::Validating)) if existing != candidate => {
            Err(ProviderError::DuplicateRegistration {
                chain_id: chain_id.clone(),
                existing: existing.clone(),
                rejected: candidate.clone(),
            })
        }
        _ => Ok(()),
    }
}

/// Invariant: the version counter advances by exactly one.
pub fn invariant_next_version(current: ValsetUpdateId) -> Result<ValsetUpdateId, ProviderError> {
    current
        .checked_add(1)
        .ok_or(ProviderError::VersionOverflow { current })
}
