//! # Domain Entities
//!
//! Records persisted or exchanged by the CCV provider.

use super::errors::{BlockHeight, UnbondingEntryId, ValsetUpdateId};
use super::value_objects::{
    ChainId, ChannelId, ChannelStatus, ClientId, ClientType, ConnectionId, PortId, PROVIDER_PORT_ID,
};
use serde::{Deserialize, Serialize};

/// Unbonding entry gated on consumer acknowledgements.
///
/// Created when the staking module starts an unbonding; deleted once every
/// consumer in `unbonding_consumer_chains` has acknowledged `valset_update_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingEntry {
    /// Id assigned by the staking lifecycle.
    pub id: UnbondingEntryId,
    /// Validator-set version current when the unbonding started.
    pub valset_update_id: ValsetUpdateId,
    /// Consumer chains that have not yet acknowledged, in registry order.
    pub unbonding_consumer_chains: Vec<ChainId>,
}

impl UnbondingEntry {
    /// Create a new entry.
    pub fn new(
        id: UnbondingEntryId,
        valset_update_id: ValsetUpdateId,
        unbonding_consumer_chains: Vec<ChainId>,
    ) -> Self {
        Self {
            id,
            valset_update_id,
            unbonding_consumer_chains,
        }
    }

    /// Record that `chain_id` acknowledged. Returns whether it was outstanding.
    pub fn acknowledge(&mut self, chain_id: &ChainId) -> bool {
        let before = self.unbonding_consumer_chains.len();
        self.unbonding_consumer_chains.retain(|c| c != chain_id);
        before != self.unbonding_consumer_chains.len()
    }

    /// Whether `chain_id` still has to acknowledge.
    pub fn is_awaiting(&self, chain_id: &ChainId) -> bool {
        self.unbonding_consumer_chains.contains(chain_id)
    }

    /// Whether every consumer has acknowledged.
    pub fn is_fully_acknowledged(&self) -> bool {
        self.unbonding_consumer_chains.is_empty()
    }
}

/// Assembled view of a registered consumer chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerChain {
    /// Consumer chain id.
    pub chain_id: ChainId,
    /// Bound CCV channel.
    pub channel_id: Option<ChannelId>,
    /// Status of the bound channel.
    pub status: ChannelStatus,
    /// Opaque consumer genesis record.
    pub genesis: Option<Vec<u8>>,
    /// Provider height at which the channel was bound.
    pub init_height: BlockHeight,
}

/// Channel end as reported by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelEnd {
    /// Connection hops from provider to counterparty.
    pub connection_hops: Vec<ConnectionId>,
}

/// Connection end as reported by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionEnd {
    /// Light client the connection is built on.
    pub client_id: ClientId,
}

/// Verified light-client state of the counterparty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightClientState {
    /// Client implementation.
    pub client_type: ClientType,
    /// Chain id the light client tracks.
    pub chain_id: ChainId,
}

/// Staking lifecycle notification: an unbonding entry was created.
///
/// Only `id` is consumed by the provider; the rest is carried for logging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnbondingEntryCreated {
    /// Delegator address.
    pub delegator: String,
    /// Validator operator address.
    pub validator: String,
    /// Height at which the unbonding began.
    pub creation_height: BlockHeight,
    /// Unix timestamp at which native unbonding would complete.
    pub completion_time: u64,
    /// Amount being unbonded.
    pub balance: u128,
    /// Entry id.
    pub id: UnbondingEntryId,
}

/// Acknowledgement packet sent by a consumer once a validator-set change has
/// matured on its side, optionally carrying slash acknowledgements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityAcknowledgement {
    /// Version the consumer observed.
    pub valset_update_id: ValsetUpdateId,
    /// Opaque slash acknowledgement tokens, in arrival order.
    pub slash_acks: Vec<String>,
}

/// Consumer chain registration carried in provider genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerRegistration {
    /// Consumer chain id.
    pub chain_id: ChainId,
    /// Light client registered for the chain.
    pub client_id: ClientId,
    /// Opaque consumer genesis record.
    #[serde(default)]
    pub genesis: Vec<u8>,
}

/// Provider genesis state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderGenesis {
    /// Port to bind.
    pub port_id: PortId,
    /// Starting validator-set version.
    pub valset_update_id: ValsetUpdateId,
    /// Consumers approved at genesis.
    #[serde(default)]
    pub consumers: Vec<ConsumerRegistration>,
}

impl Default for ProviderGenesis {
    fn default() -> Self {
        Self {
            port_id: PortId::from(PROVIDER_PORT_ID),
            valset_update_id: 0,
            consumers: Vec::new(),
        }
    }
}
