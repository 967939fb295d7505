//! # CCV Provider Service
//!
//! Composes the provider components behind the [`ProviderApi`] and
//! [`StakingHooks`] inbound ports.
//!
//! ## Architecture
//!
//! ```text
//! handshake ──► ChannelRegistry ◄── UnbondingCoordinator ◄── StakingEventBridge
//!                    │                      ▲
//!                    ▼                      │
//!          ValidatorSetVersioning     ack packets ──► SlashAckLedger
//! ```
//!
//! Components hold no state of their own; every operation receives the
//! transition's store handle. [`ProviderService::execute`] runs a transition
//! against a [`CachedStore`] overlay so a failed transition leaves the
//! backing store untouched.

mod channel_registry;
mod records;
mod slash_acks;
mod staking_bridge;
mod unbonding;
mod versioning;

pub use channel_registry::ChannelRegistry;
pub use slash_acks::SlashAckLedger;
pub use staking_bridge::StakingEventBridge;
pub use unbonding::UnbondingCoordinator;
pub use versioning::ValidatorSetVersioning;

use crate::adapters::CachedStore;
use crate::domain::{
    BlockHeight, ChainId, ChannelId, ConnectionId, MaturityAcknowledgement, ProviderConfig,
    ProviderError, ProviderGenesis, ProviderResult, UnbondingEntryId, ValsetUpdateId,
};
use crate::metrics;
use crate::ports::inbound::{ProviderApi, StakingHooks};
use crate::ports::outbound::{CapabilityProvider, ChannelCloser, ConnectionLookup, KeyValueStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// The CCV provider service.
pub struct ProviderService {
    config: ProviderConfig,
    registry: ChannelRegistry,
    bridge: StakingEventBridge,
}

impl ProviderService {
    /// Create a service over the given transport and capability collaborators.
    pub fn new(
        config: ProviderConfig,
        lookup: Arc<dyn ConnectionLookup>,
        closer: Arc<dyn ChannelCloser>,
        capabilities: Arc<dyn CapabilityProvider>,
    ) -> Self {
        let registry = ChannelRegistry::new(config.port_id.clone(), lookup, closer, capabilities)
            .with_initializing_check(config.require_initializing_status);
        Self {
            config,
            registry,
            bridge: StakingEventBridge,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Channel registry bound to this service's collaborators.
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Staking lifecycle hooks to install in the host's staking module.
    pub fn staking_hooks(&self) -> &dyn StakingHooks {
        &self.bridge
    }

    /// Run one transition against a write overlay of `store`.
    ///
    /// Writes reach `store` in a single atomic batch only if `f` succeeds.
    pub fn execute<S, T, F>(&self, store: &mut S, f: F) -> ProviderResult<T>
    where
        S: KeyValueStore + ?Sized,
        F: FnOnce(&mut CachedStore<'_, S>) -> ProviderResult<T>,
    {
        let mut tx = CachedStore::new(store);
        match f(&mut tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                metrics::record_rejection(class_label(&e));
                if e.is_fatal() {
                    error!(error = %e, "[qc-15] Transition halted");
                } else {
                    warn!(error = %e, "[qc-15] Transition rejected");
                }
                Err(e)
            }
        }
    }

    /// Load provider genesis state.
    pub fn init_genesis<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        genesis: &ProviderGenesis,
    ) -> ProviderResult<()> {
        if genesis.port_id != self.config.port_id {
            warn!(
                genesis_port = %genesis.port_id,
                configured_port = %self.config.port_id,
                "[qc-15] Genesis port differs from configured port"
            );
        }
        ChannelRegistry::set_port(store, &genesis.port_id)?;
        ValidatorSetVersioning::set(store, genesis.valset_update_id)?;
        for consumer in &genesis.consumers {
            ChannelRegistry::register_consumer(store, consumer)?;
        }
        info!(
            port = %genesis.port_id,
            version = genesis.valset_update_id,
            consumers = genesis.consumers.len(),
            "[qc-15] Provider genesis initialized"
        );
        Ok(())
    }

    /// Export provider genesis state.
    pub fn export_genesis<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
    ) -> ProviderResult<ProviderGenesis> {
        Ok(ProviderGenesis {
            port_id: ChannelRegistry::bound_port(store)?
                .unwrap_or_else(|| self.config.port_id.clone()),
            valset_update_id: ValidatorSetVersioning::get(store)?,
            consumers: ChannelRegistry::registered_consumers(store)?,
        })
    }
}

impl ProviderApi for ProviderService {
    fn on_chan_open_init(
        &self,
        store: &mut dyn KeyValueStore,
        channel_id: &ChannelId,
    ) -> ProviderResult<()> {
        ChannelRegistry::mark_initializing(store, channel_id)
    }

    fn on_chan_open_try(
        &self,
        store: &dyn KeyValueStore,
        channel_id: &ChannelId,
        connection_hops: &[ConnectionId],
        claimed_chain: &ChainId,
    ) -> ProviderResult<()> {
        self.registry
            .verify_bind(store, channel_id, connection_hops, claimed_chain)
    }

    fn on_chan_open_confirm(
        &self,
        store: &mut dyn KeyValueStore,
        height: BlockHeight,
        channel_id: &ChannelId,
    ) -> ProviderResult<()> {
        self.registry.commit_bind(store, height, channel_id)?;
        Ok(())
    }

    fn on_ack_packet(
        &self,
        store: &mut dyn KeyValueStore,
        channel_id: &ChannelId,
        ack: &MaturityAcknowledgement,
    ) -> ProviderResult<Vec<UnbondingEntryId>> {
        let chain_id = ChannelRegistry::channel_to_chain(&*store, channel_id)?.ok_or_else(|| {
            ProviderError::ChannelNotFound {
                channel_id: channel_id.clone(),
            }
        })?;
        let completed =
            UnbondingCoordinator::on_chain_acknowledged(store, &chain_id, ack.valset_update_id)?;
        for token in &ack.slash_acks {
            SlashAckLedger::append(store, &chain_id, token.as_str())?;
        }
        Ok(completed)
    }

    fn end_block(
        &self,
        store: &mut dyn KeyValueStore,
        height: BlockHeight,
    ) -> ProviderResult<ValsetUpdateId> {
        if self.config.record_valset_heights {
            let current = ValidatorSetVersioning::get(&*store)?;
            ValidatorSetVersioning::record_height(store, current, height)?;
        }
        ValidatorSetVersioning::increment(store)
    }

    fn sweep_slash_acks(
        &self,
        store: &mut dyn KeyValueStore,
    ) -> ProviderResult<Vec<(ChainId, Vec<String>)>> {
        let mut batches = Vec::new();
        for chain_id in SlashAckLedger::chains_with_pending(&*store)? {
            let acks = SlashAckLedger::drain(store, &chain_id)?;
            batches.push((chain_id, acks));
        }
        Ok(batches)
    }
}

fn class_label(e: &ProviderError) -> &'static str {
    use crate::domain::ErrorClass;
    match e.class() {
        ErrorClass::Validation => "validation",
        ErrorClass::IdentityMismatch => "identity_mismatch",
        ErrorClass::DuplicateRegistration => "duplicate_registration",
        ErrorClass::NotFound => "not_found",
        ErrorClass::InvariantViolation => "invariant_violation",
        ErrorClass::Conflict => "conflict",
        ErrorClass::Storage => "storage",
    }
}
