//! # Staking Event Bridge
//!
//! Adapts staking lifecycle hooks to the unbonding coordinator.

use super::unbonding::UnbondingCoordinator;
use crate::domain::{ProviderResult, UnbondingEntryCreated, UnbondingEntryId};
use crate::ports::inbound::StakingHooks;
use crate::ports::outbound::KeyValueStore;
use tracing::debug;

/// Staking hooks implementation.
///
/// `before_unbonding_entry_complete` answers `true` when completion is
/// allowed. Hosts whose lifecycle reads the gate as "blocked" must negate it.
#[derive(Clone, Copy, Debug, Default)]
pub struct StakingEventBridge;

impl StakingHooks for StakingEventBridge {
    fn unbonding_entry_created(
        &self,
        store: &mut dyn KeyValueStore,
        event: &UnbondingEntryCreated,
    ) -> ProviderResult<()> {
        debug!(
            entry_id = event.id,
            validator = %event.validator,
            creation_height = event.creation_height,
            "[qc-15] Unbonding entry created"
        );
        UnbondingCoordinator::on_unbonding_created(store, event.id)
    }

    fn before_unbonding_entry_complete(
        &self,
        store: &dyn KeyValueStore,
        id: UnbondingEntryId,
    ) -> ProviderResult<bool> {
        UnbondingCoordinator::may_complete(store, id)
    }
}
