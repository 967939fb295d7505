//! # Validator Set Versioning
//!
//! Monotonic counter naming the provider's current validator set, and the
//! version -> block height correlation consumers use to map a received
//! version back to a provider height.

use super::records::{read_u64, write_u64};
use crate::domain::keys::{valset_update_block_height_key, VALSET_UPDATE_ID_KEY};
use crate::domain::{invariant_next_version, BlockHeight, ProviderResult, ValsetUpdateId};
use crate::metrics;
use crate::ports::outbound::KeyValueStore;
use tracing::debug;

/// Validator-set version counter and height map.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValidatorSetVersioning;

impl ValidatorSetVersioning {
    /// Current version, 0 if never set.
    pub fn get<S: KeyValueStore + ?Sized>(store: &S) -> ProviderResult<ValsetUpdateId> {
        Ok(read_u64(store, VALSET_UPDATE_ID_KEY, "valset update id")?.unwrap_or(0))
    }

    /// Overwrite the version. Genesis and import only.
    pub fn set<S: KeyValueStore + ?Sized>(
        store: &mut S,
        version: ValsetUpdateId,
    ) -> ProviderResult<()> {
        write_u64(store, VALSET_UPDATE_ID_KEY, version)?;
        metrics::set_valset_update_id(version);
        Ok(())
    }

    /// Advance the version by one and return the new value.
    pub fn increment<S: KeyValueStore + ?Sized>(store: &mut S) -> ProviderResult<ValsetUpdateId> {
        let current = Self::get(store)?;
        let next = invariant_next_version(current)?;
        Self::set(store, next)?;
        debug!(version = next, "[qc-15] Validator set version advanced");
        Ok(next)
    }

    /// Record the provider height at which `version` was current.
    pub fn record_height<S: KeyValueStore + ?Sized>(
        store: &mut S,
        version: ValsetUpdateId,
        height: BlockHeight,
    ) -> ProviderResult<()> {
        write_u64(store, &valset_update_block_height_key(version), height)
    }

    /// Height recorded for `version`, 0 if unknown.
    pub fn lookup_height<S: KeyValueStore + ?Sized>(
        store: &S,
        version: ValsetUpdateId,
    ) -> ProviderResult<BlockHeight> {
        Ok(read_u64(
            store,
            &valset_update_block_height_key(version),
            "valset update block height",
        )?
        .unwrap_or(0))
    }

    /// Drop the height recorded for `version`.
    pub fn forget_height<S: KeyValueStore + ?Sized>(
        store: &mut S,
        version: ValsetUpdateId,
    ) -> ProviderResult<()> {
        store.delete(&valset_update_block_height_key(version))?;
        Ok(())
    }
}
