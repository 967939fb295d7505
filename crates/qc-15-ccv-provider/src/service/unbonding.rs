//! # Unbonding Coordinator
//!
//! Holds each unbonding entry until every consumer chain that was bound when
//! it started has acknowledged the validator-set version current at that
//! time.
//!
//! Entries are indexed by `(chain, version)` buckets. An acknowledgement
//! drains one bucket: the acknowledging chain is removed from every entry in
//! it, entries with no outstanding chain are deleted, then the bucket itself
//! is deleted. Every id in a bucket must have a stored entry; a dangling id
//! is reported as an invariant violation before anything is written.

use super::channel_registry::ChannelRegistry;
use super::records::{read_record, write_record};
use super::versioning::ValidatorSetVersioning;
use crate::adapters::RecordCodec;
use crate::domain::keys::{
    parse_unbonding_index_key, unbonding_entry_key, unbonding_index_key, UNBONDING_INDEX_PREFIX,
};
use crate::domain::{
    ChainId, ProviderError, ProviderResult, UnbondingEntry, UnbondingEntryId, ValsetUpdateId,
};
use crate::metrics;
use crate::ports::outbound::KeyValueStore;
use tracing::{debug, info};

const ENTRY: &str = "unbonding entry";
const INDEX: &str = "unbonding index";

/// Acknowledgement-gated unbonding bookkeeping.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnbondingCoordinator;

impl UnbondingCoordinator {
    /// Gate entry `id` on every currently bound consumer chain.
    ///
    /// With no bound chain there is nothing to wait for and no entry is
    /// stored. A repeated id is rejected without mutation.
    pub fn on_unbonding_created<S: KeyValueStore + ?Sized>(
        store: &mut S,
        id: UnbondingEntryId,
    ) -> ProviderResult<()> {
        if store.exists(&unbonding_entry_key(id))? {
            return Err(ProviderError::DuplicateEntry { entry_id: id });
        }

        let version = ValidatorSetVersioning::get(store)?;
        let chains = ChannelRegistry::consumer_chain_ids(store)?;
        if chains.is_empty() {
            debug!(entry_id = id, "[qc-15] No consumer chains, unbonding not gated");
            return Ok(());
        }

        for chain in &chains {
            let key = unbonding_index_key(chain, version);
            let mut bucket: Vec<UnbondingEntryId> =
                read_record(store, &key, INDEX)?.unwrap_or_default();
            bucket.push(id);
            write_record(store, &key, &bucket)?;
        }

        let entry = UnbondingEntry::new(id, version, chains);
        write_record(store, &unbonding_entry_key(id), &entry)?;

        metrics::record_entry_created();
        info!(
            entry_id = id,
            version,
            consumers = entry.unbonding_consumer_chains.len(),
            "[qc-15] Unbonding entry gated on consumer acknowledgements"
        );
        Ok(())
    }

    /// Whether entry `id` may complete: true iff no entry is stored for it.
    pub fn may_complete<S: KeyValueStore + ?Sized>(
        store: &S,
        id: UnbondingEntryId,
    ) -> ProviderResult<bool> {
        Ok(!store.exists(&unbonding_entry_key(id))?)
    }

    /// Drain bucket `(chain_id, version)`. Returns the ids that completed.
    ///
    /// An empty or already drained bucket is a no-op.
    pub fn on_chain_acknowledged<S: KeyValueStore + ?Sized>(
        store: &mut S,
        chain_id: &ChainId,
        version: ValsetUpdateId,
    ) -> ProviderResult<Vec<UnbondingEntryId>> {
        // Resolve everything first so a dangling id leaves the store untouched.
        let mut entries = Self::entries_for_bucket(store, chain_id, version)?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        for entry in &mut entries {
            if !entry.acknowledge(chain_id) {
                return Err(ProviderError::invariant(format!(
                    "entry {} indexed under ({chain_id}, {version}) does not await {chain_id}",
                    entry.id
                )));
            }
        }

        let mut completed = Vec::new();
        for entry in &entries {
            let key = unbonding_entry_key(entry.id);
            if entry.is_fully_acknowledged() {
                store.delete(&key)?;
                completed.push(entry.id);
            } else {
                write_record(store, &key, entry)?;
            }
        }
        store.delete(&unbonding_index_key(chain_id, version))?;

        metrics::record_entries_completed(completed.len() as u64);
        info!(
            chain_id = %chain_id,
            version,
            acknowledged = entries.len(),
            completed = completed.len(),
            "[qc-15] Consumer acknowledged validator set"
        );
        Ok(completed)
    }

    /// Stored entry for `id`.
    pub fn entry<S: KeyValueStore + ?Sized>(
        store: &S,
        id: UnbondingEntryId,
    ) -> ProviderResult<Option<UnbondingEntry>> {
        read_record(store, &unbonding_entry_key(id), ENTRY)
    }

    /// Entry ids in bucket `(chain_id, version)`, in insertion order.
    pub fn bucket<S: KeyValueStore + ?Sized>(
        store: &S,
        chain_id: &ChainId,
        version: ValsetUpdateId,
    ) -> ProviderResult<Vec<UnbondingEntryId>> {
        Ok(read_record(store, &unbonding_index_key(chain_id, version), INDEX)?.unwrap_or_default())
    }

    /// Visit every non-drained bucket in key order (chain, then version).
    /// Return `true` from `f` to stop.
    pub fn iterate_buckets<S, F>(store: &S, mut f: F) -> ProviderResult<()>
    where
        S: KeyValueStore + ?Sized,
        F: FnMut(&ChainId, ValsetUpdateId, &[UnbondingEntryId]) -> bool,
    {
        for (key, value) in store.prefix_scan(UNBONDING_INDEX_PREFIX)? {
            let (chain_id, version) = parse_unbonding_index_key(&key)
                .ok_or_else(|| ProviderError::invariant("malformed unbonding index key"))?;
            let ids: Vec<UnbondingEntryId> = RecordCodec::decode(INDEX, &value)?;
            if f(&chain_id, version, &ids) {
                break;
            }
        }
        Ok(())
    }

    /// Entries referenced by bucket `(chain_id, version)`.
    pub fn entries_for_bucket<S: KeyValueStore + ?Sized>(
        store: &S,
        chain_id: &ChainId,
        version: ValsetUpdateId,
    ) -> ProviderResult<Vec<UnbondingEntry>> {
        Self::bucket(store, chain_id, version)?
            .into_iter()
            .map(|id| {
                Self::entry(store, id)?.ok_or_else(|| {
                    ProviderError::invariant(format!(
                        "bucket ({chain_id}, {version}) references missing entry {id}"
                    ))
                })
            })
            .collect()
    }
}
