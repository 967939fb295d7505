//! # Slash Ack Ledger
//!
//! Per-chain queue of opaque slash acknowledgement tokens, drained for
//! outbound dispatch.

use super::records::{read_record, write_record};
use crate::adapters::RecordCodec;
use crate::domain::keys::{slash_acks_key, suffix_str, SLASH_ACKS_PREFIX};
use crate::domain::{ChainId, ProviderError, ProviderResult};
use crate::metrics;
use crate::ports::outbound::KeyValueStore;
use tracing::debug;

const ACKS: &str = "slash acks";

/// Pending slash acknowledgements.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlashAckLedger;

impl SlashAckLedger {
    /// Append `token` to the queue of `chain_id`.
    pub fn append<S: KeyValueStore + ?Sized>(
        store: &mut S,
        chain_id: &ChainId,
        token: impl Into<String>,
    ) -> ProviderResult<()> {
        let key = slash_acks_key(chain_id);
        let mut acks: Vec<String> = read_record(store, &key, ACKS)?.unwrap_or_default();
        acks.push(token.into());
        write_record(store, &key, &acks)?;
        metrics::record_slash_ack(chain_id.as_str());
        Ok(())
    }

    /// Pending tokens of `chain_id`, oldest first.
    pub fn pending<S: KeyValueStore + ?Sized>(
        store: &S,
        chain_id: &ChainId,
    ) -> ProviderResult<Vec<String>> {
        Ok(read_record(store, &slash_acks_key(chain_id), ACKS)?.unwrap_or_default())
    }

    /// Return and clear the queue of `chain_id`. Empty if nothing is pending.
    pub fn drain<S: KeyValueStore + ?Sized>(
        store: &mut S,
        chain_id: &ChainId,
    ) -> ProviderResult<Vec<String>> {
        let acks = Self::pending(store, chain_id)?;
        if !acks.is_empty() {
            store.delete(&slash_acks_key(chain_id))?;
            debug!(
                chain_id = %chain_id,
                count = acks.len(),
                "[qc-15] Slash acks drained"
            );
        }
        Ok(acks)
    }

    /// Visit chains with pending tokens in chain id order. Return `true` from
    /// `f` to stop.
    pub fn iterate<S, F>(store: &S, mut f: F) -> ProviderResult<()>
    where
        S: KeyValueStore + ?Sized,
        F: FnMut(&ChainId, &[String]) -> bool,
    {
        for (key, value) in store.prefix_scan(SLASH_ACKS_PREFIX)? {
            let chain = suffix_str(&key, SLASH_ACKS_PREFIX)
                .ok_or_else(|| ProviderError::invariant("malformed slash acks key"))?;
            let acks: Vec<String> = RecordCodec::decode(ACKS, &value)?;
            if acks.is_empty() {
                continue;
            }
            if f(&ChainId::from(chain), &acks) {
                break;
            }
        }
        Ok(())
    }

    /// Chains with pending tokens, in chain id order.
    pub fn chains_with_pending<S: KeyValueStore + ?Sized>(
        store: &S,
    ) -> ProviderResult<Vec<ChainId>> {
        let mut chains = Vec::new();
        Self::iterate(store, |chain, _| {
            chains.push(chain.clone());
            false
        })?;
        Ok(chains)
    }
}
