//! # Channel Registry
//!
//! Binds consumer chain identity to exactly one CCV channel.
//!
//! Binding happens in two handshake stages. The try stage runs
//! [`ChannelRegistry::verify_bind`], a pure check against verified transport
//! state. The confirm stage runs [`ChannelRegistry::commit_bind`], which
//! re-resolves the chain from the channel and writes the binding. A second
//! channel that raced past verification is caught at commit, marked INVALID
//! and handed to the transport for closing.

use super::records::{read_string, read_u64, write_u64};
use crate::domain::keys::{
    chain_to_channel_key, chain_to_client_key, channel_status_key, channel_to_chain_key,
    consumer_genesis_key, init_chain_height_key, suffix_str, CHAIN_TO_CHANNEL_PREFIX,
    CHAIN_TO_CLIENT_PREFIX, CHANNEL_TO_CHAIN_PREFIX, PORT_KEY,
};
use crate::domain::{
    invariant_client_matches, invariant_no_validating_channel, invariant_single_hop,
    invariant_tendermint_client, BlockHeight, ChainId, ChannelId, ChannelStatus, ClientId,
    ConnectionId, ConsumerChain, ConsumerRegistration, LightClientState, PortId, ProviderError,
    ProviderResult,
};
use crate::metrics;
use crate::ports::outbound::{CapabilityProvider, ChannelCloser, ConnectionLookup, KeyValueStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Consumer chain <-> channel registry.
///
/// Store-only queries are associated functions so other components can read
/// the registry without holding the transport collaborators.
pub struct ChannelRegistry {
    port: PortId,
    require_initializing_status: bool,
    lookup: Arc<dyn ConnectionLookup>,
    closer: Arc<dyn ChannelCloser>,
    capabilities: Arc<dyn CapabilityProvider>,
}

impl ChannelRegistry {
    /// Create a registry acting on `port`.
    pub fn new(
        port: PortId,
        lookup: Arc<dyn ConnectionLookup>,
        closer: Arc<dyn ChannelCloser>,
        capabilities: Arc<dyn CapabilityProvider>,
    ) -> Self {
        Self {
            port,
            require_initializing_status: false,
            lookup,
            closer,
            capabilities,
        }
    }

    /// Require INITIALIZING status at the try stage.
    pub fn with_initializing_check(mut self, required: bool) -> Self {
        self.require_initializing_status = required;
        self
    }

    /// Port this registry acts on.
    pub fn port(&self) -> &PortId {
        &self.port
    }

    // =========================================================================
    // HANDSHAKE
    // =========================================================================

    /// Check that `channel_id` may become the CCV channel of `claimed_chain`.
    ///
    /// Never mutates the store.
    pub fn verify_bind<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        channel_id: &ChannelId,
        connection_hops: &[ConnectionId],
        claimed_chain: &ChainId,
    ) -> ProviderResult<()> {
        let hop = invariant_single_hop(connection_hops)?;

        if self.require_initializing_status {
            let actual = Self::channel_status(store, channel_id)?;
            if actual != ChannelStatus::Initializing {
                return Err(ProviderError::InvalidStatus {
                    channel_id: channel_id.clone(),
                    expected: ChannelStatus::Initializing,
                    actual,
                });
            }
        }

        let (client_id, state) = self.resolve_client(hop)?;
        invariant_tendermint_client(&client_id, &state)?;

        let registered = Self::consumer_client(store, claimed_chain)?;
        invariant_client_matches(claimed_chain, registered.as_ref(), &client_id, &state)?;

        let bound = match Self::chain_to_channel(store, claimed_chain)? {
            Some(existing) => {
                let status = Self::channel_status(store, &existing)?;
                Some((existing, status))
            }
            None => None,
        };
        invariant_no_validating_channel(
            claimed_chain,
            channel_id,
            bound.as_ref().map(|(c, s)| (c, *s)),
        )?;

        debug!(
            chain_id = %claimed_chain,
            channel_id = %channel_id,
            "[qc-15] Channel verified for binding"
        );
        Ok(())
    }

    /// Bind `channel_id` to the chain its light client tracks.
    ///
    /// If that chain is already bound to a different channel, the new channel
    /// is marked INVALID, a close is requested on it and
    /// `DuplicateRegistration` is returned. Confirming the bound channel again
    /// is a no-op.
    pub fn commit_bind<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        height: BlockHeight,
        channel_id: &ChannelId,
    ) -> ProviderResult<ChainId> {
        let end = self
            .lookup
            .channel(&self.port, channel_id)
            .ok_or_else(|| ProviderError::ChannelNotFound {
                channel_id: channel_id.clone(),
            })?;
        let hop = invariant_single_hop(&end.connection_hops)?;
        let (_, state) = self.resolve_client(hop)?;
        let chain_id = state.chain_id;

        match Self::chain_to_channel(store, &chain_id)? {
            Some(existing) if &existing == channel_id => {
                debug!(
                    chain_id = %chain_id,
                    channel_id = %channel_id,
                    "[qc-15] Channel already bound"
                );
                return Ok(chain_id);
            }
            Some(existing) => {
                return Err(self.reject_duplicate(store, chain_id, existing, channel_id)?);
            }
            None => {}
        }

        store.put(&chain_to_channel_key(&chain_id), channel_id.as_bytes())?;
        store.put(&channel_to_chain_key(channel_id), chain_id.as_bytes())?;
        write_u64(store, &init_chain_height_key(&chain_id), height)?;
        Self::set_channel_status(store, channel_id, ChannelStatus::Validating)?;

        metrics::record_channel_bound();
        info!(
            chain_id = %chain_id,
            channel_id = %channel_id,
            height,
            "[qc-15] CCV channel bound"
        );
        Ok(chain_id)
    }

    /// Compensate a losing bind and build its error.
    fn reject_duplicate<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        chain_id: ChainId,
        existing: ChannelId,
        rejected: &ChannelId,
    ) -> ProviderResult<ProviderError> {
        Self::set_channel_status(store, rejected, ChannelStatus::Invalid)?;

        match self.capabilities.channel_capability(&self.port, rejected) {
            Some(ticket) => {
                if let Err(e) = self.closer.close_init(&self.port, rejected, &ticket) {
                    warn!(
                        channel_id = %rejected,
                        error = %e,
                        "[qc-15] Close request for duplicate channel failed"
                    );
                }
            }
            None => warn!(
                channel_id = %rejected,
                "[qc-15] No capability to close duplicate channel"
            ),
        }

        metrics::record_duplicate_rejected();
        warn!(
            chain_id = %chain_id,
            existing = %existing,
            rejected = %rejected,
            "[qc-15] Duplicate CCV channel rejected"
        );
        Ok(ProviderError::DuplicateRegistration {
            chain_id,
            existing,
            rejected: rejected.clone(),
        })
    }

    fn resolve_client(&self, hop: &ConnectionId) -> ProviderResult<(ClientId, LightClientState)> {
        let connection =
            self.lookup
                .connection(hop)
                .ok_or_else(|| ProviderError::ConnectionNotFound {
                    connection_id: hop.clone(),
                })?;
        let state = self
            .lookup
            .client_state(&connection.client_id)
            .ok_or_else(|| ProviderError::ClientNotFound {
                client_id: connection.client_id.clone(),
            })?;
        Ok((connection.client_id, state))
    }

    // =========================================================================
    // CHAIN <-> CHANNEL
    // =========================================================================

    /// Channel bound to `chain_id`.
    pub fn chain_to_channel<S: KeyValueStore + ?Sized>(
        store: &S,
        chain_id: &ChainId,
    ) -> ProviderResult<Option<ChannelId>> {
        Ok(read_string(store, &chain_to_channel_key(chain_id), "channel id")?.map(ChannelId::from))
    }

    /// Chain bound to `channel_id`.
    pub fn channel_to_chain<S: KeyValueStore + ?Sized>(
        store: &S,
        channel_id: &ChannelId,
    ) -> ProviderResult<Option<ChainId>> {
        Ok(read_string(store, &channel_to_chain_key(channel_id), "chain id")?.map(ChainId::from))
    }

    /// Visit bound chains in chain id order. Return `true` from `f` to stop.
    pub fn iterate_consumer_chains<S, F>(store: &S, mut f: F) -> ProviderResult<()>
    where
        S: KeyValueStore + ?Sized,
        F: FnMut(&ChainId, &ChannelId) -> bool,
    {
        for (key, value) in store.prefix_scan(CHAIN_TO_CHANNEL_PREFIX)? {
            let chain = decode_suffix(&key, CHAIN_TO_CHANNEL_PREFIX, "chain id")?;
            let channel = decode_value(value, "channel id")?;
            if f(&ChainId::from(chain), &ChannelId::from(channel)) {
                break;
            }
        }
        Ok(())
    }

    /// Visit bound channels in channel id order. Return `true` from `f` to stop.
    pub fn iterate_channels<S, F>(store: &S, mut f: F) -> ProviderResult<()>
    where
        S: KeyValueStore + ?Sized,
        F: FnMut(&ChannelId, &ChainId) -> bool,
    {
        for (key, value) in store.prefix_scan(CHANNEL_TO_CHAIN_PREFIX)? {
            let channel = decode_suffix(&key, CHANNEL_TO_CHAIN_PREFIX, "channel id")?;
            let chain = decode_value(value, "chain id")?;
            if f(&ChannelId::from(channel), &ChainId::from(chain)) {
                break;
            }
        }
        Ok(())
    }

    /// Every bound chain, in chain id order.
    ///
    /// Membership only: a chain whose channel went INVALID is still listed.
    pub fn consumer_chain_ids<S: KeyValueStore + ?Sized>(
        store: &S,
    ) -> ProviderResult<Vec<ChainId>> {
        let mut chains = Vec::new();
        Self::iterate_consumer_chains(store, |chain, _| {
            chains.push(chain.clone());
            false
        })?;
        Ok(chains)
    }

    // =========================================================================
    // CHANNEL STATUS
    // =========================================================================

    /// Status of `channel_id`, UNINITIALIZED if unset.
    pub fn channel_status<S: KeyValueStore + ?Sized>(
        store: &S,
        channel_id: &ChannelId,
    ) -> ProviderResult<ChannelStatus> {
        match store.get(&channel_status_key(channel_id))?.as_deref() {
            None => Ok(ChannelStatus::Uninitialized),
            Some([byte]) => ChannelStatus::from_byte(*byte).ok_or_else(|| {
                ProviderError::invariant(format!("unknown status byte {byte} for {channel_id}"))
            }),
            Some(other) => Err(ProviderError::invariant(format!(
                "malformed status for {channel_id}: {} bytes",
                other.len()
            ))),
        }
    }

    /// Overwrite the status of `channel_id`.
    pub fn set_channel_status<S: KeyValueStore + ?Sized>(
        store: &mut S,
        channel_id: &ChannelId,
        status: ChannelStatus,
    ) -> ProviderResult<()> {
        store.put(&channel_status_key(channel_id), &[status.to_byte()])?;
        Ok(())
    }

    /// Mark a channel whose handshake has started.
    pub fn mark_initializing<S: KeyValueStore + ?Sized>(
        store: &mut S,
        channel_id: &ChannelId,
    ) -> ProviderResult<()> {
        let current = Self::channel_status(store, channel_id)?;
        if !current.can_transition_to(ChannelStatus::Initializing) {
            return Err(ProviderError::InvalidStatus {
                channel_id: channel_id.clone(),
                expected: ChannelStatus::Uninitialized,
                actual: current,
            });
        }
        Self::set_channel_status(store, channel_id, ChannelStatus::Initializing)
    }

    // =========================================================================
    // CONSUMER RECORDS
    // =========================================================================

    /// Register a consumer approved for binding.
    pub fn register_consumer<S: KeyValueStore + ?Sized>(
        store: &mut S,
        registration: &ConsumerRegistration,
    ) -> ProviderResult<()> {
        Self::set_consumer_client(store, &registration.chain_id, &registration.client_id)?;
        if !registration.genesis.is_empty() {
            Self::set_consumer_genesis(store, &registration.chain_id, &registration.genesis)?;
        }
        info!(
            chain_id = %registration.chain_id,
            client_id = %registration.client_id,
            "[qc-15] Consumer chain registered"
        );
        Ok(())
    }

    /// Every registered consumer, in chain id order.
    pub fn registered_consumers<S: KeyValueStore + ?Sized>(
        store: &S,
    ) -> ProviderResult<Vec<ConsumerRegistration>> {
        let mut consumers = Vec::new();
        for (key, value) in store.prefix_scan(CHAIN_TO_CLIENT_PREFIX)? {
            let chain_id = ChainId::from(decode_suffix(&key, CHAIN_TO_CLIENT_PREFIX, "chain id")?);
            let client_id = ClientId::from(decode_value(value, "client id")?);
            let genesis = Self::consumer_genesis(store, &chain_id)?.unwrap_or_default();
            consumers.push(ConsumerRegistration {
                chain_id,
                client_id,
                genesis,
            });
        }
        Ok(consumers)
    }

    /// Record the light client the provider trusts for `chain_id`.
    pub fn set_consumer_client<S: KeyValueStore + ?Sized>(
        store: &mut S,
        chain_id: &ChainId,
        client_id: &ClientId,
    ) -> ProviderResult<()> {
        store.put(&chain_to_client_key(chain_id), client_id.as_bytes())?;
        Ok(())
    }

    /// Light client registered for `chain_id`.
    pub fn consumer_client<S: KeyValueStore + ?Sized>(
        store: &S,
        chain_id: &ChainId,
    ) -> ProviderResult<Option<ClientId>> {
        Ok(read_string(store, &chain_to_client_key(chain_id), "client id")?.map(ClientId::from))
    }

    /// Store the opaque consumer genesis record.
    pub fn set_consumer_genesis<S: KeyValueStore + ?Sized>(
        store: &mut S,
        chain_id: &ChainId,
        genesis: &[u8],
    ) -> ProviderResult<()> {
        store.put(&consumer_genesis_key(chain_id), genesis)?;
        Ok(())
    }

    /// Opaque consumer genesis record.
    pub fn consumer_genesis<S: KeyValueStore + ?Sized>(
        store: &S,
        chain_id: &ChainId,
    ) -> ProviderResult<Option<Vec<u8>>> {
        Ok(store.get(&consumer_genesis_key(chain_id))?)
    }

    /// Provider height at which `chain_id` was bound, 0 if never.
    pub fn init_height<S: KeyValueStore + ?Sized>(
        store: &S,
        chain_id: &ChainId,
    ) -> ProviderResult<BlockHeight> {
        Ok(read_u64(store, &init_chain_height_key(chain_id), "init chain height")?.unwrap_or(0))
    }

    /// Assembled view of `chain_id`, if the provider knows the chain at all.
    pub fn consumer_chain<S: KeyValueStore + ?Sized>(
        store: &S,
        chain_id: &ChainId,
    ) -> ProviderResult<Option<ConsumerChain>> {
        let channel_id = Self::chain_to_channel(store, chain_id)?;
        let genesis = Self::consumer_genesis(store, chain_id)?;
        let registered = Self::consumer_client(store, chain_id)?.is_some();
        if channel_id.is_none() && genesis.is_none() && !registered {
            return Ok(None);
        }
        let status = match &channel_id {
            Some(channel) => Self::channel_status(store, channel)?,
            None => ChannelStatus::Uninitialized,
        };
        Ok(Some(ConsumerChain {
            chain_id: chain_id.clone(),
            channel_id,
            status,
            genesis,
            init_height: Self::init_height(store, chain_id)?,
        }))
    }

    // =========================================================================
    // PORT
    // =========================================================================

    /// Record the bound port.
    pub fn set_port<S: KeyValueStore + ?Sized>(store: &mut S, port: &PortId) -> ProviderResult<()> {
        store.put(PORT_KEY, port.as_bytes())?;
        Ok(())
    }

    /// Bound port, if recorded.
    pub fn bound_port<S: KeyValueStore + ?Sized>(store: &S) -> ProviderResult<Option<PortId>> {
        Ok(read_string(store, PORT_KEY, "port id")?.map(PortId::from))
    }
}

fn decode_suffix<'a>(key: &'a [u8], prefix: &[u8], what: &str) -> ProviderResult<&'a str> {
    suffix_str(key, prefix).ok_or_else(|| ProviderError::invariant(format!("malformed {what} key")))
}

fn decode_value(value: Vec<u8>, what: &str) -> ProviderResult<String> {
    String::from_utf8(value).map_err(|_| ProviderError::invariant(format!("non utf-8 {what}")))
}
