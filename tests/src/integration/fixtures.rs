//! Shared setup for provider flows.

use ccv_telemetry::{log_chain_event, log_event};
use qc_15_ccv_provider::{
    ChainId, ChannelId, ConnectionId, ConsumerRegistration, InMemoryKVStore,
    MockConnectionLookup, ProviderApi, ProviderConfig, ProviderGenesis, ProviderResult,
    ProviderService, RecordingChannelCloser, StakingHooks, StaticCapabilityProvider,
    UnbondingEntryCreated, UnbondingEntryId,
};
use std::sync::Arc;

/// Provider port used by every fixture.
pub const PORT: &str = "provider";

/// A provider wired to in-memory collaborators.
pub struct Harness {
    /// Service under test.
    pub service: ProviderService,
    /// Records close requests.
    pub closer: Arc<RecordingChannelCloser>,
    /// Committed provider state.
    pub store: InMemoryKVStore,
}

/// Consumer chain reachable over one or more candidate channels, each on its
/// own connection but sharing the chain's registered client.
pub struct Consumer<'a> {
    /// Chain id.
    pub chain: &'a str,
    /// Candidate channel ids.
    pub channels: &'a [&'a str],
}

impl Harness {
    /// Provider at `version` with `consumers` registered at genesis.
    pub fn new(version: u64, consumers: &[Consumer<'_>]) -> Self {
        Self::with_config(ProviderConfig::default(), version, consumers)
    }

    /// As [`Harness::new`] with an explicit config.
    pub fn with_config(config: ProviderConfig, version: u64, consumers: &[Consumer<'_>]) -> Self {
        let mut lookup = MockConnectionLookup::new();
        for consumer in consumers {
            for channel in consumer.channels {
                lookup = lookup.with_consumer_path(
                    PORT,
                    *channel,
                    connection_for(channel),
                    client_for(consumer.chain),
                    consumer.chain,
                );
            }
        }

        let closer = Arc::new(RecordingChannelCloser::new());
        let service = ProviderService::new(
            config,
            Arc::new(lookup),
            closer.clone(),
            Arc::new(StaticCapabilityProvider::new()),
        );

        let genesis = ProviderGenesis {
            valset_update_id: version,
            consumers: consumers
                .iter()
                .map(|c| ConsumerRegistration {
                    chain_id: ChainId::from(c.chain),
                    client_id: client_for(c.chain).into(),
                    genesis: format!("{}-genesis", c.chain).into_bytes(),
                })
                .collect(),
            ..ProviderGenesis::default()
        };
        let mut store = InMemoryKVStore::new();
        service
            .init_genesis(&mut store, &genesis)
            .expect("genesis on an empty store");

        Self {
            service,
            closer,
            store,
        }
    }

    /// Full handshake (try + confirm) for `channel` claiming `chain`, as one
    /// transition.
    pub fn open(&mut self, channel: &str, chain: &str, height: u64) -> ProviderResult<()> {
        let channel = ChannelId::from(channel);
        let hops = [ConnectionId::from(connection_for(channel.as_str()))];
        let chain = ChainId::from(chain);
        let service = &self.service;
        let result = service.execute(&mut self.store, |tx| {
            service.on_chan_open_try(&*tx, &channel, &hops, &chain)?;
            service.on_chan_open_confirm(tx, height, &channel)
        });
        log_chain_event!(
            debug,
            "harness",
            "handshake finished",
            chain,
            channel,
            height,
            accepted = result.is_ok()
        );
        result
    }

    /// Confirm-only transition, as when a racing handshake skipped try.
    pub fn confirm(&mut self, channel: &str, height: u64) -> ProviderResult<()> {
        let channel = ChannelId::from(channel);
        let service = &self.service;
        service.execute(&mut self.store, |tx| {
            service.on_chan_open_confirm(tx, height, &channel)
        })
    }

    /// Staking module starts unbonding entry `id`.
    pub fn unbond(&mut self, id: UnbondingEntryId) -> ProviderResult<()> {
        let event = UnbondingEntryCreated {
            delegator: "cosmos1delegator".into(),
            validator: "cosmosvaloper1validator".into(),
            creation_height: 1,
            completion_time: 1_814_400,
            balance: 1_000_000,
            id,
        };
        log_event!(debug, "harness", "unbonding started", entry_id = id);
        let service = &self.service;
        service.execute(&mut self.store, |tx| {
            service.staking_hooks().unbonding_entry_created(tx, &event)
        })
    }

    /// Staking module asks whether entry `id` may complete.
    pub fn may_complete(&self, id: UnbondingEntryId) -> ProviderResult<bool> {
        self.service
            .staking_hooks()
            .before_unbonding_entry_complete(&self.store, id)
    }
}

/// Connection id derived from a channel id.
pub fn connection_for(channel: &str) -> String {
    format!("connection-{channel}")
}

/// Client id registered for a chain.
pub fn client_for(chain: &str) -> String {
    format!("07-tendermint-{chain}")
}
