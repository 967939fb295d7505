//! # Inbound Ports
//!
//! What the host drives into the provider: channel handshake callbacks,
//! acknowledgement packets, block boundaries and staking lifecycle hooks.

use crate::domain::{
    BlockHeight, ChainId, ChannelId, ConnectionId, MaturityAcknowledgement, ProviderResult,
    UnbondingEntryCreated, UnbondingEntryId, ValsetUpdateId,
};
use crate::ports::outbound::KeyValueStore;

/// Staking lifecycle hooks the provider implements.
///
/// Exactly the two notifications the unbonding gate needs.
pub trait StakingHooks {
    /// An unbonding entry was created by the staking module.
    fn unbonding_entry_created(
        &self,
        store: &mut dyn KeyValueStore,
        event: &UnbondingEntryCreated,
    ) -> ProviderResult<()>;

    /// Whether the staking module may complete entry `id`.
    ///
    /// `true` means completion is allowed.
    fn before_unbonding_entry_complete(
        &self,
        store: &dyn KeyValueStore,
        id: UnbondingEntryId,
    ) -> ProviderResult<bool>;
}

/// Provider API - inbound port.
pub trait ProviderApi {
    /// Handshake opened: mark the channel INITIALIZING.
    fn on_chan_open_init(
        &self,
        store: &mut dyn KeyValueStore,
        channel_id: &ChannelId,
    ) -> ProviderResult<()>;

    /// Handshake try stage: verify a consumer's channel without mutation.
    fn on_chan_open_try(
        &self,
        store: &dyn KeyValueStore,
        channel_id: &ChannelId,
        connection_hops: &[ConnectionId],
        claimed_chain: &ChainId,
    ) -> ProviderResult<()>;

    /// Handshake confirm stage: bind the channel to its consumer.
    fn on_chan_open_confirm(
        &self,
        store: &mut dyn KeyValueStore,
        height: BlockHeight,
        channel_id: &ChannelId,
    ) -> ProviderResult<()>;

    /// Maturity acknowledgement from a consumer. Returns completed entry ids.
    fn on_ack_packet(
        &self,
        store: &mut dyn KeyValueStore,
        channel_id: &ChannelId,
        ack: &MaturityAcknowledgement,
    ) -> ProviderResult<Vec<UnbondingEntryId>>;

    /// Block boundary after validator-set changes were applied.
    fn end_block(
        &self,
        store: &mut dyn KeyValueStore,
        height: BlockHeight,
    ) -> ProviderResult<ValsetUpdateId>;

    /// Drain every pending slash acknowledgement for outbound dispatch.
    fn sweep_slash_acks(
        &self,
        store: &mut dyn KeyValueStore,
    ) -> ProviderResult<Vec<(ChainId, Vec<String>)>>;
}
