//! In-memory transport and capability adapters.
//!
//! Used by tests and by hosts that embed the provider without a live
//! channel transport.

use crate::domain::{
    ChainId, ChannelEnd, ChannelId, ClientId, ClientType, ConnectionEnd, ConnectionId,
    LightClientState, PortId,
};
use crate::ports::outbound::{
    CapabilityProvider, CapabilityTicket, ChannelCloseError, ChannelCloser, ConnectionLookup,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};

/// Connection lookup over fixed tables.
#[derive(Clone, Debug, Default)]
pub struct MockConnectionLookup {
    channels: BTreeMap<(PortId, ChannelId), ChannelEnd>,
    connections: BTreeMap<ConnectionId, ConnectionEnd>,
    clients: BTreeMap<ClientId, LightClientState>,
}

impl MockConnectionLookup {
    /// Empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel end.
    pub fn with_channel(
        mut self,
        port: impl Into<PortId>,
        channel: impl Into<ChannelId>,
        hops: Vec<ConnectionId>,
    ) -> Self {
        self.channels.insert(
            (port.into(), channel.into()),
            ChannelEnd {
                connection_hops: hops,
            },
        );
        self
    }

    /// Add a connection end.
    pub fn with_connection(
        mut self,
        connection: impl Into<ConnectionId>,
        client: impl Into<ClientId>,
    ) -> Self {
        self.connections.insert(
            connection.into(),
            ConnectionEnd {
                client_id: client.into(),
            },
        );
        self
    }

    /// Add a light client.
    pub fn with_client(
        mut self,
        client: impl Into<ClientId>,
        client_type: ClientType,
        chain: impl Into<ChainId>,
    ) -> Self {
        self.clients.insert(
            client.into(),
            LightClientState {
                client_type,
                chain_id: chain.into(),
            },
        );
        self
    }

    /// Wire a complete single-hop Tendermint path `channel -> connection -> client -> chain`.
    pub fn with_consumer_path(
        self,
        port: impl Into<PortId>,
        channel: impl Into<ChannelId>,
        connection: impl Into<ConnectionId>,
        client: impl Into<ClientId>,
        chain: impl Into<ChainId>,
    ) -> Self {
        let connection = connection.into();
        let client = client.into();
        self.with_channel(port, channel, vec![connection.clone()])
            .with_connection(connection, client.clone())
            .with_client(client, ClientType::Tendermint, chain)
    }
}

impl ConnectionLookup for MockConnectionLookup {
    fn channel(&self, port: &PortId, channel_id: &ChannelId) -> Option<ChannelEnd> {
        self.channels
            .get(&(port.clone(), channel_id.clone()))
            .cloned()
    }

    fn connection(&self, connection_id: &ConnectionId) -> Option<ConnectionEnd> {
        self.connections.get(connection_id).cloned()
    }

    fn client_state(&self, client_id: &ClientId) -> Option<LightClientState> {
        self.clients.get(client_id).cloned()
    }
}

/// Channel closer that records every request.
#[derive(Debug, Default)]
pub struct RecordingChannelCloser {
    requests: Mutex<Vec<(PortId, ChannelId)>>,
    reject: bool,
}

impl RecordingChannelCloser {
    /// Closer that accepts every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Closer that records and then rejects every request.
    pub fn rejecting() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<(PortId, ChannelId)> {
        self.requests.lock().clone()
    }

    /// Whether a close was requested for `channel_id`.
    pub fn was_closed(&self, channel_id: &ChannelId) -> bool {
        self.requests.lock().iter().any(|(_, c)| c == channel_id)
    }
}

impl ChannelCloser for RecordingChannelCloser {
    fn close_init(
        &self,
        port: &PortId,
        channel_id: &ChannelId,
        _capability: &CapabilityTicket,
    ) -> Result<(), ChannelCloseError> {
        self.requests.lock().push((port.clone(), channel_id.clone()));
        if self.reject {
            return Err(ChannelCloseError::Rejected {
                channel_id: channel_id.clone(),
                reason: "closer configured to reject".to_string(),
            });
        }
        Ok(())
    }
}

/// Capability provider that owns every channel, or none.
#[derive(Clone, Debug, Default)]
pub struct StaticCapabilityProvider {
    revoked: BTreeSet<ChannelId>,
    deny_all: bool,
}

impl StaticCapabilityProvider {
    /// Grants a capability for every channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants nothing.
    pub fn deny_all() -> Self {
        Self {
            revoked: BTreeSet::new(),
            deny_all: true,
        }
    }

    /// Withhold the capability for one channel.
    pub fn without(mut self, channel: impl Into<ChannelId>) -> Self {
        self.revoked.insert(channel.into());
        self
    }
}

impl CapabilityProvider for StaticCapabilityProvider {
    fn channel_capability(
        &self,
        _port: &PortId,
        channel_id: &ChannelId,
    ) -> Option<CapabilityTicket> {
        if self.deny_all || self.revoked.contains(channel_id) {
            return None;
        }
        // Stable per-channel index so tickets compare equal across calls.
        let index = channel_id
            .as_bytes()
            .iter()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(*b)));
        Some(CapabilityTicket::issue(index))
    }
}
