//! # Domain Value Objects
//!
//! Identifiers and status values for the CCV provider.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Raw identifier bytes, as used in store keys.
            pub fn as_bytes(&self) -> &[u8] {
                self.0.as_bytes()
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Consumer chain identifier (immutable key of a consumer).
    ChainId
);

string_id!(
    /// Channel identifier on the provider side.
    ChannelId
);

string_id!(
    /// Connection identifier.
    ConnectionId
);

string_id!(
    /// Light client identifier.
    ClientId
);

string_id!(
    /// Port identifier owned by the provider module.
    PortId
);

/// Default port the provider binds.
pub const PROVIDER_PORT_ID: &str = "provider";

/// Lifecycle status of a CCV channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChannelStatus {
    /// No record for the channel.
    #[default]
    Uninitialized = 0,
    /// Handshake in progress.
    Initializing = 1,
    /// Bound to a consumer chain and carrying validator-set updates.
    Validating = 2,
    /// Lost a registration race or was otherwise retired.
    Invalid = 3,
}

impl ChannelStatus {
    /// Single-byte store encoding.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Decode the single-byte store encoding.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Uninitialized),
            1 => Some(Self::Initializing),
            2 => Some(Self::Validating),
            3 => Some(Self::Invalid),
            _ => None,
        }
    }

    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: ChannelStatus) -> bool {
        match (self, next) {
            (Self::Uninitialized, Self::Initializing) => true,
            (Self::Uninitialized, Self::Validating) => true,
            (Self::Initializing, Self::Validating) => true,
            (_, Self::Invalid) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Initializing => "INITIALIZING",
            Self::Validating => "VALIDATING",
            Self::Invalid => "INVALID",
        };
        f.write_str(name)
    }
}

/// Light client implementation backing a connection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientType {
    /// Tendermint light client, the only type CCV channels may be built on.
    Tendermint,
    /// Anything else, carried by name.
    Other(String),
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tendermint => f.write_str("07-tendermint"),
            Self::Other(name) => f.write_str(name),
        }
    }
}
