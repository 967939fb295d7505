//! # Store Keys
//!
//! Byte layout of every record the provider persists.
//!
//! Keys are `prefix/...` so prefix scans iterate one record family in
//! lexicographic order. Numeric components are 8-byte big-endian so byte
//! order equals numeric order.

use super::errors::{UnbondingEntryId, ValsetUpdateId};
use super::value_objects::{ChainId, ChannelId};

/// Port binding.
pub const PORT_KEY: &[u8] = b"port";
/// Validator-set version counter.
pub const VALSET_UPDATE_ID_KEY: &[u8] = b"valsetupdateid";

/// chain -> channel.
pub const CHAIN_TO_CHANNEL_PREFIX: &[u8] = b"chaintochannel/";
/// channel -> chain.
pub const CHANNEL_TO_CHAIN_PREFIX: &[u8] = b"channeltochain/";
/// chain -> registered light client.
pub const CHAIN_TO_CLIENT_PREFIX: &[u8] = b"chaintoclient/";
/// chain -> opaque consumer genesis.
pub const CONSUMER_GENESIS_PREFIX: &[u8] = b"consumergenesis/";
/// chain -> provider height at bind time.
pub const INIT_CHAIN_HEIGHT_PREFIX: &[u8] = b"initchainheight/";
/// channel -> status byte.
pub const CHANNEL_STATUS_PREFIX: &[u8] = b"channelstatus/";
/// entry id -> unbonding entry.
pub const UNBONDING_ENTRY_PREFIX: &[u8] = b"unbondingentry/";
/// (chain, version) -> entry ids.
pub const UNBONDING_INDEX_PREFIX: &[u8] = b"unbondingindex/";
/// version -> block height.
pub const VALSET_UPDATE_BLOCK_HEIGHT_PREFIX: &[u8] = b"valsetupdateblockheight/";
/// chain -> pending slash acks.
pub const SLASH_ACKS_PREFIX: &[u8] = b"slashacks/";

fn prefixed(prefix: &[u8], suffix: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + suffix.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(suffix);
    key
}

/// `chaintochannel/{chain}`.
pub fn chain_to_channel_key(chain_id: &ChainId) -> Vec<u8> {
    prefixed(CHAIN_TO_CHANNEL_PREFIX, chain_id.as_bytes())
}

/// `channeltochain/{channel}`.
pub fn channel_to_chain_key(channel_id: &ChannelId) -> Vec<u8> {
    prefixed(CHANNEL_TO_CHAIN_PREFIX, channel_id.as_bytes())
}

/// `chaintoclient/{chain}`.
pub fn chain_to_client_key(chain_id: &ChainId) -> Vec<u8> {
    prefixed(CHAIN_TO_CLIENT_PREFIX, chain_id.as_bytes())
}

/// `consumergenesis/{chain}`.
pub fn consumer_genesis_key(chain_id: &ChainId) -> Vec<u8> {
    prefixed(CONSUMER_GENESIS_PREFIX, chain_id.as_bytes())
}

/// `initchainheight/{chain}`.
pub fn init_chain_height_key(chain_id: &ChainId) -> Vec<u8> {
    prefixed(INIT_CHAIN_HEIGHT_PREFIX, chain_id.as_bytes())
}

/// `channelstatus/{channel}`.
pub fn channel_status_key(channel_id: &ChannelId) -> Vec<u8> {
    prefixed(CHANNEL_STATUS_PREFIX, channel_id.as_bytes())
}

/// `unbondingentry/{id:BE8}`.
pub fn unbonding_entry_key(id: UnbondingEntryId) -> Vec<u8> {
    prefixed(UNBONDING_ENTRY_PREFIX, &id.to_be_bytes())
}

/// `unbondingindex/{chain}/{version:BE8}`.
///
/// The version is fixed-width at the end of the key, so the chain id is
/// recovered by stripping the prefix and the trailing 9 bytes.
pub fn unbonding_index_key(chain_id: &ChainId, version: ValsetUpdateId) -> Vec<u8> {
    let mut key = prefixed(UNBONDING_INDEX_PREFIX, chain_id.as_bytes());
    key.push(b'/');
    key.extend_from_slice(&version.to_be_bytes());
    key
}

/// `valsetupdateblockheight/{version:BE8}`.
pub fn valset_update_block_height_key(version: ValsetUpdateId) -> Vec<u8> {
    prefixed(VALSET_UPDATE_BLOCK_HEIGHT_PREFIX, &version.to_be_bytes())
}

/// `slashacks/{chain}`.
pub fn slash_acks_key(chain_id: &ChainId) -> Vec<u8> {
    prefixed(SLASH_ACKS_PREFIX, chain_id.as_bytes())
}

/// Strip `prefix` from `key` and read the remainder as a utf-8 identifier.
pub fn suffix_str<'a>(key: &'a [u8], prefix: &[u8]) -> Option<&'a str> {
    key.strip_prefix(prefix)
        .and_then(|rest| std::str::from_utf8(rest).ok())
}

/// Split an unbonding index key back into (chain, version).
pub fn parse_unbonding_index_key(key: &[u8]) -> Option<(ChainId, ValsetUpdateId)> {
    let rest = key.strip_prefix(UNBONDING_INDEX_PREFIX)?;
    if rest.len() < 9 {
        return None;
    }
    let (chain, tail) = rest.split_at(rest.len() - 9);
    if tail[0] != b'/' {
        return None;
    }
    let version = u64::from_be_bytes(tail[1..].try_into().ok()?);
    let chain = std::str::from_utf8(chain).ok()?;
    Some((ChainId::from(chain), version))
}

/// Encode a u64 record value.
pub fn encode_u64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decode a u64 record value.
pub fn decode_u64(bytes: &[u8]) -> Option<u64> {
    bytes.try_into().ok().map(u64::from_be_bytes)
}
