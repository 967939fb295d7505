//! Typed reads and writes over the raw store.

use crate::adapters::RecordCodec;
use crate::domain::keys::{decode_u64, encode_u64};
use crate::domain::{ProviderError, ProviderResult};
use crate::ports::outbound::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn read_u64<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &[u8],
    what: &str,
) -> ProviderResult<Option<u64>> {
    match store.get(key)? {
        None => Ok(None),
        Some(bytes) => decode_u64(&bytes).map(Some).ok_or_else(|| {
            ProviderError::invariant(format!("malformed {what}: {} bytes", bytes.len()))
        }),
    }
}

pub(crate) fn write_u64<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &[u8],
    value: u64,
) -> ProviderResult<()> {
    store.put(key, &encode_u64(value))?;
    Ok(())
}

pub(crate) fn read_string<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &[u8],
    what: &str,
) -> ProviderResult<Option<String>> {
    match store.get(key)? {
        None => Ok(None),
        Some(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| ProviderError::invariant(format!("non utf-8 {what}"))),
    }
}

pub(crate) fn read_record<S, T>(store: &S, key: &[u8], what: &str) -> ProviderResult<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key)? {
        None => Ok(None),
        Some(bytes) => RecordCodec::decode(what, &bytes).map(Some),
    }
}

pub(crate) fn write_record<S, T>(store: &mut S, key: &[u8], value: &T) -> ProviderResult<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let bytes = RecordCodec::encode(value)?;
    store.put(key, &bytes)?;
    Ok(())
}
