//! Record codec for persisted provider state.

use crate::domain::ProviderError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Bincode codec for typed store records.
///
/// A record that fails to decode means the store no longer matches what this
/// module wrote, so failures surface as `InvariantViolation`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordCodec;

impl RecordCodec {
    /// Encode a record.
    pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProviderError> {
        bincode::serialize(value)
            .map_err(|e| ProviderError::invariant(format!("record encode failed: {e}")))
    }

    /// Decode a record; `what` names the record family for the error.
    pub fn decode<T: DeserializeOwned>(what: &str, bytes: &[u8]) -> Result<T, ProviderError> {
        bincode::deserialize(bytes)
            .map_err(|e| ProviderError::invariant(format!("undecodable {what} record: {e}")))
    }
}
