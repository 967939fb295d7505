//! # Provider Metrics
//!
//! Prometheus metrics for the CCV provider core.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-15-ccv-provider = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `ccv_provider_channels_bound_total` - Channels bound to a consumer chain
//! - `ccv_provider_duplicate_channels_rejected_total` - Duplicate channels rejected at confirm
//! - `ccv_provider_valset_update_id` - Current validator-set version
//! - `ccv_provider_unbonding_entries_created_total` - Unbonding entry gating writes issued
//! - `ccv_provider_unbonding_entries_completed_total` - Entries released by acks
//! - `ccv_provider_slash_acks_total` - Slash acks queued, by chain
//! - `ccv_provider_rejections_total` - Failed transitions, by error class
//!
//! Counters record operations as they execute. Writes of a transition the
//! host later discards are still counted; only `rejections_total` reflects
//! transition outcomes.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Channels bound to a consumer chain
    pub static ref CHANNELS_BOUND: IntCounter = register_int_counter!(
        "ccv_provider_channels_bound_total",
        "Total number of channels bound to a consumer chain"
    )
    .expect("Failed to create CHANNELS_BOUND metric");

    /// Duplicate channels rejected at confirm
    pub static ref DUPLICATES_REJECTED: IntCounter = register_int_counter!(
        "ccv_provider_duplicate_channels_rejected_total",
        "Total number of duplicate channels rejected at confirm"
    )
    .expect("Failed to create DUPLICATES_REJECTED metric");

    /// Current validator-set version
    pub static ref VALSET_UPDATE_ID: IntGauge = register_int_gauge!(
        "ccv_provider_valset_update_id",
        "Current validator-set version"
    )
    .expect("Failed to create VALSET_UPDATE_ID metric");

    /// Unbonding entry gating writes issued
    pub static ref ENTRIES_CREATED: IntCounter = register_int_counter!(
        "ccv_provider_unbonding_entries_created_total",
        "Total number of unbonding entry gating writes issued"
    )
    .expect("Failed to create ENTRIES_CREATED metric");

    /// Unbonding entries fully acknowledged
    pub static ref ENTRIES_COMPLETED: IntCounter = register_int_counter!(
        "ccv_provider_unbonding_entries_completed_total",
        "Total number of unbonding entries released by consumer acknowledgements"
    )
    .expect("Failed to create ENTRIES_COMPLETED metric");

    /// Slash acks queued, labeled by chain
    pub static ref SLASH_ACKS: IntCounterVec = register_int_counter_vec!(
        "ccv_provider_slash_acks_total",
        "Total number of slash acknowledgements queued",
        &["chain"]
    )
    .expect("Failed to create SLASH_ACKS metric");

    /// Rejected transitions, labeled by error class
    pub static ref REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "ccv_provider_rejections_total",
        "Total number of rejected provider transitions",
        &["class"]
    )
    .expect("Failed to create REJECTIONS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a channel bound to a consumer chain
#[cfg(feature = "metrics")]
pub fn record_channel_bound() {
    CHANNELS_BOUND.inc();
}

/// Record a duplicate channel rejected at confirm
#[cfg(feature = "metrics")]
pub fn record_duplicate_rejected() {
    DUPLICATES_REJECTED.inc();
}

/// Update the validator-set version gauge
#[cfg(feature = "metrics")]
pub fn set_valset_update_id(id: u64) {
    VALSET_UPDATE_ID.set(i64::try_from(id).unwrap_or(i64::MAX));
}

/// Record an unbonding entry gating write
#[cfg(feature = "metrics")]
pub fn record_entry_created() {
    ENTRIES_CREATED.inc();
}

/// Record unbonding entries released
#[cfg(feature = "metrics")]
pub fn record_entries_completed(count: u64) {
    ENTRIES_COMPLETED.inc_by(count);
}

/// Record a queued slash ack
#[cfg(feature = "metrics")]
pub fn record_slash_ack(chain: &str) {
    SLASH_ACKS.with_label_values(&[chain]).inc();
}

/// Record a rejected transition
#[cfg(feature = "metrics")]
pub fn record_rejection(class: &str) {
    REJECTIONS.with_label_values(&[class]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

/// Record a channel bound to a consumer chain
#[cfg(not(feature = "metrics"))]
pub fn record_channel_bound() {}

/// Record a duplicate channel rejected at confirm
#[cfg(not(feature = "metrics"))]
pub fn record_duplicate_rejected() {}

/// Update the validator-set version gauge
#[cfg(not(feature = "metrics"))]
pub fn set_valset_update_id(_id: u64) {}

/// Record an unbonding entry gating write
#[cfg(not(feature = "metrics"))]
pub fn record_entry_created() {}

/// Record unbonding entries released
#[cfg(not(feature = "metrics"))]
pub fn record_entries_completed(_count: u64) {}

/// Record a queued slash ack
#[cfg(not(feature = "metrics"))]
pub fn record_slash_ack(_chain: &str) {}

/// Record a rejected transition
#[cfg(not(feature = "metrics"))]
pub fn record_rejection(_class: &str) {}
