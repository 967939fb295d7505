//! # Integration Test Flows
//!
//! End-to-end provider scenarios across the channel registry, versioning,
//! unbonding coordinator, slash ack ledger and staking bridge.
//!
//! ## Flows Tested:
//!
//! 1. **Handshake**: consumer binds its channel; a racing duplicate is closed
//! 2. **Unbonding**: an entry created at version v waits for every consumer
//! 3. **Acknowledgement**: ack packets release entries and queue slash acks
//! 4. **Rollback**: failed transitions leave committed state untouched

use super::fixtures::{Consumer, Harness};
use qc_15_ccv_provider::{
    ChainId, ChannelId, ChannelRegistry, ChannelStatus, ErrorClass, MaturityAcknowledgement,
    ProviderApi, ProviderError, UnbondingCoordinator, ValidatorSetVersioning,
};

// =============================================================================
// TEST FIXTURES
// =============================================================================

fn foo_and_bar() -> Harness {
    Harness::new(
        7,
        &[
            Consumer {
                chain: "foo",
                channels: &["ch-1", "ch-2"],
            },
            Consumer {
                chain: "bar",
                channels: &["ch-3"],
            },
        ],
    )
}

fn ack(h: &mut Harness, channel: &str, version: u64, slash_acks: &[&str]) -> Vec<u64> {
    let channel = ChannelId::from(channel);
    let ack = MaturityAcknowledgement {
        valset_update_id: version,
        slash_acks: slash_acks.iter().map(|s| s.to_string()).collect(),
    };
    let service = &h.service;
    service
        .execute(&mut h.store, |tx| service.on_ack_packet(tx, &channel, &ack))
        .unwrap()
}

// =============================================================================
// HANDSHAKE
// =============================================================================

#[test]
fn test_consumer_binds_single_channel() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();

    let foo = ChainId::from("foo");
    let view = ChannelRegistry::consumer_chain(&h.store, &foo)
        .unwrap()
        .unwrap();
    assert_eq!(view.channel_id, Some(ChannelId::from("ch-1")));
    assert_eq!(view.status, ChannelStatus::Validating);
    assert_eq!(view.init_height, 100);
    assert_eq!(view.genesis, Some(b"foo-genesis".to_vec()));
}

#[test]
fn test_duplicate_handshake_rejected_at_try() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();
    let before = h.store.clone();

    let err = h.open("ch-2", "foo", 101).unwrap_err();
    assert_eq!(err.class(), ErrorClass::DuplicateRegistration);
    // Rejected at the try stage: no close was needed.
    assert!(h.closer.requests().is_empty());
    assert_eq!(h.store, before);
}

#[test]
fn test_racing_confirm_closes_loser() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();

    let err = h.confirm("ch-2", 101).unwrap_err();
    assert!(matches!(err, ProviderError::DuplicateRegistration { .. }));
    assert!(h.closer.was_closed(&ChannelId::from("ch-2")));
    assert_eq!(
        ChannelRegistry::chain_to_channel(&h.store, &ChainId::from("foo")).unwrap(),
        Some(ChannelId::from("ch-1"))
    );
}

#[test]
fn test_wrong_chain_claim_rejected() {
    let mut h = foo_and_bar();
    // ch-3 is built on bar's client.
    let err = h.open("ch-3", "foo", 100).unwrap_err();
    assert_eq!(err.class(), ErrorClass::IdentityMismatch);
    assert!(ChannelRegistry::consumer_chain_ids(&h.store)
        .unwrap()
        .is_empty());
}

// =============================================================================
// UNBONDING AND ACKNOWLEDGEMENT
// =============================================================================

#[test]
fn test_unbonding_waits_for_every_consumer() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();
    h.open("ch-3", "bar", 100).unwrap();

    h.unbond(42).unwrap();
    assert_eq!(
        UnbondingCoordinator::bucket(&h.store, &ChainId::from("foo"), 7).unwrap(),
        vec![42]
    );
    assert_eq!(
        UnbondingCoordinator::bucket(&h.store, &ChainId::from("bar"), 7).unwrap(),
        vec![42]
    );
    assert!(!h.may_complete(42).unwrap());

    assert!(ack(&mut h, "ch-1", 7, &[]).is_empty());
    assert!(!h.may_complete(42).unwrap());

    assert_eq!(ack(&mut h, "ch-3", 7, &[]), vec![42]);
    assert!(h.may_complete(42).unwrap());
    assert!(UnbondingCoordinator::entry(&h.store, 42).unwrap().is_none());
}

#[test]
fn test_entries_follow_version_at_creation() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();

    h.unbond(1).unwrap();
    let service = &h.service;
    service
        .execute(&mut h.store, |tx| service.end_block(tx, 101))
        .unwrap();
    h.unbond(2).unwrap();

    assert_eq!(ValidatorSetVersioning::get(&h.store).unwrap(), 8);
    assert_eq!(ValidatorSetVersioning::lookup_height(&h.store, 7).unwrap(), 101);

    // Acking version 8 releases only the entry created under it.
    assert_eq!(ack(&mut h, "ch-1", 8, &[]), vec![2]);
    assert!(!h.may_complete(1).unwrap());
    assert_eq!(ack(&mut h, "ch-1", 7, &[]), vec![1]);
    assert!(h.may_complete(1).unwrap());
}

#[test]
fn test_unbonding_without_consumers_is_immediate() {
    let mut h = foo_and_bar();
    h.unbond(5).unwrap();
    assert!(h.may_complete(5).unwrap());
}

#[test]
fn test_consumer_bound_later_does_not_gate_earlier_entry() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();
    h.unbond(9).unwrap();
    h.open("ch-3", "bar", 101).unwrap();

    assert_eq!(ack(&mut h, "ch-1", 7, &[]), vec![9]);
    assert!(h.may_complete(9).unwrap());
}

#[test]
fn test_slash_acks_swept_per_chain() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();
    h.open("ch-3", "bar", 100).unwrap();

    ack(&mut h, "ch-1", 7, &["A"]);
    ack(&mut h, "ch-1", 8, &["B"]);
    ack(&mut h, "ch-3", 7, &["X"]);

    let service = &h.service;
    let batches = service
        .execute(&mut h.store, |tx| service.sweep_slash_acks(tx))
        .unwrap();
    assert_eq!(
        batches,
        vec![
            (ChainId::from("bar"), vec!["X".to_string()]),
            (ChainId::from("foo"), vec!["A".to_string(), "B".to_string()]),
        ]
    );
}

// =============================================================================
// ROLLBACK
// =============================================================================

#[test]
fn test_failed_ack_leaves_state_untouched() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();
    h.unbond(42).unwrap();
    let before = h.store.clone();

    let service = &h.service;
    let err = service
        .execute(&mut h.store, |tx| {
            service.on_ack_packet(
                tx,
                &ChannelId::from("ch-unknown"),
                &MaturityAcknowledgement::default(),
            )
        })
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::NotFound);
    assert_eq!(h.store, before);
}

#[test]
fn test_duplicate_entry_rolls_back() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();
    h.unbond(42).unwrap();
    let before = h.store.clone();

    let err = h.unbond(42).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Conflict);
    assert_eq!(h.store, before);
}

#[test]
fn test_export_genesis_after_activity() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();
    let service = &h.service;
    service
        .execute(&mut h.store, |tx| service.end_block(tx, 101))
        .unwrap();

    let exported = h.service.export_genesis(&h.store).unwrap();
    assert_eq!(exported.valset_update_id, 8);
    assert_eq!(exported.consumers.len(), 2);
}

#[test]
fn test_metrics_exported_after_bind() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();
    let text = ccv_telemetry::encode_metrics().unwrap();
    assert!(text.contains("ccv_provider_channels_bound_total"));
}

#[test]
fn test_duplicate_counter_tracks_rejections_not_status() {
    let mut h = foo_and_bar();
    h.open("ch-1", "foo", 100).unwrap();
    h.confirm("ch-2", 101).unwrap_err();

    let text = ccv_telemetry::encode_metrics().unwrap();
    assert!(text.contains("ccv_provider_duplicate_channels_rejected_total"));
    assert!(!text.contains("ccv_provider_channels_invalidated_total"));
    // The INVALID mark went out with the failed transition.
    assert_eq!(
        ChannelRegistry::channel_status(&h.store, &ChannelId::from("ch-2")).unwrap(),
        ChannelStatus::Uninitialized
    );
}
