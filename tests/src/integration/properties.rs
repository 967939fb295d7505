//! Randomized ordering properties.

use super::fixtures::{Consumer, Harness};
use proptest::prelude::*;
use qc_15_ccv_provider::{
    ChainId, ChannelId, ChannelRegistry, ChannelStatus, MaturityAcknowledgement, ProviderApi,
    UnbondingCoordinator,
};

const CHAINS: [&str; 3] = ["a", "b", "c"];

fn three_consumers() -> Harness {
    let mut h = Harness::new(
        3,
        &[
            Consumer {
                chain: "a",
                channels: &["ch-a"],
            },
            Consumer {
                chain: "b",
                channels: &["ch-b"],
            },
            Consumer {
                chain: "c",
                channels: &["ch-c"],
            },
        ],
    );
    for chain in CHAINS {
        h.open(&format!("ch-{chain}"), chain, 1).unwrap();
    }
    h
}

fn deliver(h: &mut Harness, chain: &str, version: u64) -> Vec<u64> {
    let channel = ChannelId::from(format!("ch-{chain}"));
    let ack = MaturityAcknowledgement {
        valset_update_id: version,
        slash_acks: Vec::new(),
    };
    let service = &h.service;
    service
        .execute(&mut h.store, |tx| service.on_ack_packet(tx, &channel, &ack))
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Any delivery order, with arbitrary duplicate deliveries, releases each
    // entry exactly once: after its last outstanding consumer acknowledged.
    #[test]
    fn prop_acks_release_each_entry_once(
        deliveries in proptest::collection::vec((0usize..3, 0usize..2), 0..24),
        entries in 1u64..5,
    ) {
        let mut h = three_consumers();
        for id in 0..entries {
            h.unbond(id).unwrap();
        }

        let mut acked = [false; 3];
        let mut released = Vec::new();
        // Version 3 for every entry; index 1 in the tuple picks a stale
        // version that must never release anything.
        for (chain, stale) in deliveries {
            let version = if stale == 1 { 2 } else { 3 };
            let done = deliver(&mut h, CHAINS[chain], version);
            if version == 3 {
                acked[chain] = true;
            } else {
                prop_assert!(done.is_empty());
            }
            released.extend(done);
            let all = acked.iter().all(|a| *a);
            for id in 0..entries {
                prop_assert_eq!(h.may_complete(id).unwrap(), all);
            }
        }

        let mut sorted = released.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), released.len());
        if acked.iter().all(|a| *a) {
            prop_assert_eq!(released.len() as u64, entries);
            for chain in CHAINS {
                prop_assert!(UnbondingCoordinator::bucket(&h.store, &ChainId::from(chain), 3)
                    .unwrap()
                    .is_empty());
            }
        }
    }

    // Racing confirms for one chain leave exactly the first channel VALIDATING.
    #[test]
    fn prop_one_validating_channel_per_chain(
        order in Just(vec!["ch-1", "ch-2", "ch-3", "ch-4"]).prop_shuffle(),
    ) {
        let mut h = Harness::new(
            0,
            &[Consumer {
                chain: "foo",
                channels: &["ch-1", "ch-2", "ch-3", "ch-4"],
            }],
        );
        for channel in &order {
            let _ = h.confirm(channel, 1);
        }

        let validating: Vec<_> = order
            .iter()
            .filter(|c| {
                ChannelRegistry::channel_status(&h.store, &ChannelId::from(**c)).unwrap()
                    == ChannelStatus::Validating
            })
            .collect();
        prop_assert_eq!(validating, vec![&order[0]]);
        prop_assert_eq!(h.closer.requests().len(), order.len() - 1);
    }
}
