//! # CCV Provider Benchmarks
//!
//! | Operation | Shape | Expected cost |
//! |-----------|-------|---------------|
//! | Unbonding entry creation | N bound consumers | O(N) bucket appends |
//! | Acknowledgement | bucket of M entries | O(M) entry rewrites |
//! | Slash ack sweep | K chains pending | O(K) drains |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qc_15_ccv_provider::{
    ChainId, ChannelId, ConsumerRegistration, InMemoryKVStore, MockConnectionLookup, ProviderApi,
    ProviderConfig, ProviderGenesis, ProviderService, RecordingChannelCloser, SlashAckLedger,
    StaticCapabilityProvider, UnbondingCoordinator,
};
use std::sync::Arc;

/// Provider with `consumers` chains bound at version 1.
fn provider(consumers: usize) -> (ProviderService, InMemoryKVStore) {
    let mut lookup = MockConnectionLookup::new();
    let mut registrations = Vec::with_capacity(consumers);
    for i in 0..consumers {
        lookup = lookup.with_consumer_path(
            "provider",
            format!("ch-{i}"),
            format!("conn-{i}"),
            format!("client-{i}"),
            format!("chain-{i}"),
        );
        registrations.push(ConsumerRegistration {
            chain_id: format!("chain-{i}").into(),
            client_id: format!("client-{i}").into(),
            genesis: Vec::new(),
        });
    }

    let service = ProviderService::new(
        ProviderConfig::default(),
        Arc::new(lookup),
        Arc::new(RecordingChannelCloser::new()),
        Arc::new(StaticCapabilityProvider::new()),
    );
    let mut store = InMemoryKVStore::new();
    let genesis = ProviderGenesis {
        valset_update_id: 1,
        consumers: registrations,
        ..ProviderGenesis::default()
    };
    service.init_genesis(&mut store, &genesis).unwrap();
    for i in 0..consumers {
        service
            .on_chan_open_confirm(&mut store, 1, &ChannelId::from(format!("ch-{i}")))
            .unwrap();
    }
    (service, store)
}

fn bench_unbonding_created(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-15-unbonding-created");

    for consumers in [1usize, 10, 50] {
        let (_, base) = provider(consumers);
        group.throughput(Throughput::Elements(consumers as u64));
        group.bench_with_input(
            BenchmarkId::new("consumers", consumers),
            &consumers,
            |b, _| {
                b.iter_batched(
                    || base.clone(),
                    |mut store| {
                        UnbondingCoordinator::on_unbonding_created(&mut store, black_box(42))
                            .unwrap();
                        store
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_acknowledgement(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-15-acknowledgement");

    for entries in [10u64, 100, 1_000] {
        let (service, mut base) = provider(3);
        for id in 0..entries {
            UnbondingCoordinator::on_unbonding_created(&mut base, id).unwrap();
        }
        let ack = qc_15_ccv_provider::MaturityAcknowledgement {
            valset_update_id: 1,
            slash_acks: Vec::new(),
        };
        let channel = ChannelId::from("ch-0");

        group.throughput(Throughput::Elements(entries));
        group.bench_with_input(BenchmarkId::new("bucket", entries), &entries, |b, _| {
            b.iter_batched(
                || base.clone(),
                |mut store| {
                    service
                        .execute(&mut store, |tx| service.on_ack_packet(tx, &channel, &ack))
                        .unwrap();
                    store
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_slash_ack_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-15-slash-ack-sweep");

    for chains in [1usize, 10, 100] {
        let (service, mut base) = provider(0);
        for i in 0..chains {
            for token in 0..4 {
                let chain = ChainId::from(format!("chain-{i}"));
                SlashAckLedger::append(&mut base, &chain, format!("ack-{token}")).unwrap();
            }
        }

        group.throughput(Throughput::Elements(chains as u64));
        group.bench_with_input(BenchmarkId::new("chains", chains), &chains, |b, _| {
            b.iter_batched(
                || base.clone(),
                |mut store| black_box(service.sweep_slash_acks(&mut store).unwrap()),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_unbonding_created,
    bench_acknowledgement,
    bench_slash_ack_sweep
);
criterion_main!(benches);
