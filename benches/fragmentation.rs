//! Criterion benchmarks for fragmentation and reassembly throughput.
//!
//! This benchmark suite covers:
//! - splitting payloads into encoded fragments, and
//! - a full send, poll and receive cycle over the in-memory medium.

use std::num::NonZeroUsize;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rf24_transport::{
    DEFAULT_MAX_MESSAGE_SIZE,
    Fragmenter,
    ManualClock,
    Transport,
    TransportConfig,
    network::{MemoryMedium, NodeAddress},
};

const PAYLOAD_SIZES: [usize; 4] = [19, 73, 1_024, 16_384];

fn payload(len: usize) -> Vec<u8> { (0..len).map(|i| i.to_le_bytes()[0]).collect() }

fn benchmark_fragment(c: &mut Criterion) {
    let mut group = c.benchmark_group("fragment/encode");
    let fragmenter = Fragmenter::new(DEFAULT_MAX_MESSAGE_SIZE);

    for len in PAYLOAD_SIZES {
        let bytes = payload(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &bytes, |b, bytes| {
            b.iter(|| {
                let batch = match fragmenter.fragment(black_box(bytes)) {
                    Ok(batch) => batch,
                    Err(err) => panic!("fragmentation failed: {err}"),
                };
                for fragment in &batch {
                    black_box(fragment.encode());
                }
            });
        });
    }
    group.finish();
}

fn benchmark_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("transport/round_trip");
    let base = NodeAddress::new(0o0);
    let leaf = NodeAddress::new(0o1);

    for len in PAYLOAD_SIZES {
        let bytes = payload(len);
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();
        let config = TransportConfig::default()
            .with_pool_capacity(NonZeroUsize::MIN);
        let mut sender = Transport::with_clock(medium.attach(leaf), clock.clone(), config);
        let mut receiver = Transport::with_clock(medium.attach(base), clock, config);

        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &bytes, |b, bytes| {
            b.iter(|| {
                if let Err(err) = sender.send(base, bytes) {
                    panic!("send failed: {err}");
                }
                receiver.poll();
                black_box(receiver.receive(usize::MAX));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_fragment, benchmark_round_trip);
criterion_main!(benches);
