//! Criterion benchmarks for the key table and XML builders.
//!
//! These sit on the key-press hot path (one document per button press), so
//! they should stay in the sub-microsecond class.
//!
//! Run with:
//! ```bash
//! cargo bench --package netcast-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netcast_core::keymap::{key_code, RemoteKey};
use netcast_core::protocol::{build_key_command, build_pairing_request};

fn bench_key_code_lookup(c: &mut Criterion) {
    c.bench_function("key_code_all_variants", |b| {
        b.iter(|| {
            for key in RemoteKey::ALL {
                black_box(key_code(black_box(key)));
            }
        })
    });
}

fn bench_build_key_command(c: &mut Criterion) {
    c.bench_function("build_key_command_ok", |b| {
        b.iter(|| black_box(build_key_command(black_box(RemoteKey::Ok))))
    });
}

fn bench_build_pairing_request(c: &mut Criterion) {
    c.bench_function("build_pairing_request_with_pin", |b| {
        b.iter(|| black_box(build_pairing_request(black_box(Some("5417")))))
    });
    c.bench_function("build_pairing_request_without_pin", |b| {
        b.iter(|| black_box(build_pairing_request(black_box(None))))
    });
}

criterion_group!(
    benches,
    bench_key_code_lookup,
    bench_build_key_command,
    bench_build_pairing_request
);
criterion_main!(benches);
