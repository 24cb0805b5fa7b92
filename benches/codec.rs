#![allow(clippy::unwrap_used)]
//! Benchmarks for layer string decoding, encoding and aggregation

#![allow(missing_docs)]

use compat_manager::codec::{self, CompatFlags};
use compat_manager::platform::OsVersion;
use compat_manager::settings::{SettingsRecord, SharedSettings, aggregate, shared};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const OS: OsVersion = OsVersion::Windows10;
const LINE: &str = "~ WINXPSP3 BITCOLOR GDIDPISCALING DPIUNAWARE 640X480 RUNASADMIN CUSTOMSHIM";

fn bench_decode(c: &mut Criterion) {
    c.bench_function("decode_full_line", |b| {
        b.iter(|| black_box(codec::decode(black_box(LINE), OS)));
    });
}

fn bench_encode(c: &mut Criterion) {
    let flags: CompatFlags = codec::decode(LINE, OS);

    c.bench_function("encode_full_line", |b| {
        b.iter(|| black_box(codec::encode(black_box(&flags), OS)));
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let members: Vec<SharedSettings> = (0..500)
        .map(|i| {
            let line = if i % 2 == 0 { LINE } else { "~ WINXPSP3 RUNASADMIN" };
            shared(SettingsRecord::from_registry_string(Some(line), OS))
        })
        .collect();

    c.bench_function("aggregate_500_records", |b| {
        b.iter(|| black_box(aggregate(black_box(&members))));
    });
}

criterion_group!(benches, bench_decode, bench_encode, bench_aggregate);
criterion_main!(benches);
