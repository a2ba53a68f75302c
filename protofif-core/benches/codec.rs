use chrono::{DateTime, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use protofif_core::normalize::normalize;
use protofif_core::sql::{parse_rfc3339, to_rfc3339};
use protofif_core::{BsonCodec, Duration, Timestamp, Value, Zone};

const DOCUMENT: &str = "\
service: api
replicas: 3
ports:
  80: http
  443: https
limits:
  1: {cpu: 0.5, memory: 256}
  2: {cpu: 1.0, memory: 512}
? [region, zone]
: eu-west-1a
";

fn sample_timestamp() -> Timestamp {
    let instant = DateTime::<Utc>::from_timestamp(1_705_312_800, 123_456_789).unwrap_or_default();
    Timestamp::from_instant(&instant, Zone::Named(chrono_tz::Europe::Berlin))
}

fn bench_normalize(c: &mut Criterion) {
    let tree: serde_yaml::Value = serde_yaml::from_str(DOCUMENT).unwrap();

    c.bench_function("normalize_document", |b| {
        b.iter(|| normalize(black_box(tree.clone())))
    });

    c.bench_function("value_from_yaml_str", |b| {
        b.iter(|| Value::from_yaml_str(black_box(DOCUMENT)))
    });
}

fn bench_timestamp(c: &mut Criterion) {
    let timestamp = sample_timestamp();
    let text = to_rfc3339(&timestamp);
    let bson = timestamp.to_bson();

    c.bench_function("timestamp_to_instant", |b| {
        b.iter(|| black_box(&timestamp).to_instant())
    });

    c.bench_function("timestamp_parse_rfc3339", |b| {
        b.iter(|| parse_rfc3339(black_box(&text)))
    });

    c.bench_function("timestamp_from_bson", |b| {
        b.iter(|| Timestamp::from_bson(black_box(&bson)))
    });

    c.bench_function("timestamp_add_duration", |b| {
        let duration = Duration::from_nanos(1_500_000_000);
        b.iter(|| black_box(&timestamp).add_duration(black_box(&duration)))
    });
}

criterion_group!(benches, bench_normalize, bench_timestamp);
criterion_main!(benches);
