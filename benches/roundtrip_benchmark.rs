//! Benchmarks for the clue round trip in each mitigation mode.

use asymmetric_xml::{
    deserialize, escape_text, serialize, unescape, Clue, ClueDefinition, Mitigations,
    XmlEvent, XmlReader, NOTHING_TO_SEE_HERE,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

fn definitions() -> Vec<(String, ClueDefinition)> {
    Mitigations::ALL
        .iter()
        .map(|m| (m.to_string(), ClueDefinition::from_mitigations(*m)))
        .collect()
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Serialization");

    let sentinel = Clue::with_text(NOTHING_TO_SEE_HERE);
    let other = Clue::with_text("The butler keeps the key in the clock");

    for (mode, def) in definitions() {
        group.bench_with_input(BenchmarkId::new("sentinel", &mode), &def, |b, def| {
            b.iter(|| serialize(black_box(&sentinel), def))
        });
        group.bench_with_input(BenchmarkId::new("other", &mode), &def, |b, def| {
            b.iter(|| serialize(black_box(&other), def))
        });
    }

    group.finish();
}

fn bench_deserialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Deserialization");

    for (mode, def) in definitions() {
        let xml = serialize(&Clue::with_text(NOTHING_TO_SEE_HERE), &def).unwrap();
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::new("sentinel", &mode), &xml, |b, xml| {
            b.iter(|| deserialize(black_box(xml), &def))
        });
    }

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("Roundtrip");

    let clue = Clue::with_text(NOTHING_TO_SEE_HERE);
    for (mode, def) in definitions() {
        group.bench_function(&mode, |b| {
            b.iter(|| {
                let xml = serialize(black_box(&clue), &def).unwrap();
                deserialize(black_box(&xml), &def).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_escape(c: &mut Criterion) {
    let mut group = c.benchmark_group("Escape");

    let plain = NOTHING_TO_SEE_HERE.repeat(16);
    let marked = "<clue> & \"hint\" ".repeat(16);
    let escaped = escape_text(&marked).into_owned();

    group.bench_function("escape_plain", |b| b.iter(|| escape_text(black_box(&plain))));
    group.bench_function("escape_marked", |b| b.iter(|| escape_text(black_box(&marked))));
    group.bench_function("unescape", |b| b.iter(|| unescape(black_box(&escaped))));

    group.finish();
}

fn bench_xml_reader(c: &mut Criterion) {
    let xml = "<Clue><text>Nothing To See Here</text></Clue>";

    c.bench_function("XmlReader/clue", |b| {
        b.iter(|| {
            let mut reader = XmlReader::from_str(black_box(xml));
            let mut count = 0;
            while !matches!(reader.next_event().unwrap(), XmlEvent::Eof) {
                count += 1;
            }
            count
        })
    });
}

criterion_group!(
    benches,
    bench_serialization,
    bench_deserialization,
    bench_roundtrip,
    bench_escape,
    bench_xml_reader,
);

criterion_main!(benches);
