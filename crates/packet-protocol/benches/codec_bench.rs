//! Criterion benchmarks for the packet codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package packet-protocol --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use packet_protocol::{decode, encode, PacketDecoder, PayloadWidth, Record};

const WIDTHS: [PayloadWidth; 3] = [PayloadWidth::One, PayloadWidth::Two, PayloadWidth::Four];

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for width in WIDTHS {
        let record = Record::new(0xDEAD_BEEF, 0x7A, width);
        group.bench_with_input(BenchmarkId::from_parameter(width.bytes()), &record, |b, r| {
            b.iter(|| encode(black_box(r), width))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for width in WIDTHS {
        let packet = encode(&Record::new(0xDEAD_BEEF, 0x7A, width), width);
        group.bench_with_input(BenchmarkId::from_parameter(width.bytes()), &packet, |b, p| {
            b.iter(|| decode(black_box(p.as_bytes()), width))
        });
    }
    group.finish();
}

fn bench_stream_decoder(c: &mut Criterion) {
    let width = PayloadWidth::Four;
    let stream: Vec<u8> = (0..1024u32)
        .flat_map(|i| encode(&Record::new(i, i as u8, width), width).as_bytes().to_vec())
        .collect();

    c.bench_function("stream_decoder_4k_reads", |b| {
        b.iter(|| {
            let mut decoder = PacketDecoder::new(width);
            let mut total = 0;
            for chunk in stream.chunks(4096) {
                total += decoder.feed(black_box(chunk)).len();
            }
            total
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_stream_decoder);
criterion_main!(benches);
