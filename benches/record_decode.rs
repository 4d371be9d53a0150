use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use ibdecode::page::index::IndexPage;
use ibdecode::page::Page;
use ibdecode::record::CompactDecoder;
use ibdecode::types::value::Value;
use ibdecode::utils::mock::{encode_row, users_table, IndexPageBuilder};

const ROW_COUNTS: &[usize] = &[10, 100, 200];

fn build_page(rows: usize) -> Vec<u8> {
    let table = users_table();
    let mut builder = IndexPageBuilder::new(1);
    for i in 0..rows {
        builder = builder.row(encode_row(
            &table,
            &[
                Value::Int(i as i64 + 1),
                Value::Text(format!("user_{i:05}")),
                Value::Text(format!("user_{i:05}@example.com")),
                Value::Timestamp {
                    epoch: 1_640_995_200 + i as u32,
                    micros: 0,
                },
            ],
            0x100 + i as u64,
            0x80_0000_0000_0001,
        ));
    }
    builder.build()
}

fn benchmark_record_decode(c: &mut Criterion) {
    let table = users_table();
    let mut group = c.benchmark_group("record_decode");
    for &rows in ROW_COUNTS {
        let buf = build_page(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_function(format!("decode_{rows}_rows"), |b| {
            b.iter(|| {
                let page = IndexPage::parse(Page::new(1, buf.clone()).unwrap()).unwrap();
                let decoder = CompactDecoder::new(&table);
                let mut decoded = 0;
                for slot in page.walk(1000, true) {
                    let slot = slot.unwrap();
                    let record = decoder.decode(&page, slot.origin).unwrap();
                    decoded += record.values.len();
                }
                black_box(decoded)
            })
        });
    }
    group.finish();
}

fn benchmark_structural_parse(c: &mut Criterion) {
    let buf = build_page(100);
    c.bench_function("structural_parse", |b| {
        b.iter(|| {
            let page = IndexPage::parse(Page::new(1, buf.clone()).unwrap()).unwrap();
            black_box(page.used_bytes())
        })
    });
}

criterion_group!(benches, benchmark_record_decode, benchmark_structural_parse);
criterion_main!(benches);
