//! Decoding benchmarks.
//!
//! The workbooks are generated in memory with rust_xlsxwriter.
//!
//! ```bash
//! cargo bench --bench basic
//! ```

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rust_xlsxwriter::{Format, Workbook};
use std::hint::black_box;
use std::io::Cursor;
use xlgrid::Xlsx;

const ROWS: u32 = 10_000;
const COLUMNS: u16 = 10;

fn generate() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let date = Format::new().set_num_format("yyyy-mm-dd hh:mm");
    let percent = Format::new().set_num_format("0.00%");
    for row in 0..ROWS {
        for col in 0..COLUMNS {
            let res = match col % 5 {
                0 => worksheet.write_string(row, col, format!("text {}", row % 100)),
                1 => worksheet.write_number(row, col, row as f64),
                2 => worksheet.write_number_with_format(row, col, 45000. + row as f64, &date),
                3 => worksheet.write_number_with_format(row, col, 1. / (row + 1) as f64, &percent),
                _ => worksheet.write_boolean(row, col, row % 2 == 0),
            };
            res.expect("cannot write cell");
        }
        if row % 100 == 0 {
            worksheet
                .merge_range(row, COLUMNS, row + 1, COLUMNS + 1, "merged", &Format::new())
                .expect("cannot merge");
        }
    }
    workbook.save_to_buffer().expect("cannot save workbook")
}

fn bench_decode(c: &mut Criterion) {
    let data = generate();
    let mut group = c.benchmark_group("xlsx");
    group.sample_size(10);
    group.throughput(Throughput::Elements(ROWS as u64 * COLUMNS as u64));

    group.bench_function("worksheet", |b| {
        b.iter(|| {
            let mut xlsx = Xlsx::new(Cursor::new(&data[..])).expect("cannot open workbook");
            let sheet = xlsx.worksheet("Sheet1").expect("cannot find sheet");
            black_box(sheet.rows().flatten().filter(|c| !c.is_empty()).count())
        })
    });

    group.bench_function("scan", |b| {
        let mut xlsx = Xlsx::new(Cursor::new(&data[..])).expect("cannot open workbook");
        b.iter(|| {
            let mut sheet = xlsx.worksheet("Sheet1").expect("cannot find sheet");
            let mut total = 0.;
            while sheet.next_row() {
                if let Ok(v) = sheet.get::<i64>(1) {
                    total += v as f64;
                }
            }
            black_box(total)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
