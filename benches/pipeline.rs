use criterion::{Criterion, criterion_group, criterion_main};
use encoding_rs::UTF_8;
use met_etl::pipeline::PipelineContext;
use met_etl::schema::{COUNTRY, DIMENSIONS, Schema};
use met_etl::source::{self, RawTable};

const COUNTRIES: &[&str] = &["Egypt", "France or Italy", "USA|Canada|Mexico", "", "Japan"];
const DIMENSION_TEXT: &[&str] = &[
    "H. 4 in. (10.16 x 8.5 cm)",
    "45.72 x 30.48 x 2.5 cm",
    "irregular",
    "",
];

fn generate_export(schema: &Schema, rows: usize) -> Vec<u8> {
    let column = |name: &str| schema.column_index(name).expect("column");
    let (object_id, title, constituent, artist) = (
        column("Object ID"),
        column("Title"),
        column("Constituent ID"),
        column("Artist Display Name"),
    );
    let (dimensions, country) = (column(DIMENSIONS), column(COUNTRY));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(schema.headers()).expect("header");
    for i in 0..rows {
        let mut row = vec![String::new(); schema.columns.len()];
        row[object_id] = i.to_string();
        row[title] = format!("Series {}", i % 400);
        if i % 3 == 0 {
            row[constituent] = (i % 900).to_string();
        }
        if i % 2 == 0 {
            row[artist] = format!("Artist {}", i % 50);
        }
        row[dimensions] = DIMENSION_TEXT[i % DIMENSION_TEXT.len()].to_string();
        row[country] = COUNTRIES[i % COUNTRIES.len()].to_string();
        writer.write_record(&row).expect("row");
    }
    writer.into_inner().expect("flush")
}

fn bench_pipeline(c: &mut Criterion) {
    let context = PipelineContext::met_objects().expect("context");
    let export = generate_export(context.schema(), 50_000);
    let raw: RawTable =
        source::read_raw_from_reader(export.as_slice(), context.schema(), b',', UTF_8)
            .expect("read export");

    let mut group = c.benchmark_group("pipeline");

    group.bench_function("read_export", |b| {
        b.iter(|| {
            source::read_raw_from_reader(export.as_slice(), context.schema(), b',', UTF_8)
                .expect("read export")
        });
    });

    group.bench_function("run_all_stages", |b| {
        b.iter(|| context.run(&raw));
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
