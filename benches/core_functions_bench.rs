use binlog_analysis::binlog::{ChangeKind, ChangeOperation, ColumnValue, EventContext, classify, decode, reconstruct};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_classify(c: &mut Criterion) {
    let lines = [
        "#241201 10:30:20 server id 1  end_log_pos 430 CRC32 0x5d4e1f02 \tWrite_rows: table id 90 flags: STMT_END_F",
        "SET TIMESTAMP=1733049020/*!*/;",
        "### UPDATE `shop`.`orders`",
        "###   @2='alice'",
        "COMMIT/*!*/;",
    ];
    c.bench_function("classify_mixed_lines", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(classify(black_box(line)));
            }
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let tokens = ["NULL", "123456789012.345", "-1 (4294967295)", r"'it\'s a \\path\n'", "NULL54"];
    c.bench_function("decode_value_tokens", |b| {
        b.iter(|| {
            for token in &tokens {
                black_box(decode(black_box(token)));
            }
        })
    });
}

fn bench_reconstruct_update(c: &mut Criterion) {
    let mut op = ChangeOperation::new(ChangeKind::Update, "shop".into(), "orders".into(), &EventContext::default());
    for i in 1..=20u32 {
        op.where_values.push(ColumnValue::new(i, decode(&format!("'old_{i}'"))));
        let new = if i % 4 == 0 { format!("'new_{i}'") } else { format!("'old_{i}'") };
        op.set_values.push(ColumnValue::new(i, decode(&new)));
    }

    c.bench_function("reconstruct_update_20_columns", |b| b.iter(|| black_box(reconstruct(black_box(&op)))));
}

criterion_group!(benches, bench_classify, bench_decode, bench_reconstruct_update);
criterion_main!(benches);
