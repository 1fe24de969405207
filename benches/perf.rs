use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use aml_terminal::analysis_fetch::parse_analysis_json;
use aml_terminal::charts::ChartLifecycle;
use aml_terminal::panels::transaction_rows;
use aml_terminal::state::{CategorySlice, ChartData, DailyPoint, TransactionRecord};

fn analysis_json(days: usize) -> String {
    let daily: Vec<String> = (0..days)
        .map(|i| format!(r#"{{"date":"2025-01-{:02}","total_amount":{}}}"#, i % 28 + 1, 100 + i))
        .collect();
    let txns: Vec<String> = (0..days)
        .map(|i| {
            format!(
                r#"{{"id":"txn_{i}","date":"2025-01-{:02}","type":"withdrawal","amount":{}.5,"description":"Transaction"}}"#,
                i % 28 + 1,
                9000 + i
            )
        })
        .collect();
    format!(
        r#"{{
            "detection": {{"risk_score": 65, "risk_level": "HIGH", "flags": ["Structuring: Multiple transactions near $10k threshold"]}},
            "features": {{"total_transactions": {days}, "avg_amount": 4200.5, "transactions_per_day": 3.2, "near_threshold_count": 9}},
            "charts": {{"daily_spending": [{}], "category_breakdown": [{{"category":"cash","amount":9000}},{{"category":"wire","amount":4000}}]}},
            "transactions": [{}]
        }}"#,
        daily.join(","),
        txns.join(",")
    )
}

fn sample_chart_data(days: usize) -> ChartData {
    ChartData {
        daily_spending: (0..days)
            .map(|i| DailyPoint {
                date: format!("2025-01-{:02}", i % 28 + 1),
                total_amount: 100.0 + i as f64,
            })
            .collect(),
        category_breakdown: vec![
            CategorySlice {
                category: "deposit".to_string(),
                amount: 9000.0,
            },
            CategorySlice {
                category: "withdrawal".to_string(),
                amount: 4000.0,
            },
            CategorySlice {
                category: "transfer".to_string(),
                amount: 1500.0,
            },
        ],
    }
}

fn sample_transactions(count: usize) -> Vec<TransactionRecord> {
    (0..count)
        .map(|i| TransactionRecord {
            id: format!("txn_{i}"),
            date: format!("2025-01-{:02}", i % 28 + 1),
            kind: "withdrawal".to_string(),
            amount: 8000.0 + i as f64 * 10.0,
            description: "Transaction".to_string(),
        })
        .collect()
}

fn bench_analysis_parse(c: &mut Criterion) {
    let raw = analysis_json(60);
    c.bench_function("analysis_parse", |b| {
        b.iter(|| {
            let result = parse_analysis_json(black_box(&raw)).unwrap();
            black_box(result.transactions.len());
        })
    });
}

fn bench_chart_rebuild(c: &mut Criterion) {
    let data = sample_chart_data(60);
    c.bench_function("chart_rebuild", |b| {
        let mut lifecycle = ChartLifecycle::new();
        b.iter(|| {
            lifecycle.rebuild(black_box(&data));
            black_box(lifecycle.daily().map(|d| d.points.len()));
        })
    });
}

fn bench_transaction_rows(c: &mut Criterion) {
    let txns = sample_transactions(500);
    c.bench_function("transaction_rows", |b| {
        b.iter(|| {
            let rows = transaction_rows(black_box(&txns));
            black_box(rows.len());
        })
    });
}

criterion_group!(
    benches,
    bench_analysis_parse,
    bench_chart_rebuild,
    bench_transaction_rows
);
criterion_main!(benches);
