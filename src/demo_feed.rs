use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::feed::run_export;
use crate::state::{
    AccountOption, AnalysisResult, CategorySlice, ChartData, DailyPoint, Delta, Detection,
    Features, ProviderCommand, TransactionRecord,
};

/// The listing shows at most this many rows per analysis, matching the
/// analysis service's own display cap.
pub const DISPLAY_LIMIT: usize = 20;

/// Offline stand-in for the analysis service: serves the same command/delta
/// protocol from synthesized per-pattern data, so the terminal works with no
/// backend configured.
pub fn spawn_demo_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::FetchAccounts => {
                    thread::sleep(Duration::from_millis(300));
                    let _ = tx.send(Delta::SetAccounts(demo_accounts()));
                }
                ProviderCommand::FetchAnalysis {
                    account_id,
                    pattern,
                } => {
                    let _ = tx.send(Delta::Log(format!(
                        "[INFO] Demo analysis for {account_id} ({pattern})"
                    )));
                    thread::sleep(Duration::from_millis(600));
                    let result = synthesize_analysis(&pattern, &mut rng);
                    let _ = tx.send(Delta::SetAnalysis {
                        account_id,
                        result: Box::new(result),
                    });
                }
                ProviderCommand::ExportAnalysis { path, result } => {
                    run_export(&tx, &path, &result);
                }
            }
        }
    });
}

pub fn demo_accounts() -> Vec<AccountOption> {
    [
        ("acct_001", "John Doe (Normal)", "normal"),
        ("acct_002", "Jane Smith (Structuring)", "structuring"),
        ("acct_003", "Bob Johnson (Rapid)", "rapid"),
    ]
    .into_iter()
    .map(|(id, name, pattern)| AccountOption {
        id: id.to_string(),
        name: name.to_string(),
        pattern: pattern.to_string(),
    })
    .collect()
}

pub fn synthesize_analysis(pattern: &str, rng: &mut impl Rng) -> AnalysisResult {
    let txns = generate_transactions(pattern, rng);
    let features = aggregate_features(&txns);
    let detection = score_features(&features, &txns);
    let charts = ChartData {
        daily_spending: daily_rollup(&txns),
        category_breakdown: category_rollup(&txns),
    };
    let transactions = txns.into_iter().take(DISPLAY_LIMIT).collect();
    AnalysisResult {
        detection,
        features,
        charts,
        transactions,
    }
}

fn generate_transactions(pattern: &str, rng: &mut impl Rng) -> Vec<TransactionRecord> {
    let base_date = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid base date");
    let mut txns = Vec::new();

    match pattern {
        "structuring" => {
            // Bursts just below the $10k reporting threshold every few days.
            for i in 0..60 {
                let amount = if i % 4 == 0 {
                    rng.gen_range(9200.0..9800.0)
                } else {
                    rng.gen_range(50.0..500.0)
                };
                txns.push(record(i, base_date, i as i64, pick_kind(rng), amount, "Transaction"));
            }
        }
        "rapid" => {
            // Many transfers packed into a short window, enough to trip the
            // velocity rule.
            for i in 0..100 {
                let amount = rng.gen_range(1000.0..5000.0);
                let kind = *["deposit", "withdrawal"].choose(rng).expect("non-empty");
                txns.push(record(i, base_date, (i / 4) as i64, kind, amount, "Quick Transfer"));
            }
        }
        _ => {
            for i in 0..60 {
                let amount = rng.gen_range(50.0..800.0);
                let description = *["Grocery", "Rent", "Salary", "Shopping", "Utilities"]
                    .choose(rng)
                    .expect("non-empty");
                txns.push(record(i, base_date, i as i64, pick_kind(rng), amount, description));
            }
        }
    }

    txns
}

fn record(
    idx: usize,
    base_date: NaiveDate,
    day_offset: i64,
    kind: &str,
    amount: f64,
    description: &str,
) -> TransactionRecord {
    let date = base_date + ChronoDuration::days(day_offset);
    TransactionRecord {
        id: format!("txn_{idx}"),
        date: date.format("%Y-%m-%d").to_string(),
        kind: kind.to_string(),
        amount,
        description: description.to_string(),
    }
}

fn pick_kind(rng: &mut impl Rng) -> &'static str {
    ["deposit", "withdrawal", "transfer"]
        .choose(rng)
        .copied()
        .expect("non-empty")
}

fn aggregate_features(txns: &[TransactionRecord]) -> Features {
    let total = txns.len() as u64;
    let sum: f64 = txns.iter().map(|t| t.amount).sum();
    let avg_amount = if txns.is_empty() {
        0.0
    } else {
        sum / txns.len() as f64
    };

    let mut dates: Vec<&str> = txns.iter().map(|t| t.date.as_str()).collect();
    dates.sort_unstable();
    dates.dedup();
    let transactions_per_day = if dates.is_empty() {
        0.0
    } else {
        txns.len() as f64 / dates.len() as f64
    };

    let near_threshold_count = txns
        .iter()
        .filter(|t| t.amount >= 9000.0 && t.amount < 10000.0)
        .count() as u64;

    Features {
        total_transactions: total,
        avg_amount,
        transactions_per_day,
        near_threshold_count,
    }
}

// The collaborator's simple rule table, applied to the synthesized batch.
fn score_features(features: &Features, txns: &[TransactionRecord]) -> Detection {
    let mut risk_score: f64 = 0.0;
    let mut flags = Vec::new();

    if features.near_threshold_count > 5 {
        risk_score += 40.0;
        flags.push("Structuring: Multiple transactions near $10k threshold".to_string());
    }
    if features.transactions_per_day > 3.0 {
        risk_score += 25.0;
        flags.push("High Velocity: Unusually high transaction frequency".to_string());
    }

    let round_count = txns.iter().filter(|t| t.amount % 100.0 == 0.0).count();
    let round_ratio = if txns.is_empty() {
        0.0
    } else {
        round_count as f64 / txns.len() as f64
    };
    if round_ratio > 0.5 {
        risk_score += 20.0;
        flags.push("Round Numbers: High percentage of exact amount transactions".to_string());
    }
    if features.avg_amount > 5000.0 {
        risk_score += 15.0;
        flags.push("Large Amounts: Average transaction significantly above normal".to_string());
    }

    let risk_level = if risk_score >= 60.0 {
        "HIGH"
    } else if risk_score >= 30.0 {
        "MEDIUM"
    } else {
        "LOW"
    };

    Detection {
        risk_score: risk_score.min(100.0),
        risk_level: risk_level.to_string(),
        flags,
    }
}

// Rollups preserve first-appearance order; generated dates are already
// ascending, so the time axis stays chronological without re-sorting.
fn daily_rollup(txns: &[TransactionRecord]) -> Vec<DailyPoint> {
    let mut points: Vec<DailyPoint> = Vec::new();
    for txn in txns {
        match points.iter_mut().find(|p| p.date == txn.date) {
            Some(point) => point.total_amount += txn.amount,
            None => points.push(DailyPoint {
                date: txn.date.clone(),
                total_amount: txn.amount,
            }),
        }
    }
    points
}

fn category_rollup(txns: &[TransactionRecord]) -> Vec<CategorySlice> {
    let mut slices: Vec<CategorySlice> = Vec::new();
    for txn in txns {
        match slices.iter_mut().find(|c| c.category == txn.kind) {
            Some(slice) => slice.amount += txn.amount,
            None => slices.push(CategorySlice {
                category: txn.kind.clone(),
                amount: txn.amount,
            }),
        }
    }
    slices
}
