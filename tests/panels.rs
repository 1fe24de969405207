use aml_terminal::panels::{
    flag_entries, format_currency, risk_score_text, stat_entries, transaction_rows,
    NO_FINDINGS_TEXT,
};
use aml_terminal::state::{Detection, Features, TransactionRecord};

fn detection(flags: Vec<&str>) -> Detection {
    Detection {
        risk_score: 85.0,
        risk_level: "HIGH".to_string(),
        flags: flags.into_iter().map(str::to_string).collect(),
    }
}

fn txn(id: &str, amount: f64) -> TransactionRecord {
    TransactionRecord {
        id: id.to_string(),
        date: "2024-01-01".to_string(),
        kind: "withdrawal".to_string(),
        amount,
        description: "ATM".to_string(),
    }
}

#[test]
fn empty_flags_render_single_affirmation() {
    let entries = flag_entries(&detection(Vec::new()));
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].warning);
    assert_eq!(entries[0].text, NO_FINDINGS_TEXT);
}

#[test]
fn each_flag_renders_one_warning_entry() {
    let entries = flag_entries(&detection(vec![
        "Structuring pattern detected",
        "High Velocity: Unusually high transaction frequency",
    ]));
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.warning));
    assert_eq!(entries[0].text, "Structuring pattern detected");
}

#[test]
fn risk_score_renders_without_trailing_zero() {
    assert_eq!(risk_score_text(&detection(Vec::new())), "85");
    let mut fractional = detection(Vec::new());
    fractional.risk_score = 72.5;
    assert_eq!(risk_score_text(&fractional), "72.5");
}

#[test]
fn stats_format_per_field_rules() {
    let features = Features {
        total_transactions: 42,
        avg_amount: 1234.5,
        transactions_per_day: 3.0,
        near_threshold_count: 7,
    };
    let entries = stat_entries(&features);
    assert_eq!(entries[0].value, "42");
    assert_eq!(entries[1].value, "$1234.50");
    assert_eq!(entries[2].value, "3.00");
    assert_eq!(entries[3].value, "7");
}

#[test]
fn currency_formatting_keeps_two_decimals() {
    assert_eq!(format_currency(9500.0), "$9500.00");
    assert_eq!(format_currency(0.5), "$0.50");
    assert_eq!(format_currency(1234.567), "$1234.57");
}

#[test]
fn high_amount_marker_is_strictly_greater_than_threshold() {
    let rows = transaction_rows(&[txn("a", 9000.0), txn("b", 9000.01), txn("c", 9001.0)]);
    assert!(!rows[0].high_amount);
    assert!(rows[1].high_amount);
    assert!(rows[2].high_amount);
}

#[test]
fn rows_preserve_payload_order_and_fields() {
    let rows = transaction_rows(&[txn("t2", 100.0), txn("t1", 9500.0)]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "t2");
    assert_eq!(rows[1].id, "t1");
    assert_eq!(rows[1].amount, "$9500.00");
    assert_eq!(rows[1].kind, "withdrawal");
    assert_eq!(rows[1].date, "2024-01-01");
    assert_eq!(rows[1].description, "ATM");
    assert!(rows[1].high_amount);
}
