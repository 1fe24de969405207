use crate::state::{Detection, Features, TransactionRecord};

/// Amounts strictly above this get the high-amount marker in the table.
pub const HIGH_AMOUNT_THRESHOLD: f64 = 9000.0;

pub const NO_FINDINGS_TEXT: &str = "No suspicious activity detected";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagEntry {
    pub text: String,
    pub warning: bool,
}

/// Projects the detection flags into display entries. An empty flag list is
/// a positive finding, not an error, and renders as exactly one
/// affirmation entry.
pub fn flag_entries(detection: &Detection) -> Vec<FlagEntry> {
    if detection.flags.is_empty() {
        return vec![FlagEntry {
            text: NO_FINDINGS_TEXT.to_string(),
            warning: false,
        }];
    }
    detection
        .flags
        .iter()
        .map(|flag| FlagEntry {
            text: flag.clone(),
            warning: true,
        })
        .collect()
}

pub fn risk_score_text(detection: &Detection) -> String {
    detection.risk_score.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatEntry {
    pub label: &'static str,
    pub value: String,
}

pub fn stat_entries(features: &Features) -> [StatEntry; 4] {
    [
        StatEntry {
            label: "Total transactions",
            value: features.total_transactions.to_string(),
        },
        StatEntry {
            label: "Avg amount",
            value: format_currency(features.avg_amount),
        },
        StatEntry {
            label: "Txns per day",
            value: format!("{:.2}", features.transactions_per_day),
        },
        StatEntry {
            label: "Near threshold",
            value: features.near_threshold_count.to_string(),
        },
    ]
}

pub fn format_currency(amount: f64) -> String {
    format!("${amount:.2}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub description: String,
    pub high_amount: bool,
}

/// Projects the transaction listing into display rows, payload order
/// preserved.
pub fn transaction_rows(transactions: &[TransactionRecord]) -> Vec<TransactionRow> {
    transactions
        .iter()
        .map(|txn| TransactionRow {
            id: txn.id.clone(),
            date: txn.date.clone(),
            kind: txn.kind.clone(),
            amount: format_currency(txn.amount),
            description: txn.description.clone(),
            high_amount: txn.amount > HIGH_AMOUNT_THRESHOLD,
        })
        .collect()
}
