use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::panels;
use crate::state::AnalysisResult;

/// Writes the currently rendered analysis to an xlsx workbook: a summary
/// sheet (risk, flags, statistics, rollups) and a transaction sheet.
/// Returns the number of transaction rows written.
pub fn write_analysis_workbook(path: &str, analysis: &AnalysisResult) -> Result<usize> {
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows(analysis))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Transactions")?;
        write_rows(sheet, &transaction_rows(analysis))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {path}"))?;

    Ok(analysis.transactions.len())
}

fn summary_rows(analysis: &AnalysisResult) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec![
            "Risk Score".to_string(),
            panels::risk_score_text(&analysis.detection),
        ],
        vec![
            "Risk Level".to_string(),
            analysis.detection.risk_level.clone(),
        ],
    ];
    for entry in panels::flag_entries(&analysis.detection) {
        rows.push(vec!["Flag".to_string(), entry.text]);
    }
    for entry in panels::stat_entries(&analysis.features) {
        rows.push(vec![entry.label.to_string(), entry.value]);
    }
    rows.push(Vec::new());
    rows.push(vec!["Category".to_string(), "Amount".to_string()]);
    for slice in &analysis.charts.category_breakdown {
        rows.push(vec![
            slice.category.clone(),
            panels::format_currency(slice.amount),
        ]);
    }
    rows.push(Vec::new());
    rows.push(vec!["Date".to_string(), "Total Amount".to_string()]);
    for point in &analysis.charts.daily_spending {
        rows.push(vec![
            point.date.clone(),
            panels::format_currency(point.total_amount),
        ]);
    }
    rows
}

fn transaction_rows(analysis: &AnalysisResult) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "ID".to_string(),
        "Date".to_string(),
        "Type".to_string(),
        "Amount".to_string(),
        "Description".to_string(),
        "High Amount".to_string(),
    ]];
    for row in panels::transaction_rows(&analysis.transactions) {
        rows.push(vec![
            row.id,
            row.date,
            row.kind,
            row.amount,
            row.description,
            if row.high_amount { "yes" } else { "no" }.to_string(),
        ]);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
