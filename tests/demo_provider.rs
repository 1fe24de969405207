use rand::rngs::StdRng;
use rand::SeedableRng;

use aml_terminal::demo_feed::{demo_accounts, synthesize_analysis, DISPLAY_LIMIT};

#[test]
fn demo_accounts_cover_the_three_patterns() {
    let accounts = demo_accounts();
    let patterns: Vec<&str> = accounts.iter().map(|a| a.pattern.as_str()).collect();
    assert_eq!(patterns, vec!["normal", "structuring", "rapid"]);
    assert!(accounts.iter().all(|a| !a.id.is_empty() && !a.name.is_empty()));
}

#[test]
fn normal_pattern_has_no_findings() {
    let mut rng = StdRng::seed_from_u64(7);
    let result = synthesize_analysis("normal", &mut rng);

    assert!(result.detection.flags.is_empty());
    assert_eq!(result.detection.risk_level, "LOW");
    assert_eq!(result.features.total_transactions, 60);
    assert_eq!(result.features.near_threshold_count, 0);
}

#[test]
fn structuring_pattern_trips_the_threshold_rule() {
    let mut rng = StdRng::seed_from_u64(7);
    let result = synthesize_analysis("structuring", &mut rng);

    assert!(result.features.near_threshold_count > 5);
    assert!(
        result
            .detection
            .flags
            .iter()
            .any(|flag| flag.starts_with("Structuring"))
    );
    assert!(result.detection.risk_score >= 40.0);
}

#[test]
fn rapid_pattern_trips_the_velocity_rule() {
    let mut rng = StdRng::seed_from_u64(7);
    let result = synthesize_analysis("rapid", &mut rng);

    assert!(result.features.transactions_per_day > 3.0);
    assert!(
        result
            .detection
            .flags
            .iter()
            .any(|flag| flag.starts_with("High Velocity"))
    );
}

#[test]
fn listing_is_capped_while_features_count_everything() {
    let mut rng = StdRng::seed_from_u64(7);
    let result = synthesize_analysis("rapid", &mut rng);

    assert_eq!(result.transactions.len(), DISPLAY_LIMIT);
    assert_eq!(result.features.total_transactions, 100);
}

#[test]
fn daily_rollup_is_chronological_and_complete() {
    let mut rng = StdRng::seed_from_u64(7);
    let result = synthesize_analysis("structuring", &mut rng);

    let dates: Vec<&str> = result
        .charts
        .daily_spending
        .iter()
        .map(|p| p.date.as_str())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort_unstable();
    assert_eq!(dates, sorted);
    assert_eq!(dates.len(), 60);

    let daily_total: f64 = result
        .charts
        .daily_spending
        .iter()
        .map(|p| p.total_amount)
        .sum();
    let category_total: f64 = result
        .charts
        .category_breakdown
        .iter()
        .map(|c| c.amount)
        .sum();
    assert!((daily_total - category_total).abs() < 1e-6);
}
