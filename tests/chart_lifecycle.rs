use aml_terminal::charts::{ChartLifecycle, ChartRole, CATEGORY_PALETTE};
use aml_terminal::state::{CategorySlice, ChartData, DailyPoint};

fn chart_data(dates: &[&str], categories: &[(&str, f64)]) -> ChartData {
    ChartData {
        daily_spending: dates
            .iter()
            .enumerate()
            .map(|(idx, date)| DailyPoint {
                date: date.to_string(),
                total_amount: 100.0 * (idx as f64 + 1.0),
            })
            .collect(),
        category_breakdown: categories
            .iter()
            .map(|(name, amount)| CategorySlice {
                category: name.to_string(),
                amount: *amount,
            })
            .collect(),
    }
}

#[test]
fn first_build_creates_without_destroying() {
    let mut lifecycle = ChartLifecycle::new();
    assert!(!lifecycle.is_live(ChartRole::DailySpending));
    assert!(!lifecycle.is_live(ChartRole::CategoryBreakdown));

    lifecycle.rebuild(&chart_data(&["2024-01-01"], &[("cash", 500.0)]));

    assert!(lifecycle.is_live(ChartRole::DailySpending));
    assert!(lifecycle.is_live(ChartRole::CategoryBreakdown));
    assert_eq!(lifecycle.destroy_count(ChartRole::DailySpending), 0);
    assert_eq!(lifecycle.destroy_count(ChartRole::CategoryBreakdown), 0);
}

#[test]
fn rebuild_destroys_each_prior_handle_exactly_once() {
    let mut lifecycle = ChartLifecycle::new();
    let data = chart_data(&["2024-01-01", "2024-01-02"], &[("cash", 500.0)]);

    lifecycle.rebuild(&data);
    lifecycle.rebuild(&data);

    assert_eq!(lifecycle.destroy_count(ChartRole::DailySpending), 1);
    assert_eq!(lifecycle.destroy_count(ChartRole::CategoryBreakdown), 1);
    assert!(lifecycle.is_live(ChartRole::DailySpending));
    assert!(lifecycle.is_live(ChartRole::CategoryBreakdown));
}

#[test]
fn destroy_without_live_handle_is_a_noop() {
    let mut lifecycle = ChartLifecycle::new();
    assert!(!lifecycle.destroy(ChartRole::DailySpending));
    assert_eq!(lifecycle.destroy_count(ChartRole::DailySpending), 0);
}

#[test]
fn daily_points_keep_payload_order() {
    let mut lifecycle = ChartLifecycle::new();
    // Dates deliberately out of order: x stays ordinal, no re-sorting.
    lifecycle.rebuild(&chart_data(
        &["2024-01-03", "2024-01-01", "2024-01-02"],
        &[("cash", 500.0)],
    ));

    let daily = lifecycle.daily().expect("daily handle should be live");
    assert_eq!(daily.labels, vec!["2024-01-03", "2024-01-01", "2024-01-02"]);
    assert_eq!(
        daily.points,
        vec![(0.0, 100.0), (1.0, 200.0), (2.0, 300.0)]
    );
    assert!(daily.y_max > 300.0);
}

#[test]
fn empty_series_builds_live_but_empty_handle() {
    let mut lifecycle = ChartLifecycle::new();
    lifecycle.rebuild(&chart_data(&[], &[]));

    let daily = lifecycle.daily().expect("daily handle should be live");
    assert!(daily.points.is_empty());
    assert_eq!(daily.y_max, 1.0);
    let category = lifecycle.category().expect("category handle should be live");
    assert!(category.segments.is_empty());
}

#[test]
fn category_shares_are_proportional() {
    let mut lifecycle = ChartLifecycle::new();
    lifecycle.rebuild(&chart_data(
        &["2024-01-01"],
        &[("cash", 750.0), ("wire", 250.0)],
    ));

    let category = lifecycle.category().expect("category handle should be live");
    assert_eq!(category.segments[0].share, 0.75);
    assert_eq!(category.segments[1].share, 0.25);
}

#[test]
fn zero_total_breakdown_has_zero_shares() {
    let mut lifecycle = ChartLifecycle::new();
    lifecycle.rebuild(&chart_data(&[], &[("cash", 0.0), ("wire", 0.0)]));

    let category = lifecycle.category().expect("category handle should be live");
    assert!(category.segments.iter().all(|s| s.share == 0.0));
}

#[test]
fn palette_repeats_when_categories_exceed_it() {
    let mut lifecycle = ChartLifecycle::new();
    let categories: Vec<(String, f64)> = (0..6).map(|i| (format!("cat{i}"), 100.0)).collect();
    let refs: Vec<(&str, f64)> = categories
        .iter()
        .map(|(name, amount)| (name.as_str(), *amount))
        .collect();
    lifecycle.rebuild(&chart_data(&["2024-01-01"], &refs));

    let category = lifecycle.category().expect("category handle should be live");
    assert_eq!(category.segments.len(), 6);
    let n = CATEGORY_PALETTE.len();
    assert_eq!(category.segments[n].color, category.segments[0].color);
    assert_eq!(category.segments[n + 1].color, category.segments[1].color);
}
