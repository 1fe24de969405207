use ratatui::style::Color;

use crate::state::{CategorySlice, ChartData, DailyPoint};

/// Fixed palette for category segments, reused cyclically when the
/// breakdown has more categories than colors.
pub const CATEGORY_PALETTE: [Color; 4] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRole {
    DailySpending,
    CategoryBreakdown,
}

/// Render-ready time-series dataset. The handle owns the point buffer the
/// ratatui `Dataset` borrows at draw time; x is the ordinal position of each
/// date in payload order.
#[derive(Debug, Clone)]
pub struct DailyChart {
    pub labels: Vec<String>,
    pub points: Vec<(f64, f64)>,
    pub y_max: f64,
}

#[derive(Debug, Clone)]
pub struct CategoryChart {
    pub segments: Vec<CategorySegment>,
}

#[derive(Debug, Clone)]
pub struct CategorySegment {
    pub label: String,
    pub amount: f64,
    pub share: f64,
    pub color: Color,
}

/// Exclusive owner of the two chart handles. At most one handle per role is
/// live at a time; an old handle is destroyed before its replacement is
/// built, so repeated analyses never stack widgets on the same panel.
#[derive(Debug, Clone, Default)]
pub struct ChartLifecycle {
    daily: Option<DailyChart>,
    category: Option<CategoryChart>,
    destroyed_daily: u32,
    destroyed_category: u32,
}

impl ChartLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces both handles from a fresh payload: destroy-before-create
    /// per role.
    pub fn rebuild(&mut self, data: &ChartData) {
        self.destroy(ChartRole::DailySpending);
        self.daily = Some(build_daily_chart(&data.daily_spending));
        self.destroy(ChartRole::CategoryBreakdown);
        self.category = Some(build_category_chart(&data.category_breakdown));
    }

    /// Releases the live handle for a role, if any. Returns whether a handle
    /// was actually dropped.
    pub fn destroy(&mut self, role: ChartRole) -> bool {
        match role {
            ChartRole::DailySpending => {
                if self.daily.take().is_some() {
                    self.destroyed_daily += 1;
                    return true;
                }
            }
            ChartRole::CategoryBreakdown => {
                if self.category.take().is_some() {
                    self.destroyed_category += 1;
                    return true;
                }
            }
        }
        false
    }

    pub fn daily(&self) -> Option<&DailyChart> {
        self.daily.as_ref()
    }

    pub fn category(&self) -> Option<&CategoryChart> {
        self.category.as_ref()
    }

    pub fn is_live(&self, role: ChartRole) -> bool {
        match role {
            ChartRole::DailySpending => self.daily.is_some(),
            ChartRole::CategoryBreakdown => self.category.is_some(),
        }
    }

    pub fn destroy_count(&self, role: ChartRole) -> u32 {
        match role {
            ChartRole::DailySpending => self.destroyed_daily,
            ChartRole::CategoryBreakdown => self.destroyed_category,
        }
    }
}

fn build_daily_chart(daily: &[DailyPoint]) -> DailyChart {
    let labels = daily.iter().map(|d| d.date.clone()).collect();
    let points = daily
        .iter()
        .enumerate()
        .map(|(idx, d)| (idx as f64, d.total_amount))
        .collect::<Vec<_>>();
    let max = points.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max);
    let y_max = if max <= 0.0 { 1.0 } else { max * 1.2 };
    DailyChart {
        labels,
        points,
        y_max,
    }
}

fn build_category_chart(breakdown: &[CategorySlice]) -> CategoryChart {
    let total: f64 = breakdown.iter().map(|c| c.amount).sum();
    let segments = breakdown
        .iter()
        .enumerate()
        .map(|(idx, slice)| CategorySegment {
            label: slice.category.clone(),
            amount: slice.amount,
            share: if total > 0.0 {
                slice.amount / total
            } else {
                0.0
            },
            color: CATEGORY_PALETTE[idx % CATEGORY_PALETTE.len()],
        })
        .collect();
    CategoryChart { segments }
}
