use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Deserializer, Serialize};

use crate::charts::ChartLifecycle;

/// One selectable account, as delivered by the account-list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOption {
    pub id: String,
    pub name: String,
    pub pattern: String,
}

/// The account/pattern pair the user explicitly picked. `None` until the
/// first pick, and checked before any analysis request goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: String,
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub detection: Detection,
    pub features: Features,
    pub charts: ChartData,
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub risk_score: f64,
    pub risk_level: String,
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Features {
    pub total_transactions: u64,
    pub avg_amount: f64,
    pub transactions_per_day: f64,
    pub near_threshold_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub daily_spending: Vec<DailyPoint>,
    pub category_breakdown: Vec<CategorySlice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub description: String,
}

// Transaction ids arrive as strings or bare numbers depending on the
// collaborator; both are carried as strings.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Int(num) => num.to_string(),
        RawId::Float(num) => num.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// One-line user-facing message, distinct from the diagnostic console log.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ExportState {
    pub active: bool,
    pub done: bool,
    pub path: Option<String>,
    pub error: Option<String>,
    pub last_updated: Option<Instant>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self {
            active: false,
            done: false,
            path: None,
            error: None,
            last_updated: None,
        }
    }

    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        if !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::new();
        }
    }

    pub fn status_line(&self) -> Option<String> {
        if !self.active && !self.done {
            return None;
        }
        if let Some(err) = &self.error {
            return Some(format!("Export failed: {err}"));
        }
        match (&self.path, self.done) {
            (Some(path), true) => Some(format!("Exported {path}")),
            (Some(path), false) => Some(format!("Exporting {path}...")),
            (None, _) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub accounts: Vec<AccountOption>,
    pub accounts_loading: bool,
    pub account_cursor: usize,
    pub selection: Option<Selection>,
    pub analysis_loading: bool,
    /// True once the first analysis has rendered; a later failed request
    /// must not flip this back.
    pub results_visible: bool,
    pub analysis: Option<AnalysisResult>,
    pub analysis_account: Option<String>,
    pub charts: ChartLifecycle,
    pub txn_scroll: u16,
    pub notice: Option<Notice>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub export: ExportState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            accounts_loading: false,
            account_cursor: 0,
            selection: None,
            analysis_loading: false,
            results_visible: false,
            analysis: None,
            analysis_account: None,
            charts: ChartLifecycle::new(),
            txn_scroll: 0,
            notice: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            export: ExportState::new(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn set_notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            text: text.into(),
        });
    }

    pub fn current_selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_account(&self) -> Option<&AccountOption> {
        let selection = self.selection.as_ref()?;
        self.accounts.iter().find(|a| a.id == selection.id)
    }

    pub fn select_next_account(&mut self) {
        if self.accounts.is_empty() {
            return;
        }
        if self.account_cursor + 1 < self.accounts.len() {
            self.account_cursor += 1;
        }
    }

    pub fn select_prev_account(&mut self) {
        self.account_cursor = self.account_cursor.saturating_sub(1);
    }

    /// Commits the highlighted account as the current selection. Selection
    /// changes only here, never as a side effect of list refreshes.
    pub fn choose_account(&mut self) {
        let Some(account) = self.accounts.get(self.account_cursor) else {
            return;
        };
        self.selection = Some(Selection {
            id: account.id.clone(),
            pattern: account.pattern.clone(),
        });
        self.notice = None;
        self.push_log(format!(
            "[INFO] Selected {} ({})",
            account.name, account.pattern
        ));
    }

    /// Validates preconditions for one analysis round trip and flips the UI
    /// into loading mode. Returns the command to hand to the provider, or
    /// `None` when nothing should be sent (no selection, or a request is
    /// already in flight).
    pub fn begin_analysis(&mut self) -> Option<ProviderCommand> {
        if self.analysis_loading {
            self.push_log("[INFO] Analysis already in flight");
            return None;
        }
        let Some(selection) = self.selection.clone() else {
            self.set_notice(NoticeKind::Warning, "Select an account first");
            return None;
        };
        self.analysis_loading = true;
        self.notice = None;
        self.push_log(format!(
            "[INFO] Analysis requested for {} ({})",
            selection.id, selection.pattern
        ));
        Some(ProviderCommand::FetchAnalysis {
            account_id: selection.id,
            pattern: selection.pattern,
        })
    }

    pub fn scroll_transactions_down(&mut self) {
        let total = self
            .analysis
            .as_ref()
            .map(|a| a.transactions.len())
            .unwrap_or(0);
        if usize::from(self.txn_scroll) + 1 < total {
            self.txn_scroll += 1;
        }
    }

    pub fn scroll_transactions_up(&mut self) {
        self.txn_scroll = self.txn_scroll.saturating_sub(1);
    }

    pub fn maybe_clear_export(&mut self, now: Instant) {
        self.export.clear_if_done_for(now, 8);
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetAccounts(Vec<AccountOption>),
    AccountsFailed(String),
    SetAnalysis {
        account_id: String,
        result: Box<AnalysisResult>,
    },
    AnalysisFailed {
        account_id: String,
        error: String,
    },
    ExportStarted {
        path: String,
    },
    ExportFinished {
        path: String,
        rows: usize,
    },
    ExportFailed(String),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchAccounts,
    FetchAnalysis {
        account_id: String,
        pattern: String,
    },
    ExportAnalysis {
        path: String,
        result: Box<AnalysisResult>,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetAccounts(accounts) => {
            state.accounts_loading = false;
            // A refreshed list may no longer contain the chosen account.
            if let Some(selection) = &state.selection
                && !accounts.iter().any(|a| a.id == selection.id)
            {
                state.selection = None;
            }
            state.account_cursor = state.account_cursor.min(accounts.len().saturating_sub(1));
            state.push_log(format!("[INFO] Loaded {} accounts", accounts.len()));
            state.accounts = accounts;
        }
        Delta::AccountsFailed(error) => {
            // Degraded but non-fatal: the selector stays empty and analysis
            // simply cannot be triggered.
            state.accounts_loading = false;
            state.push_log(format!("[WARN] Account list error: {error}"));
        }
        Delta::SetAnalysis { account_id, result } => {
            state.charts.rebuild(&result.charts);
            state.analysis = Some(*result);
            state.analysis_account = Some(account_id.clone());
            state.analysis_loading = false;
            state.results_visible = true;
            state.txn_scroll = 0;
            state.notice = None;
            state.push_log(format!("[INFO] Analysis ready for {account_id}"));
        }
        Delta::AnalysisFailed { account_id, error } => {
            // Loading mode always exits; everything else keeps its prior
            // state so a failed fetch never half-updates the panels.
            state.analysis_loading = false;
            state.set_notice(NoticeKind::Error, "Analysis failed. Try again.");
            state.push_log(format!("[WARN] Analysis error for {account_id}: {error}"));
        }
        Delta::ExportStarted { path } => {
            state.export.active = true;
            state.export.done = false;
            state.export.path = Some(path.clone());
            state.export.error = None;
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[INFO] Export started: {path}"));
        }
        Delta::ExportFinished { path, rows } => {
            state.export.active = false;
            state.export.done = true;
            state.export.path = Some(path.clone());
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[INFO] Export finished: {path} ({rows} rows)"));
        }
        Delta::ExportFailed(error) => {
            state.export.active = false;
            state.export.done = true;
            state.export.error = Some(error.clone());
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[WARN] Export error: {error}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
