use std::env;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
};

use aml_terminal::charts::{CategoryChart, DailyChart};
use aml_terminal::panels;
use aml_terminal::state::{
    apply_delta, AnalysisResult, AppState, Delta, NoticeKind, ProviderCommand,
};
use aml_terminal::{demo_feed, feed};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next_account(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev_account(),
            KeyCode::Enter => self.state.choose_account(),
            KeyCode::Char('a') => self.request_analysis(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_accounts(true),
            KeyCode::Char('e') | KeyCode::Char('E') => self.request_export(),
            KeyCode::PageDown => self.state.scroll_transactions_down(),
            KeyCode::PageUp => self.state.scroll_transactions_up(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else {
                    self.state.notice = None;
                }
            }
            _ => {}
        }
    }

    fn request_accounts(&mut self, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Account fetch unavailable");
            }
            return;
        };
        if tx.send(ProviderCommand::FetchAccounts).is_err() {
            if announce {
                self.state.push_log("[WARN] Account request failed");
            }
        } else {
            self.state.accounts_loading = true;
            if announce {
                self.state.push_log("[INFO] Account list requested");
            }
        }
    }

    fn request_analysis(&mut self) {
        let Some(cmd) = self.state.begin_analysis() else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.state.analysis_loading = false;
            self.state.push_log("[INFO] Analysis fetch unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.analysis_loading = false;
            self.state.push_log("[WARN] Analysis request failed");
        }
    }

    fn request_export(&mut self) {
        if self.state.export.active {
            self.state.push_log("[INFO] Export already running");
            return;
        }
        let Some(analysis) = self.state.analysis.clone() else {
            self.state
                .set_notice(NoticeKind::Info, "No analysis to export yet");
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Export unavailable");
            return;
        };
        let account = self
            .state
            .analysis_account
            .clone()
            .unwrap_or_else(|| "analysis".to_string());
        let path = format!("aml_{account}_{}.xlsx", Utc::now().format("%Y%m%d_%H%M%S"));
        if tx
            .send(ProviderCommand::ExportAnalysis {
                path,
                result: Box::new(analysis),
            })
            .is_err()
        {
            self.state.push_log("[WARN] Export request failed");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();

    let base_url = env::var("AML_API_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let demo_mode = base_url.is_none();
    match base_url {
        Some(base) => feed::spawn_http_provider(base, tx, cmd_rx),
        None => demo_feed::spawn_demo_provider(tx, cmd_rx),
    }

    let mut app = App::new(Some(cmd_tx));
    if demo_mode {
        app.state
            .push_log("[INFO] AML_API_BASE_URL not set, serving demo data");
    }
    app.request_accounts(false);

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.state.maybe_clear_export(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(40)])
        .split(chunks[1]);

    render_accounts(frame, body[0], &app.state);
    render_results(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    render_footer(frame, chunks[3], &app.state);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let account = state
        .selected_account()
        .map(|a| a.name.clone())
        .or_else(|| state.current_selection().map(|s| s.id.clone()))
        .unwrap_or_else(|| "no account".to_string());
    let pattern = state
        .current_selection()
        .map(|s| s.pattern.clone())
        .unwrap_or_else(|| "-".to_string());
    let line1 = format!(" ┌─┐ AML TERMINAL | {account} | pattern: {pattern}");
    let line2 = " │$│ Transaction anomaly monitor".to_string();
    let line3 = " └─┘".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn render_accounts(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Accounts").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    if state.accounts.is_empty() {
        let text = if state.accounts_loading {
            "Loading accounts..."
        } else {
            "No accounts (press r to reload)"
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let chosen_id = state.current_selection().map(|s| s.id.clone());
    let visible = inner.height as usize;
    let (start, end) = visible_range(state.account_cursor, state.accounts.len(), visible);

    let mut lines = Vec::new();
    for idx in start..end {
        let account = &state.accounts[idx];
        let cursor = if idx == state.account_cursor { "> " } else { "  " };
        let chosen = chosen_id.as_deref() == Some(account.id.as_str());
        let name_style = if chosen {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let row_style = if idx == state.account_cursor {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(
            Line::from(vec![
                Span::raw(cursor.to_string()),
                Span::styled(account.name.clone(), name_style),
                Span::styled(
                    format!("  [{}]", account.pattern),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
            .style(row_style),
        );
    }

    let list = Paragraph::new(Text::from(lines));
    frame.render_widget(list, inner);
}

fn render_results(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.analysis_loading {
        let block = Block::default().title("Analysis").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let spinner = Paragraph::new("Analyzing transactions...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(spinner, inner);
        return;
    }

    let analysis = if state.results_visible {
        state.analysis.as_ref()
    } else {
        None
    };
    let Some(analysis) = analysis else {
        let block = Block::default().title("Analysis").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let placeholder = Paragraph::new("No analysis yet. Pick an account and press 'a'.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(placeholder, inner);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Min(8),
            Constraint::Length(10),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(34)])
        .split(rows[0]);

    render_risk(frame, top[0], analysis);
    render_stats(frame, top[1], analysis);

    let chart_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(rows[1]);

    render_daily_chart(frame, chart_row[0], state.charts.daily());
    render_category_chart(frame, chart_row[1], state.charts.category());

    render_transactions(frame, rows[2], state, analysis);
}

fn risk_level_color(level: &str) -> Color {
    match level {
        "HIGH" => Color::Red,
        "MEDIUM" => Color::Yellow,
        "LOW" => Color::Green,
        _ => Color::White,
    }
}

fn render_risk(frame: &mut Frame, area: Rect, analysis: &AnalysisResult) {
    let block = Block::default()
        .title("Risk Assessment")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let level_color = risk_level_color(&analysis.detection.risk_level);
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Score: "),
            Span::styled(
                panels::risk_score_text(&analysis.detection),
                Style::default()
                    .fg(level_color)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw("Level: "),
            Span::styled(
                analysis.detection.risk_level.clone(),
                Style::default().fg(level_color),
            ),
        ]),
        Line::raw(""),
    ];
    for entry in panels::flag_entries(&analysis.detection) {
        if entry.warning {
            lines.push(Line::from(Span::styled(
                format!("⚠ {}", entry.text),
                Style::default().fg(Color::Yellow),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!("✔ {}", entry.text),
                Style::default().fg(Color::Green),
            )));
        }
    }

    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_stats(frame: &mut Frame, area: Rect, analysis: &AnalysisResult) {
    let block = Block::default().title("Statistics").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = panels::stat_entries(&analysis.features)
        .into_iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("{:<20}", entry.label),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(entry.value, Style::default().add_modifier(Modifier::BOLD)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn render_daily_chart(frame: &mut Frame, area: Rect, handle: Option<&DailyChart>) {
    let block = Block::default()
        .title("Daily Spending")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(handle) = handle.filter(|h| !h.points.is_empty()) else {
        let empty = Paragraph::new("No chart data").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    };

    let datasets = vec![
        Dataset::default()
            .name("Daily spending ($)")
            .marker(ratatui::symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&handle.points),
    ];

    let x_max = (handle.points.len().saturating_sub(1)).max(1) as f64;
    let x_labels = vec![
        Span::raw(handle.labels.first().cloned().unwrap_or_default()),
        Span::raw(handle.labels.last().cloned().unwrap_or_default()),
    ];
    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .labels(x_labels)
        .bounds([0.0, x_max]);

    let y_labels = vec![
        Span::raw("$0".to_string()),
        Span::raw(format!("${:.0}", handle.y_max / 2.0)),
        Span::raw(format!("${:.0}", handle.y_max)),
    ];
    let y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .labels(y_labels)
        .bounds([0.0, handle.y_max]);

    let chart = Chart::new(datasets).x_axis(x_axis).y_axis(y_axis);
    frame.render_widget(chart, inner);
}

fn render_category_chart(frame: &mut Frame, area: Rect, handle: Option<&CategoryChart>) {
    let block = Block::default()
        .title("Category Breakdown")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(handle) = handle.filter(|h| !h.segments.is_empty()) else {
        let empty = Paragraph::new("No chart data").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(12), Constraint::Length(24)])
        .split(inner);

    let bars: Vec<Bar> = handle
        .segments
        .iter()
        .map(|seg| {
            Bar::default()
                .value(seg.amount.round().max(0.0) as u64)
                .text_value(format!("{:.0}%", seg.share * 100.0))
                .style(Style::default().fg(seg.color))
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(6)
        .bar_gap(1);
    frame.render_widget(chart, cols[0]);

    let legend: Vec<Line> = handle
        .segments
        .iter()
        .map(|seg| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(seg.color)),
                Span::raw(format!("{} {:.1}%", seg.label, seg.share * 100.0)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(legend)), cols[1]);
}

fn transaction_columns() -> [Constraint; 5] {
    [
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Min(10),
    ]
}

fn render_transactions(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    analysis: &AnalysisResult,
) {
    let rows = panels::transaction_rows(&analysis.transactions);
    let block = Block::default()
        .title(format!("Transactions ({})", rows.len()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 2 || inner.width == 0 {
        return;
    }

    let widths = transaction_columns();
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    for (col, title) in ["ID", "Date", "Type", "Amount", "Description"]
        .iter()
        .enumerate()
    {
        frame.render_widget(Paragraph::new(*title).style(header_style), header_cols[col]);
    }

    let list_area = sections[1];
    if rows.is_empty() {
        let empty = Paragraph::new("No transactions").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = list_area.height as usize;
    let max_start = rows.len().saturating_sub(visible);
    let start = (state.txn_scroll as usize).min(max_start);
    let end = (start + visible).min(rows.len());

    for (i, row) in rows[start..end].iter().enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let amount_style = if row.high_amount {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        frame.render_widget(Paragraph::new(row.id.clone()), cols[0]);
        frame.render_widget(Paragraph::new(row.date.clone()), cols[1]);
        frame.render_widget(Paragraph::new(row.kind.clone()), cols[2]);
        frame.render_widget(Paragraph::new(row.amount.clone()).style(amount_style), cols[3]);
        frame.render_widget(Paragraph::new(row.description.clone()), cols[4]);
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No log entries yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    if let Some(notice) = &state.notice {
        let style = match notice.kind {
            NoticeKind::Info => Style::default().fg(Color::Cyan),
            NoticeKind::Warning => Style::default().fg(Color::Yellow),
            NoticeKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        };
        frame.render_widget(Paragraph::new(notice.text.clone()).style(style), area);
        return;
    }
    if let Some(status) = state.export.status_line() {
        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::Cyan)),
            area,
        );
        return;
    }
    let keys = "j/k Move | Enter Select | a Analyze | e Export | r Reload | PgUp/PgDn Scroll | ? Help | q Quit";
    frame.render_widget(
        Paragraph::new(keys).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "AML Terminal - Help",
        "",
        "Accounts:",
        "  j/k or ↑/↓   Move cursor",
        "  Enter        Select account",
        "  r            Reload account list",
        "",
        "Analysis:",
        "  a            Analyze selected account",
        "  e            Export analysis to xlsx",
        "  PgUp/PgDn    Scroll transactions",
        "",
        "Global:",
        "  ?            Toggle help",
        "  Esc          Close help / clear notice",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
