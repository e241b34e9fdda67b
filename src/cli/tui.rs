//! Interactive TUI for browsing comparisons and history

use anyhow::{Context, Result};
use crossbeam_channel::{select, unbounded, Receiver};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{BarChart, Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use tracing::warn;

use crate::analysis::{ComparisonResult, FrequencyData, HistoryReport, WalkLimits};
use crate::config::UiConfig;
use crate::git::CommitInfo;
use crate::navigation::{Dataset, Flow, Input, Msg, NavigationState, Row, Side, View, Worker};

/// Colors resolved from the `[ui]` config section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub muted: Color,
    pub highlight: Color,
}

impl Theme {
    pub fn from_config(ui: &UiConfig) -> Self {
        Self {
            accent: parse_color(&ui.accent, Color::Cyan),
            muted: parse_color(&ui.muted, Color::DarkGray),
            highlight: parse_color(&ui.highlight, Color::Blue),
        }
    }
}

fn parse_color(name: &str, fallback: Color) -> Color {
    Color::from_str(name).unwrap_or_else(|_| {
        warn!("Unknown color '{}', using {}", name, fallback);
        fallback
    })
}

pub fn run(
    repo_path: PathBuf,
    flow: Flow,
    initial_query: Option<String>,
    limits: WalkLimits,
    ui: &UiConfig,
) -> Result<()> {
    let (results_tx, results_rx) = unbounded();
    let worker = Worker::new(repo_path, limits, results_tx);
    let mut state = NavigationState::new(flow, initial_query);
    let theme = Theme::from_config(ui);
    let tick = Duration::from_millis(ui.tick_rate_ms.max(10));

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = spawn_input_reader();
    let res = run_app(&mut terminal, &mut state, &worker, &events, &results_rx, &theme, tick);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Forward terminal events onto a channel so they can be selected
/// together with background results.
fn spawn_input_reader() -> Receiver<Event> {
    let (tx, rx) = unbounded();
    let spawned = thread::Builder::new()
        .name("gitpulse-input".to_string())
        .spawn(move || loop {
            match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Terminal input failed: {}", e);
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        warn!("Failed to spawn input thread: {}", e);
    }
    rx
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut NavigationState,
    worker: &Worker,
    events: &Receiver<Event>,
    results: &Receiver<Msg>,
    theme: &Theme,
    tick: Duration,
) -> Result<()> {
    for effect in state.update(Msg::Start) {
        worker.run(effect);
    }

    while !state.should_quit {
        terminal.draw(|f| ui(f, state, theme))?;

        let msg = select! {
            recv(events) -> ev => match ev {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    map_key(key, state.search.active).map(Msg::Input)
                }
                Ok(_) => None,
                // Input is gone; nothing can end the session any more
                Err(_) => return Ok(()),
            },
            recv(results) -> msg => msg.ok(),
            default(tick) => None,
        };

        if let Some(msg) = msg {
            for effect in state.update(msg) {
                worker.run(effect);
            }
        }
    }
    Ok(())
}

/// Decode a key press. While the search box is open printable keys are
/// text, so only Ctrl-C quits.
pub fn map_key(key: KeyEvent, searching: bool) -> Option<Input> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Input::Quit),
            _ => None,
        };
    }

    if searching {
        return match key.code {
            KeyCode::Char(c) => Some(Input::Char(c)),
            KeyCode::Backspace => Some(Input::Backspace),
            KeyCode::Enter => Some(Input::Enter),
            KeyCode::Esc => Some(Input::Escape),
            KeyCode::Up => Some(Input::Up),
            KeyCode::Down => Some(Input::Down),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(Input::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(Input::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Input::Down),
        KeyCode::PageUp => Some(Input::PageUp),
        KeyCode::PageDown => Some(Input::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(Input::Home),
        KeyCode::End | KeyCode::Char('G') => Some(Input::End),
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|n| Input::Select(n as usize)),
        KeyCode::Enter => Some(Input::Enter),
        KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => Some(Input::Back),
        KeyCode::Esc => Some(Input::Escape),
        KeyCode::Char('r') => Some(Input::Refresh),
        KeyCode::Char('/') => Some(Input::ToggleSearch),
        _ => None,
    }
}

fn ui(f: &mut Frame, state: &NavigationState, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, chunks[0], state, theme);

    if let Some(message) = &state.error {
        let text = vec![
            Line::from(Span::styled("Error", Style::default().fg(Color::Red).bold())),
            Line::from(""),
            Line::from(message.as_str()),
            Line::from(""),
            Line::from(Span::styled(
                "Press r to retry or q to quit",
                Style::default().fg(theme.muted),
            )),
        ];
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(" Error "))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, chunks[1]);
    } else if state.data.is_none() {
        let paragraph = Paragraph::new(format!("Loading {}...", state.flow.describe()))
            .style(Style::default().fg(theme.muted))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, chunks[1]);
    } else {
        match state.view {
            View::Overview => render_overview(f, chunks[1], state, theme),
            View::Frequency => render_frequency(f, chunks[1], state, theme),
            _ => render_rows(f, chunks[1], state, theme),
        }
    }

    render_footer(f, chunks[2], state, theme);
}

fn render_header(f: &mut Frame, area: Rect, state: &NavigationState, theme: &Theme) {
    let mut spans = vec![
        Span::styled(" gitpulse ", Style::default().fg(theme.accent).bold()),
        Span::raw("| "),
        Span::styled(state.flow.describe(), Style::default().bold()),
        Span::raw(format!(" | {}", state.view.title())),
    ];
    if !state.view.is_hub() {
        let len = state.visible_rows().len();
        if len > 0 {
            spans.push(Span::styled(
                format!(" | {}/{}", state.cursor + 1, len),
                Style::default().fg(theme.muted),
            ));
        }
    }
    if state.loading {
        spans.push(Span::styled(
            "  loading...",
            Style::default().fg(Color::Yellow),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame, area: Rect, state: &NavigationState, theme: &Theme) {
    if state.search.active {
        let line = Line::from(vec![
            Span::styled(" /", Style::default().fg(theme.accent).bold()),
            Span::raw(state.search.query.as_str()),
            Span::styled("_", Style::default().fg(theme.accent)),
            Span::styled(
                "   Enter:Keep  Esc:Clear",
                Style::default().fg(theme.muted),
            ),
        ]);
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut help = if state.view.is_hub() {
        let selectors = state
            .flow
            .details()
            .iter()
            .enumerate()
            .map(|(i, view)| format!("{}:{}", i + 1, view.title()))
            .collect::<Vec<_>>()
            .join("  ");
        format!(" {selectors}  /:Search  r:Refresh  q:Quit")
    } else {
        " j/k:Navigate  Esc:Back  /:Search  r:Refresh  q:Quit".to_string()
    };
    if !state.search.query.is_empty() {
        help.push_str(&format!("  [filter: {}]", state.search.query));
    }
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(theme.muted)),
        area,
    );
}

fn render_overview(f: &mut Frame, area: Rect, state: &NavigationState, theme: &Theme) {
    let Some(result) = state.comparison() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);

    let summary = Paragraph::new(comparison_summary(result, theme))
        .block(Block::default().borders(Borders::ALL).title(" Summary "))
        .wrap(Wrap { trim: false });
    f.render_widget(summary, chunks[0]);
    render_rows(f, chunks[1], state, theme);
}

fn comparison_summary<'a>(result: &'a ComparisonResult, theme: &Theme) -> Vec<Line<'a>> {
    let stats = &result.stats;
    let label = Style::default().bold();
    let mut lines = Vec::new();

    match &result.merge_base {
        Some(base) => lines.push(Line::from(vec![
            Span::styled("Merge base: ", label),
            Span::styled(base.hash.as_str(), Style::default().fg(Color::Yellow)),
            Span::raw(format!("  {}", base.message)),
            Span::styled(
                format!("  ({} days ago)", stats.days_since_base),
                Style::default().fg(theme.muted),
            ),
        ])),
        None => lines.push(Line::from(vec![
            Span::styled("Merge base: ", label),
            Span::styled(
                "none (histories are unrelated)",
                Style::default().fg(Color::Red),
            ),
        ])),
    }
    for (name, ahead, truncated) in [
        (&result.ref1, stats.ref1_ahead_by, result.ref1_truncated),
        (&result.ref2, stats.ref2_ahead_by, result.ref2_truncated),
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("{name}: "), Style::default().fg(theme.accent).bold()),
            Span::raw(format!("{} ahead", count(ahead, truncated))),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Shared preview: ", label),
        Span::raw(count(stats.shared_commits, result.shared_truncated)),
        Span::styled("  Total: ", label),
        Span::raw(stats.total_commits.to_string()),
    ]));
    if result.is_identical() {
        lines.push(Line::from(Span::styled(
            "Both refs point at the same commit",
            Style::default().fg(Color::Green),
        )));
    }
    lines
}

fn render_frequency(f: &mut Frame, area: Rect, state: &NavigationState, theme: &Theme) {
    let Some(report) = state.history() else {
        return;
    };
    let freq = &report.frequency;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Min(5),
        ])
        .split(area);

    let summary = Paragraph::new(frequency_summary(freq, theme))
        .block(Block::default().borders(Borders::ALL).title(" Activity "));
    f.render_widget(summary, chunks[0]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);

    let weekday_labels: Vec<String> = freq
        .weekday_counts()
        .map(|(day, _)| day.to_string())
        .collect();
    let weekday_data: Vec<(&str, u64)> = weekday_labels
        .iter()
        .zip(freq.commits_by_weekday.iter())
        .map(|(label, n)| (label.as_str(), *n as u64))
        .collect();
    let weekdays = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" By weekday "))
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme.accent))
        .value_style(Style::default().fg(Color::Black).bg(theme.accent))
        .data(weekday_data.as_slice());
    f.render_widget(weekdays, charts[0]);

    let hour_labels: Vec<String> = (0..24).map(|h| format!("{h:02}")).collect();
    let hour_data: Vec<(&str, u64)> = hour_labels
        .iter()
        .zip(freq.commits_by_hour.iter())
        .map(|(label, n)| (label.as_str(), *n as u64))
        .collect();
    let hours = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" By hour "))
        .bar_width(2)
        .bar_gap(0)
        .bar_style(Style::default().fg(theme.accent))
        .value_style(Style::default().fg(Color::Black).bg(theme.accent))
        .data(hour_data.as_slice());
    f.render_widget(hours, charts[1]);

    render_rows(f, chunks[2], state, theme);
}

fn frequency_summary<'a>(freq: &FrequencyData, theme: &Theme) -> Vec<Line<'a>> {
    let streaks = &freq.streaks;
    let scanned = if freq.truncated {
        format!("{}+ commits", freq.total_commits)
    } else {
        format!("{} commits", freq.total_commits)
    };
    let longest_span = match (streaks.longest_start, streaks.longest_end) {
        (Some(start), Some(end)) => format!(" ({start} to {end})"),
        _ => String::new(),
    };
    vec![
        Line::from(format!(
            "{} on {} active days, {:.1} per day, busiest day {}",
            scanned,
            freq.total_active_days,
            freq.average_per_active_day(),
            freq.max_commits_per_day
        )),
        Line::from(vec![
            Span::raw("Current streak: "),
            Span::styled(
                format!("{} days", streaks.current),
                Style::default().fg(Color::Green).bold(),
            ),
            Span::raw("   Longest: "),
            Span::styled(
                format!("{} days", streaks.longest),
                Style::default().fg(Color::Green).bold(),
            ),
            Span::styled(longest_span, Style::default().fg(theme.muted)),
        ]),
    ]
}

fn render_rows(f: &mut Frame, area: Rect, state: &NavigationState, theme: &Theme) {
    let rows = state.visible_rows();
    let title = match (&state.data, state.view) {
        (_, View::Overview) => " Views ".to_string(),
        (Some(Dataset::History(report)), View::Timeline) if report.timeline_truncated => {
            format!(" Timeline (latest {}) ", report.timeline.len())
        }
        (_, view) => format!(" {} ", view.title()),
    };

    if rows.is_empty() {
        let message = if state.search.query.is_empty() {
            "Nothing to show".to_string()
        } else {
            format!("No matches for '{}'", state.search.query)
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(theme.muted))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| ListItem::new(row_line(row, state, theme)))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(theme.highlight).fg(Color::White))
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(state.cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn row_line<'a>(row: &Row<'a>, state: &NavigationState, theme: &Theme) -> Line<'a> {
    let muted = Style::default().fg(theme.muted);
    match row {
        Row::Menu { key, view } => Line::from(vec![
            Span::styled(format!("[{key}] "), Style::default().fg(theme.accent).bold()),
            Span::raw(view.title()),
            Span::styled(menu_hint(state, *view), muted),
        ]),
        Row::Commit { commit, side } => {
            let commit: &'a CommitInfo = commit;
            let mut spans = Vec::new();
            if let Some(side) = side {
                let (marker, color) = match side {
                    Side::Ref1 => ("< ", Color::Magenta),
                    Side::Ref2 => ("> ", Color::Green),
                };
                spans.push(Span::styled(marker, Style::default().fg(color).bold()));
            }
            spans.extend(commit_spans(commit, theme));
            Line::from(spans)
        }
        Row::Tag(tag) => {
            let tag = *tag;
            let mut spans = vec![Span::styled(
                format!("{:<20} ", tag.name),
                Style::default().fg(theme.accent),
            )];
            spans.extend(commit_spans(&tag.target, theme));
            Line::from(spans)
        }
        Row::Author { name, count } => Line::from(vec![
            Span::styled(format!("{count:>6}  "), Style::default().bold()),
            Span::raw(*name),
        ]),
        Row::Field { label, value } => Line::from(vec![
            Span::styled(format!("{label:<10} "), Style::default().bold()),
            Span::raw(value.clone()),
        ]),
    }
}

fn commit_spans<'a>(commit: &'a CommitInfo, theme: &Theme) -> Vec<Span<'a>> {
    let muted = Style::default().fg(theme.muted);
    vec![
        Span::styled(commit.hash.as_str(), Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("  {}  ", commit.timestamp.format("%Y-%m-%d %H:%M")),
            muted,
        ),
        Span::raw(commit.message.as_str()),
        Span::styled(format!("  {}", commit.author), muted),
    ]
}

/// Short count shown next to a hub entry
fn menu_hint(state: &NavigationState, view: View) -> String {
    match (state.comparison(), state.history(), view) {
        (Some(result), _, View::DivergenceDetail) => format!(
            "  ({} + {} commits)",
            count(result.stats.ref1_ahead_by, result.ref1_truncated),
            count(result.stats.ref2_ahead_by, result.ref2_truncated)
        ),
        (Some(result), _, View::SharedHistoryDetail) => format!(
            "  ({} commits)",
            count(result.shared_commits.len(), result.shared_truncated)
        ),
        (_, Some(report), View::Tags) => format!("  ({})", report.tags.len()),
        (_, Some(report), View::Merges) => format!("  ({})", report.merges.len()),
        (_, Some(report), View::Frequency) => history_hint(report),
        _ => String::new(),
    }
}

fn history_hint(report: &HistoryReport) -> String {
    format!("  ({} day streak)", report.frequency.streaks.current)
}

fn count(n: usize, truncated: bool) -> String {
    if truncated {
        format!("{n}+")
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_map_key_browse_mode() {
        assert_eq!(map_key(key(KeyCode::Char('q')), false), Some(Input::Quit));
        assert_eq!(map_key(key(KeyCode::Char('j')), false), Some(Input::Down));
        assert_eq!(map_key(key(KeyCode::Char('3')), false), Some(Input::Select(3)));
        assert_eq!(map_key(key(KeyCode::Char('0')), false), None);
        assert_eq!(map_key(key(KeyCode::Char('/')), false), Some(Input::ToggleSearch));
        assert_eq!(map_key(key(KeyCode::Esc), false), Some(Input::Escape));
        assert_eq!(map_key(key(KeyCode::Char('r')), false), Some(Input::Refresh));
    }

    #[test]
    fn test_map_key_search_mode_types_text() {
        assert_eq!(map_key(key(KeyCode::Char('q')), true), Some(Input::Char('q')));
        assert_eq!(map_key(key(KeyCode::Char('1')), true), Some(Input::Char('1')));
        assert_eq!(map_key(key(KeyCode::Backspace), true), Some(Input::Backspace));
        assert_eq!(map_key(key(KeyCode::Enter), true), Some(Input::Enter));
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c, true), Some(Input::Quit));
        assert_eq!(map_key(ctrl_c, false), Some(Input::Quit));
    }

    #[test]
    fn test_theme_falls_back_on_unknown_color() {
        let ui = UiConfig {
            accent: "not-a-color".to_string(),
            muted: "gray".to_string(),
            ..UiConfig::default()
        };
        let theme = Theme::from_config(&ui);
        assert_eq!(theme.accent, Color::Cyan);
        assert_eq!(theme.muted, Color::Gray);
    }

    #[test]
    fn test_render_loading_and_error() {
        let theme = Theme::from_config(&UiConfig::default());
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let mut state = NavigationState::new(
            Flow::Compare {
                ref1: "main".to_string(),
                ref2: "HEAD".to_string(),
            },
            None,
        );

        terminal.draw(|f| ui(f, &state, &theme)).unwrap();
        assert!(screen_text(&terminal).contains("Loading main...HEAD"));

        state.update(Msg::Start);
        state.update(Msg::Loaded {
            generation: state.generation,
            outcome: Err("Ref not found: 'main'".to_string()),
        });
        terminal.draw(|f| ui(f, &state, &theme)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Ref not found: 'main'"));
        assert!(text.contains("Press r to retry"));
    }
}
