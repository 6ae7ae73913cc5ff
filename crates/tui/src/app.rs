use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};
use village_core::{
    BuildingCard, BuildingKind, Locale, ResourceAmounts, ResourceKind, VillageController,
    VillageEvent, VillageSnapshot,
};

const TICK_RATE: Duration = Duration::from_millis(250);
const COLUMN_LEN: usize = 5;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal frontend for a [`VillageController`].
pub struct VillageApp {
    controller: VillageController,
    village_rx: Option<mpsc::UnboundedReceiver<VillageEvent>>,
    state: UiState,
    theme: Theme,
}

impl VillageApp {
    pub fn new(controller: VillageController, locale: Locale) -> Self {
        Self {
            controller,
            village_rx: None,
            state: UiState::new(locale),
            theme: Theme::default(),
        }
    }

    pub fn attach_events(&mut self, receiver: mpsc::UnboundedReceiver<VillageEvent>) {
        self.village_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        self.controller.start();
        info!("Village started");

        let mut village_rx = self.village_rx.take();
        let result = loop {
            if let Err(err) = terminal.draw(|frame| self.draw(frame)) {
                break Err(err.into());
            }
            if self.state.should_quit {
                break Ok(());
            }

            let mut village_closed = false;
            let keep_running = match village_rx.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        maybe_event = event_rx.recv() => self.process_app_event(maybe_event),
                        maybe_village = rx.recv() => {
                            match maybe_village {
                                Some(event) => self.handle_village_event(event),
                                None => village_closed = true,
                            }
                            true
                        }
                    }
                }
                None => {
                    let maybe_event = event_rx.recv().await;
                    self.process_app_event(maybe_event)
                }
            };
            if village_closed {
                village_rx = None;
            }
            if !keep_running {
                break Ok(());
            }
        };

        self.controller.stop();
        restore_terminal(&mut terminal)?;
        result
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                self.handle_key(key);
                true
            }
            Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn handle_village_event(&mut self, event: VillageEvent) {
        match event {
            VillageEvent::Produced(delta) => debug!(?delta, "Production tick"),
            VillageEvent::Constructed(receipt) => {
                debug!(building = %receipt.kind, level = receipt.new_level, "Construction confirmed")
            }
            VillageEvent::ConstructionRejected(err) => debug!(%err, "Construction rejected"),
            VillageEvent::MessageChanged(_) => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.state.move_vertical(-1),
            KeyCode::Down | KeyCode::Char('j') => self.state.move_vertical(1),
            KeyCode::Left | KeyCode::Char('h') => self.state.move_horizontal(-1),
            KeyCode::Right | KeyCode::Char('l') => self.state.move_horizontal(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.build(self.state.selected()),
            KeyCode::Char('L') => {
                self.state.locale = self.state.locale.toggled();
                info!(locale = ?self.state.locale, "Locale changed");
            }
            KeyCode::Char(ch) => {
                if let Some(kind) = quick_build_target(ch) {
                    self.state.cursor = kind as usize;
                    self.build(kind);
                }
            }
            _ => {}
        }
    }

    fn build(&mut self, kind: BuildingKind) {
        if let Err(err) = self.controller.construct(kind) {
            debug!(%err, "Construction attempt failed");
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let snapshot = self.controller.snapshot();
        let area = frame.size();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Length(3),
            ])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(40)])
            .split(rows[3]);

        self.render_title(frame, rows[0]);
        self.render_resources(frame, rows[1], &snapshot);
        self.render_message(frame, rows[2], &snapshot);
        self.render_village(frame, body[0], &snapshot);
        self.render_building_menu(frame, body[1], &snapshot);
        self.render_help(frame, rows[4], &snapshot);
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let (title, tagline) = match self.state.locale {
            Locale::English => ("🏰 Village 🏰", "Build your empire!"),
            Locale::Arabic => ("🏰 ترافيان 🏰", "ابنِ إمبراطوريتك!"),
        };
        let lines = vec![
            Line::from(Span::styled(
                title,
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(tagline, Style::default().fg(self.theme.muted))),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_resources(&self, frame: &mut Frame, area: Rect, snapshot: &VillageSnapshot) {
        let locale = self.state.locale;
        let income = snapshot.income();
        let mut spans = Vec::new();
        for kind in ResourceKind::ALL {
            spans.push(Span::raw(format!("{} ", kind.icon())));
            spans.push(Span::styled(
                snapshot.resources[kind].to_string(),
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" {}", kind.label(locale)),
                Style::default().fg(self.theme.muted),
            ));
            if income[kind] > 0 {
                spans.push(Span::styled(
                    format!(" +{}", income[kind]),
                    Style::default().fg(self.theme.success),
                ));
            }
            spans.push(Span::raw("   "));
        }
        let population_label = match locale {
            Locale::English => "Population",
            Locale::Arabic => "السكان",
        };
        spans.push(Span::raw("👥 "));
        spans.push(Span::styled(
            snapshot.population.to_string(),
            Style::default()
                .fg(self.theme.warning)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {population_label}"),
            Style::default().fg(self.theme.muted),
        ));

        let title = match locale {
            Locale::English => "Resources",
            Locale::Arabic => "الموارد",
        };
        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_message(&self, frame: &mut Frame, area: Rect, snapshot: &VillageSnapshot) {
        let line = match snapshot.message.as_ref() {
            Some(message) => {
                let color = if message.kind.is_error() {
                    self.theme.danger
                } else {
                    self.theme.success
                };
                Line::from(Span::styled(
                    message.text(self.state.locale),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
            }
            None => Line::from(Span::styled(
                idle_status(self.state.locale, snapshot.ticks),
                Style::default().fg(self.theme.muted),
            )),
        };
        let title = match self.state.locale {
            Locale::English => "Status",
            Locale::Arabic => "الحالة",
        };
        let paragraph = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_village(&self, frame: &mut Frame, area: Rect, snapshot: &VillageSnapshot) {
        let locale = self.state.locale;
        let lines: Vec<Line> = BuildingKind::ALL
            .into_iter()
            .map(|kind| {
                let definition = kind.definition();
                let level = snapshot.level(kind);
                let style = if level > 0 {
                    Style::default().fg(self.theme.primary_fg)
                } else {
                    Style::default().fg(self.theme.muted)
                };
                Line::from(Span::styled(
                    format!(
                        "{} {}{}",
                        definition.icon,
                        definition.name(locale),
                        tile_level_suffix(level)
                    ),
                    style,
                ))
            })
            .collect();
        let title = match locale {
            Locale::English => "Village",
            Locale::Arabic => "القرية",
        };
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_building_menu(&self, frame: &mut Frame, area: Rect, snapshot: &VillageSnapshot) {
        let title = match self.state.locale {
            Locale::English => "🔨 Build",
            Locale::Arabic => "🔨 قائمة البناء",
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let cards = snapshot.cards();
        for (column, chunk) in cards.chunks(COLUMN_LEN).enumerate() {
            let Some(column_area) = columns.get(column).copied() else {
                break;
            };
            let items: Vec<ListItem> = chunk
                .iter()
                .enumerate()
                .map(|(row, card)| {
                    let index = column * COLUMN_LEN + row;
                    ListItem::new(self.card_lines(index, card))
                })
                .collect();

            let mut list_state = ListState::default();
            let (cursor_column, cursor_row) = self.state.position();
            if cursor_column == column {
                list_state.select(Some(cursor_row));
            }

            let list = List::new(items)
                .highlight_style(Style::default().bg(self.theme.selection_bg))
                .highlight_symbol("▶ ");
            frame.render_stateful_widget(list, column_area, &mut list_state);
        }
    }

    fn card_lines(&self, index: usize, card: &BuildingCard) -> Vec<Line<'static>> {
        let locale = self.state.locale;
        let name_style = if card.affordable {
            Style::default()
                .fg(self.theme.success)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(self.theme.danger)
                .add_modifier(Modifier::BOLD)
        };
        let level_label = match locale {
            Locale::English => "Level",
            Locale::Arabic => "المستوى",
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", quick_build_key(index)),
                    Style::default().fg(self.theme.muted),
                ),
                Span::raw(format!("{} ", card.definition.icon)),
                Span::styled(card.definition.name(locale).to_string(), name_style),
                Span::styled(
                    format!("  {level_label}: {}", card.level),
                    Style::default().fg(self.theme.accent),
                ),
            ]),
            Line::from(Span::raw(format!("    {}", format_cost(&card.next_cost)))),
        ];
        if let Some((resource, rate)) = card.next_rate {
            let production_label = match locale {
                Locale::English => "Production",
                Locale::Arabic => "إنتاج",
            };
            lines.push(Line::from(Span::styled(
                format!("    {production_label}: +{rate} {}/tick", resource.icon()),
                Style::default().fg(self.theme.warning),
            )));
        }
        lines.push(Line::from(""));
        lines
    }

    fn render_help(&self, frame: &mut Frame, area: Rect, snapshot: &VillageSnapshot) {
        let locale = self.state.locale;
        let line = Line::from(vec![
            Span::raw(help_text(locale)),
            Span::styled(
                format!("   {}", ticker_label(locale, snapshot.running)),
                Style::default().fg(self.theme.muted),
            ),
        ]);
        let title = match locale {
            Locale::English => "Commands",
            Locale::Arabic => "الأوامر",
        };
        let paragraph = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    cursor: usize,
    locale: Locale,
    should_quit: bool,
}

impl UiState {
    fn new(locale: Locale) -> Self {
        Self {
            cursor: 0,
            locale,
            should_quit: false,
        }
    }

    fn selected(&self) -> BuildingKind {
        BuildingKind::ALL[self.cursor.min(BuildingKind::ALL.len() - 1)]
    }

    /// Column and row of the cursor in the two-column menu.
    fn position(&self) -> (usize, usize) {
        (self.cursor / COLUMN_LEN, self.cursor % COLUMN_LEN)
    }

    fn move_vertical(&mut self, delta: isize) {
        let (column, row) = self.position();
        let column_start = column * COLUMN_LEN;
        let column_len = BuildingKind::ALL
            .len()
            .saturating_sub(column_start)
            .min(COLUMN_LEN);
        let row = (row as isize + delta).clamp(0, column_len as isize - 1) as usize;
        self.cursor = column_start + row;
    }

    fn move_horizontal(&mut self, delta: isize) {
        let (column, row) = self.position();
        let columns = BuildingKind::ALL.len().div_ceil(COLUMN_LEN);
        let column = (column as isize + delta).clamp(0, columns as isize - 1) as usize;
        self.cursor = (column * COLUMN_LEN + row).min(BuildingKind::ALL.len() - 1);
    }
}

fn quick_build_key(index: usize) -> char {
    match index {
        9 => '0',
        0..=8 => char::from(b'1' + index as u8),
        _ => ' ',
    }
}

fn quick_build_target(ch: char) -> Option<BuildingKind> {
    let index = match ch {
        '0' => 9,
        '1'..='9' => ch as usize - '1' as usize,
        _ => return None,
    };
    BuildingKind::ALL.get(index).copied()
}

fn tile_level_suffix(level: u32) -> String {
    if level > 0 {
        format!(" ({level})")
    } else {
        String::new()
    }
}

fn idle_status(locale: Locale, ticks: u64) -> String {
    match locale {
        Locale::English => format!("tick {ticks}"),
        Locale::Arabic => format!("الدورة {ticks}"),
    }
}

fn help_text(locale: Locale) -> &'static str {
    match locale {
        Locale::English => "hjkl/arrows select  Enter build  1-0 quick build  L language  q quit",
        Locale::Arabic => "hjkl/الأسهم اختيار  Enter بناء  1-0 بناء سريع  L اللغة  q خروج",
    }
}

fn ticker_label(locale: Locale, running: bool) -> &'static str {
    match (locale, running) {
        (Locale::English, true) => "ticker running",
        (Locale::English, false) => "ticker stopped",
        (Locale::Arabic, true) => "الإنتاج يعمل",
        (Locale::Arabic, false) => "الإنتاج متوقف",
    }
}

fn format_cost(cost: &ResourceAmounts) -> String {
    cost.iter()
        .map(|(kind, amount)| format!("{}{amount}", kind.icon()))
        .collect::<Vec<_>>()
        .join(" ")
}
