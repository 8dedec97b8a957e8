use crate::about::{about_lines, APP_NAME};
use crate::exchange_rates::describe_source;
use crate::models::{convert, ConversionError, RateTable};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;

/// Upper bound of the amount field, in USD.
pub const MAX_AMOUNT: f64 = 9999.0;
const OUTPUT_PLACEHOLDER: &str = "0.00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Amount,
    Currency,
    Convert,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Amount => Focus::Currency,
            Focus::Currency => Focus::Convert,
            Focus::Convert => Focus::Amount,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Amount => Focus::Convert,
            Focus::Currency => Focus::Amount,
            Focus::Convert => Focus::Currency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    /// Validation message attached to the control that caused it.
    Error { anchor: Focus, message: String },
    About,
}

pub struct App {
    table: RateTable,
    codes: Vec<String>,
    pub amount_input: String,
    pub selected: Option<usize>,
    pub focus: Focus,
    pub output: Option<String>,
    pub popup: Option<Popup>,
    pub should_quit: bool,
}

impl App {
    pub fn new(table: RateTable) -> App {
        let codes = table.codes();
        App {
            table,
            codes,
            amount_input: String::new(),
            selected: None,
            focus: Focus::Amount,
            output: None,
            popup: None,
            should_quit: false,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        self.amount_input.parse().ok()
    }

    pub fn selected_code(&self) -> Option<&str> {
        self.selected.map(|i| self.codes[i].as_str())
    }

    pub fn next(&mut self) {
        if self.codes.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i >= self.codes.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    pub fn previous(&mut self) {
        if self.codes.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i == 0 {
                    self.codes.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    pub fn convert(&mut self) {
        match convert(self.amount(), self.selected_code(), &self.table) {
            Ok(result) => self.output = Some(result),
            Err(e) => {
                let anchor = match e {
                    ConversionError::NonPositiveAmount => Focus::Amount,
                    ConversionError::NoCurrency | ConversionError::UnknownCurrency(_) => {
                        Focus::Currency
                    }
                };
                self.popup = Some(Popup::Error {
                    anchor,
                    message: e.to_string(),
                });
            }
        }
    }

    fn push_amount_char(&mut self, c: char) {
        if !(c.is_ascii_digit() || c == '.') {
            return;
        }
        let mut candidate = self.amount_input.clone();
        candidate.push(c);

        // Two decimals at most, like the amount spinner it replaces
        let decimals_ok = match candidate.split_once('.') {
            Some((_, frac)) => frac.len() <= 2 && !frac.contains('.'),
            None => true,
        };
        let in_range = candidate == "." || candidate.parse::<f64>().map_or(false, |v| v <= MAX_AMOUNT);
        if decimals_ok && in_range {
            self.amount_input = candidate;
        }
    }

    fn step_amount(&mut self, delta: f64) {
        let value = (self.amount().unwrap_or(0.0) + delta).clamp(0.0, MAX_AMOUNT);
        self.amount_input = format!("{:.2}", value);
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if self.popup.is_some() {
            // Any key dismisses the popup
            self.popup = None;
            return;
        }

        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.popup = Some(Popup::About),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Enter => self.convert(),
            other => match self.focus {
                Focus::Amount => match other {
                    KeyCode::Char(c) => self.push_amount_char(c),
                    KeyCode::Backspace => {
                        self.amount_input.pop();
                    }
                    KeyCode::Up => self.step_amount(1.0),
                    KeyCode::Down => self.step_amount(-1.0),
                    _ => {}
                },
                Focus::Currency => match other {
                    KeyCode::Down => self.next(),
                    KeyCode::Up => self.previous(),
                    _ => {}
                },
                Focus::Convert => {
                    if other == KeyCode::Char(' ') {
                        self.convert();
                    }
                }
            },
        }
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| draw_ui(f, &app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key(key.code);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn focus_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.size());

    let title = Paragraph::new(APP_NAME)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16),
            Constraint::Length(9),
            Constraint::Min(20),
        ])
        .split(chunks[1]);

    let amount = Paragraph::new(app.amount_input.as_str()).block(
        Block::default()
            .title("Amount")
            .borders(Borders::ALL)
            .border_style(focus_style(app, Focus::Amount)),
    );
    f.render_widget(amount, clip(Rect { height: 3, ..row[0] }, row[0]));

    f.render_widget(
        Paragraph::new("USD as"),
        clip(
            Rect {
                y: row[1].y + 1,
                height: 1,
                ..row[1]
            },
            row[1],
        ),
    );

    let items: Vec<ListItem> = app
        .table
        .iter()
        .map(|entry| {
            let label = if entry.name == entry.code {
                entry.code.clone()
            } else {
                format!("{} ({})", entry.name, entry.code)
            };
            ListItem::new(Line::from(vec![Span::raw(label)]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title("Currency")
                .borders(Borders::ALL)
                .border_style(focus_style(app, Focus::Currency)),
        )
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(app.selected);
    f.render_stateful_widget(list, row[2], &mut state);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(25), Constraint::Min(20)])
        .split(chunks[2]);

    let button = Paragraph::new("Convert").block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(app, Focus::Convert)),
    );
    f.render_widget(button, bottom[0]);

    let output = match &app.output {
        Some(text) => Paragraph::new(text.as_str()),
        None => Paragraph::new(OUTPUT_PLACEHOLDER).style(Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(output.block(Block::default().borders(Borders::ALL)), bottom[1]);

    let status = format!(
        "Rates: {} | Tab: next field  Enter: convert  ?: about  q: quit",
        describe_source(&app.table)
    );
    f.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );

    match &app.popup {
        Some(Popup::Error { anchor, message }) => {
            let area = match anchor {
                Focus::Amount => row[0],
                _ => row[2],
            };
            let rect = clip(popup_rect(area, message.chars().count() as u16 + 4, 3), f.size());
            draw_popup(f, rect, "", &[message.clone()]);
        }
        Some(Popup::About) => {
            let lines = about_lines();
            let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
            let area = centered_rect(f.size(), width, lines.len() as u16 + 2);
            draw_popup(f, area, "About", &lines);
        }
        None => {}
    }
}

fn draw_popup(f: &mut Frame, area: Rect, title: &str, lines: &[String]) {
    let text: Vec<Line> = lines.iter().map(|l| Line::from(l.as_str())).collect();
    let popup = Paragraph::new(text).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

/// The part of `rect` inside `bounds`; zero-sized when they do not overlap.
fn clip(rect: Rect, bounds: Rect) -> Rect {
    let x = rect.x.max(bounds.x);
    let y = rect.y.max(bounds.y);
    let right = rect.right().min(bounds.right());
    let bottom = rect.bottom().min(bounds.bottom());
    Rect {
        x,
        y,
        width: right.saturating_sub(x),
        height: bottom.saturating_sub(y),
    }
}

/// A rect just below the top of `anchor`, starting in its column.
fn popup_rect(anchor: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: anchor.x,
        y: anchor.y + anchor.height.min(3),
        width: width.max(anchor.width),
        height,
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn start_tui(table: RateTable) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(table);
    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}
