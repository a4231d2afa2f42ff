//! Terminal view over a [`Session`].
//!
//! The view only reads snapshots and calls the session's control
//! operations; it never touches engine state directly.

use std::io;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::debug;

use crate::config::colors;
use crate::engine::StepOutcome;
use crate::scheduler::Cadence;
use crate::session::Session;
use crate::state::{ExecutionState, OutputEvent};

/// The tape pane always shows at least this many cells.
const MIN_TAPE_WINDOW: usize = 30;

/// Separator after every this many tape cells.
const TAPE_GROUP: usize = 8;

const FRAME_RATE: Duration = Duration::from_millis(33);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Focus {
    Program,
    Output,
    Tape,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CellDisplay {
    Binary,
    Ascii,
}

struct Editor {
    buffer: Vec<String>,
    cursor_row: usize,
    cursor_col: usize,
    scroll_row: usize,
}

impl Editor {
    fn new(source: &str) -> Self {
        let mut buffer: Vec<String> = source.lines().map(str::to_string).collect();
        if buffer.is_empty() {
            buffer.push(String::new());
        }
        Self {
            buffer,
            cursor_row: 0,
            cursor_col: 0,
            scroll_row: 0,
        }
    }

    fn text(&self) -> String {
        self.buffer.join("\n")
    }
}

pub struct App {
    session: Session,
    source: String,
    filename: Option<String>,

    focused: Focus,
    display: CellDisplay,
    // When set, panes scroll to keep the current instruction / cell / output visible.
    follow: bool,
    program_scroll: usize,
    tape_scroll: usize,
    output_scroll: usize,

    editor: Option<Editor>,
    show_help: bool,
    status_message: String,
    was_running: bool,
}

impl App {
    pub fn new(session: Session, source: String, filename: Option<String>) -> Self {
        Self {
            session,
            source,
            filename,
            focused: Focus::Program,
            display: CellDisplay::Binary,
            follow: true,
            program_scroll: 0,
            tape_scroll: 0,
            output_scroll: 0,
            editor: None,
            show_help: false,
            status_message: String::from("Ready"),
            was_running: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Advance any active run and note when it stops on its own.
    pub fn on_tick(&mut self, now: Instant) {
        if self.session.tick(now) > 0 {
            self.follow = true;
        }
        let running = self.session.is_running();
        if self.was_running && !running {
            self.status_message = finished_message(self.session.snapshot());
        }
        self.was_running = running;
    }

    fn step(&mut self) {
        self.follow = true;
        self.status_message = match self.session.step() {
            StepOutcome::Frozen => "Program finished; reset to run again".to_string(),
            StepOutcome::Applied { halted: true, .. } => "Done".to_string(),
            StepOutcome::Applied { ip, token, effect, .. } => format!("{ip}: {token}  {effect}"),
            StepOutcome::Faulted(fault) => format!("Halted: {fault}"),
        };
    }

    fn start(&mut self, cadence: Cadence, now: Instant) {
        self.follow = true;
        self.session.start(cadence, now);
        self.status_message = if self.session.is_running() {
            match cadence {
                Cadence::Normal => "Running...".to_string(),
                Cadence::FastForward => "Running (fast)...".to_string(),
            }
        } else {
            "Program finished; reset to run again".to_string()
        };
        self.was_running = self.session.is_running();
    }

    fn pause(&mut self) {
        if self.session.is_running() {
            self.status_message = "Paused".to_string();
        }
        self.session.pause();
        self.was_running = false;
    }

    fn reset(&mut self) {
        self.session.reset();
        self.reset_view();
        self.status_message = "Reset".to_string();
    }

    fn reset_view(&mut self) {
        self.follow = true;
        self.program_scroll = 0;
        self.tape_scroll = 0;
        self.output_scroll = 0;
        self.was_running = false;
    }

    fn apply_edit(&mut self) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        self.source = editor.text();
        self.session.replace_program(&self.source);
        self.reset_view();
        self.status_message = format!("Loaded {} instructions", self.session.program().len());
        debug!(target: "tui", tokens = self.session.program().len(), "edit_applied");
    }
}

fn finished_message(state: &ExecutionState) -> String {
    match state.fault() {
        Some(fault) => format!("Halted: {fault}"),
        None if state.is_done() => "Done".to_string(),
        None => "Paused".to_string(),
    }
}

/// Start the visualizer on `app`, restoring the terminal on the way out.
pub fn run(app: &mut App) -> io::Result<()> {
    // terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let res = run_app(&mut terminal, app);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Wake up for the next scheduled step, or at frame rate when idle.
        let now = Instant::now();
        let timeout = app
            .session
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(FRAME_RATE)
            .min(FRAME_RATE);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key, Instant::now()) {
                    break;
                }
            }
        }

        app.on_tick(Instant::now());
    }

    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    let size = f.area();

    // Root: vertical layout -> main area + status bar
    let root = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Min(1), Constraint::Length(2)].as_ref())
        .split(size);

    let main_area = root[0];
    let status_area = root[1];

    // Main area: program + output on the left, tape on the right
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
        .split(main_area);

    let left_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(10)].as_ref())
        .split(cols[0]);

    if app.editor.is_some() {
        draw_editor(f, left_rows[0], app);
    } else {
        draw_program(f, left_rows[0], app);
    }
    draw_output(f, left_rows[1], app);
    draw_tape(f, cols[1], app);
    draw_status(f, status_area, app);

    if app.show_help {
        draw_help_overlay(f, size);
    }
}

fn pane_block(title: String, focused: bool, focused_color: Color, unfocused_color: Color) -> Block<'static> {
    let color = if focused { focused_color } else { unfocused_color };
    Block::default()
        .title(Span::styled(title, Style::default().fg(color)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn draw_program(f: &mut Frame, area: Rect, app: &mut App) {
    let c = colors();
    let program = app.session.program();
    let state = app.session.snapshot();
    let title = match app.filename.as_deref() {
        Some(path) => format!("Program - {path} ({} instructions)", program.len()),
        None => format!("Program ({} instructions)", program.len()),
    };
    let block = pane_block(
        title,
        app.focused == Focus::Program,
        c.program_title_focused,
        c.program_title_unfocused,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    if program.is_empty() {
        f.render_widget(Paragraph::new("<no instructions>"), inner);
        return;
    }

    // Two columns per token: the token and a space.
    let per_row = (inner.width as usize / 2).max(1);
    let height = (inner.height as usize).max(1);
    let rows = program.len().div_ceil(per_row);
    let current = state.instruction_pointer();
    if app.follow {
        app.program_scroll = scroll_into_view(app.program_scroll, current / per_row, height);
    }
    app.program_scroll = app.program_scroll.min(rows.saturating_sub(1));

    let token_style = Style::default().fg(c.program_token);
    let current_style = Style::default()
        .fg(c.program_current)
        .add_modifier(Modifier::REVERSED | Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::with_capacity(height);
    for row in app.program_scroll..(app.program_scroll + height).min(rows) {
        let start = row * per_row;
        let end = (start + per_row).min(program.len());
        let mut spans: Vec<Span<'static>> = Vec::with_capacity((end - start) * 2);
        for (i, token) in program.tokens()[start..end].iter().enumerate() {
            let style = if start + i == current { current_style } else { token_style };
            spans.push(Span::styled(token.to_string(), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_editor(f: &mut Frame, area: Rect, app: &mut App) {
    let c = colors();
    let block = pane_block(
        "Edit program - Ctrl+S/F5 apply, Esc cancel".to_string(),
        true,
        c.program_title_focused,
        c.program_title_unfocused,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(editor) = app.editor.as_mut() else {
        return;
    };
    let height = (inner.height as usize).max(1);
    editor.scroll_row = scroll_into_view(editor.scroll_row, editor.cursor_row, height);

    let end = (editor.scroll_row + height).min(editor.buffer.len());
    let lines: Vec<Line> = editor.buffer[editor.scroll_row..end]
        .iter()
        .map(|l| Line::raw(l.clone()))
        .collect();
    f.render_widget(Paragraph::new(lines), inner);

    let row = editor.cursor_row.saturating_sub(editor.scroll_row);
    let col = editor.cursor_col.min(inner.width.saturating_sub(1) as usize);
    f.set_cursor_position(Position::new(inner.x + col as u16, inner.y + row as u16));
}

fn draw_output(f: &mut Frame, area: Rect, app: &mut App) {
    let c = colors();
    let block = pane_block(
        "Output".to_string(),
        app.focused == Focus::Output,
        c.output_title_focused,
        c.output_title_unfocused,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let output = app.session.snapshot().output();
    if output.is_empty() {
        f.render_widget(Paragraph::new("<no output yet>"), inner);
        return;
    }

    let height = (inner.height as usize).max(1);
    let last = output.len() - 1;
    if app.follow {
        app.output_scroll = scroll_into_view(app.output_scroll, last, height);
    }
    app.output_scroll = app.output_scroll.min(last);

    let end = (app.output_scroll + height).min(output.len());
    let lines: Vec<Line> = (app.output_scroll..end)
        .map(|i| {
            let event = &output[i];
            let mut style = match event {
                OutputEvent::Value(_) => Style::default().fg(c.output_value),
                OutputEvent::Error(_) => Style::default().fg(c.output_error),
            };
            if i == last {
                style = style.add_modifier(Modifier::BOLD);
            }
            Line::from(Span::styled(output_line(event, app.display), style))
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn output_line(event: &OutputEvent, display: CellDisplay) -> String {
    match (event, display) {
        (OutputEvent::Value(v), CellDisplay::Ascii) => format!(": {v:>3}  {}", cell_ascii(*v)),
        _ => event.to_string(),
    }
}

fn draw_tape(f: &mut Frame, area: Rect, app: &mut App) {
    let c = colors();
    let state = app.session.snapshot();
    let mode = match app.display {
        CellDisplay::Binary => "bin",
        CellDisplay::Ascii => "ascii",
    };
    let block = pane_block(
        format!("Tape ({} cells, {mode})", state.tape().capacity()),
        app.focused == Focus::Tape,
        c.tape_border_focused,
        c.tape_border_unfocused,
    );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let window = tape_window(state);
    let mut lines: Vec<Line> = Vec::with_capacity(window.clone().count() * 9 / 8 + 1);
    let mut current_line = 0usize;
    for index in window {
        let value = state.tape().get(index).unwrap_or(0);
        let is_current = index == state.tape_pointer();
        if is_current {
            current_line = lines.len();
        }

        let value_text = match app.display {
            CellDisplay::Binary => cell_binary(value),
            CellDisplay::Ascii => format!("{:>4}", cell_ascii(value)),
        };
        let value_style = if is_current {
            Style::default()
                .fg(c.tape_cell_pointer)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else if value == 0 {
            Style::default().fg(c.tape_cell_empty)
        } else {
            Style::default().fg(c.tape_cell_nonzero)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{index:>5} "), Style::default().fg(c.tape_index)),
            Span::styled(value_text, value_style),
            Span::styled(format!(" {value:>3}"), Style::default().fg(c.tape_index)),
        ]));

        if index % TAPE_GROUP == TAPE_GROUP - 1 {
            lines.push(Line::styled(
                "─".repeat(inner.width as usize),
                Style::default().fg(c.tape_index),
            ));
        }
    }

    let height = (inner.height as usize).max(1);
    if app.follow {
        app.tape_scroll = scroll_into_view(app.tape_scroll, current_line, height);
    }
    app.tape_scroll = app.tape_scroll.min(lines.len().saturating_sub(1));

    let visible: Vec<Line> = lines.into_iter().skip(app.tape_scroll).take(height).collect();
    f.render_widget(Paragraph::new(visible), inner);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let c = colors();
    let state = app.session.snapshot();
    let (run_state, run_color) = match app.session.running_cadence() {
        Some(Cadence::Normal) => ("Running", c.status_running),
        Some(Cadence::FastForward) => ("Running (fast)", c.status_running),
        None if state.is_done() => ("Done", c.status_done),
        None => ("Paused", c.status_text),
    };
    let program_len = app.session.program().len();
    let status = format!(
        " IP: {}/{} | Ptr: {} | Cell: {} | Steps: {} | F1 for Help ",
        state.instruction_pointer(),
        program_len,
        state.tape_pointer(),
        state.current_cell(),
        app.session.steps(),
    );
    let block = Block::default().borders(Borders::TOP);
    f.render_widget(block, area);
    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(1),
    };
    let line = Line::from(vec![
        Span::styled(format!(" {run_state} "), Style::default().fg(run_color).add_modifier(Modifier::BOLD)),
        Span::styled("|", Style::default().fg(c.status_text)),
        Span::styled(status, Style::default().fg(c.status_text)),
        Span::styled(format!("| {}", app.status_message), Style::default().fg(c.help_hint)),
    ]);
    f.render_widget(Paragraph::new(line), inner);
}

fn draw_help_overlay(f: &mut Frame, area: Rect) {
    let c = colors();
    let w = area.width.saturating_sub(area.width / 4);
    let h = area.height.saturating_sub(area.height / 3);
    let x = area.x + (area.width - w) / 2;
    let y = area.y + (area.height - h) / 2;
    let rect = Rect { x, y, width: w, height: h };

    let block = Block::default()
        .title(Span::styled("Help", Style::default().fg(c.dialog_title)))
        .borders(Borders::ALL)
        .style(Style::default().bg(c.dialog_bg));
    f.render_widget(Clear, rect);
    f.render_widget(block, rect);

    let text = vec![
        Line::raw("s/Right: Step one instruction"),
        Line::raw("r/F5: Run   f: Run (fast)   p/Space: Pause   x: Reset"),
        Line::raw("a: Toggle ASCII / binary cells"),
        Line::raw("e: Edit program (Ctrl+S/F5 apply, Esc cancel)"),
        Line::raw("Tab/Shift+Tab: Switch pane focus"),
        Line::raw("Up/Down/PageUp/PageDown: Scroll focused pane (c: follow again)"),
        Line::raw("F1/?: Toggle this help"),
        Line::raw("q/Esc/Ctrl+Q: Quit"),
    ];
    let inner = Rect {
        x: rect.x + 2,
        y: rect.y + 2,
        width: rect.width.saturating_sub(4),
        height: rect.height.saturating_sub(4),
    };
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(c.dialog_text))
            .wrap(Wrap { trim: false }),
        inner,
    );
}

/// Returns true when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent, now: Instant) -> bool {
    if app.editor.is_some() {
        handle_editor_key(app, key);
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') => return true,
            _ => return false,
        }
    }

    match key.code {
        KeyCode::F(1) | KeyCode::Char('?') => {
            app.show_help = !app.show_help;
        }
        KeyCode::Esc => {
            // Close help when open; otherwise quit
            if app.show_help {
                app.show_help = false;
            } else {
                return true;
            }
        }
        KeyCode::Char('q') => return true,
        KeyCode::Char('s') | KeyCode::Right => app.step(),
        KeyCode::Char('r') | KeyCode::F(5) => app.start(Cadence::Normal, now),
        KeyCode::Char('f') => app.start(Cadence::FastForward, now),
        KeyCode::Char('p') | KeyCode::Char(' ') => app.pause(),
        KeyCode::Char('x') => app.reset(),
        KeyCode::Char('a') => {
            app.display = match app.display {
                CellDisplay::Binary => CellDisplay::Ascii,
                CellDisplay::Ascii => CellDisplay::Binary,
            };
        }
        KeyCode::Char('e') => {
            app.pause();
            app.editor = Some(Editor::new(&app.source));
            app.status_message = "Editing".to_string();
        }
        KeyCode::Char('c') => app.follow = true,
        KeyCode::Tab => {
            app.focused = match app.focused {
                Focus::Program => Focus::Output,
                Focus::Output => Focus::Tape,
                Focus::Tape => Focus::Program,
            };
        }
        KeyCode::BackTab => {
            app.focused = match app.focused {
                Focus::Program => Focus::Tape,
                Focus::Output => Focus::Program,
                Focus::Tape => Focus::Output,
            };
        }
        KeyCode::Up => scroll_focused(app, -1),
        KeyCode::Down => scroll_focused(app, 1),
        KeyCode::PageUp => scroll_focused(app, -10),
        KeyCode::PageDown => scroll_focused(app, 10),
        _ => {}
    }
    false
}

fn scroll_focused(app: &mut App, delta: isize) {
    app.follow = false;
    let offset = match app.focused {
        Focus::Program => &mut app.program_scroll,
        Focus::Output => &mut app.output_scroll,
        Focus::Tape => &mut app.tape_scroll,
    };
    *offset = offset.saturating_add_signed(delta);
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    let apply = matches!(key.code, KeyCode::F(5))
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s'));
    if apply {
        app.apply_edit();
        return;
    }
    if key.code == KeyCode::Esc {
        app.editor = None;
        app.status_message = "Edit cancelled".to_string();
        return;
    }

    let Some(ed) = app.editor.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Left => {
            if ed.cursor_col > 0 {
                ed.cursor_col -= 1;
            } else if ed.cursor_row > 0 {
                ed.cursor_row -= 1;
                ed.cursor_col = ed.buffer[ed.cursor_row].chars().count();
            }
        }
        KeyCode::Right => {
            let len = ed.buffer[ed.cursor_row].chars().count();
            if ed.cursor_col < len {
                ed.cursor_col += 1;
            } else if ed.cursor_row + 1 < ed.buffer.len() {
                ed.cursor_row += 1;
                ed.cursor_col = 0;
            }
        }
        KeyCode::Up => {
            ed.cursor_row = ed.cursor_row.saturating_sub(1);
        }
        KeyCode::Down => {
            if ed.cursor_row + 1 < ed.buffer.len() {
                ed.cursor_row += 1;
            }
        }
        KeyCode::Home => ed.cursor_col = 0,
        KeyCode::End => ed.cursor_col = ed.buffer[ed.cursor_row].chars().count(),
        KeyCode::Enter => {
            let line = &mut ed.buffer[ed.cursor_row];
            let split = nth_char_to_byte_idx(line, ed.cursor_col);
            let right = line.split_off(split);
            ed.buffer.insert(ed.cursor_row + 1, right);
            ed.cursor_row += 1;
            ed.cursor_col = 0;
        }
        KeyCode::Backspace => {
            if ed.cursor_col > 0 {
                let line = &mut ed.buffer[ed.cursor_row];
                let start = nth_char_to_byte_idx(line, ed.cursor_col - 1);
                let end = nth_char_to_byte_idx(line, ed.cursor_col);
                line.drain(start..end);
                ed.cursor_col -= 1;
            } else if ed.cursor_row > 0 {
                let cur = ed.buffer.remove(ed.cursor_row);
                ed.cursor_row -= 1;
                ed.cursor_col = ed.buffer[ed.cursor_row].chars().count();
                ed.buffer[ed.cursor_row].push_str(&cur);
            }
        }
        KeyCode::Delete => {
            let len_chars = ed.buffer[ed.cursor_row].chars().count();
            if ed.cursor_col < len_chars {
                let line = &mut ed.buffer[ed.cursor_row];
                let start = nth_char_to_byte_idx(line, ed.cursor_col);
                let end = nth_char_to_byte_idx(line, ed.cursor_col + 1);
                line.drain(start..end);
            } else if ed.cursor_row + 1 < ed.buffer.len() {
                let next = ed.buffer.remove(ed.cursor_row + 1);
                ed.buffer[ed.cursor_row].push_str(&next);
            }
        }
        KeyCode::Char(ch) => {
            // Only insert plain characters; avoid inserting on Ctrl/Alt combos
            let plain = !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
            if plain && !ch.is_control() {
                let line = &mut ed.buffer[ed.cursor_row];
                let at = nth_char_to_byte_idx(line, ed.cursor_col);
                line.insert(at, ch);
                ed.cursor_col += 1;
            }
        }
        _ => {}
    }

    ed.cursor_row = ed.cursor_row.min(ed.buffer.len() - 1);
    ed.cursor_col = ed.cursor_col.min(ed.buffer[ed.cursor_row].chars().count());
}

fn nth_char_to_byte_idx(s: &str, nth: usize) -> usize {
    match s.char_indices().nth(nth) {
        Some((i, _)) => i,
        None => s.len(),
    }
}

/// New scroll offset that keeps `target` inside a `height`-row viewport.
/// A target above the viewport or below it is brought to the top row.
fn scroll_into_view(scroll: usize, target: usize, height: usize) -> usize {
    if target < scroll || target >= scroll + height.max(1) {
        target
    } else {
        scroll
    }
}

/// Cells the tape pane shows: from the lowest visited cell to the highest,
/// and never fewer than `MIN_TAPE_WINDOW` when the tape is that large.
fn tape_window(state: &ExecutionState) -> RangeInclusive<usize> {
    let last = state.tape().capacity() - 1;
    let end = state.visited_max().max(MIN_TAPE_WINDOW - 1).min(last);
    state.visited_min()..=end
}

/// Eight bits, split into nibbles: `0000 1000`.
fn cell_binary(value: u8) -> String {
    format!("{:04b} {:04b}", value >> 4, value & 0x0F)
}

/// Printable ASCII as-is, whitespace escaped, everything else as `\xHH`.
fn cell_ascii(value: u8) -> String {
    match value {
        0x20..=0x7E => format!("'{}'", value as char),
        b'\n' => "\\n".to_string(),
        b'\r' => "\\r".to_string(),
        b'\t' => "\\t".to_string(),
        _ => format!("\\x{value:02X}"),
    }
}
