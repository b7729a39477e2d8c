//! Terminal front end: draws the store and turns keys and mouse input into
//! store operations.

mod edit;

use std::io::stdout;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use gridpad_config::Settings;
use gridpad_core::Point;
use gridpad_engine::{
    Alignment, Cell, CellPatch, Sheet, Store, COLUMNS, DEFAULT_FONT_SIZE, ROWS,
};

use crate::util;
use edit::EditState;

/// Row-number gutter: up to two digits, right-aligned in three, plus a space.
const ROW_GUTTER: usize = 4;
/// Two clicks on the same cell within this window start an edit.
const DOUBLE_CLICK: Duration = Duration::from_millis(400);
const PAGE_ROWS: isize = 20;
const MIN_FONT_SIZE: u32 = 1;
const MAX_FONT_SIZE: u32 = 72;

struct Areas {
    title: Rect,
    grid: Rect,
    edit_line: Rect,
    status: Option<Rect>,
}

struct TuiApp {
    store: Store,
    settings: Settings,
    scroll_row: usize,
    scroll_col: usize,
    edit: Option<EditState>,
    status_message: Option<String>,
    should_quit: bool,
    /// The last key was a refused `q`
    confirm_quit: bool,
    show_help: bool,
    /// Terminal size as of the last frame
    screen: Rect,
    last_click: Option<(Point, Instant)>,
    /// Set by the store subscription and by UI-only state changes
    dirty: Rc<std::cell::Cell<bool>>,
}

impl TuiApp {
    fn new(settings: Settings) -> Self {
        let mut store = Store::with_paste_layout(settings.paste_layout);
        let dirty = Rc::new(std::cell::Cell::new(true));
        let flag = Rc::clone(&dirty);
        store.subscribe(Box::new(move |_| flag.set(true)));
        store.select_cell(Point::new(0, 0));

        Self {
            store,
            settings,
            scroll_row: 0,
            scroll_col: 0,
            edit: None,
            status_message: None,
            should_quit: false,
            confirm_quit: false,
            show_help: false,
            screen: Rect::default(),
            last_click: None,
            dirty,
        }
    }

    fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    /// The moving corner of the selection, where keyboard navigation happens.
    fn cursor(&self) -> Point {
        self.store.selection().cursor().unwrap_or_default()
    }

    fn areas(&self, area: Rect) -> Areas {
        if self.settings.show_status_bar {
            let chunks = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);
            Areas {
                title: chunks[0],
                grid: chunks[1],
                edit_line: chunks[2],
                status: Some(chunks[3]),
            }
        } else {
            let chunks = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);
            Areas {
                title: chunks[0],
                grid: chunks[1],
                edit_line: chunks[2],
                status: None,
            }
        }
    }

    fn column_slot(&self) -> usize {
        self.settings.column_width as usize + 1
    }

    fn visible_cols(&self, grid: Rect) -> usize {
        let available = (grid.width as usize).saturating_sub(ROW_GUTTER);
        (available / self.column_slot()).clamp(1, COLUMNS)
    }

    fn visible_rows(&self, grid: Rect) -> usize {
        (grid.height as usize).saturating_sub(1).clamp(1, ROWS)
    }

    fn ensure_visible(&mut self) {
        let grid = self.areas(self.screen).grid;
        let vis_cols = self.visible_cols(grid);
        let vis_rows = self.visible_rows(grid);
        let cursor = self.cursor();

        if cursor.col < self.scroll_col {
            self.scroll_col = cursor.col;
        }
        if cursor.col >= self.scroll_col + vis_cols {
            self.scroll_col = cursor.col + 1 - vis_cols;
        }
        if cursor.row < self.scroll_row {
            self.scroll_row = cursor.row;
        }
        if cursor.row >= self.scroll_row + vis_rows {
            self.scroll_row = cursor.row + 1 - vis_rows;
        }
        self.scroll_col = self.scroll_col.min(COLUMNS - vis_cols);
        self.scroll_row = self.scroll_row.min(ROWS - vis_rows);
    }

    /// Grid cell under a terminal position, if any.
    fn hit_test(&self, x: u16, y: u16) -> Option<Point> {
        let grid = self.areas(self.screen).grid;
        if x < grid.x || x >= grid.x + grid.width || y <= grid.y || y >= grid.y + grid.height {
            return None;
        }

        let rel_x = (x - grid.x) as usize;
        if rel_x < ROW_GUTTER {
            return None;
        }
        let vis_col = (rel_x - ROW_GUTTER) / self.column_slot();
        if vis_col >= self.visible_cols(grid) {
            return None;
        }

        let col = self.scroll_col + vis_col;
        let row = self.scroll_row + (y - grid.y - 1) as usize;
        Sheet::in_bounds(col, row).then_some(Point::new(col, row))
    }

    // =========================================================================
    // Input
    // =========================================================================

    fn handle_key(&mut self, key: KeyEvent) {
        self.mark_dirty();
        self.status_message = None;
        let confirmed_quit = std::mem::take(&mut self.confirm_quit);

        if self.show_help {
            // Any key dismisses help
            self.show_help = false;
            return;
        }

        if self.edit.is_some() {
            self.handle_edit_key(key);
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Char('c') if ctrl => self.copy(),
            KeyCode::Char('v') if ctrl => self.paste(),
            KeyCode::Char('q') => self.request_quit(confirmed_quit),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Up | KeyCode::Char('k') => self.navigate(0, -1, shift),
            KeyCode::Down | KeyCode::Char('j') => self.navigate(0, 1, shift),
            KeyCode::Left | KeyCode::Char('h') => self.navigate(-1, 0, shift),
            KeyCode::Right | KeyCode::Char('l') => self.navigate(1, 0, shift),
            KeyCode::Tab => self.navigate(1, 0, false),
            KeyCode::BackTab => self.navigate(-1, 0, false),
            KeyCode::PageUp => self.navigate(0, -PAGE_ROWS, shift),
            KeyCode::PageDown => self.navigate(0, PAGE_ROWS, shift),
            KeyCode::Home => self.navigate(-(COLUMNS as isize), 0, shift),
            KeyCode::End => self.navigate(COLUMNS as isize, 0, shift),
            KeyCode::Enter | KeyCode::F(2) => self.begin_edit(self.cursor()),
            KeyCode::Char('f') => self.cycle_format(1),
            KeyCode::Char('F') => self.cycle_format(-1),
            KeyCode::Char('a') => self.cycle_alignment(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.step_font_size(1),
            KeyCode::Char('-') => self.step_font_size(-1),
            KeyCode::Delete | KeyCode::Backspace => {
                self.store.update_selection(CellPatch::new().value(""));
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.edit.is_some() {
                    // Clicking away commits, unless the value was refused
                    self.commit_edit();
                    if self.edit.is_some() {
                        return;
                    }
                }
                let Some(p) = self.hit_test(mouse.column, mouse.row) else {
                    return;
                };

                let now = Instant::now();
                let double = matches!(
                    self.last_click,
                    Some((prev, at)) if prev == p && now.duration_since(at) <= DOUBLE_CLICK
                );
                self.last_click = Some((p, now));

                if double {
                    self.last_click = None;
                    self.begin_edit(p);
                } else if mouse.modifiers.contains(KeyModifiers::SHIFT) {
                    self.store.extend_to(p);
                } else {
                    self.store.start_selection(p);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(p) = self.hit_test(mouse.column, mouse.row) {
                    self.store.extend_selection(p);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.store.end_selection(),
            MouseEventKind::ScrollDown => {
                let vis_rows = self.visible_rows(self.areas(self.screen).grid);
                self.scroll_row = (self.scroll_row + 3).min(ROWS - vis_rows);
                self.mark_dirty();
            }
            MouseEventKind::ScrollUp => {
                self.scroll_row = self.scroll_row.saturating_sub(3);
                self.mark_dirty();
            }
            _ => {}
        }
    }

    /// Nothing is saved, so leaving an edited grid takes a second `q`.
    fn request_quit(&mut self, confirmed: bool) {
        if confirmed || self.store.sheet().edited_count() == 0 {
            self.should_quit = true;
        } else {
            self.confirm_quit = true;
            self.status_message =
                Some("Edits will be lost: press q again to quit".to_string());
        }
    }

    fn navigate(&mut self, d_col: isize, d_row: isize, extend: bool) {
        if extend {
            self.store.extend_by(d_col, d_row);
        } else {
            self.store.move_by(d_col, d_row);
        }
    }

    // =========================================================================
    // Toolbar actions (apply to every selected cell)
    // =========================================================================

    fn cycle_format(&mut self, delta: isize) {
        let next = self.store.cell(self.cursor().col, self.cursor().row).format.cycle(delta);
        self.store.update_selection(CellPatch::new().format(next));
        self.status_message = Some(format!("Format: {}", next));
    }

    fn cycle_alignment(&mut self) {
        let next = self.store.cell(self.cursor().col, self.cursor().row).alignment.cycle();
        self.store.update_selection(CellPatch::new().alignment(next));
        self.status_message = Some(format!("Align: {}", next));
    }

    fn step_font_size(&mut self, delta: i64) {
        let current = self.store.cell(self.cursor().col, self.cursor().row).font_size;
        let next = (current as i64 + delta).clamp(MIN_FONT_SIZE as i64, MAX_FONT_SIZE as i64) as u32;
        self.store.update_selection(CellPatch::new().font_size(next));
        self.status_message = Some(format!("Font size: {}", next));
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    fn copy(&mut self) {
        self.store.copy_selection();
        let len = self.store.clipboard().snapshot().map(|s| s.len()).unwrap_or(0);
        self.status_message = Some(format!("Copied {} cell(s)", len));
    }

    fn paste(&mut self) {
        if !self.store.has_clipboard() {
            self.status_message = Some("Clipboard is empty".to_string());
            return;
        }
        let written = self.store.paste_selection();
        self.status_message = Some(format!("Pasted {} cell(s)", written.len()));
    }

    // =========================================================================
    // Editing
    // =========================================================================

    fn begin_edit(&mut self, p: Point) {
        let value = self.store.cell(p.col, p.row).value.clone();
        self.edit = Some(EditState::new(p, value));
        self.mark_dirty();
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some(edit) = self.edit.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc => self.edit = None,
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Backspace => edit.backspace(),
            KeyCode::Delete => edit.delete(),
            KeyCode::Left => edit.move_left(),
            KeyCode::Right => edit.move_right(),
            KeyCode::Home => edit.move_home(),
            KeyCode::End => edit.move_end(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => edit.insert(c),
            _ => {}
        }
    }

    /// Write the edit buffer to its cell. With write validation on, a refused
    /// value keeps the editor open and shows why.
    fn commit_edit(&mut self) {
        let Some(edit) = self.edit.take() else {
            return;
        };
        let p = edit.point();
        let patch = CellPatch::new().value(edit.buffer());

        if self.settings.validate_on_write {
            if let Err(e) = self.store.update_cell_checked(p.col, p.row, patch) {
                log::debug!("edit refused: {}", e);
                self.status_message = Some(e.to_string());
                self.edit = Some(edit);
            }
        } else {
            self.store.update_cell(p.col, p.row, patch);
        }
        self.mark_dirty();
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let areas = self.areas(area);

        self.draw_title(frame, areas.title);
        self.draw_grid(frame, areas.grid);
        self.draw_edit_line(frame, areas.edit_line);
        if let Some(status) = areas.status {
            self.draw_status(frame, status);
        }

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    /// Title doubles as the toolbar: format, alignment and size of the cursor cell.
    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let cursor = self.cursor();
        let cell = self.store.cell(cursor.col, cursor.row);
        let title = format!(
            " gridpad | {} | format: {} | align: {} | size: {} ",
            util::cell_label(cursor),
            cell.format,
            cell.alignment,
            cell.font_size
        );
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn cell_style(cell: &Cell, selected: bool, is_cursor: bool) -> Style {
        let mut style = if is_cursor {
            Style::default().fg(Color::Black).bg(Color::White)
        } else if selected {
            Style::default().fg(Color::White).bg(Color::Blue)
        } else {
            Style::default().fg(Color::Gray)
        };
        // The terminal has one font size; show larger text bold and smaller dim
        if cell.font_size > DEFAULT_FONT_SIZE {
            style = style.add_modifier(Modifier::BOLD);
        } else if cell.font_size < DEFAULT_FONT_SIZE {
            style = style.add_modifier(Modifier::DIM);
        }
        style
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        let width = self.settings.column_width as usize;
        let vis_cols = self.visible_cols(area);
        let vis_rows = self.visible_rows(area);
        let end_col = (self.scroll_col + vis_cols).min(COLUMNS);
        let end_row = (self.scroll_row + vis_rows).min(ROWS);
        let cursor = self.cursor();
        let selection = self.store.selection();

        // Header line
        let mut header_spans = vec![Span::styled(
            " ".repeat(ROW_GUTTER),
            Style::default().fg(Color::DarkGray),
        )];
        for c in self.scroll_col..end_col {
            let label = util::align_display(&util::col_to_letter(c), width, Alignment::Center);
            let style = if c == cursor.col {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };
            header_spans.push(Span::styled(format!("{} ", label), style));
        }

        let mut lines: Vec<Line> = Vec::with_capacity(vis_rows + 1);
        lines.push(Line::from(header_spans));

        for r in self.scroll_row..end_row {
            let row_num_style = if r == cursor.row {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let mut spans = vec![Span::styled(
                format!("{:>width$} ", r + 1, width = ROW_GUTTER - 1),
                row_num_style,
            )];

            for c in self.scroll_col..end_col {
                let p = Point::new(c, r);
                let cell = self.store.cell(c, r);
                let text = util::align_display(&cell.display(), width, cell.alignment);
                let style = Self::cell_style(cell, selection.contains(p), p == cursor);
                spans.push(Span::styled(text, style));
                spans.push(Span::raw(" "));
            }

            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_edit_line(&self, frame: &mut Frame, area: Rect) {
        match &self.edit {
            Some(edit) => {
                let prefix = format!(" {}> ", util::cell_label(edit.point()));
                let cursor_x = area.x as usize
                    + util::display_width(&prefix)
                    + util::display_width(edit.before_cursor());
                let line = Line::from(vec![
                    Span::styled(prefix, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                    Span::styled(edit.buffer().to_string(), Style::default().fg(Color::White)),
                ]);
                frame.render_widget(Paragraph::new(line), area);
                let max_x = area.x + area.width.saturating_sub(1);
                frame.set_cursor_position(((cursor_x as u16).min(max_x), area.y));
            }
            None => {
                let cursor = self.cursor();
                let value = &self.store.cell(cursor.col, cursor.row).value;
                let line = Line::from(vec![
                    Span::styled(
                        format!(" {}: ", util::cell_label(cursor)),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(value.clone(), Style::default().fg(Color::Gray)),
                ]);
                frame.render_widget(Paragraph::new(line), area);
            }
        }
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let left = match (&self.status_message, self.store.selected_range()) {
            (Some(msg), _) => format!(" {}", msg),
            (None, Some(range)) if range.is_single() => {
                format!(" {}", util::cell_label(range.top_left()))
            }
            (None, Some(range)) => format!(
                " {}:{} ({} cells)",
                util::cell_label(range.top_left()),
                util::cell_label(Point::new(range.end_col, range.end_row)),
                range.cell_count()
            ),
            (None, None) => String::new(),
        };

        let clip = match self.store.clipboard().snapshot() {
            Some(s) => format!("clipboard: {} cell(s)", s.len()),
            None => "clipboard: empty".to_string(),
        };
        let right = format!("{}  ?: help ", clip);

        let padding = (area.width as usize)
            .saturating_sub(left.chars().count() + right.chars().count());
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let para = Paragraph::new(Line::from(vec![Span::styled(
            status,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )]))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Selection",
            "  ---------",
            "  arrows / hjkl     Move cursor",
            "  Shift+arrows      Extend selection",
            "  mouse drag        Select rectangle",
            "  PgUp / PgDn       Page up/down",
            "  Home / End        First/last column",
            "",
            "  Editing",
            "  -------",
            "  Enter / F2        Edit cell",
            "  double-click      Edit cell",
            "  Esc               Cancel edit",
            "  Delete            Clear values",
            "  Ctrl+C / Ctrl+V   Copy / paste",
            "",
            "  Format (whole selection)",
            "  ------------------------",
            "  f / F             Next/prev format",
            "  a                 Cycle alignment",
            "  + / -             Font size",
            "",
            "  General",
            "  -------",
            "  q                 Quit (twice if edited)",
            "  ?                 Toggle this help",
            "",
        ];
        let help_width: u16 = 44;
        let help_height: u16 = help_lines.len() as u16 + 2;

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(
            area.x + x,
            area.y + y,
            help_width.min(area.width),
            help_height.min(area.height),
        );

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// Run the interactive editor until the user quits.
pub fn run(settings: Settings) -> Result<(), String> {
    let app = TuiApp::new(settings);
    run_app(app)
}

fn run_app(mut app: TuiApp) -> Result<(), String> {
    let mouse = app.settings.mouse;

    terminal::enable_raw_mode()
        .map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;
    if mouse {
        stdout()
            .execute(EnableMouseCapture)
            .map_err(|e| format!("failed to enable mouse capture: {}", e))?;
    }

    struct Cleanup {
        mouse: bool,
    }
    impl Drop for Cleanup {
        fn drop(&mut self) {
            if self.mouse {
                let _ = stdout().execute(DisableMouseCapture);
            }
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup { mouse };

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        let size = terminal
            .size()
            .map(|s| Rect::new(0, 0, s.width, s.height))
            .unwrap_or_default();
        if size != app.screen {
            app.screen = size;
            app.mark_dirty();
        }

        if app.take_dirty() {
            app.ensure_visible();
            terminal
                .draw(|frame| app.draw(frame))
                .map_err(|e| format!("draw error: {}", e))?;
        }

        if event::poll(Duration::from_millis(100))
            .map_err(|e| format!("event poll error: {}", e))?
        {
            match event::read().map_err(|e| format!("event read error: {}", e))? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(..) => app.mark_dirty(),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpad_engine::{FormatKind, PasteLayout};

    fn app() -> TuiApp {
        let mut app = TuiApp::new(Settings::default());
        app.screen = Rect::new(0, 0, 120, 40);
        app
    }

    fn press(app: &mut TuiApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut TuiApp, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut TuiApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn mouse(app: &mut TuiApp, kind: MouseEventKind, column: u16, row: u16) {
        app.handle_mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    /// Screen position of a cell's first character with default settings
    /// (title on line 0, column header on line 1, gutter of 4, 12+1 per column).
    fn screen_pos(col: u16, row: u16) -> (u16, u16) {
        (ROW_GUTTER as u16 + col * 13, row + 2)
    }

    #[test]
    fn edit_and_commit() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "1234.5");
        press(&mut app, KeyCode::Enter);

        assert!(app.edit.is_none());
        assert_eq!(app.store.cell(0, 0).value, "1234.5");
    }

    #[test]
    fn quit_needs_confirmation_once_edited() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "keep");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert!(app.status_message.as_deref().unwrap().contains("q again"));

        // Any other key cancels the pending quit
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn quit_untouched_grid_immediately() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn escape_cancels_edit() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "draft");
        press(&mut app, KeyCode::Esc);

        assert!(app.edit.is_none());
        assert!(!app.should_quit);
        assert!(app.store.cell(0, 0).is_default());
    }

    #[test]
    fn refused_value_keeps_editor_open() {
        let mut app = TuiApp::new(Settings {
            validate_on_write: true,
            ..Settings::default()
        });
        app.screen = Rect::new(0, 0, 120, 40);
        press(&mut app, KeyCode::Char('f')); // text -> number
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Enter);

        assert!(app.edit.is_some());
        assert!(app.status_message.as_deref().unwrap().contains("not a number"));
        assert_eq!(app.store.cell(0, 0).value, "");
    }

    #[test]
    fn toolbar_keys_apply_to_selection() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT));
        app.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT));
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('+'));

        for (c, r) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            let cell = app.store.cell(c, r);
            assert_eq!(cell.format, FormatKind::Number);
            assert_eq!(cell.alignment, Alignment::Center);
            assert_eq!(cell.font_size, 12);
        }
        assert!(app.store.cell(2, 2).is_default());
    }

    #[test]
    fn mouse_drag_selects_rectangle() {
        let mut app = app();
        let (x0, y0) = screen_pos(0, 0);
        let (x1, y1) = screen_pos(2, 2);
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), x0, y0);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), x1, y1);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), x1, y1);

        assert_eq!(app.store.selected_cells().len(), 9);
        assert!(!app.store.selection().is_active());
    }

    #[test]
    fn drag_without_press_does_not_select() {
        let mut app = app();
        let (x, y) = screen_pos(3, 3);
        app.take_dirty();
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), x, y);

        assert_eq!(app.store.selected_cells(), vec![Point::new(0, 0)]);
        assert!(!app.take_dirty());
    }

    #[test]
    fn hit_test_ignores_gutter_and_header() {
        let app = app();
        assert_eq!(app.hit_test(1, 2), None);
        assert_eq!(app.hit_test(5, 1), None);
        assert_eq!(app.hit_test(5, 2), Some(Point::new(0, 0)));
        let (x, y) = screen_pos(1, 1);
        assert_eq!(app.hit_test(x, y), Some(Point::new(1, 1)));
    }

    #[test]
    fn double_click_edits() {
        let mut app = app();
        let (x, y) = screen_pos(1, 0);
        for _ in 0..2 {
            mouse(&mut app, MouseEventKind::Down(MouseButton::Left), x, y);
            mouse(&mut app, MouseEventKind::Up(MouseButton::Left), x, y);
        }
        assert_eq!(app.edit.as_ref().map(|e| e.point()), Some(Point::new(1, 0)));
    }

    #[test]
    fn copy_paste_through_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "v");
        press(&mut app, KeyCode::Enter);

        ctrl(&mut app, 'c');
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        ctrl(&mut app, 'v');

        assert_eq!(app.store.cell(0, 2).value, "v");
        assert_eq!(app.status_message.as_deref(), Some("Pasted 1 cell(s)"));
    }

    #[test]
    fn paste_layout_comes_from_settings() {
        let app = TuiApp::new(Settings {
            paste_layout: PasteLayout::Rectangle,
            ..Settings::default()
        });
        assert_eq!(app.store.paste_layout(), PasteLayout::Rectangle);
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE));
        app.ensure_visible();

        let grid = app.areas(app.screen).grid;
        assert_eq!(app.cursor(), Point::new(25, 49));
        assert_eq!(app.scroll_col + app.visible_cols(grid), COLUMNS);
        assert_eq!(app.scroll_row + app.visible_rows(grid), ROWS);
    }
}
