use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::{debug, info};

use crate::connect::measure::Measurements;
use crate::parser::config::{self, Config};
use crate::parser::tree;
use crate::selection::controller::SelectionController;
use crate::selection::events::{Subscription, TreeEvent};
use crate::selection::path::{PathState, SelectionPath};
use crate::selection::reorder::DisplayOrderCache;
use crate::techtree;
use crate::tree::model::{CandidateSet, Level};
use crate::tree::sample::{SAMPLE_SCENARIO, SAMPLE_TREE};
use crate::tui::input::{self, Action, Direction};
use crate::tui::render::{self, ColumnView, SidePanel, TreeRenderData, centered_rect};
use crate::tui::settings::{self, SettingsEvent, SettingsPanelState};

const RESULTS_TOAST: &str = "Results updated";

#[derive(Debug, Clone)]
enum PendingTextKind {
    Rename { level: Level, item_id: String },
}

#[derive(Debug, Clone)]
struct PendingText {
    title: String,
    buffer: String,
    cursor: usize,
    kind: PendingTextKind,
}

#[derive(Debug, Clone)]
enum PendingConfirm {
    DeleteItem {
        level: Level,
        item_id: String,
        name: String,
    },
}

#[derive(Debug, Clone)]
struct Toast {
    text: &'static str,
    expires: Instant,
}

#[derive(Debug)]
struct AppState {
    tree_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    controller: SelectionController,
    events: Subscription,
    order: DisplayOrderCache,
    /// Rectangles from the last frame; stale once the path moves.
    measurements: Measurements,
    config: Config,
    focus: Level,
    cursors: [usize; 4],
    scroll: [usize; 4],
    side_panel: SidePanel,
    refresh_count: u64,
    toast: Option<Toast>,
    assistant_prompt: Option<String>,
    show_help: bool,
    show_settings: bool,
    settings_state: SettingsPanelState,
    status_message: Option<String>,
    pending_text: Option<PendingText>,
    pending_confirm: Option<PendingConfirm>,
    demo: bool,
}

impl AppState {
    fn load(demo: bool, initial_path: Option<&str>) -> Result<Self> {
        if demo {
            let candidates = tree::parse(SAMPLE_TREE)?;
            let config = Config {
                scenario: Some(SAMPLE_SCENARIO.to_string()),
                ..Config::default()
            };
            let mut app = Self::new(candidates, config, initial_path);
            app.demo = true;
            app.status_message = Some("demo mode: changes are in-memory only".to_string());
            return Ok(app);
        }

        let root = techtree::find_root()?;
        Self::load_from(&root, initial_path)
    }

    fn load_from(root: &Path, initial_path: Option<&str>) -> Result<Self> {
        let candidates = techtree::load_tree(root)?;
        let config = techtree::load_config(root)?;
        let hidden_level4 = candidates.has_level4() && !config.show_level4;
        let mut app = Self::new(candidates, config, initial_path);
        app.tree_path = Some(techtree::tree_path(root));
        app.config_path = Some(techtree::config_path(root));
        if hidden_level4 {
            app.status_message =
                Some("tree has level 4 items, show them from settings [s]".to_string());
        }
        Ok(app)
    }

    fn new(
        candidates: CandidateSet,
        config: Config,
        initial_path: Option<&str>,
    ) -> Self {
        let path = initial_path
            .map(|p| SelectionPath::from_segments(p.split('/')))
            .unwrap_or_default();
        let focus = path
            .depth()
            .map(|deepest| deepest.min(config.deepest_level()))
            .unwrap_or(Level::One);
        let mut controller = SelectionController::new(PathState::with_path(candidates, path));
        let events = controller.subscribe();
        Self {
            tree_path: None,
            config_path: None,
            controller,
            events,
            order: DisplayOrderCache::new(),
            measurements: Measurements::default(),
            config,
            focus,
            cursors: [0; 4],
            scroll: [0; 4],
            side_panel: SidePanel::Results,
            refresh_count: 0,
            toast: None,
            assistant_prompt: None,
            show_help: false,
            show_settings: false,
            settings_state: SettingsPanelState::default(),
            status_message: None,
            pending_text: None,
            pending_confirm: None,
            demo: false,
        }
    }

    /// React to everything the controller published since the last call.
    fn process_events(&mut self) {
        while let Some(event) = self.events.try_next() {
            match event {
                TreeEvent::SelectionChanged { level, item_id } => {
                    debug!(%level, %item_id, "selection changed");
                    self.refresh_results(level);
                }
                TreeEvent::PathCleared { level } => self.refresh_results(level),
                TreeEvent::CustomNodeRequested { level, prompt } => {
                    self.side_panel = SidePanel::Assistant;
                    self.assistant_prompt = Some(prompt);
                    debug!(%level, "assistant opened");
                }
            }
        }
    }

    /// Bump the results panel and reset the columns from `level` down.
    fn refresh_results(&mut self, level: Level) {
        self.refresh_count += 1;
        self.toast = Some(Toast {
            text: RESULTS_TOAST,
            expires: Instant::now() + Duration::from_millis(self.config.toast_ms),
        });
        self.reset_columns_from(level);
        debug!(%level, refreshes = self.refresh_count, "results refreshed");
    }

    fn reset_columns_from(&mut self, level: Level) {
        for l in std::iter::once(level).chain(level.deeper()) {
            self.cursors[l.index()] = 0;
            self.scroll[l.index()] = 0;
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.process_events();
        if self
            .toast
            .as_ref()
            .is_some_and(|t| Instant::now() >= t.expires)
        {
            self.toast = None;
        }

        let hints = self.hints();
        let state = self.controller.state();
        let config = &self.config;

        let mut breadcrumb = Vec::new();
        for level in Level::ALL {
            let Some(id) = state.selected(level) else {
                break;
            };
            let name = state
                .selected_item(level)
                .map(|item| item.name.as_str())
                .unwrap_or(id);
            breadcrumb.push((config.level_name(level), name));
        }

        let views = self
            .order
            .columns(state, config.deepest_level())
            .into_iter()
            .map(|column| {
                let level = column.level;
                ColumnView {
                    column,
                    title: config.level_name(level),
                    cursor: (level == self.focus).then_some(self.cursors[level.index()]),
                    scroll: self.scroll[level.index()],
                    empty_hint: empty_hint(config, state, level),
                }
            })
            .collect::<Vec<_>>();

        let data = TreeRenderData {
            columns: &views,
            path: state.path(),
            stamp: state.stamp(),
            breadcrumb: &breadcrumb,
            scenario: config.scenario.as_deref(),
            side_panel: self.side_panel,
            refresh_count: self.refresh_count,
            assistant_prompt: self.assistant_prompt.as_deref(),
            toast: self.toast.as_ref().map(|t| t.text),
            hints: &hints,
            message: self.status_message.as_deref(),
            show_help: self.show_help,
            show_descriptions: config.show_descriptions,
            show_connectors: config.show_connectors,
            demo: self.demo,
        };
        let outcome = render::draw(frame, &data);
        self.measurements = outcome.measurements;
        self.scroll = outcome.scroll;

        if self.show_settings {
            settings::draw(frame, &self.settings_state, &self.config);
        }
        if let Some(prompt) = &self.pending_text {
            draw_text_prompt(frame, prompt);
        } else if let Some(confirm) = &self.pending_confirm {
            draw_confirm_prompt(frame, confirm);
        }
    }

    fn hints(&self) -> String {
        if self.show_settings {
            return "[j/k or arrows] select  [h/l or Enter] change  [Esc] close".to_string();
        }
        if self.pending_text.is_some() {
            return "type text, [Backspace] delete, [Enter] apply, [Esc] cancel".to_string();
        }
        if self.pending_confirm.is_some() {
            return "[y] confirm  [n/Esc/Backspace] cancel".to_string();
        }
        format!(
            "[h/l] level  [j/k] move  [Enter] select  [n] custom {}  [e] rename  [D] delete  [Tab] panel  [s] settings",
            self.config.level_name(self.focus).to_lowercase()
        )
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        self.status_message = None;

        if self.show_settings {
            match settings::handle_key(key, &mut self.settings_state, &mut self.config) {
                SettingsEvent::Changed => {
                    self.focus = self.focus.min(self.config.deepest_level());
                    self.persist_config()?;
                }
                SettingsEvent::Close => self.show_settings = false,
                SettingsEvent::None => {}
            }
            return Ok(false);
        }

        if self.pending_confirm.is_some() {
            self.handle_confirm_key(key)?;
            self.process_events();
            return Ok(false);
        }

        let in_text_mode = self.pending_text.is_some();
        let action = input::action_for_key(key, in_text_mode);
        if in_text_mode {
            return self.handle_text_action(action);
        }

        match action {
            Action::Quit => return Ok(true),
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::OpenSettings => self.show_settings = true,
            Action::Move(direction) => self.move_cursor(direction),
            Action::Select => self.select_at_cursor(),
            Action::ClearLevel => {
                if !self.controller.clear_from(self.focus) {
                    self.status_message = Some("nothing selected at this level".to_string());
                }
            }
            Action::RequestCustomNode => self.controller.request_custom_node(self.focus),
            Action::RenameItem => self.start_rename_prompt(),
            Action::DeleteItem => self.start_delete_prompt(),
            Action::TogglePanel => {
                self.side_panel = match self.side_panel {
                    SidePanel::Results => SidePanel::Assistant,
                    SidePanel::Assistant => SidePanel::Results,
                };
            }
            Action::Reload => self.reload()?,
            Action::Cancel => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.side_panel = SidePanel::Results;
                }
            }
            Action::Noop | Action::SubmitText | Action::Backspace | Action::InputChar(_) => {}
        }
        self.process_events();
        Ok(false)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.show_settings || self.pending_text.is_some() || self.pending_confirm.is_some()
                {
                    return;
                }
                if !self.measurements.is_current(self.controller.state().stamp()) {
                    debug!("click ignored, layout is stale");
                    return;
                }
                let Some((level, id)) = self
                    .measurements
                    .hit_test(i32::from(mouse.column), i32::from(mouse.row))
                    .map(|(level, id)| (level, id.to_string()))
                else {
                    return;
                };
                self.focus = level;
                self.select(level, &id);
            }
            MouseEventKind::ScrollDown => self.move_cursor(Direction::Down),
            MouseEventKind::ScrollUp => self.move_cursor(Direction::Up),
            _ => {}
        }
        self.process_events();
    }

    fn column_len(&self, level: Level) -> usize {
        self.controller.state().visible(level).len()
    }

    fn move_cursor(&mut self, direction: Direction) {
        let idx = self.focus.index();
        match direction {
            Direction::Up => self.cursors[idx] = self.cursors[idx].saturating_sub(1),
            Direction::Down => {
                let last = self.column_len(self.focus).saturating_sub(1);
                self.cursors[idx] = (self.cursors[idx] + 1).min(last);
            }
            Direction::Left => {
                if let Some(parent) = self.focus.parent() {
                    self.focus = parent;
                }
            }
            Direction::Right => {
                if let Some(child) = self.focus.child()
                    && child <= self.config.deepest_level()
                {
                    self.focus = child;
                }
            }
        }
    }

    /// Id of the item under the cursor in display order.
    fn item_at_cursor(&mut self) -> Option<(String, String)> {
        let column = self.order.column(self.controller.state(), self.focus);
        column
            .items
            .get(self.cursors[self.focus.index()])
            .map(|item| (item.id.clone(), item.name.clone()))
    }

    fn select_at_cursor(&mut self) {
        let Some((id, _)) = self.item_at_cursor() else {
            return;
        };
        self.select(self.focus, &id);
    }

    fn select(&mut self, level: Level, id: &str) {
        if !self.controller.select(level, id) {
            return;
        }
        if let Some(child) = level.child()
            && child <= self.config.deepest_level()
            && !self.controller.state().visible(child).is_empty()
        {
            self.focus = child;
        }
    }

    fn start_rename_prompt(&mut self) {
        let Some((item_id, name)) = self.item_at_cursor() else {
            self.status_message = Some("no item to rename".to_string());
            return;
        };
        self.pending_text = Some(PendingText {
            title: format!("Rename {} item", self.config.level_name(self.focus)),
            cursor: name.chars().count(),
            buffer: name,
            kind: PendingTextKind::Rename {
                level: self.focus,
                item_id,
            },
        });
    }

    fn start_delete_prompt(&mut self) {
        let Some((item_id, name)) = self.item_at_cursor() else {
            self.status_message = Some("no item to delete".to_string());
            return;
        };
        self.pending_confirm = Some(PendingConfirm::DeleteItem {
            level: self.focus,
            item_id,
            name,
        });
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(PendingConfirm::DeleteItem {
                    level,
                    item_id,
                    name,
                }) = self.pending_confirm.take()
                    && self.controller.remove(level, &item_id).is_some()
                {
                    let last = self.column_len(level).saturating_sub(1);
                    let cursor = &mut self.cursors[level.index()];
                    *cursor = (*cursor).min(last);
                    self.persist_tree()?;
                    info!(%level, %item_id, "item deleted");
                    self.status_message = Some(format!("deleted {name}"));
                }
            }
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.pending_confirm = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_text_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::SubmitText => {
                if let Some(prompt) = self.pending_text.take() {
                    self.apply_text_prompt(prompt)?;
                }
            }
            Action::Cancel => self.pending_text = None,
            Action::Backspace => {
                if let Some(prompt) = &mut self.pending_text
                    && prompt.cursor > 0
                {
                    let from = byte_index_for_cursor(&prompt.buffer, prompt.cursor - 1);
                    let to = byte_index_for_cursor(&prompt.buffer, prompt.cursor);
                    prompt.buffer.replace_range(from..to, "");
                    prompt.cursor -= 1;
                }
            }
            Action::InputChar(c) => {
                if let Some(prompt) = &mut self.pending_text {
                    let at = byte_index_for_cursor(&prompt.buffer, prompt.cursor);
                    prompt.buffer.insert(at, c);
                    prompt.cursor += 1;
                }
            }
            Action::Move(Direction::Left) => {
                if let Some(prompt) = &mut self.pending_text {
                    prompt.cursor = prompt.cursor.saturating_sub(1);
                }
            }
            Action::Move(Direction::Right) => {
                if let Some(prompt) = &mut self.pending_text {
                    let max = prompt.buffer.chars().count();
                    prompt.cursor = (prompt.cursor + 1).min(max);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn apply_text_prompt(&mut self, prompt: PendingText) -> Result<()> {
        match prompt.kind {
            PendingTextKind::Rename { level, item_id } => {
                let name = prompt.buffer.trim();
                match self.controller.rename(level, &item_id, name) {
                    Ok(true) => {
                        self.persist_tree()?;
                        self.status_message = Some(format!("renamed to {name}"));
                    }
                    Ok(false) => {
                        self.status_message = Some(format!("no item '{item_id}' to rename"));
                    }
                    Err(err) => self.status_message = Some(err.to_string()),
                }
            }
        }
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        let Some(path) = &self.tree_path else {
            self.status_message = Some("demo mode: nothing to reload".to_string());
            return Ok(());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let candidates = tree::parse(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let count = candidates.item_count();
        self.controller.replace_candidates(candidates);
        self.status_message = Some(format!("reloaded {count} items"));
        Ok(())
    }

    fn persist_tree(&self) -> Result<()> {
        let Some(path) = &self.tree_path else {
            return Ok(());
        };
        fs::write(path, tree::serialize(self.controller.state().candidates()))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "saved tree");
        Ok(())
    }

    fn persist_config(&self) -> Result<()> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };
        fs::write(path, config::serialize(&self.config))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "saved config");
        Ok(())
    }
}

fn empty_hint(config: &Config, state: &PathState, level: Level) -> String {
    let name = config.level_name(level).to_lowercase();
    match level.parent() {
        Some(parent) if state.selected(parent).is_none() => {
            format!("Select a {} first.", config.level_name(parent).to_lowercase())
        }
        _ => format!("No {name} candidates yet. Press n to add one."),
    }
}

fn draw_text_prompt(frame: &mut Frame, prompt: &PendingText) {
    let area = centered_rect(frame.area(), 60, 24);
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            prompt.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        line_with_cursor(
            &prompt.buffer,
            prompt.cursor,
            Style::default().fg(Color::White),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Backspace deletes char. Enter applies, Esc cancels.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().title("Input").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_confirm_prompt(frame: &mut Frame, confirm: &PendingConfirm) {
    let area = centered_rect(frame.area(), 56, 22);
    frame.render_widget(Clear, area);
    let PendingConfirm::DeleteItem { name, .. } = confirm;
    let paragraph = Paragraph::new(vec![
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("Delete \"{name}\"?"),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Items below it go too.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                "[y/Enter]",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" yes   ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                "[n/Esc/Backspace]",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" no", Style::default().fg(Color::DarkGray)),
        ]),
    ])
    .block(
        Block::default()
            .title(" confirm ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(paragraph, area);
}

pub fn run(demo: bool, initial_path: Option<&str>) -> Result<()> {
    let mut app = AppState::load(demo, initial_path)?;
    info!(demo, path = %app.controller.state().path(), "view opened");

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| app.draw(f))?;
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if matches!(key.kind, KeyEventKind::Release | KeyEventKind::Repeat) {
                    continue;
                }
                if app.handle_key(key)? {
                    break;
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            _ => {}
        }
    }

    info!(path = %app.controller.state().path(), "view closed");
    Ok(())
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableMouseCapture, LeaveAlternateScreen);
    }
}

fn line_with_cursor(text: &str, cursor: usize, text_style: Style, caret_style: Style) -> Line<'static> {
    let split = byte_index_for_cursor(text, cursor.min(text.chars().count()));
    let (left, right) = text.split_at(split);
    let mut spans = Vec::new();
    if !left.is_empty() {
        spans.push(Span::styled(left.to_string(), text_style));
    }
    spans.push(Span::styled("▌", caret_style));
    if !right.is_empty() {
        spans.push(Span::styled(right.to_string(), text_style));
    }
    Line::from(spans)
}

fn byte_index_for_cursor(text: &str, cursor: usize) -> usize {
    text.char_indices()
        .nth(cursor)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::measure::Bounds;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut AppState, codes: &[KeyCode]) {
        for code in codes {
            app.handle_key(key(*code)).unwrap();
        }
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn click(app: &mut AppState, column: u16, row: u16) {
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    fn draw(app: &mut AppState) {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
    }

    #[test]
    fn enter_selects_and_advances_focus() {
        let mut app = AppState::load(true, None).unwrap();
        press(&mut app, &[KeyCode::Down, KeyCode::Enter]);

        assert_eq!(app.controller.state().path().level1(), Some("monitoring"));
        assert_eq!(app.focus, Level::Two);
        assert_eq!(app.refresh_count, 1);
        assert!(app.toast.is_some());
        assert_eq!(app.cursors[0], 0, "selected item moves to the top");
    }

    #[test]
    fn reselecting_is_silent_and_changing_clears_deeper() {
        let mut app = AppState::load(true, Some("early-detection/imaging/oct")).unwrap();
        assert_eq!(app.focus, Level::Three);
        assert_eq!(app.refresh_count, 0, "deep link does not notify");

        app.focus = Level::One;
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.refresh_count, 0);
        assert_eq!(app.controller.state().path().depth(), Some(Level::Three));

        press(&mut app, &[KeyCode::Char('h'), KeyCode::Down, KeyCode::Enter]);
        let path = app.controller.state().path();
        assert_eq!(path.level1(), Some("monitoring"));
        assert_eq!(path.level2(), None);
        assert_eq!(path.level3(), None);
        assert_eq!(app.refresh_count, 1);
    }

    #[test]
    fn custom_node_request_opens_assistant() {
        let mut app = AppState::load(true, Some("access")).unwrap();
        assert_eq!(app.focus, Level::One);
        press(&mut app, &[KeyCode::Char('l'), KeyCode::Char('n')]);
        assert_eq!(app.side_panel, SidePanel::Assistant);
        assert!(app.assistant_prompt.as_deref().unwrap().contains("Level 2"));
        press(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.side_panel, SidePanel::Results);
    }

    #[test]
    fn clicks_need_current_measurements() {
        let mut app = AppState::load(true, None).unwrap();
        let stamp = app.controller.state().stamp();
        let mut m = Measurements::new(stamp, Bounds::new(0, 0, 100, 40));
        m.record(Level::One, "access", Bounds::new(2, 2, 20, 3));
        app.measurements = m.clone();

        click(&mut app, 5, 3);
        assert_eq!(app.controller.state().path().level1(), Some("access"));

        press(&mut app, &[KeyCode::Char('h'), KeyCode::Backspace]);
        assert!(app.controller.state().path().is_empty());
        click(&mut app, 5, 3);
        assert!(
            app.controller.state().path().is_empty(),
            "measurements from before the clear are stale"
        );
    }

    #[test]
    fn drawing_refreshes_measurements_for_clicks() {
        let mut app = AppState::load(true, Some("early-detection")).unwrap();
        draw(&mut app);
        assert!(app.measurements.is_current(app.controller.state().stamp()));
        let rect = app
            .measurements
            .rect(Level::Two, "biomarkers")
            .expect("level 2 is drawn");
        click(&mut app, rect.x as u16 + 1, rect.y as u16 + 1);
        assert_eq!(app.controller.state().path().level2(), Some("biomarkers"));
        assert_eq!(app.focus, Level::Three);
    }

    #[test]
    fn deleting_the_selected_item_clears_the_path() {
        let mut app = AppState::load(true, Some("monitoring/field")).unwrap();
        assert_eq!(app.focus, Level::Two);
        press(&mut app, &[KeyCode::Char('D')]);
        assert!(app.pending_confirm.is_some());
        press(&mut app, &[KeyCode::Char('y')]);

        let state = app.controller.state();
        assert_eq!(state.path().level1(), Some("monitoring"));
        assert_eq!(state.path().level2(), None);
        assert!(state.visible(Level::Two).iter().all(|i| i.id != "field"));
        assert_eq!(app.refresh_count, 1);
    }

    #[test]
    fn rename_prompt_edits_the_item_under_cursor() {
        let mut app = AppState::load(true, None).unwrap();
        press(&mut app, &[KeyCode::Char('e')]);
        for _ in 0.."Early detection of retinal disease".len() {
            press(&mut app, &[KeyCode::Backspace]);
        }
        type_text(&mut app, "Screening");
        press(&mut app, &[KeyCode::Enter]);

        let item = &app.controller.state().visible(Level::One)[0];
        assert_eq!(item.name, "Screening");
        assert!(app.pending_text.is_none());
    }

    #[test]
    fn rename_to_unstorable_name_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(techtree::techtree_dir(dir.path())).unwrap();
        let original = "a : Alpha | first\nb : Beta\n";
        fs::write(techtree::tree_path(dir.path()), original).unwrap();

        let mut app = AppState::load_from(dir.path(), None).unwrap();
        press(&mut app, &[KeyCode::Char('e')]);
        type_text(&mut app, " | beta");
        press(&mut app, &[KeyCode::Enter]);

        assert_eq!(app.controller.state().visible(Level::One)[0].name, "Alpha");
        assert_eq!(app.status_message.as_deref(), Some("name cannot contain '|'"));
        let text = fs::read_to_string(techtree::tree_path(dir.path())).unwrap();
        assert_eq!(text, original);
    }

    #[test]
    fn edits_and_settings_persist_to_disk() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(techtree::techtree_dir(dir.path())).unwrap();
        fs::write(techtree::tree_path(dir.path()), "a : Alpha\n    x : Ex\nb : Beta\n").unwrap();

        let mut app = AppState::load_from(dir.path(), None).unwrap();
        press(&mut app, &[KeyCode::Char('D'), KeyCode::Enter]);
        let text = fs::read_to_string(techtree::tree_path(dir.path())).unwrap();
        assert_eq!(text, "b : Beta\n");

        press(&mut app, &[KeyCode::Char('s'), KeyCode::Enter, KeyCode::Esc]);
        let cfg = techtree::load_config(dir.path()).unwrap();
        assert!(cfg.show_level4);
    }
}
