// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Hosts a [`Session`] (ratatui + crossterm): quick panels and input prompts are modal
//! overlays, transformation results open in a file viewer, and processor errors land in a
//! diagnostics pane under it.

use std::{
    env,
    error::Error,
    fs, io,
    path::{Path, PathBuf},
    process::Command,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, warn};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::config::{Availability, ProcessorConfig, Settings, SettingsStore};
use crate::error::PilotError;
use crate::messages::Messages;
use crate::navigator::CANCELLED;
use crate::runner::{self, ActiveRun, ErrorLocation, Exec, WatchOutcome};
use crate::session::{Effect, Prompt, Response, Session, SessionContext};

const FOCUS_COLOR: Color = Color::LightGreen;
const DIAGNOSTICS_COLOR: Color = Color::LightRed;
const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const FOOTER_BRAND_COLOR: Color = Color::White;
const FOOTER_BRAND: &str = "xslt-pilot ";
const TICK: Duration = Duration::from_millis(100);
const TOAST_TTL: Duration = Duration::from_secs(2);
// Lines kept above a reported error line when the viewer jumps to it.
const LOCATION_CONTEXT_LINES: u16 = 3;

/// Everything resolved at startup that the UI needs to run sessions.
#[derive(Debug, Clone)]
pub struct Launch {
    pub source: PathBuf,
    pub settings: Settings,
    pub store: SettingsStore,
    pub processor: ProcessorConfig,
    pub availability: Availability,
    pub messages: Messages,
}

/// Runs the interactive terminal UI until the user quits.
///
/// Must not be called from async code: console reads use blocking locks.
pub fn run(launch: Launch, exec: Box<dyn Exec>) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(launch, exec);
    app.start_session();

    while !app.should_quit {
        app.tick(Instant::now());
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                    if let Some(action) = app.take_external_action() {
                        let result =
                            terminal.run_external_action(|| app.execute_external_action(action));
                        if let Err(err) = result {
                            let message = app.messages.format("status.editor_failed", &[&err]);
                            app.set_toast(message);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.size();

    let diagnostics_height = if app.diagnostics_visible && app.diagnostics.is_some() {
        (area.height / 3).max(3)
    } else {
        0
    };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(diagnostics_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    let main_area = layout[0];

    render_viewer(frame, app, main_area);
    if diagnostics_height > 0 {
        render_diagnostics(frame, app, layout[1]);
    }
    frame.render_widget(Paragraph::new(notice_line(app.notice.as_ref())), layout[2]);

    let toast_suffix = app.toast_suffix(Instant::now());
    frame.render_widget(Paragraph::new(footer_help_line(app, &toast_suffix)), layout[3]);
    frame.render_widget(
        Paragraph::new(footer_brand_line()).alignment(Alignment::Right),
        layout[3],
    );

    match app.panel.as_mut() {
        Some(Panel::Quick(panel)) => render_quick_panel(frame, panel, &app.messages, main_area),
        Some(Panel::Input(panel)) => render_input_panel(frame, panel, main_area),
        None => {}
    }

    if app.show_help {
        render_help(frame, app, main_area);
    }
}

// Extracted panel/viewer/footer/help rendering helpers.
include!("chrome.rs");

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// The persistent status line above the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    level: NoticeLevel,
    text: String,
}

/// A modal quick panel. `visible` holds original item indices in display order.
#[derive(Debug, Clone)]
struct QuickPanel {
    title: String,
    items: Vec<String>,
    query: String,
    visible: Vec<usize>,
    state: ListState,
}

impl QuickPanel {
    fn new(title: String, items: Vec<String>) -> Self {
        let mut panel =
            Self { title, items, query: String::new(), visible: Vec::new(), state: ListState::default() };
        panel.refilter();
        panel
    }

    fn refilter(&mut self) {
        self.visible = filter_items(&self.items, &self.query);
        self.state.select(if self.visible.is_empty() { None } else { Some(0) });
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        let current = self.state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(last);
        self.state.select(Some(next));
    }

    /// Original listing index of the highlighted row.
    fn selected_index(&self) -> Option<i64> {
        let position = self.state.selected()?;
        self.visible.get(position).and_then(|&idx| i64::try_from(idx).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InputPanel {
    caption: String,
    value: String,
}

#[derive(Debug, Clone)]
enum Panel {
    Quick(QuickPanel),
    Input(InputPanel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileView {
    path: PathBuf,
    lines: Vec<String>,
    scroll: u16,
    location: Option<ErrorLocation>,
}

impl FileView {
    fn load(path: &Path, location: Option<ErrorLocation>) -> Result<Self, PilotError> {
        let bytes = fs::read(path).map_err(|source| PilotError::io(path, source))?;
        let lines = String::from_utf8_lossy(&bytes).lines().map(str::to_owned).collect();
        let scroll = location
            .map(|location| {
                let line = u16::try_from(location.line).unwrap_or(u16::MAX);
                line.saturating_sub(1).saturating_sub(LOCATION_CONTEXT_LINES)
            })
            .unwrap_or(0);
        Ok(Self { path: path.to_path_buf(), lines, scroll, location })
    }

    fn max_scroll(&self) -> u16 {
        u16::try_from(self.lines.len().saturating_sub(1)).unwrap_or(u16::MAX)
    }

    fn scroll_by(&mut self, delta: i32) {
        let next = i32::from(self.scroll).saturating_add(delta).max(0);
        self.scroll = u16::try_from(next).unwrap_or(u16::MAX).min(self.max_scroll());
    }

    /// Line the editor should open at.
    fn focus_line(&self) -> u32 {
        self.location.map(|location| location.line).unwrap_or_else(|| u32::from(self.scroll) + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExternalAction {
    EditFile { path: PathBuf, line: u32 },
}

struct App {
    launch: Launch,
    messages: Messages,
    exec: Box<dyn Exec>,
    session: Option<Session>,
    panel: Option<Panel>,
    active: Option<ActiveRun>,
    files: Vec<FileView>,
    current_file: usize,
    viewer_height: u16,
    diagnostics: Option<String>,
    diagnostics_visible: bool,
    diagnostics_scroll: u16,
    notice: Option<Notice>,
    toast: Option<Toast>,
    show_help: bool,
    help_scroll: u16,
    help_viewport_height: u16,
    pending_external_action: Option<ExternalAction>,
    should_quit: bool,
}

impl App {
    fn new(launch: Launch, exec: Box<dyn Exec>) -> Self {
        let messages = launch.messages.clone();
        Self {
            launch,
            messages,
            exec,
            session: None,
            panel: None,
            active: None,
            files: Vec::new(),
            current_file: 0,
            viewer_height: 0,
            diagnostics: None,
            diagnostics_visible: false,
            diagnostics_scroll: 0,
            notice: None,
            toast: None,
            show_help: false,
            help_scroll: 0,
            help_viewport_height: 0,
            pending_external_action: None,
            should_quit: false,
        }
    }

    /// Starts a new session for the source file unless a transformation is still watched.
    fn start_session(&mut self) {
        if self.active.is_some() {
            self.set_notice(NoticeLevel::Warning, self.messages.text("status.already_running"));
            return;
        }
        let context = SessionContext::new(
            self.launch.source.clone(),
            self.launch.processor.clone(),
            self.launch.availability.clone(),
            &self.launch.settings,
            self.messages.clone(),
        );
        let (session, effects) = Session::start(context);
        self.session = Some(session);
        self.apply_effects(effects);
        self.refresh_panel();
    }

    fn respond(&mut self, response: Response) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let effects = session.handle(response);
        self.apply_effects(effects);
        self.refresh_panel();
    }

    /// Mirrors the session's current prompt into the panel overlay.
    fn refresh_panel(&mut self) {
        let prompt = self.session.as_ref().and_then(Session::prompt);
        self.panel = match prompt {
            Some(Prompt::QuickPanel { title, status, items }) => {
                self.set_notice(NoticeLevel::Info, status);
                Some(Panel::Quick(QuickPanel::new(title, items)))
            }
            Some(Prompt::Input { caption, initial }) => {
                Some(Panel::Input(InputPanel { caption, value: initial }))
            }
            None => None,
        };
    }

    /// Runs session effects in order. A notice raised earlier in the batch (saved parameters,
    /// missing-parameter warning) stays on the status line; the dispatch text then goes to a toast.
    fn apply_effects(&mut self, effects: Vec<Effect>) {
        let mut noticed = false;
        for effect in effects {
            match effect {
                Effect::Status(text) => {
                    self.set_notice(NoticeLevel::Info, text);
                    noticed = true;
                }
                Effect::Warning(text) => {
                    self.set_notice(NoticeLevel::Warning, text);
                    noticed = true;
                }
                Effect::Error(text) => {
                    self.set_notice(NoticeLevel::Error, text);
                    noticed = true;
                }
                Effect::RememberParamFilename(name) => self.remember_param_filename(name),
                Effect::Dispatch(job) => {
                    if self.active.is_some() {
                        self.set_notice(
                            NoticeLevel::Warning,
                            self.messages.text("status.already_running"),
                        );
                        continue;
                    }
                    let output = job.output.clone();
                    match runner::dispatch(self.exec.as_ref(), job, Instant::now()) {
                        Ok(run) => {
                            self.active = Some(run);
                            self.diagnostics = None;
                            self.diagnostics_visible = false;
                            let text =
                                self.messages.format("status.dispatched", &[&output.display()]);
                            if noticed {
                                self.set_toast(text);
                            } else {
                                self.set_notice(NoticeLevel::Info, text);
                            }
                        }
                        Err(err) => {
                            warn!("dispatch failed: {err}");
                            self.set_notice(NoticeLevel::Error, err.user_message(&self.messages));
                        }
                    }
                }
            }
        }
    }

    fn remember_param_filename(&mut self, name: String) {
        self.launch.settings.last_param_filename = name.clone();
        let result = self.launch.store.update(|settings| settings.last_param_filename = name);
        if let Err(err) = result {
            warn!("cannot persist settings: {err}");
            self.set_notice(NoticeLevel::Error, err.user_message(&self.messages));
        }
    }

    /// Runs the completion watcher when its next check is due.
    fn tick(&mut self, now: Instant) {
        let Some(run) = self.active.as_mut() else {
            return;
        };
        let Some(outcome) = run.poll(now) else {
            return;
        };
        self.active = None;
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: WatchOutcome) {
        match outcome {
            WatchOutcome::Succeeded { output } => {
                self.open_file(&output, None);
                let text = self.messages.format("status.succeeded", &[&output.display()]);
                self.set_notice(NoticeLevel::Info, text);
            }
            WatchOutcome::Failed { diagnostics, stylesheet, location, partial_output } => {
                self.diagnostics =
                    Some(format!("{}\n{diagnostics}", self.messages.text("diagnostics.header")));
                self.diagnostics_visible = true;
                self.diagnostics_scroll = 0;
                self.open_file(
                    &stylesheet,
                    Some(location.unwrap_or(ErrorLocation { line: 1, column: 1 })),
                );
                self.set_notice(NoticeLevel::Error, self.messages.text("error.transform_failed"));
                if let Some(output) = partial_output {
                    self.open_file(&output, None);
                    let text = self.messages.format("status.partial_output", &[&output.display()]);
                    self.set_toast(text);
                }
            }
            WatchOutcome::TimedOut { output } => {
                debug!("no output at {output:?}");
                self.set_notice(NoticeLevel::Error, self.messages.text("error.transform_failed"));
            }
        }
    }

    /// Opens (or re-reads) `path` in the viewer and focuses it.
    fn open_file(&mut self, path: &Path, location: Option<ErrorLocation>) {
        let view = match FileView::load(path, location) {
            Ok(view) => view,
            Err(err) => {
                self.set_notice(NoticeLevel::Error, err.user_message(&self.messages));
                return;
            }
        };
        match self.files.iter().position(|open| open.path == view.path) {
            Some(idx) => {
                self.files[idx] = view;
                self.current_file = idx;
            }
            None => {
                self.files.push(view);
                self.current_file = self.files.len() - 1;
            }
        }
    }

    fn current_view(&self) -> Option<&FileView> {
        self.files.get(self.current_file)
    }

    fn current_view_mut(&mut self) -> Option<&mut FileView> {
        self.files.get_mut(self.current_file)
    }

    fn cycle_file(&mut self) {
        if !self.files.is_empty() {
            self.current_file = (self.current_file + 1) % self.files.len();
        }
    }

    fn scroll_viewer(&mut self, delta: i32) {
        if let Some(view) = self.current_view_mut() {
            view.scroll_by(delta);
        }
    }

    fn scroll_viewer_page(&mut self, direction: i32) {
        let page = i32::from(self.viewer_height.max(2).saturating_sub(1));
        self.scroll_viewer(direction.signum() * page);
    }

    fn scroll_diagnostics(&mut self, delta: i32) {
        let lines = self.diagnostics.as_deref().map(|text| text.lines().count()).unwrap_or(0);
        let max = u16::try_from(lines.saturating_sub(1)).unwrap_or(u16::MAX);
        let next = i32::from(self.diagnostics_scroll).saturating_add(delta).max(0);
        self.diagnostics_scroll = u16::try_from(next).unwrap_or(u16::MAX).min(max);
    }

    fn toggle_diagnostics(&mut self) {
        self.diagnostics_visible = !self.diagnostics_visible;
    }

    fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0;
        }
    }

    fn help_scroll_by(&mut self, delta: i32) {
        if delta < 0 {
            self.help_scroll = self.help_scroll.saturating_sub(delta.unsigned_abs() as u16);
        } else {
            self.help_scroll = self.help_scroll.saturating_add(delta as u16);
        }
    }

    fn help_scroll_page(&mut self, direction: i32) {
        let page = self.help_viewport_height.max(1).saturating_sub(1) as i32;
        let step = page.max(1);
        self.help_scroll_by(direction.signum() * step);
    }

    fn take_external_action(&mut self) -> Option<ExternalAction> {
        self.pending_external_action.take()
    }

    fn queue_edit_current_file(&mut self) {
        let Some(view) = self.current_view() else {
            self.set_toast(self.messages.text("status.no_file_open"));
            return;
        };
        self.pending_external_action =
            Some(ExternalAction::EditFile { path: view.path.clone(), line: view.focus_line() });
    }

    fn execute_external_action(&mut self, action: ExternalAction) -> Result<(), String> {
        match action {
            ExternalAction::EditFile { path, line } => {
                let editor_command = resolve_editor_command();
                launch_editor_command(&editor_command, &path, line)?;
                let location = self.current_view().and_then(|view| view.location);
                self.open_file(&path, location);
                Ok(())
            }
        }
    }

    fn yank_diagnostics(&mut self) {
        let Some(text) = self.diagnostics.clone() else {
            self.set_toast(self.messages.text("status.nothing_to_copy"));
            return;
        };
        match copy_to_clipboard(&text) {
            Ok(backend) => {
                let message = self.messages.format("status.copied", &[&backend]);
                self.set_toast(message);
            }
            Err(err) => {
                let message = self.messages.format("status.editor_failed", &[&err]);
                self.set_toast(message);
            }
        }
    }

    fn set_notice(&mut self, level: NoticeLevel, text: String) {
        self.notice = Some(Notice { level, text });
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast { message: message.into(), expires_at: Instant::now() + TOAST_TTL });
    }

    fn toast_suffix(&mut self, now: Instant) -> String {
        let toast_snapshot =
            self.toast.as_ref().map(|toast| (toast.message.clone(), toast.expires_at));
        match toast_snapshot {
            Some((message, expires_at)) if expires_at > now => format!(" | {message}"),
            Some(_) => {
                self.toast = None;
                String::new()
            }
            None => String::new(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.handle_key_code(key.code) {
            self.should_quit = true;
        }
    }

    /// Returns `true` when the app should quit.
    fn handle_key_code(&mut self, code: KeyCode) -> bool {
        if self.show_help {
            match code {
                KeyCode::Esc | KeyCode::Char('?') => self.show_help = false,
                KeyCode::Char('q') => return true,
                KeyCode::Down | KeyCode::Char('j') => self.help_scroll_by(1),
                KeyCode::Up | KeyCode::Char('k') => self.help_scroll_by(-1),
                KeyCode::PageDown => self.help_scroll_page(1),
                KeyCode::PageUp => self.help_scroll_page(-1),
                KeyCode::Home => self.help_scroll = 0,
                KeyCode::End => self.help_scroll = u16::MAX,
                _ => {}
            }
            return false;
        }

        match self.panel.as_mut() {
            Some(Panel::Quick(panel)) => {
                match code {
                    KeyCode::Esc => self.respond(Response::Pick(CANCELLED)),
                    KeyCode::Enter => {
                        if let Some(index) = panel.selected_index() {
                            self.respond(Response::Pick(index));
                        }
                    }
                    KeyCode::Down => panel.move_cursor(1),
                    KeyCode::Up => panel.move_cursor(-1),
                    KeyCode::PageDown => panel.move_cursor(10),
                    KeyCode::PageUp => panel.move_cursor(-10),
                    KeyCode::Backspace => {
                        panel.query.pop();
                        panel.refilter();
                    }
                    KeyCode::Char(ch) => {
                        panel.query.push(ch);
                        panel.refilter();
                    }
                    _ => {}
                }
                return false;
            }
            Some(Panel::Input(panel)) => {
                match code {
                    KeyCode::Esc => self.respond(Response::Dismiss),
                    KeyCode::Enter => {
                        let value = panel.value.clone();
                        self.respond(Response::Submit(value));
                    }
                    KeyCode::Backspace => {
                        panel.value.pop();
                    }
                    KeyCode::Char(ch) => panel.value.push(ch),
                    _ => {}
                }
                return false;
            }
            None => {}
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char('r') => self.start_session(),
            KeyCode::Char('d') => self.toggle_diagnostics(),
            KeyCode::Char('y') => self.yank_diagnostics(),
            KeyCode::Char('e') => self.queue_edit_current_file(),
            KeyCode::Tab => self.cycle_file(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_viewer(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_viewer(-1),
            KeyCode::PageDown => self.scroll_viewer_page(1),
            KeyCode::PageUp => self.scroll_viewer_page(-1),
            KeyCode::Home => {
                if let Some(view) = self.current_view_mut() {
                    view.scroll = 0;
                }
            }
            KeyCode::End => {
                if let Some(view) = self.current_view_mut() {
                    view.scroll = view.max_scroll();
                }
            }
            KeyCode::Char('J') => self.scroll_diagnostics(1),
            KeyCode::Char('K') => self.scroll_diagnostics(-1),
            _ => {}
        }
        false
    }
}

/// Indices of `items` matching `query`, best first. An empty query keeps listing order.
fn filter_items(items: &[String], query: &str) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return (0..items.len()).collect();
    }

    let mut scored = items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| item_score(&needle, &item.to_lowercase()).map(|score| (score, idx)))
        .collect::<Vec<_>>();
    scored.sort_by(|(score_a, idx_a), (score_b, idx_b)| {
        score_b.cmp(score_a).then_with(|| idx_a.cmp(idx_b))
    });
    scored.into_iter().map(|(_, idx)| idx).collect()
}

/// Substring hits outrank subsequence hits; subsequence hits rank by similarity.
fn item_score(needle: &str, haystack: &str) -> Option<i64> {
    if let Some(first) = haystack.find(needle) {
        let mut score = 200_000i64.saturating_sub((first as i64) * 1000);
        score -= haystack.chars().count() as i64;
        if first == 0 {
            score += 50_000;
        }
        if haystack == needle {
            score += 100_000;
        }
        return Some(score);
    }

    if !is_subsequence(needle, haystack) {
        return None;
    }
    let ratio = rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars());
    Some((ratio * 1000.0).round() as i64)
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut hay = haystack.chars();
    needle.chars().all(|want| hay.any(|ch| ch == want))
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }

    fn run_external_action(
        &mut self,
        action: impl FnOnce() -> Result<(), String>,
    ) -> Result<(), String> {
        let _suspend = TerminalSuspendGuard::new(&mut self.terminal)
            .map_err(|err| format!("terminal suspend failed: {err}"))?;
        action()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

struct TerminalSuspendGuard<'a> {
    terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>,
}

impl<'a> TerminalSuspendGuard<'a> {
    fn new(terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<Self> {
        terminal.show_cursor()?;
        disable_raw_mode()?;

        if let Err(err) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
            let _ = enable_raw_mode();
            let _ = execute!(terminal.backend_mut(), EnterAlternateScreen);
            let _ = terminal.hide_cursor();
            let _ = ratatui::backend::Backend::flush(terminal.backend_mut());
            return Err(err);
        }

        ratatui::backend::Backend::flush(terminal.backend_mut())?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSuspendGuard<'_> {
    fn drop(&mut self) {
        let _ = enable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), EnterAlternateScreen);
        let _ = self.terminal.clear();
        let _ = self.terminal.hide_cursor();
        let _ = ratatui::backend::Backend::flush(self.terminal.backend_mut());
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}

fn copy_to_clipboard(text: &str) -> Result<&'static str, String> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(osc52_sequence(text))).map_err(|err| err.to_string())?;
    Ok("osc52")
}

fn osc52_sequence(text: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}

fn resolve_editor_command() -> String {
    env::var("VISUAL")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env::var("EDITOR").ok().filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_owned())
}

fn editor_shell_line(command: &str, path: &Path, line: u32) -> Result<String, String> {
    let path_text = path.to_string_lossy();
    if path_text.starts_with('-') {
        return Err(format!("refusing to open {path_text}"));
    }
    Ok(format!("{command} +{} {}", line.max(1), shell_single_quote(path_text.as_ref())))
}

fn launch_editor_command(command: &str, path: &Path, line: u32) -> Result<(), String> {
    let shell_line = editor_shell_line(command, path, line)?;
    let status = Command::new("sh")
        .arg("-lc")
        .arg(&shell_line)
        .status()
        .map_err(|err| format!("failed to run editor command `{command}`: {err}"))?;
    if !status.success() {
        return Err(format!("editor command failed with status {status}"));
    }
    Ok(())
}

fn shell_single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
