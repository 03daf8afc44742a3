// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One transformation session as an explicit state machine.
//!
//! The host shows whatever [`Session::prompt`] asks for, feeds the user's answer back through
//! [`Session::handle`], and carries out the returned [`Effect`]s. The session never touches the
//! terminal or spawns processes itself, so every flow can be driven from tests.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::{Availability, ProcessorConfig, Settings};
use crate::error::PilotError;
use crate::messages::Messages;
use crate::navigator::{FileFilter, NavOutcome, Navigator, CANCELLED};
use crate::params::{missing_params, param_file_name, read_param_file, write_param_file, ParamMap};
use crate::runner::{prepare, TransformJob, TransformRequest};
use crate::stylesheet::declared_params;

// Rows of the parameter-mode panel.
const CHOICE_RUN_WITHOUT: i64 = 0;
const CHOICE_ENTER_MANUALLY: i64 = 1;
const CHOICE_LOAD_FILE: i64 = 2;

/// Everything a session needs from the outside world, resolved before it starts.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub source: PathBuf,
    pub working_dir: PathBuf,
    pub processor: ProcessorConfig,
    pub availability: Availability,
    pub suppress_warnings: bool,
    pub last_param_filename: String,
    pub messages: Messages,
}

impl SessionContext {
    pub fn new(
        source: impl Into<PathBuf>,
        processor: ProcessorConfig,
        availability: Availability,
        settings: &Settings,
        messages: Messages,
    ) -> Self {
        let source = source.into();
        let working_dir = working_dir_for(&source);
        Self {
            source,
            working_dir,
            processor,
            availability,
            suppress_warnings: settings.suppress_warnings,
            last_param_filename: settings.last_param_filename.clone(),
            messages,
        }
    }
}

/// The source file's directory, or `.` for a bare file name.
pub fn working_dir_for(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    BrowsingStylesheet(Navigator),
    ChoosingParamMode,
    EnteringParam { index: usize },
    NamingParamFile,
    BrowsingParamFile(Navigator),
    Dispatched,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Dispatched | Self::Cancelled | Self::Failed)
    }
}

/// A user's answer to the current prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Quick-panel choice; `-1` means cancelled.
    Pick(i64),
    Submit(String),
    /// Escape on either kind of panel.
    Dismiss,
}

/// What the host should currently display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    QuickPanel { title: String, status: String, items: Vec<String> },
    Input { caption: String, initial: String },
}

/// Side effects for the host to perform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Status(String),
    /// Non-blocking; the session carries on.
    Warning(String),
    Error(String),
    RememberParamFilename(String),
    Dispatch(TransformJob),
}

#[derive(Debug, Clone)]
pub struct Session {
    context: SessionContext,
    state: SessionState,
    stylesheet: Option<PathBuf>,
    declared: Vec<String>,
    collected: ParamMap,
    param_file: Option<PathBuf>,
}

impl Session {
    /// Checks the environment and opens the stylesheet browser in the working directory.
    pub fn start(context: SessionContext) -> (Self, Vec<Effect>) {
        let mut session = Self {
            context,
            state: SessionState::Failed,
            stylesheet: None,
            declared: Vec::new(),
            collected: ParamMap::new(),
            param_file: None,
        };
        let mut effects = Vec::new();

        let opened = session
            .context
            .availability
            .check(&session.context.processor)
            .and_then(|()| Navigator::open(&session.context.working_dir, FileFilter::Stylesheets));
        session.state = match opened {
            Ok(navigator) => {
                info!("session started for {:?}", session.context.source);
                effects.push(Effect::Status(session.context.messages.text("status.browse_stylesheet")));
                SessionState::BrowsingStylesheet(navigator)
            }
            Err(err) => session.fail(err, &mut effects),
        };
        (session, effects)
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn stylesheet(&self) -> Option<&Path> {
        self.stylesheet.as_deref()
    }

    pub fn declared_params(&self) -> &[String] {
        &self.declared
    }

    pub fn collected(&self) -> &ParamMap {
        &self.collected
    }

    pub fn param_file(&self) -> Option<&Path> {
        self.param_file.as_deref()
    }

    pub fn prompt(&self) -> Option<Prompt> {
        let messages = &self.context.messages;
        match &self.state {
            SessionState::BrowsingStylesheet(navigator) => Some(Prompt::QuickPanel {
                title: messages.format("panel.stylesheet_title", &[&navigator.dir().display()]),
                status: messages.text("status.browse_stylesheet"),
                items: navigator.listing().labels(messages),
            }),
            SessionState::BrowsingParamFile(navigator) => Some(Prompt::QuickPanel {
                title: messages.format("panel.param_file_title", &[&navigator.dir().display()]),
                status: messages.text("status.browse_param_file"),
                items: navigator.listing().labels(messages),
            }),
            SessionState::ChoosingParamMode => {
                let name = self
                    .stylesheet
                    .as_deref()
                    .and_then(Path::file_name)
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Some(Prompt::QuickPanel {
                    title: messages.format("panel.param_choice_title", &[&name]),
                    status: messages.format("status.choose_param_mode", &[&self.declared.len()]),
                    items: vec![
                        messages.text("choice.run_without"),
                        messages.text("choice.enter_manually"),
                        messages.text("choice.load_file"),
                    ],
                })
            }
            SessionState::EnteringParam { index } => {
                let name = self.declared.get(*index).map(String::as_str).unwrap_or_default();
                Some(Prompt::Input {
                    caption: messages.format("prompt.param_value", &[&name]),
                    initial: String::new(),
                })
            }
            SessionState::NamingParamFile => Some(Prompt::Input {
                caption: messages
                    .format("prompt.param_file_name", &[&self.context.working_dir.display()]),
                initial: self.context.last_param_filename.clone(),
            }),
            SessionState::Dispatched | SessionState::Cancelled | SessionState::Failed => None,
        }
    }

    /// Single entry point for user responses. A response that does not fit the current prompt
    /// is ignored.
    pub fn handle(&mut self, response: Response) -> Vec<Effect> {
        let mut effects = Vec::new();
        let state = std::mem::replace(&mut self.state, SessionState::Failed);
        self.state = match (state, response) {
            (SessionState::BrowsingStylesheet(navigator), response) => match pick_index(&response) {
                Some(index) => self.on_stylesheet_pick(navigator, index, &mut effects),
                None => SessionState::BrowsingStylesheet(navigator),
            },
            (SessionState::ChoosingParamMode, response) => match pick_index(&response) {
                Some(index) => self.on_param_choice(index, &mut effects),
                None => SessionState::ChoosingParamMode,
            },
            (SessionState::EnteringParam { index }, Response::Submit(value)) => {
                self.on_param_value(index, value)
            }
            (SessionState::NamingParamFile, Response::Submit(name)) => {
                self.on_param_file_name(&name, &mut effects)
            }
            (
                SessionState::EnteringParam { .. } | SessionState::NamingParamFile,
                Response::Dismiss,
            ) => self.cancel("status.param_entry_cancelled", &mut effects),
            (SessionState::BrowsingParamFile(navigator), response) => match pick_index(&response) {
                Some(index) => self.on_param_file_pick(navigator, index, &mut effects),
                None => SessionState::BrowsingParamFile(navigator),
            },
            (state, response) => {
                debug!("ignoring {response:?} in {state:?}");
                state
            }
        };
        effects
    }

    fn on_stylesheet_pick(
        &mut self,
        mut navigator: Navigator,
        index: i64,
        effects: &mut Vec<Effect>,
    ) -> SessionState {
        match navigator.select(index) {
            Ok(NavOutcome::Browsing) => SessionState::BrowsingStylesheet(navigator),
            Ok(NavOutcome::Cancelled) => self.cancel("status.selection_cancelled", effects),
            Ok(NavOutcome::Selected(path)) => {
                self.declared = declared_params(&path);
                debug!("stylesheet {path:?} declares {:?}", self.declared);
                self.stylesheet = Some(path);
                if self.declared.is_empty() {
                    return self.dispatch(None, effects);
                }
                effects.push(Effect::Status(
                    self.context.messages.format("status.choose_param_mode", &[&self.declared.len()]),
                ));
                SessionState::ChoosingParamMode
            }
            Err(err) => self.fail(err, effects),
        }
    }

    fn on_param_choice(&mut self, index: i64, effects: &mut Vec<Effect>) -> SessionState {
        match index {
            CHOICE_RUN_WITHOUT => self.dispatch(None, effects),
            CHOICE_ENTER_MANUALLY => {
                self.collected.clear();
                SessionState::EnteringParam { index: 0 }
            }
            CHOICE_LOAD_FILE => {
                match Navigator::open(&self.context.working_dir, FileFilter::ParameterFiles) {
                    Ok(navigator) => {
                        effects.push(Effect::Status(
                            self.context.messages.text("status.browse_param_file"),
                        ));
                        SessionState::BrowsingParamFile(navigator)
                    }
                    Err(err) => self.fail(err, effects),
                }
            }
            _ => self.cancel("status.param_choice_cancelled", effects),
        }
    }

    fn on_param_value(&mut self, index: usize, value: String) -> SessionState {
        if let Some(name) = self.declared.get(index) {
            self.collected.insert(name.clone(), value);
        }
        if index + 1 < self.declared.len() {
            SessionState::EnteringParam { index: index + 1 }
        } else {
            SessionState::NamingParamFile
        }
    }

    fn on_param_file_name(&mut self, input: &str, effects: &mut Vec<Effect>) -> SessionState {
        let Some(file_name) = param_file_name(input) else {
            effects.push(Effect::Error(
                PilotError::ParamFileNameEmpty.user_message(&self.context.messages),
            ));
            return SessionState::NamingParamFile;
        };
        let path = self.context.working_dir.join(&file_name);

        if let Err(err) = write_param_file(&path, &self.collected) {
            return self.fail(err, effects);
        }
        effects.push(Effect::Status(
            self.context.messages.format("status.params_saved", &[&file_name]),
        ));
        self.remember(file_name, effects);

        // Read back what was just written before handing it to the processor.
        match read_param_file(&path) {
            Ok(_) => self.dispatch(Some(path), effects),
            Err(err) => self.fail(err, effects),
        }
    }

    fn on_param_file_pick(
        &mut self,
        mut navigator: Navigator,
        index: i64,
        effects: &mut Vec<Effect>,
    ) -> SessionState {
        let path = match navigator.select(index) {
            Ok(NavOutcome::Browsing) => return SessionState::BrowsingParamFile(navigator),
            Ok(NavOutcome::Cancelled) => {
                return self.cancel("status.param_file_cancelled", effects)
            }
            Ok(NavOutcome::Selected(path)) => path,
            Err(err) => return self.fail(err, effects),
        };

        let loaded = match read_param_file(&path) {
            Ok(loaded) => loaded,
            Err(err) => return self.fail(err, effects),
        };
        let file_name =
            path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();

        let missing = missing_params(&self.declared, &loaded);
        if !missing.is_empty() {
            warn!("{path:?} lacks declared parameters: {missing:?}");
            effects.push(Effect::Warning(self.context.messages.format(
                "warning.missing_params",
                &[&file_name, &missing.join(", ")],
            )));
        }
        self.collected = loaded;
        self.remember(file_name, effects);
        self.dispatch(Some(path), effects)
    }

    fn remember(&mut self, file_name: String, effects: &mut Vec<Effect>) {
        self.context.last_param_filename = file_name.clone();
        effects.push(Effect::RememberParamFilename(file_name));
    }

    fn dispatch(&mut self, param_file: Option<PathBuf>, effects: &mut Vec<Effect>) -> SessionState {
        let Some(stylesheet) = self.stylesheet.clone() else {
            return SessionState::Failed;
        };
        let request = TransformRequest {
            source: self.context.source.clone(),
            stylesheet,
            param_file: param_file.clone(),
            working_dir: self.context.working_dir.clone(),
        };
        self.param_file = param_file;

        match prepare(&request, &self.context.processor, self.context.suppress_warnings) {
            Ok(job) => {
                info!("transformation ready: {}", job.command.display_line());
                effects.push(Effect::Dispatch(job));
                SessionState::Dispatched
            }
            Err(err) => self.fail(err, effects),
        }
    }

    fn cancel(&self, key: &str, effects: &mut Vec<Effect>) -> SessionState {
        debug!("session cancelled: {key}");
        effects.push(Effect::Status(self.context.messages.text(key)));
        SessionState::Cancelled
    }

    fn fail(&self, err: PilotError, effects: &mut Vec<Effect>) -> SessionState {
        warn!("session failed: {err}");
        effects.push(Effect::Error(err.user_message(&self.context.messages)));
        SessionState::Failed
    }
}

fn pick_index(response: &Response) -> Option<i64> {
    match response {
        Response::Pick(index) => Some(*index),
        Response::Dismiss => Some(CANCELLED),
        Response::Submit(_) => None,
    }
}

#[cfg(test)]
mod tests;
