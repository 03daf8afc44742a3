// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Completion detection for a dispatched transformation.
//!
//! [`classify`] is a pure function of the console text. [`CompletionWatcher`] adds the fixed
//! retry budget and the output-file check on top of it; the caller owns the clock.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::Regex;

pub const CHECK_INTERVAL: Duration = Duration::from_millis(500);
pub const MAX_ATTEMPTS: u32 = 20;

const RUNNING_BANNER: &str = "Running ";
const FINISHED_BANNER: &str = "[Finished ";

/// Any of these anywhere in the console body counts as a failure, `Warning` included.
pub const ERROR_MARKERS: [&str; 4] = ["Exception in thread", "Error", "Warning", "Fatal Error"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleBody {
    pub text: String,
    pub finished: bool,
}

/// Drops the leading `Running ...` and trailing `[Finished ...]` banner lines.
pub fn strip_banners(console_text: &str) -> ConsoleBody {
    let mut lines = console_text.lines().collect::<Vec<_>>();
    if lines.first().is_some_and(|line| line.starts_with(RUNNING_BANNER)) {
        lines.remove(0);
    }
    let finished = lines.last().is_some_and(|line| line.starts_with(FINISHED_BANNER));
    if finished {
        lines.pop();
    }
    ConsoleBody { text: lines.join("\n").trim().to_owned(), finished }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Clean console and the process has finished.
    Success,
    Error(String),
    /// Clean console, process still running (or not started writing yet).
    Pending,
}

pub fn classify(console_text: &str) -> Classification {
    let body = strip_banners(console_text);
    if !body.text.is_empty() && ERROR_MARKERS.iter().any(|marker| body.text.contains(marker)) {
        return Classification::Error(body.text);
    }
    if body.finished {
        Classification::Success
    } else {
        Classification::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

fn error_location_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Error on line (\d+) column (\d+)").ok()).as_ref()
}

/// First `Error on line N column M` position in the text.
pub fn error_location(text: &str) -> Option<ErrorLocation> {
    let captures = error_location_re()?.captures(text)?;
    let line = captures.get(1)?.as_str().parse().ok()?;
    let column = captures.get(2)?.as_str().parse().ok()?;
    Some(ErrorLocation { line, column })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Pending,
    Succeeded,
    Failed,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Succeeded {
        output: PathBuf,
    },
    /// Error text in the console. The output may still exist (partial result).
    Failed {
        diagnostics: String,
        stylesheet: PathBuf,
        location: Option<ErrorLocation>,
        partial_output: Option<PathBuf>,
    },
    TimedOut {
        output: PathBuf,
    },
}

impl WatchOutcome {
    pub fn state(&self) -> WatchState {
        match self {
            Self::Succeeded { .. } => WatchState::Succeeded,
            Self::Failed { .. } => WatchState::Failed,
            Self::TimedOut { .. } => WatchState::TimedOut,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionWatcher {
    output: PathBuf,
    stylesheet: PathBuf,
    attempts_left: u32,
    interval: Duration,
    next_check: Instant,
    state: WatchState,
}

impl CompletionWatcher {
    /// First check is one interval after `dispatched_at`.
    pub fn new(output: impl Into<PathBuf>, stylesheet: impl Into<PathBuf>, dispatched_at: Instant) -> Self {
        Self::with_budget(output, stylesheet, dispatched_at, MAX_ATTEMPTS, CHECK_INTERVAL)
    }

    pub fn with_budget(
        output: impl Into<PathBuf>,
        stylesheet: impl Into<PathBuf>,
        dispatched_at: Instant,
        attempts: u32,
        interval: Duration,
    ) -> Self {
        Self {
            output: output.into(),
            stylesheet: stylesheet.into(),
            attempts_left: attempts,
            interval,
            next_check: dispatched_at + interval,
            state: WatchState::Pending,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    pub fn next_check(&self) -> Instant {
        self.next_check
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.state == WatchState::Pending && now >= self.next_check
    }

    /// One scheduled check. Returns the terminal outcome, or `None` after rescheduling.
    pub fn check(&mut self, now: Instant, console_text: &str, output_exists: bool) -> Option<WatchOutcome> {
        if self.state != WatchState::Pending {
            return None;
        }

        let outcome = match classify(console_text) {
            Classification::Error(diagnostics) => WatchOutcome::Failed {
                location: error_location(&diagnostics),
                diagnostics,
                stylesheet: self.stylesheet.clone(),
                partial_output: output_exists.then(|| self.output.clone()),
            },
            _ if output_exists => WatchOutcome::Succeeded { output: self.output.clone() },
            classification => {
                if self.attempts_left == 0 || classification == Classification::Success {
                    WatchOutcome::TimedOut { output: self.output.clone() }
                } else {
                    self.attempts_left -= 1;
                    self.next_check = now + self.interval;
                    return None;
                }
            }
        };

        self.state = outcome.state();
        Some(outcome)
    }
}
