// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Transform Runner: validate inputs, assemble the processor command, dispatch it, and watch
//! for completion.

pub mod command;
pub mod console;
pub mod watcher;

use std::path::PathBuf;
use std::time::Instant;

use log::{debug, info};

pub use command::{escape_value, output_path_for, TransformCommand, OUTPUT_SUFFIX};
pub use console::{Console, ConsoleExec, Exec};
pub use watcher::{
    classify, error_location, strip_banners, Classification, CompletionWatcher, ErrorLocation,
    WatchOutcome, WatchState, CHECK_INTERVAL, MAX_ATTEMPTS,
};

use crate::config::ProcessorConfig;
use crate::error::PilotError;
use crate::params::{read_param_file, ParamMap};
use crate::stylesheet::{check_well_formed, infer_output_method, OutputMethod};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    pub source: PathBuf,
    pub stylesheet: PathBuf,
    pub param_file: Option<PathBuf>,
    pub working_dir: PathBuf,
}

/// A validated, ready-to-dispatch transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformJob {
    pub command: TransformCommand,
    pub source: PathBuf,
    pub stylesheet: PathBuf,
    pub output: PathBuf,
    pub method: OutputMethod,
    pub working_dir: PathBuf,
}

/// Checks both inputs are well-formed and builds the command. Nothing is launched.
pub fn prepare(
    request: &TransformRequest,
    processor: &ProcessorConfig,
    suppress_warnings: bool,
) -> Result<TransformJob, PilotError> {
    check_well_formed(&request.source)?;
    check_well_formed(&request.stylesheet)?;

    let method = infer_output_method(&request.stylesheet);
    let output = output_path_for(&request.source, method);
    let params = match request.param_file.as_deref() {
        Some(path) => read_param_file(path)?,
        None => ParamMap::new(),
    };
    debug!("output method {method}, {} parameter(s)", params.len());

    let command = TransformCommand::build(
        processor,
        &request.source,
        &request.stylesheet,
        &output,
        suppress_warnings,
        &params,
    );
    Ok(TransformJob {
        command,
        source: request.source.clone(),
        stylesheet: request.stylesheet.clone(),
        output,
        method,
        working_dir: request.working_dir.clone(),
    })
}

/// A dispatched job plus the state needed to observe it.
#[derive(Debug, Clone)]
pub struct ActiveRun {
    job: TransformJob,
    console: Console,
    watcher: CompletionWatcher,
}

impl ActiveRun {
    pub fn job(&self) -> &TransformJob {
        &self.job
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn watcher(&self) -> &CompletionWatcher {
        &self.watcher
    }

    /// Runs the scheduled check when due; `None` while still pending.
    pub fn poll(&mut self, now: Instant) -> Option<WatchOutcome> {
        if !self.watcher.is_due(now) {
            return None;
        }
        let text = self.console.snapshot_blocking();
        let output_exists = self.job.output.exists();
        let outcome = self.watcher.check(now, &text, output_exists);
        if let Some(outcome) = outcome.as_ref() {
            info!("transformation finished: {:?}", outcome.state());
        }
        outcome
    }
}

/// Fire-and-forget dispatch; completion is observed through [`ActiveRun::poll`].
pub fn dispatch(exec: &dyn Exec, job: TransformJob, now: Instant) -> Result<ActiveRun, PilotError> {
    let console = exec.dispatch(&job.command, &job.working_dir)?;
    let watcher = CompletionWatcher::new(job.output.clone(), job.stylesheet.clone(), now);
    Ok(ActiveRun { job, console, watcher })
}
