// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Console-capturing execution facility.
//!
//! A dispatched process gets a [`Console`]: a shared text buffer that starts with a
//! `Running <command>` banner, accumulates stdout and stderr line by line, and ends with a
//! `[Finished in <secs>s]` banner once the process exits.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::runtime::Handle;
use tokio::sync::Mutex;

use super::command::TransformCommand;
use crate::error::PilotError;

#[derive(Debug, Clone, Default)]
pub struct Console {
    text: Arc<Mutex<String>>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: Arc::new(Mutex::new(text.into())) }
    }

    pub async fn append(&self, chunk: &str) {
        self.text.lock().await.push_str(chunk);
    }

    pub async fn snapshot(&self) -> String {
        self.text.lock().await.clone()
    }

    /// For the UI thread; must not be called from async code.
    pub fn snapshot_blocking(&self) -> String {
        self.text.blocking_lock().clone()
    }

    pub fn append_blocking(&self, chunk: &str) {
        self.text.blocking_lock().push_str(chunk);
    }
}

/// Seam between the runner and the process mechanism.
pub trait Exec {
    fn dispatch(&self, command: &TransformCommand, working_dir: &Path) -> Result<Console, PilotError>;
}

/// Spawns processes on a tokio runtime and streams their output into a [`Console`].
#[derive(Debug, Clone)]
pub struct ConsoleExec {
    handle: Handle,
}

impl ConsoleExec {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Exec for ConsoleExec {
    fn dispatch(&self, command: &TransformCommand, working_dir: &Path) -> Result<Console, PilotError> {
        let _runtime = self.handle.enter();

        let mut process = tokio::process::Command::new(command.program());
        process
            .args(command.args())
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = process.spawn().map_err(|source| PilotError::Dispatch {
            program: command.program().to_owned(),
            source,
        })?;
        debug!("dispatched: {}", command.display_line());

        let console = Console::with_text(format!("Running {}\n", command.display_line()));
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let started = Instant::now();

        self.handle.spawn({
            let console = console.clone();
            async move {
                let out = stdout.map(|reader| tokio::spawn(pump(reader, console.clone())));
                let err = stderr.map(|reader| tokio::spawn(pump(reader, console.clone())));
                let status = child.wait().await;
                if let Some(task) = out {
                    let _ = task.await;
                }
                if let Some(task) = err {
                    let _ = task.await;
                }

                let elapsed = started.elapsed().as_secs_f64();
                let banner = match status {
                    Ok(status) => match status.code() {
                        Some(code) if code != 0 => {
                            format!("[Finished in {elapsed:.1}s with exit code {code}]")
                        }
                        _ => format!("[Finished in {elapsed:.1}s]"),
                    },
                    Err(err) => {
                        warn!("waiting for processor failed: {err}");
                        format!("[Finished in {elapsed:.1}s]")
                    }
                };
                console.append(&format!("{banner}\n")).await;
            }
        });

        Ok(console)
    }
}

async fn pump(reader: impl AsyncRead + Unpin, console: Console) {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let mut text = String::from_utf8_lossy(&line).into_owned();
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                console.append(&text).await;
            }
            Err(err) => {
                debug!("console stream closed: {err}");
                break;
            }
        }
    }
}
