// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! XSLT Pilot CLI entrypoint.
//!
//! Opens the terminal UI for one source document. Transformations are spawned on a
//! current-thread tokio runtime while the UI loop runs on a blocking worker.

use std::error::Error;
use std::path::PathBuf;

use log::info;
use xslt_pilot::config::{Availability, Platform, ProcessorConfig, SettingsStore};
use xslt_pilot::error::PilotError;
use xslt_pilot::messages::Messages;
use xslt_pilot::runner::ConsoleExec;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <source.xml> [--settings <path>] [--log-file <path>] [--debug]\n\n--settings overrides the settings file (default: <user config dir>/xslt-pilot/settings.json).\n--log-file overrides the log file (default: next to the settings file).\n--debug logs at debug level; RUST_LOG takes precedence."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    help: bool,
    source: Option<String>,
    settings: Option<String>,
    log_file: Option<String>,
    debug: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => options.help = true,
            "--debug" => {
                if options.debug {
                    return Err(());
                }
                options.debug = true;
            }
            "--settings" => {
                if options.settings.is_some() {
                    return Err(());
                }
                options.settings = Some(args.next().ok_or(())?);
            }
            "--log-file" => {
                if options.log_file.is_some() {
                    return Err(());
                }
                options.log_file = Some(args.next().ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.source.is_some() {
                    return Err(());
                }
                options.source = Some(arg);
            }
        }
    }

    if !options.help && options.source.is_none() {
        return Err(());
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "xslt-pilot".to_owned());

        let options = match parse_options(args) {
            Ok(options) if options.help => {
                print_usage(&program);
                return Ok(());
            }
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let store = match options.settings.as_deref() {
            Some(path) => SettingsStore::new(path),
            None => SettingsStore::default_location(),
        };
        let settings = store.load()?;
        let log_file = options.log_file.map(PathBuf::from).unwrap_or_else(|| store.log_path());
        xslt_pilot::logging::init(&log_file, options.debug || settings.debug)?;

        let messages = Messages::from_environment(settings.locale.as_deref());
        let processor = ProcessorConfig::resolve(Platform::current(), &settings);
        let availability = Availability::probe(&processor);
        info!(
            "starting with locale {}, java {:?}, jars in {:?}",
            messages.locale(),
            processor.java_bin(),
            processor.jar_dir()
        );

        let source = PathBuf::from(options.source.unwrap_or_default());
        if !source.is_file() {
            let err = PilotError::MissingSelection(source);
            return Err(err.user_message(&messages).into());
        }

        let launch = xslt_pilot::tui::Launch {
            source,
            settings,
            store,
            processor,
            availability,
            messages,
        };

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let exec = ConsoleExec::new(runtime.handle().clone());

        runtime.block_on(async move {
            let tui_join = tokio::task::spawn_blocking(move || {
                xslt_pilot::tui::run(launch, Box::new(exec)).map_err(|err| err.to_string())
            })
            .await;

            let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
            tui_result.map_err(|err| {
                Box::new(std::io::Error::new(std::io::ErrorKind::Other, err)) as Box<dyn Error>
            })?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("xslt-pilot: {err}");
        std::process::exit(1);
    }
}
