// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::ProcessorConfig;
use crate::params::ParamMap;
use crate::stylesheet::OutputMethod;

pub const OUTPUT_SUFFIX: &str = "-output";
pub const SILENCE_WARNINGS_FLAG: &str = "-warnings:silent";

/// `<source without extension>-output.<ext>`.
pub fn output_path_for(source: &Path, method: OutputMethod) -> PathBuf {
    let mut name: OsString = source.with_extension("").into_os_string();
    name.push(OUTPUT_SUFFIX);
    name.push(".");
    name.push(method.extension());
    PathBuf::from(name)
}

/// Escapes literal spaces in a parameter value with a backslash.
pub fn escape_value(value: &str) -> String {
    value.replace(' ', "\\ ")
}

/// A fully assembled processor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformCommand {
    program: String,
    args: Vec<String>,
}

impl TransformCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// `<java> -cp <classpath> <entrypoint> -s: -xsl: -o: [-warnings:silent] [name=value ...]`
    pub fn build(
        processor: &ProcessorConfig,
        source: &Path,
        stylesheet: &Path,
        output: &Path,
        suppress_warnings: bool,
        params: &ParamMap,
    ) -> Self {
        let mut args = vec![
            "-cp".to_owned(),
            processor.classpath(),
            processor.entrypoint().to_owned(),
            format!("-s:{}", source.display()),
            format!("-xsl:{}", stylesheet.display()),
            format!("-o:{}", output.display()),
        ];
        if suppress_warnings {
            args.push(SILENCE_WARNINGS_FLAG.to_owned());
        }
        args.extend(params.iter().map(|(name, value)| format!("{name}={}", escape_value(value))));
        Self::new(processor.java_bin(), args)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Shell-like rendering for the console banner and logs.
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("\"{part}\"")
                } else {
                    part.to_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
