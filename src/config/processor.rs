// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

use super::settings::Settings;
use crate::error::PilotError;

pub const SAXON_ENTRYPOINT: &str = "net.sf.saxon.Transform";
pub const REQUIRED_JARS: [&str; 3] =
    ["Saxon-HE-12.9.jar", "xmlresolver-6.0.6.jar", "xmlresolver-6.0.6-data.jar"];

const MACOS_JAVA_CANDIDATES: [&str; 2] = [
    // Apple Silicon, then Intel Homebrew prefixes.
    "/opt/homebrew/opt/openjdk@11/bin/java",
    "/usr/local/opt/openjdk@11/bin/java",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        match env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            _ => Self::Linux,
        }
    }

    pub fn classpath_separator(self) -> char {
        match self {
            Self::Windows => ';',
            Self::MacOs | Self::Linux => ':',
        }
    }

    pub fn default_jar_dir(self) -> PathBuf {
        match self {
            Self::Windows => env::var_os("ProgramFiles")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"))
                .join("Saxon"),
            Self::MacOs => {
                dirs::home_dir().unwrap_or_else(|| PathBuf::from("~")).join("Library").join("Saxon")
            }
            Self::Linux => PathBuf::from("/usr/local/lib/saxon"),
        }
    }

    fn default_java_bin(self) -> String {
        if self == Self::MacOs {
            if let Some(found) =
                MACOS_JAVA_CANDIDATES.iter().find(|candidate| Path::new(candidate).exists())
            {
                return (*found).to_owned();
            }
        }
        "java".to_owned()
    }

    pub fn java_install_hint(self) -> &'static str {
        match self {
            Self::Windows => "download from adoptium.net on Windows",
            Self::MacOs => "brew install openjdk@11 on macOS",
            Self::Linux => "sudo apt install openjdk-11-jre on Linux",
        }
    }

    pub fn setup_script(self) -> &'static str {
        match self {
            Self::Windows => "setup_XmlTransformer_windows.bat",
            Self::MacOs => "setup_XmlTransformer_macos.sh",
            Self::Linux => "setup_XmlTransformer_ubuntu.sh",
        }
    }
}

/// Where the external processor lives and how to put it on the classpath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    platform: Platform,
    java_bin: String,
    jar_dir: PathBuf,
    classpath_separator: char,
    entrypoint: String,
}

impl ProcessorConfig {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            java_bin: platform.default_java_bin(),
            jar_dir: platform.default_jar_dir(),
            classpath_separator: platform.classpath_separator(),
            entrypoint: SAXON_ENTRYPOINT.to_owned(),
        }
    }

    /// Platform defaults with the `java_bin` / `jar_dir` settings applied on top.
    pub fn resolve(platform: Platform, settings: &Settings) -> Self {
        let mut config = Self::for_platform(platform);
        if let Some(java_bin) = settings.java_bin.as_deref().filter(|bin| !bin.trim().is_empty()) {
            config.java_bin = java_bin.to_owned();
        }
        if let Some(jar_dir) = settings.jar_dir.as_ref() {
            config.jar_dir = jar_dir.clone();
        }
        debug!(
            "processor config: platform={:?} java={} jars={:?}",
            config.platform, config.java_bin, config.jar_dir
        );
        config
    }

    pub fn with_java_bin(mut self, java_bin: impl Into<String>) -> Self {
        self.java_bin = java_bin.into();
        self
    }

    pub fn with_jar_dir(mut self, jar_dir: impl Into<PathBuf>) -> Self {
        self.jar_dir = jar_dir.into();
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn java_bin(&self) -> &str {
        &self.java_bin
    }

    pub fn jar_dir(&self) -> &Path {
        &self.jar_dir
    }

    pub fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    pub fn jar_paths(&self) -> Vec<PathBuf> {
        REQUIRED_JARS.iter().map(|jar| self.jar_dir.join(jar)).collect()
    }

    /// The three required jars joined by the platform separator.
    pub fn classpath(&self) -> String {
        self.jar_paths()
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(&self.classpath_separator.to_string())
    }

    pub fn missing_jars(&self) -> Vec<String> {
        REQUIRED_JARS
            .iter()
            .filter(|jar| !self.jar_dir.join(jar).is_file())
            .map(|jar| (*jar).to_owned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaStatus {
    Found { version: String },
    Missing { detail: String },
}

/// Result of the one-time environment probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub java: JavaStatus,
    pub missing_jars: Vec<String>,
}

impl Availability {
    pub fn ready() -> Self {
        Self { java: JavaStatus::Found { version: String::new() }, missing_jars: Vec::new() }
    }

    /// Runs `<java> -version` and checks the jar directory.
    pub fn probe(config: &ProcessorConfig) -> Self {
        let java = probe_java(config.java_bin());
        let missing_jars = config.missing_jars();
        if !missing_jars.is_empty() {
            warn!("missing jars in {:?}: {}", config.jar_dir(), missing_jars.join(", "));
        }
        Self { java, missing_jars }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.java, JavaStatus::Found { .. }) && self.missing_jars.is_empty()
    }

    pub fn check(&self, config: &ProcessorConfig) -> Result<(), PilotError> {
        if let JavaStatus::Missing { detail } = &self.java {
            return Err(PilotError::JavaUnavailable {
                detail: detail.clone(),
                install_hint: config.platform().java_install_hint().to_owned(),
            });
        }
        if !self.missing_jars.is_empty() {
            return Err(PilotError::LibrariesMissing {
                jar_dir: config.jar_dir().to_path_buf(),
                missing: self.missing_jars.clone(),
                setup_hint: config.platform().setup_script().to_owned(),
            });
        }
        Ok(())
    }
}

fn probe_java(java_bin: &str) -> JavaStatus {
    let mut command = Command::new(java_bin);
    command.arg("-version");
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    match command.output() {
        Ok(output) if output.status.success() => {
            // `java -version` reports on stderr.
            let text = if output.stderr.is_empty() { output.stdout } else { output.stderr };
            let version = String::from_utf8_lossy(&text).lines().next().unwrap_or_default().to_owned();
            debug!("java found: {version}");
            JavaStatus::Found { version }
        }
        Ok(output) => {
            let detail = format!("`{java_bin} -version` exited with {}", output.status);
            warn!("{detail}");
            JavaStatus::Missing { detail }
        }
        Err(err) => {
            let detail = format!("cannot run `{java_bin}`: {err}");
            warn!("{detail}");
            JavaStatus::Missing { detail }
        }
    }
}
