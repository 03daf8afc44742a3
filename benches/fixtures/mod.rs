// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("xslt_pilot_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

pub mod console {
    const RUNNING: &str = "Running java -cp /opt/saxon/Saxon-HE-12.9.jar net.sf.saxon.Transform -s:doc.xml -xsl:report.xsl -o:doc-output.xml\n";

    fn body(lines: usize) -> String {
        let mut text = String::from(RUNNING);
        for index in 0..lines {
            text.push_str(&format!("processed record {index} of {lines}\n"));
        }
        text
    }

    pub fn finished_clean(lines: usize) -> String {
        let mut text = body(lines);
        text.push_str("[Finished in 1.2s]\n");
        text
    }

    pub fn finished_with_error(lines: usize) -> String {
        let mut text = body(lines);
        text.push_str("Error on line 42 column 7 of report.xsl:\n  XTDE0640 Circular definition\n");
        text.push_str("[Finished in 1.2s with exit code 2]\n");
        text
    }

    pub fn still_running(lines: usize) -> String {
        body(lines)
    }
}

pub mod tree {
    use std::fs;
    use std::path::Path;

    /// `dirs` subdirectories plus `files` files, one in four of them stylesheets.
    pub fn populate(root: &Path, dirs: usize, files: usize) {
        for index in 0..dirs {
            fs::create_dir_all(root.join(format!("dir-{index:04}"))).expect("create dir");
        }
        for index in 0..files {
            let name = if index % 4 == 0 {
                format!("sheet-{index:04}.xsl")
            } else {
                format!("data-{index:04}.xml")
            };
            fs::write(root.join(name), "<x/>").expect("write file");
        }
    }
}
