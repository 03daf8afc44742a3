// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Directory browser behind the quick panels.
//!
//! A [`Listing`] is always: one navigation sentinel (parent, or root when already at the
//! filesystem root), then subdirectories, then files matching the [`FileFilter`]. Index `-1`
//! means the panel was cancelled; any other index addresses the listing 1:1.

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use log::{debug, warn};

use crate::error::PilotError;
use crate::messages::Messages;

/// Entries whose names are this long or longer are left out of the listing.
pub const MAX_NAME_CHARS: usize = 100;

pub const CANCELLED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFilter {
    Stylesheets,
    ParameterFiles,
}

impl FileFilter {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Stylesheets => "xsl",
            Self::ParameterFiles => "xml",
        }
    }

    /// Short file kind used in user messages ("XSL", "XML").
    pub fn kind(self) -> &'static str {
        match self {
            Self::Stylesheets => "XSL",
            Self::ParameterFiles => "XML",
        }
    }

    pub fn matches(self, file_name: &str) -> bool {
        file_name
            .strip_suffix(self.extension())
            .is_some_and(|stem| stem.ends_with('.'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Parent,
    Root,
    Directory(String),
    File(String),
}

impl Entry {
    /// Panel label; directories carry a trailing path separator.
    pub fn label(&self, messages: &Messages) -> String {
        match self {
            Self::Parent => messages.text("panel.parent"),
            Self::Root => messages.text("panel.root"),
            Self::Directory(name) => format!("{name}{MAIN_SEPARATOR}"),
            Self::File(name) => name.clone(),
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    dir: PathBuf,
    entries: Vec<Entry>,
}

impl Listing {
    /// The canonical directory this listing was taken from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: i64) -> Option<&Entry> {
        usize::try_from(index).ok().and_then(|index| self.entries.get(index))
    }

    pub fn labels(&self, messages: &Messages) -> Vec<String> {
        self.entries.iter().map(|entry| entry.label(messages)).collect()
    }
}

/// Lists `dir` for a quick panel.
///
/// Hidden (dot-prefixed) directories are skipped. Both groups are sorted case-sensitively by
/// their panel label. A directory with neither subdirectories nor matching files is an error.
pub fn list_directory(dir: &Path, filter: FileFilter) -> Result<Listing, PilotError> {
    if !dir.is_dir() {
        return Err(PilotError::InvalidDirectory(dir.to_path_buf()));
    }
    let dir = fs::canonicalize(dir).map_err(|source| PilotError::io(dir, source))?;
    let read_dir = fs::read_dir(&dir).map_err(|source| PilotError::io(&dir, source))?;

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| PilotError::io(&dir, source))?;
        let Ok(name) = entry.file_name().into_string() else {
            debug!("skipping non-UTF-8 entry in {dir:?}");
            continue;
        };
        if name.chars().count() >= MAX_NAME_CHARS {
            continue;
        }
        // Follows symlinks, so linked directories browse like real ones.
        let Ok(metadata) = fs::metadata(entry.path()) else {
            continue;
        };
        if metadata.is_dir() {
            if !name.starts_with('.') {
                dirs.push(format!("{name}{MAIN_SEPARATOR}"));
            }
        } else if filter.matches(&name) {
            files.push(name);
        }
    }

    if dirs.is_empty() && files.is_empty() {
        return Err(PilotError::NavigationEmpty { dir, kind: filter.kind() });
    }

    dirs.sort();
    files.sort();

    let sentinel = if dir.parent().is_none() { Entry::Root } else { Entry::Parent };
    let mut entries = Vec::with_capacity(1 + dirs.len() + files.len());
    entries.push(sentinel);
    entries.extend(dirs.into_iter().map(|mut label| {
        label.pop();
        Entry::Directory(label)
    }));
    entries.extend(files.into_iter().map(Entry::File));

    Ok(Listing { dir, entries })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Still browsing; the navigator now shows a new listing.
    Browsing,
    Selected(PathBuf),
    Cancelled,
}

/// The quick-panel directory browser state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    filter: FileFilter,
    listing: Listing,
}

impl Navigator {
    pub fn open(dir: &Path, filter: FileFilter) -> Result<Self, PilotError> {
        let listing = list_directory(dir, filter)?;
        debug!("browsing {:?} ({} entries)", listing.dir(), listing.len());
        Ok(Self { filter, listing })
    }

    pub fn filter(&self) -> FileFilter {
        self.filter
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn dir(&self) -> &Path {
        self.listing.dir()
    }

    /// Applies a quick-panel choice.
    pub fn select(&mut self, index: i64) -> Result<NavOutcome, PilotError> {
        if index == CANCELLED {
            return Ok(NavOutcome::Cancelled);
        }
        let Some(entry) = self.listing.get(index).cloned() else {
            warn!("panel index {index} out of range ({} entries)", self.listing.len());
            return Ok(NavOutcome::Cancelled);
        };

        let next_dir = match entry {
            Entry::Parent => match self.listing.dir().parent() {
                Some(parent) => parent.to_path_buf(),
                None => self.listing.dir().to_path_buf(),
            },
            Entry::Root => self.listing.dir().to_path_buf(),
            Entry::Directory(name) => self.listing.dir().join(name),
            Entry::File(name) => {
                let path = self.listing.dir().join(name);
                if !path.exists() {
                    return Err(PilotError::MissingSelection(path));
                }
                return Ok(NavOutcome::Selected(path));
            }
        };

        self.listing = list_directory(&next_dir, self.filter)?;
        Ok(NavOutcome::Browsing)
    }
}
