// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! XSLT Pilot: pick a stylesheet, collect its parameters, run Saxon, watch for the result.
//!
//! The interactive flow lives in [`session`]; [`tui`] hosts it in a terminal.

pub mod config;
pub mod error;
mod fsutil;
pub mod logging;
pub mod messages;
pub mod navigator;
pub mod params;
pub mod runner;
pub mod session;
pub mod stylesheet;
pub mod tui;

#[cfg(test)]
mod test_utils;
