// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Settings persistence and external processor configuration.
//!
//! Settings are a flat JSON file; the processor configuration and its availability are resolved
//! once at startup and handed to each session as plain values.

pub mod processor;
pub mod settings;

pub use processor::{
    Availability, JavaStatus, Platform, ProcessorConfig, REQUIRED_JARS, SAXON_ENTRYPOINT,
};
pub use settings::{Settings, SettingsStore, DEFAULT_PARAM_FILENAME};
