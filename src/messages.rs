// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Locale resource bundles for every user-facing string.
//!
//! Bundles are flat JSON objects (`key -> template`) compiled into the binary. Templates use
//! positional placeholders (`{0}`, `{1}`, ...). Lookups that miss the active locale fall back to
//! the default (`en`) bundle, and finally to the key itself.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::sync::Arc;

use log::warn;

pub const DEFAULT_LOCALE: &str = "en";

const BUNDLES: &[(&str, &str)] =
    &[("en", include_str!("../locales/en.json")), ("de", include_str!("../locales/de.json"))];

type Bundle = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct Messages {
    locale: String,
    bundle: Arc<Bundle>,
    fallback: Arc<Bundle>,
}

impl Default for Messages {
    fn default() -> Self {
        Self::load(DEFAULT_LOCALE)
    }
}

impl Messages {
    /// Loads the bundle for `locale` (normalised, e.g. `de_DE.UTF-8` -> `de`).
    pub fn load(locale: &str) -> Self {
        let locale = normalize_locale(locale);
        let fallback = Arc::new(parse_bundle(DEFAULT_LOCALE));
        let bundle = if locale == DEFAULT_LOCALE {
            fallback.clone()
        } else {
            Arc::new(parse_bundle(&locale))
        };
        Self { locale, bundle, fallback }
    }

    /// Picks the locale from an explicit preference, then `LC_ALL` / `LC_MESSAGES` / `LANG`.
    pub fn from_environment(preferred: Option<&str>) -> Self {
        let locale = preferred
            .map(ToOwned::to_owned)
            .or_else(|| {
                ["LC_ALL", "LC_MESSAGES", "LANG"]
                    .iter()
                    .filter_map(|name| env::var(name).ok())
                    .find(|value| !value.trim().is_empty())
            })
            .unwrap_or_else(|| DEFAULT_LOCALE.to_owned());
        Self::load(&locale)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Returns the raw template for `key`.
    pub fn template<'a>(&'a self, key: &'a str) -> &'a str {
        self.bundle
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }

    pub fn text(&self, key: &str) -> String {
        self.template(key).to_owned()
    }

    pub fn format(&self, key: &str, args: &[&dyn fmt::Display]) -> String {
        fill_template(self.template(key), args)
    }
}

fn parse_bundle(locale: &str) -> Bundle {
    let Some((_, raw)) = BUNDLES.iter().find(|(name, _)| *name == locale) else {
        return Bundle::new();
    };
    match serde_json::from_str(raw) {
        Ok(bundle) => bundle,
        Err(err) => {
            warn!("message bundle {locale} is unreadable: {err}");
            Bundle::new()
        }
    }
}

fn normalize_locale(raw: &str) -> String {
    let language = raw
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .split(['_', '-'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match language.as_str() {
        "" | "c" | "posix" => DEFAULT_LOCALE.to_owned(),
        _ => language,
    }
}

fn fill_template(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|index| (index, close)));
        match placeholder {
            Some((index, close)) if index < args.len() => {
                out.push_str(&args[index].to_string());
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
