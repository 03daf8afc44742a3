// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Stylesheet inspection: well-formedness, declared parameters, output method.
//!
//! Everything except [`check_well_formed`] degrades instead of failing: an unreadable or
//! malformed stylesheet has no parameters and produces XML.

use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;
use roxmltree::{Document, Node, ParsingOptions};

use crate::error::PilotError;

pub const XSLT_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputMethod {
    Xml,
    Html,
    Text,
}

impl OutputMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xml" => Some(Self::Xml),
            "html" => Some(Self::Html),
            "text" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Html => "html",
            Self::Text => "text",
        }
    }

    /// Extension of the output file.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Html => "html",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for OutputMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parsing_options<'input>() -> ParsingOptions<'input> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    options
}

pub(crate) fn parse_document(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    Document::parse_with_options(text, parsing_options())
}

/// Fails with `InputInvalid` (or `Io`) when `path` is not well-formed XML.
pub fn check_well_formed(path: &Path) -> Result<(), PilotError> {
    let text = fs::read_to_string(path).map_err(|source| PilotError::io(path, source))?;
    parse_document(&text)
        .map(|_| ())
        .map_err(|source| PilotError::InputInvalid { path: path.to_path_buf(), source })
}

fn is_xslt(node: &Node<'_, '_>, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XSLT_NAMESPACE)
        && node.tag_name().name() == local_name
}

/// Names of the top-level `xsl:param` declarations, in document order.
pub fn declared_params(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(text) => declared_params_in(&text),
        Err(err) => {
            debug!("cannot read {path:?} for parameters: {err}");
            Vec::new()
        }
    }
}

pub fn declared_params_in(text: &str) -> Vec<String> {
    let doc = match parse_document(text) {
        Ok(doc) => doc,
        Err(err) => {
            debug!("stylesheet does not parse, assuming no parameters: {err}");
            return Vec::new();
        }
    };
    doc.root_element()
        .children()
        .filter(|child| is_xslt(child, "param"))
        .filter_map(|param| param.attribute("name"))
        .map(ToOwned::to_owned)
        .collect()
}

pub fn infer_output_method(path: &Path) -> OutputMethod {
    match fs::read_to_string(path) {
        Ok(text) => infer_output_method_in(&text),
        Err(err) => {
            debug!("cannot read {path:?} for output method: {err}");
            OutputMethod::Xml
        }
    }
}

/// Guesses the output method from stylesheet content.
///
/// Priority: a top-level `xsl:output/@method` naming xml/html/text; then any literal `html`
/// element or `xsl:element name="html"`; then text when the stylesheet emits values/text and
/// no literal result elements; otherwise xml.
pub fn infer_output_method_in(text: &str) -> OutputMethod {
    let doc = match parse_document(text) {
        Ok(doc) => doc,
        Err(err) => {
            debug!("stylesheet does not parse, defaulting to xml: {err}");
            return OutputMethod::Xml;
        }
    };
    let root = doc.root_element();

    let declared = root
        .children()
        .find(|child| is_xslt(child, "output"))
        .and_then(|output| output.attribute("method"));
    if let Some(method) = declared.and_then(OutputMethod::parse) {
        return method;
    }
    if let Some(other) = declared {
        debug!("unsupported xsl:output method {other:?}, inspecting content");
    }

    let mut emits_text = false;
    let mut has_literal_elements = false;
    for node in root.descendants().filter(Node::is_element) {
        let is_literal = node.tag_name().namespace() != Some(XSLT_NAMESPACE);
        if is_literal && node.tag_name().name() == "html" {
            return OutputMethod::Html;
        }
        if is_xslt(&node, "element") && node.attribute("name") == Some("html") {
            return OutputMethod::Html;
        }
        if is_literal {
            has_literal_elements = true;
        }
        if is_xslt(&node, "value-of") || is_xslt(&node, "text") {
            emits_text = true;
        }
    }

    if emits_text && !has_literal_elements {
        OutputMethod::Text
    } else {
        OutputMethod::Xml
    }
}
