// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Parameter files: `<params><param name=".." value=".."/>...</params>`.
//!
//! Written with an XML declaration and 4-space indentation. Read permissively: any `param`
//! element below the root counts, and entries without a name or with an empty value are
//! skipped.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::PilotError;
use crate::fsutil::write_atomic;
use crate::stylesheet::parse_document;

pub type ParamMap = BTreeMap<String, String>;

const ROOT_ELEMENT: &str = "params";
const ENTRY_ELEMENT: &str = "param";
const INDENT: usize = 4;

pub fn parse_params(text: &str) -> Result<ParamMap, roxmltree::Error> {
    let doc = parse_document(text)?;
    let mut params = ParamMap::new();
    for node in doc.root_element().descendants().skip(1) {
        if !node.is_element()
            || node.tag_name().namespace().is_some()
            || node.tag_name().name() != ENTRY_ELEMENT
        {
            continue;
        }
        let name = node.attribute("name").unwrap_or_default();
        let value = node.attribute("value").unwrap_or_default();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        params.insert(name.to_owned(), value.to_owned());
    }
    Ok(params)
}

pub fn read_param_file(path: &Path) -> Result<ParamMap, PilotError> {
    let text = fs::read_to_string(path).map_err(|source| PilotError::io(path, source))?;
    let params = parse_params(&text)
        .map_err(|source| PilotError::ParamFileInvalid { path: path.to_path_buf(), source })?;
    debug!("parsed {} parameter(s) from {path:?}", params.len());
    Ok(params)
}

/// Serialises `params` as a pretty-printed parameter file.
pub fn render_params(params: &ParamMap) -> Result<String, String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(render_error)?;

    if params.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(ROOT_ELEMENT))).map_err(render_error)?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT))).map_err(render_error)?;
        for (name, value) in params {
            let entry = BytesStart::new(ENTRY_ELEMENT)
                .with_attributes([("name", name.as_str()), ("value", value.as_str())]);
            writer.write_event(Event::Empty(entry)).map_err(render_error)?;
        }
        writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT))).map_err(render_error)?;
    }

    let mut text = String::from_utf8(writer.into_inner()).map_err(render_error)?;
    text.push('\n');
    Ok(text)
}

fn render_error(err: impl fmt::Display) -> String {
    err.to_string()
}

pub fn write_param_file(path: &Path, params: &ParamMap) -> Result<(), PilotError> {
    let text = render_params(params)
        .map_err(|message| PilotError::ParamFileWrite { path: path.to_path_buf(), message })?;
    write_atomic(path, text.as_bytes()).map_err(|err| PilotError::ParamFileWrite {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    debug!("saved {} parameter(s) to {path:?}", params.len());
    Ok(())
}

/// Declared names absent from `present`, in declaration order.
pub fn missing_params(declared: &[String], present: &ParamMap) -> Vec<String> {
    declared.iter().filter(|name| !present.contains_key(name.as_str())).cloned().collect()
}

/// Appends `.xml` unless the name already ends with it.
pub fn param_file_name(input: &str) -> Option<String> {
    let name = input.trim();
    if name.is_empty() {
        return None;
    }
    if name.ends_with(".xml") {
        Some(name.to_owned())
    } else {
        Some(format!("{name}.xml"))
    }
}
