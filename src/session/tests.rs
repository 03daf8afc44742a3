// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::path::{Path, PathBuf};

use rstest::rstest;

use super::{
    working_dir_for, Effect, Prompt, Response, Session, SessionContext, SessionState,
};
use crate::config::{Availability, JavaStatus, Platform, ProcessorConfig, Settings};
use crate::messages::Messages;
use crate::params::read_param_file;
use crate::runner::TransformJob;
use crate::test_utils::{TempDir, IDENTITY_XSL, PARAM_XSL};

fn context(tmp: &TempDir, availability: Availability) -> SessionContext {
    let source = tmp.path().join("doc.xml");
    let processor = ProcessorConfig::for_platform(Platform::Linux)
        .with_java_bin("java")
        .with_jar_dir("/opt/saxon");
    SessionContext::new(source, processor, availability, &Settings::default(), Messages::default())
}

fn workspace(prefix: &str) -> TempDir {
    let tmp = TempDir::new(prefix);
    tmp.write("doc.xml", "<doc id=\"1\"/>");
    tmp.write("identity.xsl", IDENTITY_XSL);
    tmp.write("report.xsl", PARAM_XSL);
    tmp
}

fn items(session: &Session) -> Vec<String> {
    match session.prompt() {
        Some(Prompt::QuickPanel { items, .. }) => items,
        other => panic!("expected a quick panel, got {other:?}"),
    }
}

fn pick(session: &mut Session, label: &str) -> Vec<Effect> {
    let index = items(session)
        .iter()
        .position(|item| item == label)
        .unwrap_or_else(|| panic!("{label} not in {:?}", items(session)));
    session.handle(Response::Pick(index as i64))
}

fn dispatched_job(effects: &[Effect]) -> &TransformJob {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Dispatch(job) => Some(job),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no dispatch in {effects:?}"))
}

fn started(tmp: &TempDir) -> Session {
    let (session, effects) = Session::start(context(tmp, Availability::ready()));
    assert!(matches!(session.state(), SessionState::BrowsingStylesheet(_)), "{effects:?}");
    session
}

fn choose_report_params(tmp: &TempDir) -> Session {
    let mut session = started(tmp);
    let effects = pick(&mut session, "report.xsl");
    assert_eq!(session.state(), &SessionState::ChoosingParamMode);
    assert_eq!(
        effects,
        vec![Effect::Status("The stylesheet declares 2 parameter(s). Choose how to supply them.".to_owned())]
    );
    session
}

#[rstest]
#[case("/data/in/doc.xml", "/data/in")]
#[case("doc.xml", ".")]
#[case("nested/doc.xml", "nested")]
fn working_dir_is_source_parent(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(working_dir_for(Path::new(source)), PathBuf::from(expected));
}

#[test]
fn start_opens_stylesheet_browser_in_working_dir() {
    let tmp = workspace("session-start");
    tmp.mkdir("sub");
    let (session, effects) = Session::start(context(&tmp, Availability::ready()));

    assert_eq!(
        effects,
        vec![Effect::Status(
            "Navigate to and select an .xsl file for the XSLT transformation. Use directories to browse, Escape to cancel."
                .to_owned()
        )]
    );
    assert_eq!(
        items(&session),
        vec![
            "[Parent Directory]".to_owned(),
            format!("sub{}", std::path::MAIN_SEPARATOR),
            "identity.xsl".to_owned(),
            "report.xsl".to_owned(),
        ]
    );
}

#[test]
fn unavailable_java_blocks_the_session() {
    let tmp = workspace("session-no-java");
    let availability = Availability {
        java: JavaStatus::Missing { detail: "not found".to_owned() },
        missing_jars: Vec::new(),
    };
    let (session, effects) = Session::start(context(&tmp, availability));

    assert_eq!(session.state(), &SessionState::Failed);
    assert!(session.prompt().is_none());
    match effects.as_slice() {
        [Effect::Error(message)] => {
            assert!(message.starts_with("Java is not available (not found)"), "{message}");
            assert!(message.contains("openjdk-11-jre"), "{message}");
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn missing_jars_block_the_session() {
    let tmp = workspace("session-no-jars");
    let availability = Availability {
        java: JavaStatus::Found { version: "17".to_owned() },
        missing_jars: vec!["Saxon-HE-12.9.jar".to_owned()],
    };
    let (session, effects) = Session::start(context(&tmp, availability));

    assert_eq!(session.state(), &SessionState::Failed);
    match effects.as_slice() {
        [Effect::Error(message)] => {
            assert!(message.contains("Saxon-HE-12.9.jar"), "{message}");
            assert!(message.contains("setup_XmlTransformer_ubuntu.sh"), "{message}");
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn stylesheet_without_params_dispatches_immediately() {
    let tmp = workspace("session-no-params");
    let mut session = started(&tmp);

    let effects = pick(&mut session, "identity.xsl");

    assert_eq!(session.state(), &SessionState::Dispatched);
    let job = dispatched_job(&effects);
    assert_eq!(job.output, tmp.path().join("doc-output.xml"));
    assert_eq!(job.stylesheet, tmp.path().join("identity.xsl"));
    assert!(job.command.args().iter().all(|arg| !arg.contains('=')), "{:?}", job.command.args());
    assert!(session.param_file().is_none());
}

#[rstest]
#[case::dismiss(Response::Dismiss)]
#[case::minus_one(Response::Pick(-1))]
fn cancelling_the_browser_is_silent(#[case] response: Response) {
    let tmp = workspace("session-cancel");
    let mut session = started(&tmp);

    let effects = session.handle(response);

    assert_eq!(session.state(), &SessionState::Cancelled);
    assert_eq!(effects, vec![Effect::Status("Selection cancelled".to_owned())]);
}

#[test]
fn browsing_into_subdirectory_keeps_panel_open() {
    let tmp = workspace("session-descend");
    tmp.write("sub/inner.xsl", IDENTITY_XSL);
    let mut session = started(&tmp);

    let effects = pick(&mut session, &format!("sub{}", std::path::MAIN_SEPARATOR));

    assert!(effects.is_empty());
    assert_eq!(items(&session), vec!["[Parent Directory]".to_owned(), "inner.xsl".to_owned()]);
    match session.prompt() {
        Some(Prompt::QuickPanel { title, .. }) => assert!(title.ends_with("sub"), "{title}"),
        other => panic!("unexpected prompt {other:?}"),
    }
}

#[test]
fn submit_is_ignored_while_a_quick_panel_is_open() {
    let tmp = workspace("session-ignore");
    let mut session = started(&tmp);
    let effects = session.handle(Response::Submit("report.xsl".to_owned()));
    assert!(effects.is_empty());
    assert!(matches!(session.state(), SessionState::BrowsingStylesheet(_)));
}

#[test]
fn param_choice_offers_three_ways() {
    let tmp = workspace("session-choice");
    let session = choose_report_params(&tmp);
    assert_eq!(session.declared_params(), ["title", "count"]);
    assert_eq!(
        session.prompt(),
        Some(Prompt::QuickPanel {
            title: "Parameters for report.xsl".to_owned(),
            status: "The stylesheet declares 2 parameter(s). Choose how to supply them.".to_owned(),
            items: vec![
                "Run without parameters".to_owned(),
                "Enter parameters manually".to_owned(),
                "Select variables XML file".to_owned(),
            ],
        })
    );
}

#[test]
fn cancel_at_param_choice_aborts() {
    let tmp = workspace("session-choice-cancel");
    let mut session = choose_report_params(&tmp);
    let effects = session.handle(Response::Dismiss);
    assert_eq!(session.state(), &SessionState::Cancelled);
    assert_eq!(effects, vec![Effect::Status("Parameter choice cancelled".to_owned())]);
}

#[test]
fn run_without_params_dispatches_bare_command() {
    let tmp = workspace("session-run-without");
    let mut session = choose_report_params(&tmp);
    let effects = session.handle(Response::Pick(0));
    let job = dispatched_job(&effects);
    assert!(job.command.args().iter().all(|arg| !arg.starts_with("title=")));
}

#[test]
fn manual_entry_writes_file_remembers_name_and_dispatches() {
    let tmp = workspace("session-manual");
    let mut session = choose_report_params(&tmp);

    assert!(session.handle(Response::Pick(1)).is_empty());
    assert_eq!(
        session.prompt(),
        Some(Prompt::Input {
            caption: "Enter value for parameter 'title'".to_owned(),
            initial: String::new(),
        })
    );
    assert!(session.handle(Response::Submit("Q3 report".to_owned())).is_empty());
    assert_eq!(session.state(), &SessionState::EnteringParam { index: 1 });
    assert!(session.handle(Response::Submit(String::new())).is_empty());

    match session.prompt() {
        Some(Prompt::Input { caption, initial }) => {
            assert!(caption.starts_with("Enter name for variables XML file (in "), "{caption}");
            assert_eq!(initial, "params.xml");
        }
        other => panic!("unexpected prompt {other:?}"),
    }

    let effects = session.handle(Response::Submit("quarter".to_owned()));
    let written = tmp.path().join("quarter.xml");
    assert_eq!(effects[0], Effect::Status("Parameters saved to quarter.xml".to_owned()));
    assert_eq!(effects[1], Effect::RememberParamFilename("quarter.xml".to_owned()));
    assert_eq!(session.context().last_param_filename, "quarter.xml");
    assert_eq!(session.param_file(), Some(written.as_path()));

    let text = fs::read_to_string(&written).expect("param file");
    assert!(text.contains("<param name=\"count\" value=\"\"/>"), "{text}");
    let job = dispatched_job(&effects);
    assert_eq!(job.command.args().last().map(String::as_str), Some("title=Q3\\ report"));
    assert!(!job.command.args().iter().any(|arg| arg.starts_with("count=")));
}

#[test]
fn blank_file_name_keeps_the_prompt_open() {
    let tmp = workspace("session-blank-name");
    let mut session = choose_report_params(&tmp);
    session.handle(Response::Pick(1));
    session.handle(Response::Submit("a".to_owned()));
    session.handle(Response::Submit("b".to_owned()));

    let effects = session.handle(Response::Submit("   ".to_owned()));

    assert_eq!(session.state(), &SessionState::NamingParamFile);
    assert_eq!(effects, vec![Effect::Error("Enter a file name for the parameter file".to_owned())]);
}

#[test]
fn dismissing_manual_entry_cancels() {
    let tmp = workspace("session-manual-cancel");
    let mut session = choose_report_params(&tmp);
    session.handle(Response::Pick(1));

    let effects = session.handle(Response::Dismiss);

    assert_eq!(session.state(), &SessionState::Cancelled);
    assert_eq!(effects, vec![Effect::Status("Parameter entry cancelled".to_owned())]);
    assert!(!tmp.path().join("params.xml").exists());
}

#[test]
fn loaded_file_missing_a_name_warns_and_still_dispatches() {
    let tmp = workspace("session-load-partial");
    tmp.write("vars.xml", r#"<params><param name="title" value="Annual"/></params>"#);
    let mut session = choose_report_params(&tmp);

    let effects = session.handle(Response::Pick(2));
    assert_eq!(
        effects,
        vec![Effect::Status(
            "Select an XML parameter file (format: <param name='...' value='...' />) or navigate directories. Escape to cancel."
                .to_owned()
        )]
    );
    assert!(items(&session).contains(&"doc.xml".to_owned()));

    let effects = pick(&mut session, "vars.xml");

    assert_eq!(
        effects[0],
        Effect::Warning(
            "Warning: Missing parameters in vars.xml: count. Continuing transformation.".to_owned()
        )
    );
    assert_eq!(effects[1], Effect::RememberParamFilename("vars.xml".to_owned()));
    let job = dispatched_job(&effects);
    assert_eq!(job.command.args().last().map(String::as_str), Some("title=Annual"));
    assert_eq!(session.state(), &SessionState::Dispatched);
    assert_eq!(
        read_param_file(&tmp.path().join("vars.xml")).expect("vars"),
        session.collected().clone()
    );
}

#[test]
fn complete_param_file_dispatches_without_warning() {
    let tmp = workspace("session-load-full");
    tmp.write(
        "vars.xml",
        r#"<params><param name="title" value="A"/><param name="count" value="3"/></params>"#,
    );
    let mut session = choose_report_params(&tmp);
    session.handle(Response::Pick(2));

    let effects = pick(&mut session, "vars.xml");

    assert!(!effects.iter().any(|effect| matches!(effect, Effect::Warning(_))), "{effects:?}");
    let job = dispatched_job(&effects);
    assert!(job.command.args().ends_with(&["count=3".to_owned(), "title=A".to_owned()]));
}

#[test]
fn malformed_param_file_fails_the_session() {
    let tmp = workspace("session-load-broken");
    tmp.write("vars.xml", "<params><param name=\"a\" value=\"1\">");
    let mut session = choose_report_params(&tmp);
    session.handle(Response::Pick(2));

    let effects = pick(&mut session, "vars.xml");

    assert_eq!(session.state(), &SessionState::Failed);
    match effects.as_slice() {
        [Effect::Error(message)] => assert!(message.starts_with("Failed to parse "), "{message}"),
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn cancelling_param_file_browser_aborts() {
    let tmp = workspace("session-load-cancel");
    let mut session = choose_report_params(&tmp);
    session.handle(Response::Pick(2));

    let effects = session.handle(Response::Pick(-1));

    assert_eq!(session.state(), &SessionState::Cancelled);
    assert_eq!(effects, vec![Effect::Status("Parameter file selection cancelled".to_owned())]);
}

#[test]
fn malformed_source_stops_before_dispatch() {
    let tmp = workspace("session-bad-source");
    tmp.write("doc.xml", "<doc>");
    let mut session = started(&tmp);

    let effects = pick(&mut session, "identity.xsl");

    assert_eq!(session.state(), &SessionState::Failed);
    match effects.as_slice() {
        [Effect::Error(message)] => {
            let expected = format!("Invalid XML/XSL file: {} Error: ", tmp.path().join("doc.xml").display());
            assert!(message.starts_with(&expected), "{message}");
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn terminal_states_ignore_further_responses() {
    let tmp = workspace("session-terminal");
    let mut session = started(&tmp);
    session.handle(Response::Dismiss);

    assert!(session.is_finished());
    assert!(session.handle(Response::Pick(0)).is_empty());
    assert_eq!(session.state(), &SessionState::Cancelled);
}
