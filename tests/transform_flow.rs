// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XsltPilot-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XSLT Pilot and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use xslt_pilot::config::{Availability, Platform, ProcessorConfig, Settings};
use xslt_pilot::error::PilotError;
use xslt_pilot::messages::Messages;
use xslt_pilot::runner::{
    dispatch, Console, Exec, TransformCommand, TransformJob, WatchOutcome, WatchState,
    CHECK_INTERVAL,
};
use xslt_pilot::session::{Effect, Prompt, Response, Session, SessionContext, SessionState};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "xslt_pilot_flow_{prefix}_{}_{nanos}_{counter}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("create temp dir");
        let path = fs::canonicalize(&path).expect("canonicalize temp dir");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path.join(name);
        fs::write(&path, contents).unwrap_or_else(|err| panic!("write {path:?}: {err}"));
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

const REPORT_XSL: &str = r#"<?xml version="1.0"?>
<xsl:stylesheet version="2.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:param name="title"/>
  <xsl:template match="/">
    <report title="{$title}"/>
  </xsl:template>
</xsl:stylesheet>
"#;

/// Pretends to be Saxon: records the command, writes the output, returns a finished console.
#[derive(Default)]
struct FakeSaxon {
    calls: RefCell<Vec<(TransformCommand, PathBuf)>>,
    console_text: String,
    write_output: bool,
}

impl Exec for FakeSaxon {
    fn dispatch(&self, command: &TransformCommand, working_dir: &Path) -> Result<Console, PilotError> {
        self.calls.borrow_mut().push((command.clone(), working_dir.to_path_buf()));
        if self.write_output {
            let output = command
                .args()
                .iter()
                .find_map(|arg| arg.strip_prefix("-o:"))
                .expect("output argument");
            fs::write(output, "<report/>").expect("write output");
        }
        Ok(Console::with_text(self.console_text.clone()))
    }
}

fn context(tmp: &TempDir) -> SessionContext {
    let processor = ProcessorConfig::for_platform(Platform::Linux)
        .with_java_bin("java")
        .with_jar_dir("/opt/saxon");
    SessionContext::new(
        tmp.path().join("data.xml"),
        processor,
        Availability::ready(),
        &Settings::default(),
        Messages::load("en"),
    )
}

fn pick(session: &mut Session, label: &str) -> Vec<Effect> {
    let items = match session.prompt() {
        Some(Prompt::QuickPanel { items, .. }) => items,
        other => panic!("expected quick panel, got {other:?}"),
    };
    let index = items.iter().position(|item| item == label).expect("label listed");
    session.handle(Response::Pick(index as i64))
}

fn take_job(effects: Vec<Effect>) -> TransformJob {
    effects
        .into_iter()
        .find_map(|effect| match effect {
            Effect::Dispatch(job) => Some(job),
            _ => None,
        })
        .expect("dispatch effect")
}

#[test]
fn manual_parameters_flow_into_a_successful_run() {
    let tmp = TempDir::new("manual");
    tmp.write("data.xml", "<data/>");
    tmp.write("report.xsl", REPORT_XSL);

    let (mut session, _) = Session::start(context(&tmp));
    pick(&mut session, "report.xsl");
    assert_eq!(session.state(), &SessionState::ChoosingParamMode);
    session.handle(Response::Pick(1));
    session.handle(Response::Submit("Year end".to_owned()));
    let effects = session.handle(Response::Submit("run-params.xml".to_owned()));
    assert!(session.is_finished());
    assert!(tmp.path().join("run-params.xml").is_file());

    let job = take_job(effects);
    assert_eq!(job.output, tmp.path().join("data-output.xml"));
    assert_eq!(job.working_dir, tmp.path());
    assert_eq!(job.command.args().last().map(String::as_str), Some("title=Year\\ end"));

    let saxon = FakeSaxon {
        console_text: "Running java ...\n[Finished in 0.4s]\n".to_owned(),
        write_output: true,
        ..FakeSaxon::default()
    };
    let started = Instant::now();
    let mut run = dispatch(&saxon, job, started).expect("dispatch");
    assert_eq!(saxon.calls.borrow().len(), 1);
    assert_eq!(saxon.calls.borrow()[0].1, tmp.path());

    assert_eq!(run.poll(started), None);
    let outcome = run.poll(started + CHECK_INTERVAL).expect("finished");
    assert_eq!(outcome, WatchOutcome::Succeeded { output: tmp.path().join("data-output.xml") });
}

#[test]
fn processor_error_reports_the_stylesheet_location() {
    let tmp = TempDir::new("error");
    tmp.write("data.xml", "<data/>");
    let stylesheet = tmp.write("report.xsl", REPORT_XSL);

    let (mut session, _) = Session::start(context(&tmp));
    pick(&mut session, "report.xsl");
    let job = take_job(session.handle(Response::Pick(0)));
    assert!(!job.command.args().iter().any(|arg| arg.starts_with("title=")));

    let saxon = FakeSaxon {
        console_text: "Running java ...\nError on line 5 column 12 of report.xsl:\n  XPST0008 Variable title has not been declared\n[Finished in 0.3s with exit code 2]\n".to_owned(),
        ..FakeSaxon::default()
    };
    let started = Instant::now();
    let mut run = dispatch(&saxon, job, started).expect("dispatch");

    match run.poll(started + CHECK_INTERVAL) {
        Some(WatchOutcome::Failed { diagnostics, stylesheet: reported, location, partial_output }) => {
            assert!(diagnostics.starts_with("Error on line 5"), "{diagnostics}");
            assert!(!diagnostics.contains("[Finished"), "{diagnostics}");
            assert_eq!(reported, stylesheet);
            let location = location.expect("location");
            assert_eq!((location.line, location.column), (5, 12));
            assert_eq!(partial_output, None);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(run.watcher().state(), WatchState::Failed);
}

#[test]
fn cancelling_the_stylesheet_browser_dispatches_nothing() {
    let tmp = TempDir::new("cancel");
    tmp.write("data.xml", "<data/>");
    tmp.write("report.xsl", REPORT_XSL);

    let (mut session, _) = Session::start(context(&tmp));
    let effects = session.handle(Response::Pick(-1));
    assert_eq!(session.state(), &SessionState::Cancelled);
    assert!(!effects.iter().any(|effect| matches!(effect, Effect::Dispatch(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn real_process_output_is_observed_by_the_watcher() {
    use xslt_pilot::runner::ConsoleExec;
    use xslt_pilot::stylesheet::OutputMethod;

    let tmp = TempDir::new("sh");
    let output = tmp.path().join("data-output.xml");
    let job = TransformJob {
        command: TransformCommand::new(
            "sh",
            vec!["-c".to_owned(), "sleep 0.1; echo '<report/>' > data-output.xml".to_owned()],
        ),
        source: tmp.path().join("data.xml"),
        stylesheet: tmp.path().join("report.xsl"),
        output: output.clone(),
        method: OutputMethod::Xml,
        working_dir: tmp.path().to_path_buf(),
    };
    let exec = ConsoleExec::new(tokio::runtime::Handle::current());

    // Polling takes blocking locks, so it runs off the async worker like the UI loop does.
    let outcome = tokio::task::spawn_blocking(move || {
        let mut run = dispatch(&exec, job, Instant::now()).expect("dispatch sh");
        loop {
            if let Some(outcome) = run.poll(Instant::now()) {
                return outcome;
            }
            std::thread::sleep(CHECK_INTERVAL / 10);
        }
    })
    .await
    .expect("watch task");

    assert_eq!(outcome, WatchOutcome::Succeeded { output });
}
