//! Integration tests driving the supervisor with real child processes.

#![cfg(unix)]

use std::time::Duration;

use hydra_supervisor::command::{render_preview, CommandLine};
use hydra_supervisor::supervisor::{AttackEvent, AttackSupervisor, SupervisorError};

/// A command line running `script` through `sh`, bypassing the builder.
fn shell(script: &str) -> CommandLine {
    let args = vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()];
    CommandLine {
        preview: render_preview(&args),
        args,
        warnings: Vec::new(),
    }
}

/// Drain the event stream until `Finished`, with a hard timeout so a broken
/// worker fails the test instead of hanging it.
async fn drain(rx: &mut tokio::sync::mpsc::Receiver<AttackEvent>) -> Vec<AttackEvent> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("event stream stalled")
            .expect("event stream closed before Finished");
        let done = event == AttackEvent::Finished;
        events.push(event);
        if done {
            return events;
        }
    }
}

fn output_lines(events: &[AttackEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|event| match event {
            AttackEvent::OutputLine(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn missing_binary_reports_and_finishes() {
    let supervisor = AttackSupervisor::new();
    let args = vec!["hydra-definitely-not-installed-anywhere".to_string()];
    let command = CommandLine {
        preview: render_preview(&args),
        args,
        warnings: Vec::new(),
    };

    let mut rx = supervisor.start(command).expect("start");
    let events = drain(&mut rx).await;

    let lines = output_lines(&events);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("HYDRA NOT FOUND"), "got {:?}", lines[0]);
    assert_eq!(events.last(), Some(&AttackEvent::Finished));
    assert!(!supervisor.is_running());
}

#[tokio::test]
async fn output_lines_arrive_in_order() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor
        .start(shell("for i in $(seq 1 25); do echo \"line $i\"; done"))
        .expect("start");
    let events = drain(&mut rx).await;

    let expected: Vec<String> = (1..=25).map(|i| format!("line {i}")).collect();
    assert_eq!(
        output_lines(&events),
        expected.iter().map(String::as_str).collect::<Vec<_>>()
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == AttackEvent::Finished)
            .count(),
        1
    );
}

#[tokio::test]
async fn stderr_interleaves_in_production_order() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor
        .start(shell("echo out-1; echo err-1 1>&2; echo out-2"))
        .expect("start");
    let events = drain(&mut rx).await;

    // Both fds share one pipe, so cross-stream order is the child's own.
    assert_eq!(output_lines(&events), vec!["out-1", "err-1", "out-2"]);
}

#[tokio::test]
async fn lines_are_delivered_while_the_child_still_runs() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor
        .start(shell("echo early-line; sleep 30"))
        .expect("start");

    // Must arrive long before end of stream; a line below the batch size
    // is never withheld.
    let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("first line must arrive while the child is alive")
        .expect("event stream open");
    assert_eq!(event, AttackEvent::OutputLine("early-line".to_string()));

    supervisor.stop();
    let events = drain(&mut rx).await;
    assert_eq!(events.last(), Some(&AttackEvent::Finished));
}

#[tokio::test]
async fn second_start_is_rejected_while_running() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor.start(shell("sleep 5")).expect("start");
    assert!(supervisor.is_running());

    let err = supervisor
        .start(shell("echo should-not-run"))
        .err()
        .expect("second start must fail");
    assert!(matches!(err, SupervisorError::AlreadyRunning));

    supervisor.stop();
    let events = drain(&mut rx).await;
    assert_eq!(events.last(), Some(&AttackEvent::Finished));
    assert!(!supervisor.is_running());
}

#[tokio::test]
async fn stop_is_idempotent_and_emits_one_finished() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor.start(shell("sleep 5")).expect("start");

    supervisor.stop();
    supervisor.stop();
    let events = drain(&mut rx).await;
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == AttackEvent::Finished)
            .count(),
        1
    );

    // Stopping after completion is a no-op and produces nothing further.
    supervisor.stop();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn stop_escalates_to_kill_when_term_is_ignored() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor
        .start(shell("trap '' TERM; echo armed; while :; do sleep 1; done"))
        .expect("start");

    // Wait for the trap to be installed before stopping.
    let first = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("child output")
        .expect("event stream open");
    assert_eq!(first, AttackEvent::OutputLine("armed".to_string()));

    let begun = std::time::Instant::now();
    supervisor.stop();
    let events = drain(&mut rx).await;

    // SIGTERM is ignored; the bounded grace expires and the kill lands.
    assert!(
        begun.elapsed() < Duration::from_secs(5),
        "escalation took {:?}",
        begun.elapsed()
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == AttackEvent::Finished)
            .count(),
        1
    );
    assert!(!supervisor.is_running());
}

#[tokio::test]
async fn stop_targets_the_session_started_last() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor.start(shell("sleep 5")).expect("start");
    supervisor.stop();
    drain(&mut rx).await;

    // The replacement session answers to its own stop, not to the spent
    // token of the previous run.
    let mut rx = supervisor.start(shell("sleep 5")).expect("restart");
    assert!(supervisor.is_running());
    supervisor.stop();
    let events = drain(&mut rx).await;
    assert_eq!(events.last(), Some(&AttackEvent::Finished));
    assert!(!supervisor.is_running());
}

#[tokio::test]
async fn restart_after_finish_is_allowed() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor.start(shell("echo one")).expect("start");
    drain(&mut rx).await;

    let mut rx = supervisor.start(shell("echo two")).expect("restart");
    let events = drain(&mut rx).await;
    assert_eq!(output_lines(&events), vec!["two"]);
}

#[tokio::test]
async fn credential_lines_raise_derived_events() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor
        .start(shell(
            "echo '[22][ssh] host: 10.0.0.1   login: root   password: toor'",
        ))
        .expect("start");
    let events = drain(&mut rx).await;

    assert!(events
        .iter()
        .any(|e| matches!(e, AttackEvent::AttemptCount(1))));
    assert!(events
        .iter()
        .any(|e| matches!(e, AttackEvent::CredentialFound(line) if line.contains("root"))));

    let findings = supervisor.last_findings().expect("findings");
    assert_eq!(findings.credentials.len(), 1);
}

#[tokio::test]
async fn nonzero_exit_surfaces_the_code() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor.start(shell("exit 3")).expect("start");
    let events = drain(&mut rx).await;

    assert!(output_lines(&events)
        .iter()
        .any(|line| line.contains("exited with code: 3")));
}

#[tokio::test]
async fn empty_lines_are_skipped() {
    let supervisor = AttackSupervisor::new();
    let mut rx = supervisor
        .start(shell("echo first; echo; echo; echo last"))
        .expect("start");
    let events = drain(&mut rx).await;

    assert_eq!(output_lines(&events), vec!["first", "last"]);
}
