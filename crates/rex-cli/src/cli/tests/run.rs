use super::parse;
use crate::cli::commands::{is_retryable, CommandError};
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::io;

#[test]
fn cli_parse_run_program_and_args() {
    match parse(&["rex", "run", "--", "curl", "-fsS", "https://example.com"]) {
        CliCommand::Run {
            retry,
            retry_on_exit,
            command,
        } => {
            assert_eq!(command, vec!["curl", "-fsS", "https://example.com"]);
            assert!(retry_on_exit.is_empty());
            assert!(retry.max_retries.is_none());
            assert!(!retry.constant);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_with_retry_flags() {
    match parse(&[
        "rex",
        "run",
        "--max-retries",
        "5",
        "--base-delay-ms",
        "200",
        "--constant",
        "--max-jitter-ms",
        "0",
        "--retry-on-exit",
        "75",
        "--retry-on-exit",
        "111",
        "--",
        "make",
        "test",
    ]) {
        CliCommand::Run {
            retry,
            retry_on_exit,
            command,
        } => {
            assert_eq!(retry.max_retries, Some(5));
            assert_eq!(retry.base_delay_ms, Some(200));
            assert!(retry.constant);
            assert_eq!(retry.max_jitter_ms, Some(0));
            assert_eq!(retry_on_exit, vec![75, 111]);
            assert_eq!(command, vec!["make", "test"]);
        }
        _ => panic!("expected Run with flags"),
    }
}

#[test]
fn cli_parse_run_requires_program() {
    assert!(Cli::try_parse_from(["rex", "run"]).is_err());
}

#[test]
fn any_nonzero_exit_retryable_by_default() {
    assert!(is_retryable(&CommandError::Exit(1), &[]));
    assert!(is_retryable(&CommandError::Exit(75), &[]));
}

#[test]
fn retry_on_exit_restricts_codes() {
    assert!(is_retryable(&CommandError::Exit(75), &[75]));
    assert!(!is_retryable(&CommandError::Exit(1), &[75]));
}

#[test]
fn spawn_failures_and_signals_are_terminal() {
    let missing = CommandError::Spawn(io::Error::from(io::ErrorKind::NotFound));
    assert!(!is_retryable(&missing, &[]));
    assert!(!is_retryable(&CommandError::Signal, &[]));
    assert!(!is_retryable(&CommandError::Cancelled, &[]));
}

#[test]
fn transient_spawn_failure_is_still_terminal() {
    let busy = CommandError::Spawn(io::Error::from(io::ErrorKind::WouldBlock));
    assert!(!is_retryable(&busy, &[]));
    let refused = CommandError::Spawn(io::Error::from(io::ErrorKind::ConnectionRefused));
    assert!(!is_retryable(&refused, &[75]));
}
