use super::{
    error::UnitError,
    unit::{Outcome, UnitKind},
};
use log::warn;
use std::{fmt, path::PathBuf};

/// A unit of work that ran and failed.
#[derive(Debug)]
pub struct UnitFailure {
    pub kind: UnitKind,
    pub target: PathBuf,
    pub error: UnitError,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.target.display(), self.error)
    }
}

/// What happened to a unit, sent back from the worker that ran it.
#[derive(Debug)]
pub(super) struct Completion {
    pub(super) kind: UnitKind,
    pub(super) target: PathBuf,
    pub(super) result: Result<Outcome, UnitError>,
}

/// Aggregate result of one export run.
#[derive(Debug, Default)]
pub struct Report {
    /// Units handed to the worker pool.
    pub scheduled: usize,
    pub completed: usize,
    pub skipped: usize,
    pub cancelled: usize,
    /// Branches and units skipped during the run, in the order they were reported.
    pub warnings: Vec<String>,
    pub failures: Vec<UnitFailure>,
}

impl Report {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.cancelled == 0
    }

    pub(super) fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }

    pub(super) fn fail(&mut self, kind: UnitKind, target: PathBuf, error: UnitError) {
        self.failures.push(UnitFailure {
            kind,
            target,
            error,
        });
    }

    pub(super) fn record(&mut self, completion: Completion) {
        match completion.result {
            Ok(Outcome::Done) => self.completed += 1,
            Ok(Outcome::Skipped(message)) => {
                self.skipped += 1;
                self.warn(message);
            }
            Ok(Outcome::Cancelled) => self.cancelled += 1,
            Err(error) => self.fail(completion.kind, completion.target, error),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} completed, {} skipped, {} cancelled, {} failed",
            self.completed,
            self.skipped,
            self.cancelled,
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn completion(result: Result<Outcome, UnitError>) -> Completion {
        Completion {
            kind: UnitKind::DecryptClip,
            target: PathBuf::from("out/01. Clip.mp4"),
            result,
        }
    }

    #[test]
    fn test_record_counts_every_outcome() {
        let mut report = Report::default();
        report.record(completion(Ok(Outcome::Done)));
        report.record(completion(Ok(Outcome::Skipped("missing".to_owned()))));
        report.record(completion(Ok(Outcome::Cancelled)));
        report.record(completion(Err(UnitError::io("write", "out/01. Clip.mp4")(
            io::Error::other("disk full"),
        ))));

        assert_eq!(report.completed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.cancelled, 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.warnings, ["missing"]);
        assert!(!report.is_success());
        assert_eq!(report.to_string(), "1 completed, 1 skipped, 1 cancelled, 1 failed");
        assert_eq!(
            report.failures[0].to_string(),
            "decrypt clip out/01. Clip.mp4: cannot write out/01. Clip.mp4: disk full"
        );
    }
}
