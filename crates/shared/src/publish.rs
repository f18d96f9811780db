use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Output};

/// How far a publish attempt got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Pushed,
    NothingToCommit,
    /// A step failed; nothing after it was attempted.
    Stopped { step: &'static str, reason: String },
}

/// Commits and pushes the output directory with the `git` command line.
pub struct GitPublisher {
    repo_dir: PathBuf,
    program: String,
}

impl GitPublisher {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            program: "git".to_string(),
        }
    }

    #[cfg(test)]
    fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Stage, commit and push. Never fails the caller: a failing step is
    /// logged and the rest are skipped.
    pub fn publish(&self, message: &str) -> PublishOutcome {
        if let Err(e) = self.step("add", &["add", "-A"]) {
            return self.stop("stage", e);
        }

        // `git diff --cached --quiet` exits 0 when nothing is staged
        match self.run(&["diff", "--cached", "--quiet"]) {
            Ok(output) if output.status.success() => {
                tracing::info!("Nothing to commit in {}", self.repo_dir.display());
                return PublishOutcome::NothingToCommit;
            }
            Ok(output) if output.status.code() == Some(1) => {}
            Ok(output) => return self.stop("diff", failure("diff", &output)),
            Err(e) => return self.stop("diff", e),
        }

        if let Err(e) = self.step("commit", &["commit", "-m", message]) {
            return self.stop("commit", e);
        }

        if let Err(e) = self.step("push", &["push"]) {
            return self.stop("push", e);
        }

        PublishOutcome::Pushed
    }

    fn step(&self, name: &str, args: &[&str]) -> Result<()> {
        let output = self.run(args)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(failure(name, &output))
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new(&self.program)
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .with_context(|| format!("Failed to run {} {}", self.program, args.join(" ")))
    }

    fn stop(&self, step: &'static str, error: anyhow::Error) -> PublishOutcome {
        let reason = format!("{:#}", error);
        tracing::warn!("git {} failed, skipping the rest: {}", step, reason);
        PublishOutcome::Stopped { step, reason }
    }
}

fn failure(name: &str, output: &Output) -> anyhow::Error {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::anyhow!("git {} exited with {}: {}", name, output.status, stderr.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_stops_at_stage() {
        let dir = tempfile::tempdir().unwrap();
        let publisher =
            GitPublisher::new(dir.path()).with_program("definitely-not-a-real-git-binary");

        match publisher.publish("daily brief") {
            PublishOutcome::Stopped { step, .. } => assert_eq!(step, "stage"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_missing_repo_dir_stops_at_stage() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = GitPublisher::new(dir.path().join("gone"));

        assert!(matches!(
            publisher.publish("daily brief"),
            PublishOutcome::Stopped { step: "stage", .. }
        ));
    }
}
