//! Migration through an external tool, `sea-orm-cli migrate up` by default

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use fincafe_common::{debug, info};

use super::{Diagnostics, MigrationError, MigrationRunner};

/// Spawns the migration tool once per database
///
/// The target URL is appended as `-u <url>` and also exported as `DATABASE_URL`.
#[derive(Debug, Clone)]
pub struct CommandMigrationRunner {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandMigrationRunner {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// `sea-orm-cli migrate up -d <schema_dir>`
    pub fn sea_orm_cli(program: impl Into<PathBuf>, schema_dir: &Path) -> Self {
        Self::new(
            program,
            vec![
                "migrate".to_string(),
                "up".to_string(),
                "-d".to_string(),
                schema_dir.display().to_string(),
            ],
        )
    }

    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

#[async_trait]
impl MigrationRunner for CommandMigrationRunner {
    async fn apply_migrations(&self, database_url: &str) -> Result<Diagnostics, MigrationError> {
        debug!("Running {} {}", self.program_name(), self.args.join(" "));

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-u")
            .arg(database_url)
            .env("DATABASE_URL", database_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => timeout(limit, cmd.output())
                .await
                .map_err(|_| MigrationError::TimedOut(limit))?,
            None => cmd.output().await,
        }
        .map_err(|source| MigrationError::Spawn {
            program: self.program_name(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let diagnostics = Diagnostics {
            applied: applied_migrations(&stdout),
            stdout,
            stderr,
        };

        if !output.status.success() {
            return Err(MigrationError::ToolFailed {
                exit_code: output.status.code(),
                diagnostics,
            });
        }

        info!("{} finished successfully", self.program_name());
        Ok(diagnostics)
    }
}

/// Migration names from lines like `Applying migration 'm20250301_000001_create_farms_table'`
fn applied_migrations(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_once("Applying migration '"))
        .filter_map(|(_, rest)| rest.split_once('\''))
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandMigrationRunner {
        CommandMigrationRunner::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        )
    }

    #[test]
    fn test_applied_migrations_parsing() {
        let stdout = "Applying all pending migrations\n\
                      Applying migration 'm20250301_000001_create_farms_table'\n\
                      Migration 'm20250301_000001_create_farms_table' has been applied\n\
                      Applying migration 'm20250301_000002_create_permissions_table'\n";
        assert_eq!(
            applied_migrations(stdout),
            vec![
                "m20250301_000001_create_farms_table",
                "m20250301_000002_create_permissions_table"
            ]
        );
        assert!(applied_migrations("No pending migrations\n").is_empty());
    }

    #[test]
    fn test_sea_orm_cli_args() {
        let runner = CommandMigrationRunner::sea_orm_cli("sea-orm-cli", Path::new("./migration"));
        assert_eq!(runner.args, vec!["migrate", "up", "-d", "./migration"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_receives_url_as_argument_and_env() {
        // $1 is "-u", $2 the url
        let runner = shell(r#"echo "arg=$2"; echo "env=$DATABASE_URL""#);
        let diagnostics = runner
            .apply_migrations("sqlite:///tmp/customer_a.db?mode=rw")
            .await
            .unwrap();
        assert!(diagnostics
            .stdout
            .contains("arg=sqlite:///tmp/customer_a.db?mode=rw"));
        assert!(diagnostics
            .stdout
            .contains("env=sqlite:///tmp/customer_a.db?mode=rw"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_carries_diagnostics() {
        let runner = shell("echo 'Applying migration '\\''m1'\\'''; echo boom >&2; exit 3");
        let err = runner.apply_migrations("postgres://db/customer_a").await.unwrap_err();
        match &err {
            MigrationError::ToolFailed {
                exit_code,
                diagnostics,
            } => {
                assert_eq!(*exit_code, Some(3));
                assert_eq!(diagnostics.stderr.trim(), "boom");
                assert_eq!(diagnostics.applied, vec!["m1"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("boom"));
        assert!(err.diagnostics().is_some());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let runner = CommandMigrationRunner::new("/nonexistent/fincafe-migrate", Vec::new());
        let err = runner.apply_migrations("postgres://db/customer_a").await.unwrap_err();
        assert!(matches!(err, MigrationError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let runner = shell("sleep 5").with_timeout(Duration::from_millis(100));
        let err = runner.apply_migrations("postgres://db/customer_a").await.unwrap_err();
        assert!(matches!(err, MigrationError::TimedOut(_)));
    }
}
