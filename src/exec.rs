use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct Tool {
    program: String,
}

impl Tool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Shell-quoted rendering of an invocation, used in logs and errors.
    pub fn describe(&self, args: &[&str]) -> String {
        let words = std::iter::once(self.program.as_str()).chain(args.iter().copied());
        shlex::try_join(words).unwrap_or_else(|_| format!("{} {}", self.program, args.join(" ")))
    }

    fn command(&self, args: &[&str]) -> Command {
        debug!(command = %self.describe(args), "running external command");
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd
    }

    fn spawn_error(&self, args: &[&str], source: std::io::Error) -> Error {
        Error::Spawn {
            command: self.describe(args),
            source,
        }
    }

    fn check(&self, args: &[&str], status: ExitStatus, stderr: String) -> Result<()> {
        if status.success() {
            return Ok(());
        }
        debug!(command = %self.describe(args), %status, "external command failed");
        Err(Error::CommandFailed {
            command: self.describe(args),
            status,
            stderr,
        })
    }

    /// Runs to completion and returns stdout. A non-zero exit is an error
    /// carrying whatever the program wrote to stderr.
    pub async fn output(&self, args: &[&str]) -> Result<String> {
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| self.spawn_error(args, source))?;

        self.check(
            args,
            output.status,
            String::from_utf8_lossy(&output.stderr).into_owned(),
        )?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Runs silently and reports only whether the program exited cleanly.
    pub async fn succeeds(&self, args: &[&str]) -> bool {
        self.command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Hands the terminal to the program: stdin, stdout and stderr are inherited.
    pub async fn interactive(&self, args: &[&str]) -> Result<()> {
        let status = self
            .command(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| self.spawn_error(args, source))?;
        self.check(args, status, String::new())
    }

    /// Starts the program with stdout piped back to us and stderr passed through.
    /// The child is killed if its handle is dropped before [`Tool::wait`].
    pub fn spawn_piped(&self, args: &[&str]) -> Result<Child> {
        self.command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| self.spawn_error(args, source))
    }

    /// Waits for a child started by [`Tool::spawn_piped`].
    pub async fn wait(&self, args: &[&str], mut child: Child) -> Result<()> {
        let status = child.wait().await?;
        self.check(args, status, String::new())
    }

    /// Looks the program up the way a shell would: as a path when it contains
    /// a separator, otherwise in each `PATH` entry.
    pub fn is_installed(&self) -> bool {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return is_executable(program);
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(program))))
            .unwrap_or(false)
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
