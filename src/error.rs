use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The user backed out of an interactive prompt.
    #[error("cancelled by user")]
    Cancelled,

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("no {0} available")]
    NothingToSelect(&'static str),

    #[error("no clusters found")]
    NoClusters,

    #[error("no pods found")]
    NoPods,

    #[error("{program} CLI not found. {hint}")]
    ToolMissing { program: String, hint: &'static str },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}{suffix}", suffix = stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("invalid pod format: {0}")]
    InvalidPodRef(String),

    #[error("no suitable shell found in pod")]
    NoShell,

    #[error("{pod}: {source}")]
    PodLogs {
        pod: String,
        #[source]
        source: Box<Error>,
    },

    #[error("log task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("failed to parse projects JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read input: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("invalid log pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// True when a cancellation sits anywhere in the error chain.
pub fn is_cancelled(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<Error>(), Some(Error::Cancelled)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn cancellation_is_found_through_context() {
        let err = Err::<(), _>(Error::Cancelled)
            .context("failed to select cluster")
            .context("failed to setup cluster")
            .unwrap_err();
        assert!(is_cancelled(&err));
    }

    #[test]
    fn other_errors_are_not_cancellation() {
        let err = anyhow::Error::new(Error::InvalidSelection("7".into()));
        assert!(!is_cancelled(&err));
        assert_eq!(err.to_string(), "invalid selection: 7");
    }

    #[test]
    fn command_failure_includes_trimmed_stderr() {
        use std::os::unix::process::ExitStatusExt;

        let err = Error::CommandFailed {
            command: "kubectl get pods".into(),
            status: std::process::ExitStatus::from_raw(256),
            stderr: "  no context\n".into(),
        };
        assert!(err.to_string().ends_with(": no context"));
    }
}
