use tracing::debug;

use crate::error::Result;
use crate::kubectl::Kubectl;
use crate::models::PodRef;
use crate::session::Session;

const CONSOLE_COMMANDS: [&str; 6] = [
    "bundle exec rails console",
    "bundle exec rails c",
    "rails console",
    "rails c",
    "bin/rails console",
    "bin/rails c",
];

const FALLBACK_SHELL: &str = "/bin/bash";

pub async fn console(session: &Session, target: Option<PodRef>) -> anyhow::Result<()> {
    let Some(project) = session.preflight().await else {
        return Ok(());
    };
    println!("🔍 Looking for Rails applications in project: {}", project);

    let pod = session.resolve_pod(&project, target).await?;
    println!("🚀 Connecting to Rails console in pod: {}", pod);
    Ok(connect(&session.kubectl, &pod).await?)
}

/// Tries each console invocation through `sh -c`, then drops to a shell.
pub async fn connect(kubectl: &Kubectl, pod: &PodRef) -> Result<()> {
    println!("🎯 Connecting to Rails console...");
    println!("(Type 'exit' or press Ctrl+D to disconnect)");
    println!();

    for command in CONSOLE_COMMANDS {
        println!("Trying: {}", command);
        match kubectl.exec_interactive(pod, &["sh", "-c", command]).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                debug!(%command, error = %e, "console command failed");
                println!("Command failed, trying next option...");
            }
        }
    }

    println!("Rails console commands failed, opening shell instead...");
    kubectl.exec_interactive(pod, &[FALLBACK_SHELL]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn pod() -> PodRef {
        PodRef {
            namespace: "default".into(),
            name: "rails-web-1".into(),
        }
    }

    #[tokio::test]
    async fn console_stops_at_first_success() {
        connect(&Kubectl::new("true"), &pod()).await.unwrap();
    }

    #[tokio::test]
    async fn shell_fallback_error_is_returned() {
        let err = connect(&Kubectl::new("false"), &pod()).await.unwrap_err();
        match err {
            Error::CommandFailed { command, .. } => assert!(command.ends_with("-- /bin/bash")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
