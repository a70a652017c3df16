use tracing::debug;

use crate::error::{Error, Result};
use crate::kubectl::Kubectl;
use crate::models::PodRef;
use crate::session::Session;

/// Tried in order; the first one the image ships wins.
const SHELLS: [&str; 3] = ["/bin/bash", "/bin/zsh", "/bin/sh"];

pub async fn run(session: &Session, target: Option<PodRef>) -> anyhow::Result<()> {
    let Some(project) = session.preflight().await else {
        return Ok(());
    };
    println!("🔍 Looking for application pods in project: {}", project);

    let pod = session.resolve_pod(&project, target).await?;
    println!("🚀 Opening shell in pod: {}", pod);
    Ok(connect(&session.kubectl, &pod).await?)
}

pub async fn connect(kubectl: &Kubectl, pod: &PodRef) -> Result<()> {
    println!("🎯 Connecting to shell...");
    println!("(Type 'exit' or press Ctrl+D to disconnect)");
    println!();

    for shell in SHELLS {
        println!("Trying: {}", shell);
        match kubectl.exec_interactive(pod, &[shell]).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                debug!(%shell, error = %e, "shell unavailable");
                println!("Shell {} not available, trying next option...", shell);
            }
        }
    }

    Err(Error::NoShell)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod() -> PodRef {
        PodRef {
            namespace: "default".into(),
            name: "web-1".into(),
        }
    }

    #[tokio::test]
    async fn first_working_shell_ends_the_session() {
        connect(&Kubectl::new("true"), &pod()).await.unwrap();
    }

    #[tokio::test]
    async fn no_working_shell() {
        let err = connect(&Kubectl::new("false"), &pod()).await.unwrap_err();
        assert!(matches!(err, Error::NoShell));
    }
}
