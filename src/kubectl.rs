use tokio::process::Child;
use tracing::debug;

use crate::error::Result;
use crate::exec::Tool;
use crate::models::{PodInfo, PodRef, is_system_namespace};

const APP_POD_COLUMNS: &str =
    "custom-columns=NAMESPACE:.metadata.namespace,NAME:.metadata.name,STATUS:.status.phase";

/// Statuses worth showing in the detailed table; the failing ones help debugging.
const LISTED_STATUSES: [&str; 4] = ["Running", "Pending", "CrashLoopBackOff", "Error"];

const UNKNOWN_NODE: &str = "<unknown>";

#[derive(Clone, Debug)]
pub struct Kubectl {
    tool: Tool,
}

impl Kubectl {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tool: Tool::new(program),
        }
    }

    pub async fn current_context(&self) -> Option<String> {
        match self.tool.output(&["config", "current-context"]).await {
            Ok(out) => Some(out.trim().to_string()).filter(|ctx| !ctx.is_empty()),
            Err(e) => {
                debug!(error = %e, "no current kubectl context");
                None
            }
        }
    }

    /// Running pods outside the system namespaces.
    pub async fn application_pods(&self) -> Result<Vec<PodRef>> {
        let out = self
            .tool
            .output(&[
                "get",
                "pods",
                "--all-namespaces",
                "-o",
                APP_POD_COLUMNS,
                "--no-headers",
            ])
            .await?;
        Ok(parse_application_pods(&out))
    }

    /// Application pods with their table columns and the node each runs on.
    pub async fn detailed_pods(&self) -> Result<Vec<PodInfo>> {
        let out = self
            .tool
            .output(&["get", "pods", "--all-namespaces", "--no-headers"])
            .await?;

        let mut pods = parse_pod_table(&out);
        for pod in &mut pods {
            pod.node = self.node_for_pod(&pod.namespace, &pod.name).await;
        }
        Ok(pods)
    }

    async fn node_for_pod(&self, namespace: &str, name: &str) -> String {
        let node = self
            .tool
            .output(&["get", "pod", name, "-n", namespace, "-o", "jsonpath={.spec.nodeName}"])
            .await;
        match node {
            Ok(out) => out.trim().to_string(),
            Err(e) => {
                debug!(pod = %name, error = %e, "node lookup failed");
                UNKNOWN_NODE.to_string()
            }
        }
    }

    pub fn logs_args(pod: &PodRef, follow: bool) -> Vec<String> {
        let mut args = vec![
            "logs".to_string(),
            pod.name.clone(),
            "-n".to_string(),
            pod.namespace.clone(),
        ];
        if follow {
            args.push("-f".to_string());
        }
        args
    }

    pub fn spawn_logs(&self, args: &[&str]) -> Result<Child> {
        self.tool.spawn_piped(args)
    }

    pub async fn wait_logs(&self, args: &[&str], child: Child) -> Result<()> {
        self.tool.wait(args, child).await
    }

    /// Runs `command` inside the pod with an attached terminal.
    pub async fn exec_interactive(&self, pod: &PodRef, command: &[&str]) -> Result<()> {
        let mut args = vec!["exec", "-it", pod.name.as_str(), "-n", pod.namespace.as_str(), "--"];
        args.extend_from_slice(command);
        self.tool.interactive(&args).await
    }
}

/// Parses `NAMESPACE NAME STATUS` custom-column rows.
pub fn parse_application_pods(out: &str) -> Vec<PodRef> {
    out.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [namespace, name, status, ..]
                    if !is_system_namespace(namespace) && *status == "Running" =>
                {
                    Some(PodRef {
                        namespace: namespace.to_string(),
                        name: name.to_string(),
                    })
                }
                _ => None,
            }
        })
        .collect()
}

/// Parses the default `get pods --all-namespaces` table:
/// `NAMESPACE NAME READY STATUS RESTARTS AGE`. Node is left empty.
///
/// RESTARTS can carry a trailing `(5m ago)`, so the age is always taken from
/// the last column.
pub fn parse_pod_table(out: &str) -> Vec<PodInfo> {
    out.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                return None;
            }
            let (namespace, name, ready, status, restarts) =
                (fields[0], fields[1], fields[2], fields[3], fields[4]);
            if is_system_namespace(namespace) || !LISTED_STATUSES.contains(&status) {
                return None;
            }
            Some(PodInfo {
                namespace: namespace.to_string(),
                name: name.to_string(),
                status: status.to_string(),
                ready: ready.to_string(),
                restarts: restarts.to_string(),
                age: fields[fields.len() - 1].to_string(),
                node: String::new(),
            })
        })
        .collect()
}
