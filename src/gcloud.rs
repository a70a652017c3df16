use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::exec::Tool;
use crate::models::{Cluster, Project, ProjectStatus};

const INSTALL_HINT: &str =
    "Please install the Google Cloud SDK: https://cloud.google.com/sdk/docs/install";

#[derive(Clone, Debug)]
pub struct Gcloud {
    tool: Tool,
}

impl Gcloud {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tool: Tool::new(program),
        }
    }

    pub fn ensure_installed(&self) -> Result<()> {
        if self.tool.is_installed() {
            Ok(())
        } else {
            Err(Error::ToolMissing {
                program: self.tool.program().to_string(),
                hint: INSTALL_HINT,
            })
        }
    }

    pub async fn active_account(&self) -> Result<Option<String>> {
        let out = self
            .tool
            .output(&["auth", "list", "--filter=status:ACTIVE", "--format=value(account)"])
            .await?;
        Ok(first_line(&out))
    }

    pub async fn is_authenticated(&self) -> bool {
        match self.active_account().await {
            Ok(account) => account.is_some(),
            Err(e) => {
                debug!(error = %e, "auth check failed");
                false
            }
        }
    }

    /// The configured default project; empty or unreadable config yields `None`.
    pub async fn current_project(&self) -> Option<String> {
        match self.tool.output(&["config", "get-value", "project"]).await {
            Ok(out) => first_line(&out),
            Err(e) => {
                debug!(error = %e, "could not read current project");
                None
            }
        }
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let out = self.tool.output(&["projects", "list", "--format=json"]).await?;
        parse_projects(&out)
    }

    pub async fn project_status(&self, project_id: &str) -> ProjectStatus {
        if !self.tool.succeeds(&["projects", "describe", project_id]).await {
            return ProjectStatus::NotAccessible;
        }

        let clusters = self
            .tool
            .output(&[
                "container",
                "clusters",
                "list",
                "--project",
                project_id,
                "--format=value(name)",
            ])
            .await;
        match clusters {
            Ok(out) if !out.trim().is_empty() => ProjectStatus::HasClusters,
            _ => ProjectStatus::Accessible,
        }
    }

    pub async fn set_project(&self, project_id: &str) -> Result<()> {
        self.tool
            .output(&["config", "set", "project", project_id])
            .await
            .map(drop)
    }

    pub async fn list_clusters(&self, project_id: &str) -> Result<Vec<Cluster>> {
        let out = self
            .tool
            .output(&[
                "container",
                "clusters",
                "list",
                "--project",
                project_id,
                "--format=value(name,location)",
            ])
            .await?;
        Ok(parse_clusters(&out))
    }

    /// Writes a kubectl context for `cluster` and makes it current.
    pub async fn get_credentials(&self, project_id: &str, cluster: &Cluster) -> Result<()> {
        self.tool
            .output(&[
                "container",
                "clusters",
                "get-credentials",
                &cluster.name,
                "--location",
                &cluster.location,
                "--project",
                project_id,
            ])
            .await
            .map(drop)
    }

    pub async fn login(&self) -> Result<()> {
        self.tool.interactive(&["auth", "login"]).await
    }

    pub async fn application_default_login(&self) -> Result<()> {
        self.tool
            .interactive(&["auth", "application-default", "login"])
            .await
            .inspect_err(|e| warn!(error = %e, "application-default login failed"))
    }

    pub async fn revoke(&self, account: &str) -> Result<()> {
        self.tool.interactive(&["auth", "revoke", account]).await
    }
}

fn first_line(out: &str) -> Option<String> {
    out.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

pub fn parse_projects(json: &str) -> Result<Vec<Project>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(json)?)
}

/// Parses `--format=value(name,location)` output, one cluster per line.
pub fn parse_clusters(out: &str) -> Vec<Cluster> {
    out.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(name), Some(location)) => Some(Cluster {
                    name: name.to_string(),
                    location: location.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}
