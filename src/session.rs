use colored::*;
use tracing::debug;

use crate::error::{Error, Result};
use crate::gcloud::Gcloud;
use crate::kubectl::Kubectl;
use crate::models::{Cluster, GkeContext, PodRef};
use crate::utils;

pub struct Session {
    pub gcloud: Gcloud,
    pub kubectl: Kubectl,
}

impl Session {
    pub fn new(gcloud: Gcloud, kubectl: Kubectl) -> Self {
        Self { gcloud, kubectl }
    }

    pub async fn require_auth(&self) -> bool {
        if self.gcloud.is_authenticated().await {
            return true;
        }
        println!("{}", "❌ Not authenticated with Google Cloud".red());
        println!("Please run 'gcpeasy login' first to authenticate.");
        false
    }

    pub async fn require_project(&self) -> Option<String> {
        let project = self.gcloud.current_project().await;
        if project.is_none() {
            println!("{}", "❌ No GCP project selected".red());
            println!("Please run 'gcpeasy env select' to choose an environment.");
        }
        project
    }

    /// Announced auth and project checks shared by the pod commands.
    /// `None` means the user has to act first; guidance is already printed.
    pub async fn preflight(&self) -> Option<String> {
        println!("🔍 Checking authentication...");
        if !self.require_auth().await {
            return None;
        }
        println!("{}", "✅ Authenticated".green());

        println!("🔍 Getting current project...");
        let project = self.require_project().await?;
        println!("✅ Current project: {}", project.cyan());
        Some(project)
    }

    /// Discovers the project's clusters and picks one: automatically when
    /// there is a single cluster, from a numbered menu otherwise.
    pub async fn select_cluster(&self, project: &str) -> Result<Cluster> {
        println!("🔍 Getting GKE clusters...");
        let pb = utils::create_spinner("Fetching clusters...");
        let clusters = self.gcloud.list_clusters(project).await;
        pb.finish_and_clear();
        let clusters = clusters?;

        if clusters.is_empty() {
            println!("{}", "❌ No GKE clusters found in the current project".red());
            println!("Make sure you have GKE clusters set up and configured.");
            return Err(Error::NoClusters);
        }

        let cluster = pick_cluster(clusters)?;
        println!("🔧 Using cluster: {} in {}", cluster.name.cyan(), cluster.location);
        Ok(cluster)
    }

    pub async fn configure_cluster(&self, project: &str, cluster: &Cluster) -> Result<()> {
        println!(
            "🔧 Getting credentials for cluster {} in {}...",
            cluster.name, cluster.location
        );
        self.gcloud.get_credentials(project, cluster).await
    }

    /// Reuses the active kubectl context when it already belongs to `project`;
    /// otherwise selects and configures one of the project's clusters.
    pub async fn setup_cluster_if_needed(&self, project: &str) -> Result<()> {
        if let Some(context) = self.kubectl.current_context().await {
            if context_belongs_to(&context, project) {
                debug!(%context, %project, "reusing kubectl context");
                println!("✅ Using kubectl context: {}", context.cyan());
                return Ok(());
            }
            debug!(%context, %project, "kubectl context belongs elsewhere");
        }

        let cluster = self.select_cluster(project).await?;
        println!("🔧 Configuring kubectl...");
        self.configure_cluster(project, &cluster).await?;
        println!("{}", "✅ kubectl configured".green());
        Ok(())
    }

    pub async fn select_application_pod(&self) -> Result<PodRef> {
        println!("🔍 Searching for application pods...");
        let pb = utils::create_spinner("Fetching pods...");
        let pods = self.kubectl.application_pods().await;
        pb.finish_and_clear();
        let pods = pods?;

        if pods.is_empty() {
            println!("{}", "❌ No pods found".red());
            println!("Make sure your application is deployed and running.");
            return Err(Error::NoPods);
        }

        println!("📋 Found {} pod(s):", pods.len());
        println!();
        utils::prompt_numbered(&pods, "pod").cloned()
    }

    pub async fn setup_cluster_and_select_pod(&self, project: &str) -> Result<PodRef> {
        self.setup_cluster_if_needed(project).await?;
        self.select_application_pod().await
    }

    /// Uses `target` when the user named a pod, otherwise asks for one.
    pub async fn resolve_pod(&self, project: &str, target: Option<PodRef>) -> Result<PodRef> {
        match target {
            Some(pod) => {
                self.setup_cluster_if_needed(project).await?;
                Ok(pod)
            }
            None => self.setup_cluster_and_select_pod(project).await,
        }
    }
}

/// Whether a kubectl context was written for a cluster in `project`.
pub fn context_belongs_to(context: &str, project: &str) -> bool {
    GkeContext::parse(context).is_some_and(|gke| gke.project == project)
}

/// Auto-selects a lone cluster, otherwise asks for one from a numbered menu.
pub fn pick_cluster(clusters: Vec<Cluster>) -> Result<Cluster> {
    if let [only] = clusters.as_slice() {
        println!("✅ Found 1 cluster: {} in {}", only.name, only.location);
        return Ok(only.clone());
    }

    println!("✅ Found {} clusters:", clusters.len());
    println!();
    utils::prompt_numbered(&clusters, "cluster").cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::fake;

    #[test]
    fn context_must_be_gke_for_the_same_project() {
        assert!(context_belongs_to("gke_acme-prod_us-central1_web", "acme-prod"));
        assert!(!context_belongs_to("gke_acme-staging_us-central1_web", "acme-prod"));
        assert!(!context_belongs_to("docker-desktop", "acme-prod"));
        assert!(!context_belongs_to("gke_acme-prod-eu_europe-west1_web", "acme-prod"));
    }

    #[test]
    fn single_cluster_is_picked_without_prompting() {
        let cluster = Cluster {
            name: "web".into(),
            location: "us-central1".into(),
        };
        assert_eq!(pick_cluster(vec![cluster.clone()]).unwrap(), cluster);
    }

    #[test]
    fn no_clusters_to_pick() {
        assert!(matches!(
            pick_cluster(Vec::new()),
            Err(Error::NothingToSelect("cluster"))
        ));
    }

    #[tokio::test]
    async fn preflight_stops_without_auth() {
        let session = Session::new(
            Gcloud::new("gcpeasy-no-such-gcloud"),
            Kubectl::new("gcpeasy-no-such-kubectl"),
        );
        assert_eq!(session.preflight().await, None);
    }

    #[tokio::test]
    async fn cluster_discovery_failure_propagates() {
        let session = Session::new(
            Gcloud::new("gcpeasy-no-such-gcloud"),
            Kubectl::new("gcpeasy-no-such-kubectl"),
        );
        let err = session.setup_cluster_if_needed("acme-prod").await.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[tokio::test]
    async fn matching_context_is_reused_without_gcloud() {
        let session = Session::new(
            Gcloud::new("gcpeasy-no-such-gcloud"),
            Kubectl::new(fake::script(
                "kubectl-prod-context",
                "echo gke_acme-prod_us-central1_web",
            )),
        );
        session.setup_cluster_if_needed("acme-prod").await.unwrap();
    }

    #[tokio::test]
    async fn foreign_context_falls_through_to_cluster_setup() {
        let calls = fake::path("gcloud-setup-calls");
        let _ = std::fs::remove_file(&calls);
        let gcloud = fake::script(
            "gcloud-setup",
            &format!("echo \"$*\" >> '{}'\necho 'web us-central1'", calls.display()),
        );
        let session = Session::new(
            Gcloud::new(gcloud),
            Kubectl::new(fake::script(
                "kubectl-staging-context",
                "echo gke_acme-staging_us-central1_web",
            )),
        );
        session.setup_cluster_if_needed("acme-prod").await.unwrap();

        let calls = std::fs::read_to_string(&calls).unwrap();
        let calls: Vec<&str> = calls.lines().collect();
        assert_eq!(
            calls,
            [
                "container clusters list --project acme-prod --format=value(name,location)",
                "container clusters get-credentials web --location us-central1 --project acme-prod",
            ]
        );
    }
}
