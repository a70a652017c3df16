use anyhow::{Context, Result};
use colored::*;

use crate::models::Cluster;
use crate::session::{self, Session};
use crate::utils::{self, checkbox};

/// Auth and project checks plus cluster discovery shared by both subcommands.
/// `None` means there is nothing to act on; the reason is already printed.
async fn discover(session: &Session, announce: bool) -> Result<Option<(String, Vec<Cluster>)>> {
    if !session.require_auth().await {
        return Ok(None);
    }
    let Some(project) = session.require_project().await else {
        return Ok(None);
    };

    if announce {
        println!("Discovering GKE clusters in project: {}", project.cyan());
        println!();
    }

    let pb = utils::create_spinner("Fetching clusters...");
    let clusters = session.gcloud.list_clusters(&project).await;
    pb.finish_and_clear();
    let clusters = clusters.context(if announce {
        "failed to discover clusters"
    } else {
        "failed to get clusters"
    })?;

    if clusters.is_empty() {
        println!("No GKE clusters found.");
        return Ok(None);
    }
    Ok(Some((project, clusters)))
}

pub async fn list(session: &Session) -> Result<()> {
    let Some((_, clusters)) = discover(session, true).await? else {
        return Ok(());
    };

    let context = session.kubectl.current_context().await.unwrap_or_default();

    println!("Available clusters:");
    println!();
    for (i, cluster) in clusters.iter().enumerate() {
        println!("{} {}. {}", checkbox(cluster.is_active_in(&context)), i + 1, cluster);
    }
    println!();
    println!("💡 Use 'gcpeasy cluster select' to switch clusters");

    Ok(())
}

pub async fn select(session: &Session, identifier: Option<String>) -> Result<()> {
    let Some((project, clusters)) = discover(session, false).await? else {
        return Ok(());
    };

    let cluster = match identifier {
        Some(id) => match utils::resolve_identifier(&clusters, &id, |c| c.name == id) {
            Some(cluster) => cluster.clone(),
            None => {
                println!("Cluster '{}' not found.", id);
                println!("Use 'gcpeasy cluster list' to see available clusters.");
                return Ok(());
            }
        },
        None => session::pick_cluster(clusters).context("failed to select cluster")?,
    };

    println!("Switching to cluster: {} in {}", cluster.name, cluster.location);
    session
        .configure_cluster(&project, &cluster)
        .await
        .context("failed to switch cluster")?;
    println!(
        "{} {}",
        "✅ Successfully switched to cluster:".green(),
        cluster.name.cyan()
    );
    Ok(())
}
