use anyhow::{Context, Result};
use colored::*;
use comfy_table::Table;

use crate::models::PodInfo;
use crate::session::Session;
use crate::utils::{self, truncate};

pub async fn list(session: &Session, detailed: bool) -> Result<()> {
    let Some(project) = session.preflight().await else {
        return Ok(());
    };
    println!("🔍 Looking for application pods in project: {}", project);

    session
        .setup_cluster_if_needed(&project)
        .await
        .context("failed to setup cluster")?;

    println!("🔍 Gathering pod information...");
    let pb = utils::create_spinner("Fetching pods...");
    let pods = session.kubectl.detailed_pods().await;
    pb.finish_and_clear();
    let pods = pods.context("failed to get pod information")?;
    println!();

    if pods.is_empty() {
        println!("{}", "❌ No application pods found".red());
        println!("Make sure your applications are deployed and running.");
        return Ok(());
    }

    println!("📋 Found {} application pod(s):", pods.len());
    println!();
    println!("{}", pod_table(&pods, detailed));
    println!();
    println!(
        "💡 Use 'gcpeasy pod logs', 'gcpeasy pod shell', or 'gcpeasy rails console' to interact with these pods"
    );

    Ok(())
}

pub fn pod_table(pods: &[PodInfo], detailed: bool) -> Table {
    let mut table = Table::new();

    if !detailed {
        table.set_header(vec!["NAMESPACE", "NAME"]);
        for pod in pods {
            table.add_row(vec![truncate(&pod.namespace, 15), truncate(&pod.name, 35)]);
        }
        return table;
    }

    table.set_header(vec![
        "NAMESPACE", "NAME", "STATUS", "READY", "RESTARTS", "AGE", "NODE",
    ]);
    for pod in pods {
        let status = if pod.status == "Running" {
            pod.status.green()
        } else {
            pod.status.red()
        };
        table.add_row(vec![
            truncate(&pod.namespace, 15),
            truncate(&pod.name, 35),
            status.to_string(),
            pod.ready.clone(),
            pod.restarts.clone(),
            pod.age.clone(),
            truncate(&pod.node, 20),
        ]);
    }
    table
}
