use anyhow::{Context, Result};
use colored::*;

use crate::error::Error;
use crate::gcloud::Gcloud;
use crate::models::Project;
use crate::session::Session;
use crate::utils::{self, checkbox};

async fn discover_projects(gcloud: &Gcloud) -> crate::error::Result<Vec<Project>> {
    let pb = utils::create_spinner("Fetching projects...");
    let projects = gcloud.list_projects().await;
    pb.finish_and_clear();
    projects
}

fn print_projects(projects: &[Project], current: Option<&str>) {
    for (i, project) in projects.iter().enumerate() {
        let active = current == Some(project.project_id.as_str());
        println!("{} {}. {}", checkbox(active), i + 1, project);
    }
}

pub async fn list(session: &Session, show_status: bool) -> Result<()> {
    if !session.require_auth().await {
        return Ok(());
    }

    println!("Discovering GCP projects...");
    println!();

    let projects = discover_projects(&session.gcloud)
        .await
        .context("failed to discover projects")?;
    if projects.is_empty() {
        println!("No GCP projects found.");
        return Ok(());
    }

    let current = session.gcloud.current_project().await;

    println!("Available environments:");
    println!();

    if show_status {
        for (i, project) in projects.iter().enumerate() {
            let active = current.as_deref() == Some(project.project_id.as_str());
            let status = session.gcloud.project_status(&project.project_id).await;
            println!("{} {}. {} {}", checkbox(active), i + 1, project, status);
        }
    } else {
        print_projects(&projects, current.as_deref());
        println!();
        println!("💡 Use 'gcpeasy env list --status' to see connectivity status");
    }

    Ok(())
}

pub async fn select(session: &Session, identifier: Option<String>) -> Result<()> {
    if !session.require_auth().await {
        return Ok(());
    }

    let projects = discover_projects(&session.gcloud)
        .await
        .context("failed to get projects")?;
    if projects.is_empty() {
        println!("No GCP projects found.");
        return Ok(());
    }

    let project = match identifier {
        Some(id) => {
            let found = utils::resolve_identifier(&projects, &id, |p| {
                p.project_id == id || p.name == id
            });
            match found {
                Some(project) => project,
                None => {
                    println!("Environment '{}' not found.", id);
                    println!("Use 'gcpeasy env list' to see available environments.");
                    return Ok(());
                }
            }
        }
        None => {
            println!("Available environments:");
            println!();
            let current = session.gcloud.current_project().await;
            print_projects(&projects, current.as_deref());
            println!();

            let answer = utils::read_answer("Select environment (number):")?;
            match utils::parse_selection(&answer, projects.len(), false) {
                Ok(index) => &projects[index],
                Err(Error::InvalidSelection(input)) => {
                    println!("Invalid selection: {}", input);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    switch_to_project(&session.gcloud, &project.project_id).await
}

async fn switch_to_project(gcloud: &Gcloud, project_id: &str) -> Result<()> {
    println!("Switching to project: {}", project_id);
    gcloud
        .set_project(project_id)
        .await
        .context("failed to switch project")?;
    println!(
        "{} {}",
        "✅ Successfully switched to project:".green(),
        project_id.cyan()
    );
    Ok(())
}
