//! Projects command - project CRUD against the backend.

use anyhow::Result;
use clap::{Args, Subcommand};
use flowmatic_client::{CreateProjectRequest, Project, UpdateProjectRequest};

use super::Context;

/// Arguments for the projects command.
#[derive(Args, Debug)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List projects
    List,

    /// Show a project
    Get {
        /// Project ID
        id: String,
    },

    /// Create a project
    Create {
        /// Project name
        name: String,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Update a project
    Update {
        /// Project ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New status
        #[arg(long)]
        status: Option<String>,
    },

    /// Delete a project
    Delete {
        /// Project ID
        id: String,
    },
}

/// Run the projects command.
pub async fn run(args: ProjectsArgs, ctx: &Context) -> Result<()> {
    let projects = ctx.authed_client()?.projects();

    match args.command {
        ProjectsCommand::List => {
            let list = projects.list().await?;
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else if list.is_empty() {
                println!("No projects.");
            } else {
                for project in &list {
                    print_row(project);
                }
            }
        }
        ProjectsCommand::Get { id } => {
            let project = projects.get(&id).await?;
            print_project(&project, ctx)?;
        }
        ProjectsCommand::Create { name, description } => {
            let project = projects
                .create(CreateProjectRequest { name, description })
                .await?;
            print_project(&project, ctx)?;
        }
        ProjectsCommand::Update {
            id,
            name,
            description,
            status,
        } => {
            let project = projects
                .update(
                    &id,
                    UpdateProjectRequest {
                        name,
                        description,
                        status,
                    },
                )
                .await?;
            print_project(&project, ctx)?;
        }
        ProjectsCommand::Delete { id } => {
            projects.delete(&id).await?;
            println!("Deleted project {}", id);
        }
    }

    Ok(())
}

fn print_row(project: &Project) {
    println!(
        "{:<38} {:<12} {}",
        project.id,
        project.status.as_deref().unwrap_or("-"),
        project.name
    );
}

fn print_project(project: &Project, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(project)?);
        return Ok(());
    }

    println!("{}", project.name);
    println!("  ID: {}", project.id);
    if let Some(status) = &project.status {
        println!("  Status: {}", status);
    }
    if let Some(description) = &project.description {
        println!("  Description: {}", description);
    }
    if let Some(updated) = &project.updated_at {
        println!("  Updated: {}", updated);
    }
    Ok(())
}
