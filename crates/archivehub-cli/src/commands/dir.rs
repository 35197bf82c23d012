//! Directory management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use archivehub_core::config::AppConfig;
use archivehub_core::result::AppResult;
use archivehub_core::types::DirectoryId;
use archivehub_entity::directory::{Breadcrumb, Directory};
use archivehub_service::CreateDirectoryRequest;

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for directory commands
#[derive(Debug, Args)]
pub struct DirArgs {
    /// Directory subcommand
    #[command(subcommand)]
    pub command: DirCommand,
}

/// Directory subcommands
#[derive(Debug, Subcommand)]
pub enum DirCommand {
    /// Show the nested directory tree
    Tree {
        /// Include unpublished directories and files
        #[arg(long)]
        all: bool,
    },
    /// List the children of a directory (roots when no parent is given)
    List {
        /// Parent directory ID
        #[arg(short, long)]
        parent: Option<DirectoryId>,
        /// Include unpublished directories
        #[arg(long)]
        all: bool,
    },
    /// Create a directory
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Parent directory ID (omit for a root)
        #[arg(short, long)]
        parent: Option<DirectoryId>,
        /// Requested slug (generated from the name when omitted)
        #[arg(short, long)]
        slug: Option<String>,
        /// Sort key among siblings
        #[arg(short, long, default_value_t = 0)]
        order: i32,
        /// Publish immediately
        #[arg(long)]
        publish: bool,
    },
    /// Delete an empty directory
    Delete {
        /// Directory ID
        id: DirectoryId,
    },
    /// Resolve the breadcrumb trail of a path
    Breadcrumbs {
        /// Directory path, e.g. `docs/2024`
        path: String,
        /// Allow unpublished segments
        #[arg(long)]
        all: bool,
    },
    /// Re-run an interrupted relocation from one path prefix to another
    Repair {
        /// Old directory path
        #[arg(long)]
        from: String,
        /// New directory path
        #[arg(long)]
        to: String,
    },
}

/// Directory display row
#[derive(Debug, Serialize, Tabled)]
struct DirectoryRow {
    /// Directory ID
    id: String,
    /// Name
    name: String,
    /// Path
    path: String,
    /// Sort order
    order: i32,
    /// Published flag
    published: bool,
    /// Last update
    updated_at: String,
}

impl From<&Directory> for DirectoryRow {
    fn from(d: &Directory) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            path: d.path.clone(),
            order: d.order,
            published: d.published,
            updated_at: d.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Breadcrumb display row
#[derive(Debug, Serialize, Tabled)]
struct BreadcrumbRow {
    /// Name
    name: String,
    /// Path
    path: String,
}

impl From<Breadcrumb> for BreadcrumbRow {
    fn from(b: Breadcrumb) -> Self {
        Self {
            name: b.name,
            path: b.path,
        }
    }
}

/// Execute directory commands
pub async fn execute(args: &DirArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let services = Services::connect(config).await?;
    let result = run(&args.command, &services, format).await;
    services.close().await;
    result
}

async fn run(command: &DirCommand, services: &Services, format: OutputFormat) -> AppResult<()> {
    let directories = &services.directories;

    match command {
        DirCommand::Tree { all } => {
            let tree = directories.list_tree(*all).await?;
            output::print_tree(&tree, format);
        }
        DirCommand::List { parent, all } => {
            let rows: Vec<DirectoryRow> = directories
                .list_by_parent(*parent, *all)
                .await?
                .iter()
                .map(DirectoryRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        DirCommand::Create {
            name,
            parent,
            slug,
            order,
            publish,
        } => {
            let directory = directories
                .create(CreateDirectoryRequest {
                    parent_id: *parent,
                    name: name.clone(),
                    slug: slug.clone(),
                    description: None,
                    order: *order,
                    published: *publish,
                })
                .await?;
            output::print_list(&[DirectoryRow::from(&directory)], format);
        }
        DirCommand::Delete { id } => {
            directories.delete(*id).await?;
            output::print_success(&format!("Directory {id} deleted"));
        }
        DirCommand::Breadcrumbs { path, all } => {
            let rows: Vec<BreadcrumbRow> = directories
                .build_breadcrumbs(path, *all)
                .await?
                .into_iter()
                .map(BreadcrumbRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        DirCommand::Repair { from, to } => {
            let moved = directories.repair_relocation(from, to).await?;
            output::print_success(&format!("{moved} descendant directories relocated"));
        }
    }

    Ok(())
}
