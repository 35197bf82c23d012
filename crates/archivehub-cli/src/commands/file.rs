//! File management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use archivehub_core::config::AppConfig;
use archivehub_core::result::AppResult;
use archivehub_core::types::{DirectoryId, FileId};
use archivehub_entity::file::{File, FileType};
use archivehub_service::CreateFileRequest;

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// List the files of the directory at a path
    List {
        /// Directory path, e.g. `docs/2024`
        directory_path: String,
        /// Include unpublished files
        #[arg(long)]
        all: bool,
    },
    /// Register a remote file
    Create {
        /// Owning directory ID
        #[arg(short, long)]
        directory: DirectoryId,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Remote file URL
        #[arg(short, long)]
        url: String,
        /// Requested slug (generated from the name when omitted)
        #[arg(short, long)]
        slug: Option<String>,
        /// Declared MIME type (probed when omitted)
        #[arg(long)]
        mime: Option<String>,
        /// Declared category (classified when omitted)
        #[arg(long = "type")]
        file_type: Option<FileType>,
        /// Declared size in bytes (probed when omitted)
        #[arg(long)]
        size: Option<i64>,
        /// Sort key
        #[arg(short, long, default_value_t = 0)]
        order: i32,
        /// Publish immediately
        #[arg(long)]
        publish: bool,
    },
    /// Delete a file
    Delete {
        /// File ID
        id: FileId,
    },
}

/// File display row
#[derive(Debug, Serialize, Tabled)]
struct FileRow {
    /// File ID
    id: String,
    /// Name
    name: String,
    /// Path
    path: String,
    /// Category
    file_type: String,
    /// MIME type
    mime_type: String,
    /// Size in bytes
    size: String,
    /// Published flag
    published: bool,
}

impl From<&File> for FileRow {
    fn from(f: &File) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            path: f.path.clone(),
            file_type: f.file_type.to_string(),
            mime_type: f.mime_type.clone().unwrap_or_else(|| "-".to_string()),
            size: f
                .file_size
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            published: f.published,
        }
    }
}

/// Execute file commands
pub async fn execute(args: &FileArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let services = Services::connect(config).await?;
    let result = run(&args.command, &services, format).await;
    services.close().await;
    result
}

async fn run(command: &FileCommand, services: &Services, format: OutputFormat) -> AppResult<()> {
    let files = &services.files;

    match command {
        FileCommand::List {
            directory_path,
            all,
        } => {
            let rows: Vec<FileRow> = files
                .list_by_directory_path(directory_path, *all)
                .await?
                .iter()
                .map(FileRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        FileCommand::Create {
            directory,
            name,
            url,
            slug,
            mime,
            file_type,
            size,
            order,
            publish,
        } => {
            let file = files
                .create(CreateFileRequest {
                    directory_id: *directory,
                    name: name.clone(),
                    slug: slug.clone(),
                    description: String::new(),
                    file_url: url.clone(),
                    preview_url: None,
                    mime_type: mime.clone(),
                    file_type: *file_type,
                    file_size: *size,
                    order: *order,
                    published: *publish,
                })
                .await?;
            output::print_list(&[FileRow::from(&file)], format);
        }
        FileCommand::Delete { id } => {
            files.delete(*id).await?;
            output::print_success(&format!("File {id} deleted"));
        }
    }

    Ok(())
}
