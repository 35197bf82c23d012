//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use archivehub_entity::directory::Directory;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(&items),
    }
}

/// Print the nested directory tree, one indented line per entry.
pub fn print_tree(tree: &[Directory], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&tree),
        OutputFormat::Table => {
            if tree.is_empty() {
                println!("No directories.");
            }
            for directory in tree {
                print_tree_node(directory, 0);
            }
        }
    }
}

fn print_tree_node(directory: &Directory, depth: usize) {
    let indent = "  ".repeat(depth);
    let marker = if directory.published { "" } else { " (unpublished)" };
    println!("{indent}{}/  [{}]{marker}", directory.slug, directory.name);
    for child in &directory.children {
        print_tree_node(child, depth + 1);
    }
    for file in &directory.files {
        println!("{indent}  {}  <{}>", file.slug, file.file_type);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}
