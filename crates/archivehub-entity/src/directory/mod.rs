//! Directory domain entities.

pub mod breadcrumb;
pub mod model;

pub use breadcrumb::Breadcrumb;
pub use model::{CreateDirectory, Directory};
