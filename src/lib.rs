//! Question-bank browser: loads a manifest of category files, merges their
//! question records and serves a filter / sort / render pipeline over them.

pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod loader;
pub mod migrate;
pub mod model;
pub mod normalize;
pub mod render;
pub mod sort;
pub mod tui;

pub use controller::{CardAction, Controller, Controls};
pub use error::{CategoryLoadError, ClipboardError, LoadError, ManifestError, MigrationError};
pub use filter::{matches, FilterState};
pub use loader::{load_bank, DataSource, FsSource, QuestionBank};
pub use model::{CategoryDescriptor, Manifest, Question};
pub use normalize::fold;
pub use sort::SortKey;
