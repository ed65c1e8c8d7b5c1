//! Core document model and vault loading for Lodestone
//!
//! This crate owns the pieces every other Lodestone crate builds on:
//! the [`Document`] model with its forgiving frontmatter parser, the
//! vault walker that decides which files are indexable, and the
//! wikilink resolver that maps link text to canonical note paths.

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod loader;
pub mod resolver;
pub mod types;
pub mod wikilinks;

pub use config::VaultConfig;
pub use error::{CoreError, CoreResult};
pub use loader::VaultWalker;
pub use resolver::LinkResolver;
pub use types::{Classification, Document, RelationKind, TypedRelation};
