//! Python host-language plumbing.
//!
//! - `source`: parse source text into a walkable syntax tree
//! - `loader`: resolve dotted/relative module paths to files on disk

pub mod loader;
pub mod source;

pub use loader::{LoadedModule, ModuleLoader, ModulePath, resolve_relative};
pub use source::parse_python_source;
