//! Pyzod - Pydantic model extraction for Zod schema generation
//!
//! Pyzod is a CLI tool and library that discovers Pydantic model
//! declarations in Python sources, normalizes every field's type annotation
//! into a canonical closed type model, follows model references across
//! modules, and emits the declarations in dependency order — each class
//! strictly after everything it depends on — ready for a code-generation
//! backend targeting Zod.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (arguments, dispatch, report)
//! - `config`: Configuration file loading and parsing
//! - `diagnostics`: Non-fatal warnings and progress messages
//! - `error`: The fatal error channel for structural violations
//! - `extract`: Core extraction pipeline (imports, fields, sessions, graph)
//! - `model`: The canonical declaration and type model
//! - `python`: Host-language plumbing (source parsing, module loading)

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod model;
pub mod python;

pub use config::Config;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::ExtractError;
pub use extract::{Parsed, parse_models};
pub use model::{ClassDecl, ClassField, ContainerKind, PrimitiveKind, PyType, PyValue};
