//! The fatal error channel of the extraction pipeline.
//!
//! Only structural violations — constructs outside the recognized source
//! subset — and module loading failures travel through [`ExtractError`].
//! Recoverable degradations (unknown dependency origins, unsupported default
//! values) are reported through the diagnostics list instead and never abort
//! a run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// A type annotation used a construct outside the recognized subset.
    #[error("unsupported construct in type annotation: {0}")]
    UnsupportedAnnotation(String),

    /// A subscripted generic with an unrecognized base identifier.
    #[error("unrecognized generic type: '{0}'")]
    UnrecognizedGeneric(String),

    /// A `Literal[...]` subscript holding something other than quoted strings.
    #[error("unsupported literal value: {0}")]
    UnsupportedLiteral(String),

    /// A binary type expression with an operator other than `|`.
    #[error("unsupported operator in union type: {0}")]
    UnsupportedUnionOperator(String),

    /// A class requested for cross-module extraction is not declared in the
    /// module its import pointed at.
    #[error("class '{class}' not found in module '{module}'")]
    ClassNotFound { class: String, module: String },

    /// A module path could not be resolved to a file under the source root.
    #[error("module '{0}' not found under the source root")]
    ModuleNotFound(String),

    /// A relative import climbed above the top-level package.
    #[error("relative import (level {level}) escapes package '{package}'")]
    RelativeImportOutOfRange { level: u32, package: String },

    #[error("failed to read '{}'", .file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in '{file}': {message}")]
    Syntax { file: String, message: String },
}
