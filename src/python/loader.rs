//! Module loading: dotted and relative module paths resolved to files.
//!
//! The loader owns the mapping between the Python package namespace and the
//! filesystem. A dotted path `a.b.c` resolves to `a/b/c.py` or
//! `a/b/c/__init__.py` under the source root. Load failures are fatal to the
//! run; the pipeline has no partial-module mode.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rustpython_parser::ast;

use crate::error::ExtractError;
use crate::python::source::parse_python_source;

/// Position of a module inside the package namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePath {
    /// Absolute dotted path of the module, e.g. `app.models.user`.
    pub dotted: String,
    /// Dotted path of the package the module lives in. Equal to `dotted`
    /// for `__init__.py` modules, the parent path otherwise.
    pub package: String,
}

/// A module read from disk and parsed into top-level statements.
#[derive(Debug)]
pub struct LoadedModule {
    pub path: ModulePath,
    pub file: PathBuf,
    pub body: Vec<ast::Stmt>,
}

/// Resolves dotted module paths against a single source root and parses the
/// resolved files.
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    source_root: PathBuf,
}

impl ModuleLoader {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
        }
    }

    /// Load a module by its absolute dotted path.
    ///
    /// Tries `<root>/a/b.py` first, then the package form
    /// `<root>/a/b/__init__.py`.
    pub fn load_module(&self, dotted: &str) -> Result<LoadedModule, ExtractError> {
        let relative: PathBuf = dotted.split('.').collect();

        let module_file = self.source_root.join(relative.with_extension("py"));
        if module_file.is_file() {
            let package = match dotted.rsplit_once('.') {
                Some((package, _)) => package.to_string(),
                None => String::new(),
            };
            return self.read_and_parse(module_file, dotted.to_string(), package);
        }

        let init_file = self.source_root.join(relative).join("__init__.py");
        if init_file.is_file() {
            return self.read_and_parse(init_file, dotted.to_string(), dotted.to_string());
        }

        Err(ExtractError::ModuleNotFound(dotted.to_string()))
    }

    /// Load a module from an explicit file path, deriving its dotted path
    /// from the location of the file relative to the source root.
    ///
    /// A file outside the source root is treated as a top-level module named
    /// after its stem.
    pub fn load_file(&self, file: &Path) -> Result<LoadedModule, ExtractError> {
        let (dotted, package) = match file.strip_prefix(&self.source_root) {
            Ok(relative) => dotted_path_of(relative),
            Err(_) => {
                let stem = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                (stem, String::new())
            }
        };
        self.read_and_parse(file.to_path_buf(), dotted, package)
    }

    fn read_and_parse(
        &self,
        file: PathBuf,
        dotted: String,
        package: String,
    ) -> Result<LoadedModule, ExtractError> {
        let code = fs::read_to_string(&file).map_err(|source| ExtractError::Io {
            file: file.clone(),
            source,
        })?;
        let body = parse_python_source(&code, &file.to_string_lossy())?;
        Ok(LoadedModule {
            path: ModulePath { dotted, package },
            file,
            body,
        })
    }
}

/// Derive (dotted path, package) from a root-relative file path.
fn dotted_path_of(relative: &Path) -> (String, String) {
    let mut parts: Vec<String> = relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.last().is_some_and(|p| p == "__init__") {
        parts.pop();
        let dotted = parts.join(".");
        return (dotted.clone(), dotted);
    }

    let dotted = parts.join(".");
    parts.pop();
    (dotted, parts.join("."))
}

/// Resolve a possibly-relative import origin to an absolute dotted path.
///
/// `level` counts the leading dots of the import: one dot anchors at the
/// importing module's package, each further dot climbs one package up.
/// `module` may be empty (`from . import x`).
pub fn resolve_relative(module: &str, level: u32, package: &str) -> Result<String, ExtractError> {
    if level == 0 {
        return Ok(module.to_string());
    }

    let mut base: Vec<&str> = if package.is_empty() {
        Vec::new()
    } else {
        package.split('.').collect()
    };

    let climb = (level - 1) as usize;
    if climb > base.len() {
        return Err(ExtractError::RelativeImportOutOfRange {
            level,
            package: package.to_string(),
        });
    }
    base.truncate(base.len() - climb);

    if !module.is_empty() {
        base.extend(module.split('.'));
    }
    Ok(base.join("."))
}
