use rustpython_parser::{Mode, ast, parse};

use crate::error::ExtractError;

/// Parse Python source code into a list of top-level statements.
///
/// This is the core parsing function. For file-based loading with dotted
/// path resolution, use [`crate::python::ModuleLoader`] instead.
pub fn parse_python_source(code: &str, file_path: &str) -> Result<Vec<ast::Stmt>, ExtractError> {
    let parsed = parse(code, Mode::Module, file_path).map_err(|e| ExtractError::Syntax {
        file: file_path.to_string(),
        message: e.to_string(),
    })?;

    match parsed {
        ast::Mod::Module(module) => Ok(module.body),
        _ => Err(ExtractError::Syntax {
            file: file_path.to_string(),
            message: "expected a module".to_string(),
        }),
    }
}
