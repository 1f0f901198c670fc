//! Import table: `from X import a, b` statements scanned into a symbol map.

use std::collections::HashMap;

use rustpython_parser::ast;

/// Origin of one imported symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedSymbol {
    /// Module path as written in the import, without leading dots.
    pub module: String,
    /// Relative-import depth: number of leading dots. Zero for absolute
    /// imports.
    pub level: u32,
}

/// imported symbol name -> origin module.
///
/// e.g. `Request` -> `scanner_common.http.cassette`
///
/// Immutable once the module's top-level statements have been scanned.
/// Later imports of the same name overwrite earlier ones; the host language
/// forbids duplicate imported names in one scope, so no collision handling
/// is needed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportTable {
    entries: HashMap<String, ImportedSymbol>,
}

impl ImportTable {
    /// Scan every top-level `from ... import ...` statement of a module.
    ///
    /// Plain `import X` statements are not consulted: model classes and the
    /// framework base are always brought in with `from` imports.
    pub fn collect(stmts: &[ast::Stmt]) -> Self {
        let mut table = Self::default();
        for stmt in stmts {
            if let ast::Stmt::ImportFrom(import) = stmt {
                table.add_import_from(import);
            }
        }
        table
    }

    fn add_import_from(&mut self, import: &ast::StmtImportFrom) {
        let module = import
            .module
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_default();
        let level = import.level.as_ref().map_or(0, |l| l.to_u32());

        for alias in &import.names {
            let name = alias.name.as_str();
            if name == "*" {
                continue;
            }
            self.entries.insert(
                name.to_string(),
                ImportedSymbol {
                    module: module.clone(),
                    level,
                },
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<&ImportedSymbol> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}
