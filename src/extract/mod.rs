//! Model extraction pipeline.
//!
//! Declaration discovery, type normalization and cross-module dependency
//! resolution over Python sources, producing model declarations in an order
//! where every class appears after everything it depends on.
//!
//! ## Module Structure
//!
//! - `imports`: import statements scanned into a symbol-origin table
//! - `fields`: annotation expressions normalized into the canonical type
//!   model
//! - `session`: per-module parse state, model classification and dependency
//!   collection
//! - `graph`: the shared dependency graph and its postorder emission order
//!
//! ## Pipeline
//!
//! 1. **Collection** (`session::ModuleSession::run`)
//!    - One pass over the module's top-level statements: import table,
//!      class skeletons, type aliases
//! 2. **Extraction** (`session` + `fields`)
//!    - Classify each class, normalize model fields, record dependency
//!      edges in the shared graph
//! 3. **Resolution** (`Run::parse_module`)
//!    - Resolve external dependencies to fully qualified paths, load the
//!      owning modules and recurse, restricted to the referenced classes
//! 4. **Ordering** (`graph::ModelGraph::postorder`)
//!    - One postorder traversal over the completed graph, filtered to the
//!      extracted models

pub mod fields;
pub mod graph;
pub mod imports;
pub mod session;


use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::ExtractError;
use crate::extract::graph::ModelGraph;
use crate::extract::session::ModuleSession;
use crate::model::ClassDecl;
use crate::python::{LoadedModule, ModuleLoader};

/// Result of a successful run: the ordered declarations plus everything the
/// pipeline had to say along the way.
#[derive(Debug, Serialize)]
pub struct Parsed {
    pub classes: Vec<ClassDecl>,
    pub diagnostics: Diagnostics,
}

/// Extract every model reachable from the root module file.
///
/// The returned declarations are ordered so that each class appears
/// strictly after every class it depends on. Structural violations and
/// module load failures abort with an [`ExtractError`]; recoverable
/// degradations surface as warnings in [`Parsed::diagnostics`].
pub fn parse_models(root: &Path, config: &Config) -> Result<Parsed, ExtractError> {
    let loader = ModuleLoader::new(&config.source_root);
    let module = loader.load_file(root)?;

    let mut run = Run {
        config,
        loader,
        graph: ModelGraph::new(),
        models: HashMap::new(),
        diagnostics: Diagnostics::new(),
        visited: HashSet::new(),
    };
    run.parse_module(&module, BTreeSet::new())?;
    Ok(run.finish())
}

/// Extract models from already-parsed source, without touching the
/// filesystem. External dependencies are resolved against `loader`.
pub fn parse_loaded(
    module: &LoadedModule,
    loader: ModuleLoader,
    config: &Config,
) -> Result<Parsed, ExtractError> {
    let mut run = Run {
        config,
        loader,
        graph: ModelGraph::new(),
        models: HashMap::new(),
        diagnostics: Diagnostics::new(),
        visited: HashSet::new(),
    };
    run.parse_module(module, BTreeSet::new())?;
    Ok(run.finish())
}

/// State threaded through the recursive module visits: the shared graph,
/// the accumulated model set, diagnostics and the cross-module visit guard.
struct Run<'cfg> {
    config: &'cfg Config,
    loader: ModuleLoader,
    graph: ModelGraph,
    models: HashMap<String, ClassDecl>,
    diagnostics: Diagnostics,
    /// Fully qualified class paths already scheduled for extraction. Guards
    /// against cyclic cross-module references and repeated module loads.
    visited: HashSet<String>,
}

impl Run<'_> {
    fn parse_module(
        &mut self,
        module: &LoadedModule,
        parse_only: BTreeSet<String>,
    ) -> Result<(), ExtractError> {
        self.diagnostics
            .info(format!("parsing module '{}'", module.file.display()));

        let mut session = ModuleSession::new(module, self.config, parse_only);
        session.run(&mut self.graph, &mut self.diagnostics)?;

        let external = session.external_models()?;
        for decl in session.into_extracted() {
            self.models.insert(decl.name.clone(), decl);
        }

        if !external.is_empty() {
            self.diagnostics.info(format!(
                "'{}' depends on other models:",
                module.file.display()
            ));
            for fq_path in &external {
                self.diagnostics.info(format!("    '{}'", fq_path));
            }
        }

        for fq_path in external {
            if !self.visited.insert(fq_path.clone()) {
                continue;
            }
            let Some((module_path, class_name)) = fq_path.rsplit_once('.') else {
                return Err(ExtractError::ModuleNotFound(fq_path));
            };
            let target = self.loader.load_module(module_path)?;
            self.parse_module(&target, BTreeSet::from([class_name.to_string()]))?;
        }
        Ok(())
    }

    /// Postorder over the completed graph, filtered to extracted models:
    /// each dependency lands before its dependents.
    fn finish(mut self) -> Parsed {
        let mut classes = Vec::new();
        for name in self.graph.postorder() {
            if let Some(decl) = self.models.remove(&name) {
                classes.push(decl);
            }
        }
        Parsed {
            classes,
            diagnostics: self.diagnostics,
        }
    }
}
