//! Per-module extraction session.
//!
//! One session owns the module-scoped parse state: the import table, class
//! skeletons, type-alias bindings and the set of fully extracted models.
//! The dependency graph is the only state shared across sessions; it is
//! passed in by reference from the run driving the recursion.
//!
//! A session runs in one of two modes:
//! - whole-module (the root module): classify every declared class and
//!   fully extract each model;
//! - restricted (cross-module recursion): classify and extract only the
//!   named classes, following local dependencies as they surface.

use std::collections::{BTreeSet, HashMap};

use rustpython_parser::ast;

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::ExtractError;
use crate::extract::fields::{
    class_skeleton, extract_class_decl, extract_type, user_defined_types,
};
use crate::extract::graph::ModelGraph;
use crate::extract::imports::ImportTable;
use crate::model::{ClassDecl, PyType};
use crate::python::{LoadedModule, resolve_relative};

pub struct ModuleSession<'a> {
    module: &'a LoadedModule,
    config: &'a Config,
    /// Empty for whole-module mode; otherwise the classes to extract.
    parse_only: BTreeSet<String>,

    imports: ImportTable,
    /// Declared class names in declaration order.
    class_order: Vec<String>,
    class_nodes: HashMap<String, &'a ast::StmtClassDef>,
    skeletons: HashMap<String, ClassDecl>,
    /// Module-level `Name: TypeAlias = <expr>` bindings, resolved lazily
    /// when a model field references the alias.
    alias_nodes: HashMap<String, &'a ast::Expr>,

    models: HashMap<String, ClassDecl>,
    model_order: Vec<String>,
    /// Dependency names whose origin is an import rather than a local class.
    external: BTreeSet<String>,
}

impl<'a> ModuleSession<'a> {
    pub fn new(module: &'a LoadedModule, config: &'a Config, parse_only: BTreeSet<String>) -> Self {
        Self {
            module,
            config,
            parse_only,
            imports: ImportTable::default(),
            class_order: Vec::new(),
            class_nodes: HashMap::new(),
            skeletons: HashMap::new(),
            alias_nodes: HashMap::new(),
            models: HashMap::new(),
            model_order: Vec::new(),
            external: BTreeSet::new(),
        }
    }

    /// Walk the module and extract its models according to the session mode.
    pub fn run(
        &mut self,
        graph: &mut ModelGraph,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ExtractError> {
        self.collect_module(graph);

        if self.parse_only.is_empty() {
            self.extract_all_models(graph, diagnostics)
        } else {
            for name in self.parse_only.clone() {
                if !self.skeletons.contains_key(&name) {
                    return Err(ExtractError::ClassNotFound {
                        class: name,
                        module: self.module.path.dotted.clone(),
                    });
                }
                self.extract_model(&name, graph, diagnostics)?;
            }
            Ok(())
        }
    }

    /// Scan top-level statements once: imports, class skeletons and type
    /// aliases. Every declared class becomes a graph node, model or not.
    fn collect_module(&mut self, graph: &mut ModelGraph) {
        let module = self.module;
        self.imports = ImportTable::collect(&module.body);

        for stmt in &module.body {
            match stmt {
                ast::Stmt::ClassDef(node) => {
                    let skeleton = class_skeleton(node);
                    graph.add_node(&skeleton.name);
                    self.class_order.push(skeleton.name.clone());
                    self.class_nodes.insert(skeleton.name.clone(), node);
                    self.skeletons.insert(skeleton.name.clone(), skeleton);
                }
                ast::Stmt::AnnAssign(assign) => {
                    self.collect_type_alias(assign);
                }
                _ => {}
            }
        }
    }

    /// A module-level `Name: TypeAlias = <expr>` assignment. The right-hand
    /// side stays unparsed until a model field references the alias.
    fn collect_type_alias(&mut self, assign: &'a ast::StmtAnnAssign) {
        let ast::Expr::Name(annotation) = assign.annotation.as_ref() else {
            return;
        };
        if annotation.id.as_str() != "TypeAlias" {
            return;
        }
        if let (ast::Expr::Name(target), Some(value)) =
            (assign.target.as_ref(), assign.value.as_deref())
        {
            self.alias_nodes.insert(target.id.to_string(), value);
        }
    }

    /// Whole-module mode: classes are traversed in declaration order, each
    /// model extracted, then the dependency edges are wired in one pass.
    fn extract_all_models(
        &mut self,
        graph: &mut ModelGraph,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ExtractError> {
        for name in self.class_order.clone() {
            let Some(skeleton) = self.skeletons.get(&name) else {
                continue;
            };
            if self.is_model(skeleton) {
                self.finish_class(&name, graph, diagnostics)?;
            }
        }

        for name in self.model_order.clone() {
            let deps = match self.models.get(&name) {
                Some(decl) => self.class_deps(decl),
                None => continue,
            };
            for dep in deps {
                graph.add_edge(&name, &dep);
                if self.imports.contains(&dep) {
                    self.external.insert(dep);
                } else if !self.skeletons.contains_key(&dep) {
                    diagnostics.warn(format!(
                        "can't infer where '{}' is coming from, '{}' depends on it",
                        dep, name
                    ));
                }
            }
        }
        Ok(())
    }

    /// Restricted mode: extract one model, following local dependencies
    /// recursively as they are discovered.
    fn extract_model(
        &mut self,
        name: &str,
        graph: &mut ModelGraph,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ExtractError> {
        {
            let Some(skeleton) = self.skeletons.get(name) else {
                return Ok(());
            };
            if self.models.contains_key(name) || !self.is_model(skeleton) {
                return Ok(());
            }
        }

        let deps = self.finish_class(name, graph, diagnostics)?;
        for dep in deps {
            graph.add_edge(name, &dep);
            if self.imports.contains(&dep) {
                self.external.insert(dep);
            } else if self.skeletons.contains_key(&dep) {
                self.extract_model(&dep, graph, diagnostics)?;
            } else {
                diagnostics.warn(format!(
                    "can't infer where '{}' is coming from, '{}' depends on it",
                    dep, name
                ));
            }
        }
        Ok(())
    }

    /// Full extraction of one class: fields, defaults, docstrings, then a
    /// single level of type-alias substitution. Returns the dependency set.
    fn finish_class(
        &mut self,
        name: &str,
        graph: &mut ModelGraph,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<String>, ExtractError> {
        let Some(&node) = self.class_nodes.get(name) else {
            return Err(ExtractError::ClassNotFound {
                class: name.to_string(),
                module: self.module.path.dotted.clone(),
            });
        };

        let mut decl = extract_class_decl(node, diagnostics)?;
        for field in &mut decl.fields {
            self.resolve_aliases(&mut field.ty)?;
        }

        graph.add_node(&decl.name);
        let deps = self.class_deps(&decl);
        self.models.insert(decl.name.clone(), decl);
        self.model_order.push(name.to_string());
        Ok(deps)
    }

    /// A class is a model iff it directly lists the recognized base imported
    /// from the framework module, or inherits one through a chain of locally
    /// declared bases.
    fn is_model(&self, cls: &ClassDecl) -> bool {
        if cls.base_classes.iter().any(|b| b == &self.config.base_class) {
            if let Some(origin) = self.imports.get(&self.config.base_class) {
                if origin.level == 0 && origin.module == self.config.base_module {
                    return true;
                }
            }
        }

        for base in &cls.base_classes {
            if let Some(parent) = self.skeletons.get(base) {
                return self.is_model(parent);
            }
        }
        false
    }

    /// Substitute recorded type aliases into user-defined leaves, exactly
    /// once — a substituted type is not chased for further aliases.
    fn resolve_aliases(&self, ty: &mut PyType) -> Result<(), ExtractError> {
        match ty {
            PyType::UserDefined(name) => {
                if let Some(value) = self.alias_nodes.get(name.as_str()) {
                    *ty = extract_type(value)?;
                }
            }
            PyType::Union(types) | PyType::Tuple(types) => {
                for member in types {
                    self.resolve_aliases(member)?;
                }
            }
            PyType::Generic { args, .. } => {
                for arg in args {
                    self.resolve_aliases(arg)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Everything this class's declaration references: non-framework bases
    /// plus user-defined names inside field types.
    fn class_deps(&self, cls: &ClassDecl) -> Vec<String> {
        let mut deps: Vec<String> = cls
            .base_classes
            .iter()
            .filter(|b| *b != &self.config.base_class)
            .cloned()
            .collect();
        for field in &cls.fields {
            deps.extend(user_defined_types(&field.ty));
        }
        deps
    }

    /// Fully qualified paths of models imported from other modules, with
    /// well-known structural types filtered out so the resolver does not
    /// chase them.
    pub fn external_models(&self) -> Result<Vec<String>, ExtractError> {
        let mut paths = Vec::new();
        for name in &self.external {
            let Some(origin) = self.imports.get(name) else {
                continue;
            };
            let abs_module =
                resolve_relative(&origin.module, origin.level, &self.module.path.package)?;
            let fq_path = if abs_module.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", abs_module, name)
            };
            if !self.config.is_skipped_type(&fq_path) {
                paths.push(fq_path);
            }
        }
        Ok(paths)
    }

    /// The fully extracted models, in extraction order.
    pub fn into_extracted(self) -> Vec<ClassDecl> {
        let mut models = self.models;
        self.model_order
            .iter()
            .filter_map(|name| models.remove(name))
            .collect()
    }
}
