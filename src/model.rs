//! Canonical declaration and type model extracted from Python sources.
//!
//! This is the public contract consumed by downstream schema generators:
//! an ordered list of [`ClassDecl`] records whose field types are normalized
//! into the closed [`PyType`] variant set.

use std::fmt;

use serde::Serialize;

/// A fully extracted Pydantic model declaration.
///
/// Created as a skeleton (name + bases) when a class statement is first seen,
/// completed with fields once the class is recognized as a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDecl {
    pub name: String,
    /// Direct base class names in declaration order.
    pub base_classes: Vec<String>,
    /// Fields in declaration order.
    pub fields: Vec<ClassField>,
    /// Leading docstring, if any.
    pub comment: Option<String>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>, base_classes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            base_classes,
            fields: Vec::new(),
            comment: None,
        }
    }
}

/// One annotated field of a model class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: PyType,
    pub default_value: Option<PyValue>,
    /// Trailing docstring attached to this field, if any.
    pub comment: Option<String>,
}

/// The closed set of Python primitives understood by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Str,
    Bytes,
    Bool,
    Int,
    Float,
    None,
}

impl PrimitiveKind {
    /// The Python spelling of this primitive.
    pub fn py_name(self) -> &'static str {
        match self {
            PrimitiveKind::Str => "str",
            PrimitiveKind::Bytes => "bytes",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Float => "float",
            PrimitiveKind::None => "None",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.py_name())
    }
}

/// The parameterizable container kinds understood by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    List,
    Dict,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::List => f.write_str("list"),
            ContainerKind::Dict => f.write_str("dict"),
        }
    }
}

/// A normalized Python type expression.
///
/// Invariant: no member of a `Union` is itself a `Union` — chained `|`
/// expressions, `Optional[...]` and multi-valued `Literal[...]` are all
/// flattened a single level during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PyType {
    /// `str`, `bytes`, `bool`, `int`, `float` or `None`.
    Primitive(PrimitiveKind),
    /// An un-parameterized `list` or `dict`.
    Builtin(ContainerKind),
    /// A parameterized `list[...]` or `dict[...]`.
    Generic {
        container: ContainerKind,
        args: Vec<PyType>,
    },
    /// A flattened union of member types.
    Union(Vec<PyType>),
    /// A single literal string constraint. A `Literal` with several values
    /// normalizes to a `Union` of single-value literals.
    Literal(String),
    /// A fixed-arity `tuple[...]`.
    Tuple(Vec<PyType>),
    /// A reference to another declared class, resolved later through the
    /// dependency graph.
    UserDefined(String),
}

impl fmt::Display for PyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PyType::Primitive(p) => write!(f, "{}", p),
            PyType::Builtin(c) => write!(f, "{}", c),
            PyType::Generic { container, args } => {
                write!(f, "{}[{}]", container, join_types(args))
            }
            PyType::Union(types) => {
                let rendered: Vec<String> = types.iter().map(|t| t.to_string()).collect();
                f.write_str(&rendered.join(" | "))
            }
            PyType::Literal(value) => write!(f, "Literal[\"{}\"]", value),
            PyType::Tuple(types) => write!(f, "tuple[{}]", join_types(types)),
            PyType::UserDefined(name) => f.write_str(name),
        }
    }
}

fn join_types(types: &[PyType]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The restricted set of default-value literals the extractor captures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PyValue {
    /// A string literal with quotes stripped.
    Str(String),
    /// The `None` literal.
    None,
    /// An opaque composite literal (e.g. a dict literal) whose contents are
    /// not modeled.
    Composite,
}

impl fmt::Display for PyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PyValue::Str(s) => write!(f, "\"{}\"", s),
            PyValue::None => f.write_str("None"),
            PyValue::Composite => f.write_str("{...}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_types() {
        let ty = PyType::Generic {
            container: ContainerKind::Dict,
            args: vec![
                PyType::Primitive(PrimitiveKind::Str),
                PyType::Union(vec![
                    PyType::UserDefined("Address".to_string()),
                    PyType::Primitive(PrimitiveKind::None),
                ]),
            ],
        };
        assert_eq!(ty.to_string(), "dict[str, Address | None]");
    }

    #[test]
    fn renders_literals_and_tuples() {
        let ty = PyType::Tuple(vec![
            PyType::Literal("get".to_string()),
            PyType::Primitive(PrimitiveKind::Int),
        ]);
        assert_eq!(ty.to_string(), "tuple[Literal[\"get\"], int]");
    }
}
