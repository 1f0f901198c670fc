//! Field type extraction: annotation expressions normalized into [`PyType`].
//!
//! Extraction understands a deliberate subset of the host language: simple
//! identifiers, subscripted generics and `|` unions. Anything else is a
//! structural error that aborts the run; only default-value expressions
//! degrade softly (to `None`, with a warning).

use rustpython_parser::ast;

use crate::diagnostics::Diagnostics;
use crate::error::ExtractError;
use crate::model::{ClassDecl, ClassField, ContainerKind, PrimitiveKind, PyType, PyValue};

/// Extract one annotation expression into the canonical type model.
pub fn extract_type(expr: &ast::Expr) -> Result<PyType, ExtractError> {
    match expr {
        ast::Expr::Name(name) => Ok(primitive_or_user_defined(name.id.as_str())),
        // `None` in an annotation position is a constant in this syntax
        // tree, not a name.
        ast::Expr::Constant(c) if matches!(c.value, ast::Constant::None) => {
            Ok(PyType::Primitive(PrimitiveKind::None))
        }
        ast::Expr::Subscript(subscript) => extract_generic(subscript),
        ast::Expr::BinOp(binop) => extract_union(binop),
        other => Err(ExtractError::UnsupportedAnnotation(
            expr_kind(other).to_string(),
        )),
    }
}

/// A simple identifier: primitive, bare container, or a user-defined
/// class reference.
fn primitive_or_user_defined(name: &str) -> PyType {
    match name {
        "str" => PyType::Primitive(PrimitiveKind::Str),
        "bytes" => PyType::Primitive(PrimitiveKind::Bytes),
        "bool" => PyType::Primitive(PrimitiveKind::Bool),
        "int" => PyType::Primitive(PrimitiveKind::Int),
        "float" => PyType::Primitive(PrimitiveKind::Float),
        "None" => PyType::Primitive(PrimitiveKind::None),
        "list" | "List" => PyType::Builtin(ContainerKind::List),
        "dict" | "Dict" => PyType::Builtin(ContainerKind::Dict),
        _ => PyType::UserDefined(name.to_string()),
    }
}

/// Dispatch a subscripted generic on its base identifier.
fn extract_generic(subscript: &ast::ExprSubscript) -> Result<PyType, ExtractError> {
    let ast::Expr::Name(base) = subscript.value.as_ref() else {
        return Err(ExtractError::UnsupportedAnnotation(
            expr_kind(&subscript.value).to_string(),
        ));
    };

    match base.id.as_str() {
        "Literal" => extract_literal(subscript),
        "list" | "List" => Ok(PyType::Generic {
            container: ContainerKind::List,
            args: subscript_args(subscript)?,
        }),
        "dict" | "Dict" => Ok(PyType::Generic {
            container: ContainerKind::Dict,
            args: subscript_args(subscript)?,
        }),
        "Union" => Ok(PyType::Union(subscript_args(subscript)?)),
        "Optional" => {
            let mut args = subscript_args(subscript)?;
            args.push(PyType::Primitive(PrimitiveKind::None));
            Ok(PyType::Union(args))
        }
        "tuple" | "Tuple" => Ok(PyType::Tuple(subscript_args(subscript)?)),
        other => Err(ExtractError::UnrecognizedGeneric(other.to_string())),
    }
}

/// `Literal["a"]` or `Literal["a", "b", ...]`.
///
/// One value is a single literal constraint; several values normalize to a
/// union of single-value literals, order preserved.
fn extract_literal(subscript: &ast::ExprSubscript) -> Result<PyType, ExtractError> {
    let mut values = Vec::new();
    for elem in subscript_elements(subscript) {
        match elem {
            ast::Expr::Constant(c) => match &c.value {
                ast::Constant::Str(value) => values.push(value.clone()),
                other => {
                    return Err(ExtractError::UnsupportedLiteral(format!("{:?}", other)));
                }
            },
            other => {
                return Err(ExtractError::UnsupportedLiteral(expr_kind(other).to_string()));
            }
        }
    }

    if values.len() == 1 {
        Ok(PyType::Literal(values.remove(0)))
    } else {
        Ok(PyType::Union(values.into_iter().map(PyType::Literal).collect()))
    }
}

/// A `X | Y` union expression, flattened one level: an operand that is
/// itself a union contributes its members, not a nested union.
fn extract_union(binop: &ast::ExprBinOp) -> Result<PyType, ExtractError> {
    if !matches!(binop.op, ast::Operator::BitOr) {
        return Err(ExtractError::UnsupportedUnionOperator(format!(
            "{:?}",
            binop.op
        )));
    }

    let mut members = Vec::new();
    for operand in [binop.left.as_ref(), binop.right.as_ref()] {
        match extract_type(operand)? {
            PyType::Union(types) => members.extend(types),
            single => members.push(single),
        }
    }
    Ok(PyType::Union(members))
}

/// The ordered type arguments of a subscript.
fn subscript_args(subscript: &ast::ExprSubscript) -> Result<Vec<PyType>, ExtractError> {
    subscript_elements(subscript)
        .into_iter()
        .map(extract_type)
        .collect()
}

fn subscript_elements(subscript: &ast::ExprSubscript) -> Vec<&ast::Expr> {
    match subscript.slice.as_ref() {
        ast::Expr::Tuple(tuple) => tuple.elts.iter().collect(),
        single => vec![single],
    }
}

/// Capture a restricted set of default-value literals.
///
/// Unsupported expressions degrade to `None` with a warning; defaults never
/// abort the run.
pub fn extract_value(expr: &ast::Expr, diagnostics: &mut Diagnostics) -> PyValue {
    match expr {
        ast::Expr::Constant(c) => match &c.value {
            ast::Constant::Str(value) => PyValue::Str(value.clone()),
            ast::Constant::None => PyValue::None,
            other => {
                diagnostics.warn(format!("unsupported value type: '{:?}'", other));
                PyValue::None
            }
        },
        ast::Expr::Dict(_) => PyValue::Composite,
        other => {
            diagnostics.warn(format!("unsupported value type: '{}'", expr_kind(other)));
            PyValue::None
        }
    }
}

/// Register a class by name and its simple-identifier bases, without
/// touching the body. Computed base expressions cannot name a usable base
/// class and are skipped.
pub fn class_skeleton(node: &ast::StmtClassDef) -> ClassDecl {
    let base_classes = node
        .bases
        .iter()
        .filter_map(|base| match base {
            ast::Expr::Name(name) => Some(name.id.to_string()),
            _ => None,
        })
        .collect();
    ClassDecl::new(node.name.to_string(), base_classes)
}

/// Fully extract a class declaration: fields with normalized types and
/// default values, plus the class docstring and per-field trailing
/// docstrings.
pub fn extract_class_decl(
    node: &ast::StmtClassDef,
    diagnostics: &mut Diagnostics,
) -> Result<ClassDecl, ExtractError> {
    let mut decl = class_skeleton(node);

    for stmt in &node.body {
        match stmt {
            ast::Stmt::AnnAssign(assign) => {
                let ast::Expr::Name(target) = assign.target.as_ref() else {
                    return Err(ExtractError::UnsupportedAnnotation(
                        "annotated assignment target".to_string(),
                    ));
                };
                let ty = extract_type(&assign.annotation)?;
                let default_value = assign
                    .value
                    .as_deref()
                    .map(|value| extract_value(value, diagnostics));
                decl.fields.push(ClassField {
                    name: target.id.to_string(),
                    ty,
                    default_value,
                    comment: None,
                });
            }
            ast::Stmt::Expr(stmt_expr) => {
                if let ast::Expr::Constant(c) = stmt_expr.value.as_ref() {
                    if let ast::Constant::Str(text) = &c.value {
                        attach_comment(&mut decl, text.clone());
                    }
                }
            }
            // Methods, nested classes and plain assignments carry no field
            // information.
            _ => {}
        }
    }

    Ok(decl)
}

/// A bare string statement documents the class when it appears before any
/// field, and the preceding field otherwise.
fn attach_comment(decl: &mut ClassDecl, text: String) {
    match decl.fields.last_mut() {
        Some(field) => field.comment = Some(text),
        None => decl.comment = Some(text),
    }
}

/// Every user-defined class name referenced inside a type, collected by
/// recursing through union members and generic type arguments.
pub fn user_defined_types(ty: &PyType) -> Vec<String> {
    match ty {
        PyType::UserDefined(name) => vec![name.clone()],
        PyType::Union(types) => types.iter().flat_map(user_defined_types).collect(),
        PyType::Generic { args, .. } => args.iter().flat_map(user_defined_types).collect(),
        _ => Vec::new(),
    }
}

fn expr_kind(expr: &ast::Expr) -> &'static str {
    match expr {
        ast::Expr::Attribute(_) => "attribute access",
        ast::Expr::Call(_) => "call",
        ast::Expr::Constant(_) => "constant",
        ast::Expr::Lambda(_) => "lambda",
        ast::Expr::List(_) => "list literal",
        ast::Expr::Set(_) => "set literal",
        ast::Expr::Dict(_) => "dict literal",
        ast::Expr::Tuple(_) => "tuple literal",
        ast::Expr::Subscript(_) => "subscript",
        ast::Expr::BinOp(_) => "binary expression",
        ast::Expr::Name(_) => "name",
        _ => "expression",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rustpython_parser::{Mode, ast, parse};

    use super::*;

    fn parse_annotation(source: &str) -> ast::Expr {
        let parsed = parse(source, Mode::Expression, "test.py").unwrap();
        match parsed {
            ast::Mod::Expression(expr) => *expr.body,
            _ => unreachable!("expression mode always yields an expression"),
        }
    }

    fn type_of(source: &str) -> PyType {
        extract_type(&parse_annotation(source)).unwrap()
    }

    #[test]
    fn extracts_primitives() {
        assert_eq!(type_of("str"), PyType::Primitive(PrimitiveKind::Str));
        assert_eq!(type_of("bytes"), PyType::Primitive(PrimitiveKind::Bytes));
        assert_eq!(type_of("bool"), PyType::Primitive(PrimitiveKind::Bool));
        assert_eq!(type_of("int"), PyType::Primitive(PrimitiveKind::Int));
        assert_eq!(type_of("float"), PyType::Primitive(PrimitiveKind::Float));
        assert_eq!(type_of("None"), PyType::Primitive(PrimitiveKind::None));
    }

    #[test]
    fn extracts_bare_containers() {
        assert_eq!(type_of("list"), PyType::Builtin(ContainerKind::List));
        assert_eq!(type_of("Dict"), PyType::Builtin(ContainerKind::Dict));
    }

    #[test]
    fn unknown_names_are_user_defined() {
        assert_eq!(
            type_of("Address"),
            PyType::UserDefined("Address".to_string())
        );
    }

    #[test]
    fn extracts_parameterized_containers() {
        assert_eq!(
            type_of("list[int]"),
            PyType::Generic {
                container: ContainerKind::List,
                args: vec![PyType::Primitive(PrimitiveKind::Int)],
            }
        );
        assert_eq!(
            type_of("dict[str, Address]"),
            PyType::Generic {
                container: ContainerKind::Dict,
                args: vec![
                    PyType::Primitive(PrimitiveKind::Str),
                    PyType::UserDefined("Address".to_string()),
                ],
            }
        );
    }

    #[test]
    fn extracts_tuples() {
        assert_eq!(
            type_of("tuple[int, str]"),
            PyType::Tuple(vec![
                PyType::Primitive(PrimitiveKind::Int),
                PyType::Primitive(PrimitiveKind::Str),
            ])
        );
    }

    #[test]
    fn optional_pipe_and_union_normalize_identically() {
        let expected = PyType::Union(vec![
            PyType::Primitive(PrimitiveKind::Str),
            PyType::Primitive(PrimitiveKind::None),
        ]);
        assert_eq!(type_of("Optional[str]"), expected);
        assert_eq!(type_of("str | None"), expected);
        assert_eq!(type_of("Union[str, None]"), expected);
    }

    #[test]
    fn chained_pipes_flatten_into_one_union() {
        assert_eq!(
            type_of("int | str | None"),
            PyType::Union(vec![
                PyType::Primitive(PrimitiveKind::Int),
                PyType::Primitive(PrimitiveKind::Str),
                PyType::Primitive(PrimitiveKind::None),
            ])
        );
    }

    #[test]
    fn single_literal_stays_a_literal() {
        assert_eq!(
            type_of("Literal[\"json\"]"),
            PyType::Literal("json".to_string())
        );
    }

    #[test]
    fn multi_value_literal_becomes_a_union_of_literals() {
        assert_eq!(
            type_of("Literal[\"json\", \"yaml\"]"),
            PyType::Union(vec![
                PyType::Literal("json".to_string()),
                PyType::Literal("yaml".to_string()),
            ])
        );
    }

    #[test]
    fn non_string_literal_values_are_fatal() {
        let err = extract_type(&parse_annotation("Literal[1]")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedLiteral(_)));
    }

    #[test]
    fn unrecognized_generics_are_fatal() {
        let err = extract_type(&parse_annotation("Mapping[str, int]")).unwrap_err();
        assert!(matches!(err, ExtractError::UnrecognizedGeneric(name) if name == "Mapping"));
    }

    #[test]
    fn non_pipe_operators_are_fatal() {
        let err = extract_type(&parse_annotation("int + str")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedUnionOperator(_)));
    }

    #[test]
    fn attribute_annotations_are_fatal() {
        let err = extract_type(&parse_annotation("typing.Optional")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedAnnotation(_)));
    }

    #[test]
    fn nested_generics_recurse() {
        assert_eq!(
            type_of("list[Address | None]"),
            PyType::Generic {
                container: ContainerKind::List,
                args: vec![PyType::Union(vec![
                    PyType::UserDefined("Address".to_string()),
                    PyType::Primitive(PrimitiveKind::None),
                ])],
            }
        );
    }

    #[test]
    fn extracts_supported_default_values() {
        let mut diags = Diagnostics::new();
        assert_eq!(
            extract_value(&parse_annotation("\"on\""), &mut diags),
            PyValue::Str("on".to_string())
        );
        assert_eq!(
            extract_value(&parse_annotation("None"), &mut diags),
            PyValue::None
        );
        assert_eq!(
            extract_value(&parse_annotation("{\"a\": 1}"), &mut diags),
            PyValue::Composite
        );
        assert_eq!(diags.warning_count(), 0);
    }

    #[test]
    fn unsupported_default_values_degrade_to_none_with_a_warning() {
        let mut diags = Diagnostics::new();
        assert_eq!(
            extract_value(&parse_annotation("[1, 2]"), &mut diags),
            PyValue::None
        );
        assert_eq!(
            extract_value(&parse_annotation("42"), &mut diags),
            PyValue::None
        );
        assert_eq!(diags.warning_count(), 2);
    }

    #[test]
    fn collects_user_defined_names_through_unions_and_generics() {
        let ty = type_of("dict[str, Address | Account]");
        let mut names = user_defined_types(&ty);
        names.sort();
        assert_eq!(names, vec!["Account", "Address"]);

        // Tuples are not traversed when computing dependencies.
        let tuple = type_of("tuple[Address, int]");
        assert_eq!(user_defined_types(&tuple), Vec::<String>::new());
    }
}
