//! tree-sitter front end: Java source to [`SourceModel`].

use tree_sitter::{Node, Parser, Tree};

use super::complexity::{decision_points, Descendants};
use super::coupling::referenced_types;
use super::model::{simple_name, LineSpan, MethodDecl, SourceModel, TypeDecl, TypeKind};
use super::{AnalysisError, AnalysisResult};

/// Parse `source`, refusing trees that contain syntax errors.
pub fn parse_tree(source: &str) -> AnalysisResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(tree_sitter_java::language())
        .map_err(|e| AnalysisError::Grammar(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(AnalysisError::Aborted)?;

    let root = tree.root_node();
    if root.has_error() {
        let line = Descendants::new(root)
            .find(|n| n.is_error() || n.is_missing())
            .map(|n| n.start_position().row + 1)
            .unwrap_or(1);
        return Err(AnalysisError::Syntax { line });
    }

    Ok(tree)
}

/// Parse `source` and build its structural model.
pub fn parse_source(source: &str) -> AnalysisResult<SourceModel> {
    let tree = parse_tree(source)?;
    Ok(build_model(tree.root_node(), source.as_bytes()))
}

fn span_of(node: Node<'_>) -> LineSpan {
    LineSpan {
        start: node.start_position().row + 1,
        end: node.end_position().row + 1,
    }
}

fn text_of(node: Node<'_>, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or_default().to_string()
}

fn type_kind(kind: &str) -> Option<TypeKind> {
    match kind {
        "class_declaration" => Some(TypeKind::Class),
        "enum_declaration" => Some(TypeKind::Enum),
        "record_declaration" => Some(TypeKind::Record),
        _ => None,
    }
}

fn is_skipped_type(kind: &str) -> bool {
    matches!(kind, "interface_declaration" | "annotation_type_declaration")
}

pub(crate) fn build_model(root: Node<'_>, source: &[u8]) -> SourceModel {
    let package = {
        let mut cursor = root.walk();
        let found = root
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_declaration");
        found.and_then(|decl| package_name(decl, source))
    };

    let mut types = Vec::new();
    collect_types(root, None, source, &mut types);

    SourceModel { package, types }
}

fn package_name(decl: Node<'_>, source: &[u8]) -> Option<String> {
    let mut cursor = decl.walk();
    let name = decl
        .named_children(&mut cursor)
        .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"));
    name.map(|n| text_of(n, source))
}

/// Walk `node`'s children looking for type declarations, naming nested ones
/// after their enclosing type. Interfaces are skipped but their members are
/// still searched for classes.
fn collect_types(node: Node<'_>, enclosing: Option<&str>, source: &[u8], out: &mut Vec<TypeDecl>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        let kind = child.kind();
        let analyzed = type_kind(kind);

        if analyzed.is_none() && !is_skipped_type(kind) {
            collect_types(child, enclosing, source, out);
            continue;
        }

        let own = child
            .child_by_field_name("name")
            .map(|n| text_of(n, source))
            .unwrap_or_default();
        let qualified = match enclosing {
            Some(outer) => format!("{}.{}", outer, own),
            None => own,
        };

        if let Some(type_kind) = analyzed {
            out.push(build_type(child, qualified.clone(), type_kind, source));
        }
        collect_types(child, Some(&qualified), source, out);
    }
}

/// Direct members of a type body. Enum members sit one level down, inside
/// `enum_body_declarations`.
fn members<'tree>(declaration: Node<'tree>) -> Vec<Node<'tree>> {
    let Some(body) = declaration.child_by_field_name("body") else {
        return Vec::new();
    };

    let mut cursor = body.walk();
    let mut members = Vec::new();
    for child in body.named_children(&mut cursor) {
        if child.kind() == "enum_body_declarations" {
            let mut inner = child.walk();
            members.extend(child.named_children(&mut inner));
        } else {
            members.push(child);
        }
    }
    members
}

fn build_type(declaration: Node<'_>, name: String, kind: TypeKind, source: &[u8]) -> TypeDecl {
    let members = members(declaration);

    let field_count = members
        .iter()
        .filter(|m| m.kind() == "field_declaration")
        .count();

    let methods = members
        .iter()
        .filter_map(|m| build_method(*m, source))
        .collect();

    let superclass = declaration
        .child_by_field_name("superclass")
        .and_then(|s| s.named_child(0))
        .map(|t| simple_name(&text_of(t, source)).to_string());

    let mut referenced_types = referenced_types(declaration, source);
    let own_simple = simple_name(&name).to_string();
    referenced_types.remove(&own_simple);

    TypeDecl {
        name,
        kind,
        span: span_of(declaration),
        field_count,
        superclass,
        referenced_types,
        methods,
    }
}

fn build_method(member: Node<'_>, source: &[u8]) -> Option<MethodDecl> {
    let is_constructor = match member.kind() {
        "method_declaration" => false,
        "constructor_declaration" | "compact_constructor_declaration" => true,
        _ => return None,
    };

    let parameter_count = member
        .child_by_field_name("parameters")
        .map(|params| {
            let mut cursor = params.walk();
            let count = params
                .named_children(&mut cursor)
                .filter(|p| matches!(p.kind(), "formal_parameter" | "spread_parameter"))
                .count();
            count
        })
        .unwrap_or(0);

    Some(MethodDecl {
        name: member
            .child_by_field_name("name")
            .map(|n| text_of(n, source))
            .unwrap_or_default(),
        span: span_of(member),
        parameter_count,
        is_constructor,
        decisions: decision_points(member),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_package_and_single_class() {
        let model = parse_source(
            "package com.acme.orders;\n\nclass A {\n  int x;\n  void m() { if (x > 0) {} }\n}\n",
        )
        .unwrap();

        assert_eq!(model.package.as_deref(), Some("com.acme.orders"));
        assert_eq!(model.types.len(), 1);

        let a = &model.types[0];
        assert_eq!(a.name, "A");
        assert_eq!(a.kind, TypeKind::Class);
        assert_eq!(a.span, LineSpan { start: 3, end: 6 });
        assert_eq!(a.field_count, 1);
        assert_eq!(a.methods.len(), 1);
        assert_eq!(a.methods[0].decisions.cyclomatic_complexity(), 2);
        assert_eq!(a.methods[0].span.lines(), 1);
    }

    #[test]
    fn test_interfaces_are_skipped() {
        let model = parse_source("interface Shape { double area(); }").unwrap();
        assert!(model.types.is_empty());
    }

    #[test]
    fn test_class_nested_in_interface_is_kept() {
        let model = parse_source("interface Shape { class Unit { int side; } }").unwrap();
        assert_eq!(model.types.len(), 1);
        assert_eq!(model.types[0].name, "Shape.Unit");
        assert_eq!(model.types[0].field_count, 1);
    }

    #[test]
    fn test_nested_fields_and_methods_stay_with_their_type() {
        let model = parse_source(
            r#"
            class Outer {
                int a, b;
                String c;
                void run() {}
                static class Inner {
                    int d;
                    int e;
                    int f;
                    Inner() {}
                    void go(int x, String... rest) {}
                }
            }
            "#,
        )
        .unwrap();

        let names: Vec<_> = model.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Outer.Inner"]);

        let outer = &model.types[0];
        assert_eq!(outer.field_count, 2);
        assert_eq!(outer.methods.len(), 1);

        let inner = &model.types[1];
        assert_eq!(inner.field_count, 3);
        assert_eq!(inner.methods.len(), 2);
        assert!(inner.methods[0].is_constructor);
        assert_eq!(inner.methods[1].parameter_count, 2);
    }

    #[test]
    fn test_enum_members_are_counted() {
        let model = parse_source(
            r#"
            enum Level {
                LOW, HIGH;
                private int weight;
                int weight() { return weight; }
            }
            "#,
        )
        .unwrap();

        let level = &model.types[0];
        assert_eq!(level.kind, TypeKind::Enum);
        assert_eq!(level.field_count, 1);
        assert_eq!(level.methods.len(), 1);
    }

    #[test]
    fn test_superclass_and_coupling() {
        let model = parse_source(
            "class Repo extends java.util.AbstractList<Item> implements Store { Repo self; Item head; }",
        )
        .unwrap();

        let repo = &model.types[0];
        assert_eq!(repo.superclass.as_deref(), Some("AbstractList"));
        assert!(!repo.referenced_types.contains("Repo"));
        assert!(repo.referenced_types.contains("Item"));
        assert!(repo.referenced_types.contains("Store"));
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = parse_source("class A {\n  void m( {\n}\n").unwrap_err();
        assert!(matches!(err, AnalysisError::Syntax { .. }));
    }
}
