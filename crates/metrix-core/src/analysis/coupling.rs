//! Referenced-type collection for coupling between objects.
//!
//! Names are taken as written; nothing is resolved against imports or a
//! classpath. `java.util.List` and `List` are therefore two names.

use std::collections::BTreeSet;
use tree_sitter::Node;

use super::complexity::Descendants;

/// Inferred local types carry no name to couple to
const IGNORED: &[&str] = &["var"];

fn is_counted(node: Node<'_>) -> bool {
    let parent_kind = node.parent().map(|p| p.kind());
    match node.kind() {
        // Type parameters declare names, they do not reference them, and the
        // segments of a qualified name belong to the outermost qualified node
        "type_identifier" => !matches!(
            parent_kind,
            Some("type_parameter") | Some("scoped_type_identifier")
        ),
        "scoped_type_identifier" => parent_kind != Some("scoped_type_identifier"),
        _ => false,
    }
}

/// Distinct type names referenced anywhere under `declaration`.
pub fn referenced_types(declaration: Node<'_>, source: &[u8]) -> BTreeSet<String> {
    Descendants::new(declaration)
        .filter(|node| is_counted(*node))
        .filter_map(|node| node.utf8_text(source).ok())
        .map(|text| text.split_whitespace().collect::<String>())
        .filter(|name| !IGNORED.contains(&name.as_str()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::parser::parse_tree;

    fn types_of(source: &str) -> Vec<String> {
        let tree = parse_tree(source).unwrap();
        let class = tree.root_node().named_child(0).unwrap();
        referenced_types(class, source.as_bytes()).into_iter().collect()
    }

    #[test]
    fn test_collects_fields_parameters_locals_and_generics() {
        let names = types_of(
            r#"
            class Order extends Base {
                private Customer customer;
                private java.util.Map<String, LineItem> items;
                Money total(Discount d) {
                    Money sum = new Money();
                    var n = 0;
                    return sum;
                }
            }
            "#,
        );
        assert_eq!(
            names,
            vec!["Base", "Customer", "Discount", "LineItem", "Money", "String", "java.util.Map"]
        );
    }

    #[test]
    fn test_type_parameters_are_not_references() {
        let names = types_of("class Box<T extends Comparable<T>> { T value; }");
        assert_eq!(names, vec!["Comparable", "T"]);
    }

    #[test]
    fn test_primitive_only_class_has_no_coupling() {
        assert!(types_of("class P { int a; double b; void m(long c) { boolean d = true; } }").is_empty());
    }
}
