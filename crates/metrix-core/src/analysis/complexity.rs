//! Decision-point counting over a syntax subtree.

use tree_sitter::{Node, TreeCursor};

use super::model::DecisionPoints;

/// Pre-order walk of a subtree, driven by a cursor rather than recursion so
/// deeply nested expressions cannot exhaust the stack.
pub struct Descendants<'tree> {
    cursor: TreeCursor<'tree>,
    done: bool,
}

impl<'tree> Descendants<'tree> {
    pub fn new(root: Node<'tree>) -> Self {
        Self {
            cursor: root.walk(),
            done: false,
        }
    }
}

impl<'tree> Iterator for Descendants<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Node<'tree>> {
        if self.done {
            return None;
        }

        let node = self.cursor.node();

        if self.cursor.goto_first_child() || self.cursor.goto_next_sibling() {
            return Some(node);
        }

        // Climb until an ancestor has a following sibling; the cursor refuses
        // to leave the subtree it was created on.
        loop {
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }
        }
    }
}

/// Contribution of a single node kind.
fn decision_of(kind: &str) -> DecisionPoints {
    let mut points = DecisionPoints::default();
    match kind {
        "if_statement" => points.ifs = 1,
        "for_statement" => points.fors = 1,
        "enhanced_for_statement" => points.for_eaches = 1,
        "while_statement" => points.whiles = 1,
        "do_statement" => points.do_whiles = 1,
        // `case X:`, `case X ->` and `default` all surface as a label
        "switch_label" => points.case_labels = 1,
        "catch_clause" => points.catches = 1,
        "ternary_expression" => points.ternaries = 1,
        _ => {},
    }
    points
}

/// Fold every decision point in `node`'s subtree, `node` included.
pub fn decision_points(node: Node<'_>) -> DecisionPoints {
    Descendants::new(node).map(|n| decision_of(n.kind())).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::parser::parse_tree;

    fn method_points(body: &str) -> DecisionPoints {
        let source = format!("class T {{ void m(int x, java.util.List<String> xs) {{ {} }} }}", body);
        let tree = parse_tree(&source).unwrap();
        let method = Descendants::new(tree.root_node())
            .find(|n| n.kind() == "method_declaration")
            .unwrap();
        decision_points(method)
    }

    #[test]
    fn test_descendants_visits_whole_subtree_once() {
        let tree = parse_tree("class A { int x; void m() {} } class B {}").unwrap();
        let root = tree.root_node();
        let classes = Descendants::new(root)
            .filter(|n| n.kind() == "class_declaration")
            .count();
        assert_eq!(classes, 2);

        let first = root.named_child(0).unwrap();
        let inside_first = Descendants::new(first)
            .filter(|n| n.kind() == "class_declaration")
            .count();
        assert_eq!(inside_first, 1, "walk must not leak into sibling declarations");
    }

    #[test]
    fn test_straight_line_code_scores_one() {
        let points = method_points("int y = x + 1; y++; System.out.println(y);");
        assert_eq!(points.cyclomatic_complexity(), 1);
    }

    #[test]
    fn test_each_construct_counts_once() {
        let points = method_points(
            r#"
            if (x > 0) { x--; } else if (x < 0) { x++; }
            for (int i = 0; i < x; i++) {}
            for (String s : xs) {}
            while (x > 10) { x--; }
            do { x++; } while (x < 3);
            int y = x > 1 ? 1 : 0;
            try { x = 1; } catch (IllegalStateException e) {} catch (RuntimeException e) {}
            switch (x) { case 1: break; case 2: break; default: break; }
            "#,
        );

        assert_eq!(points.ifs, 2);
        assert_eq!(points.fors, 1);
        assert_eq!(points.for_eaches, 1);
        assert_eq!(points.whiles, 1);
        assert_eq!(points.do_whiles, 1);
        assert_eq!(points.ternaries, 1);
        assert_eq!(points.catches, 2);
        assert_eq!(points.case_labels, 3);
        // n = 7 statements/ternaries, m = 2 catches, k = 3 labels
        assert_eq!(points.cyclomatic_complexity(), 1 + 7 + 2 + 3);
    }

    #[test]
    fn test_boolean_operators_do_not_count() {
        let points = method_points("if (x > 0 && x < 10 || x == 42) { x = 0; }");
        assert_eq!(points.cyclomatic_complexity(), 2);
    }

    #[test]
    fn test_arrow_switch_labels_count() {
        let points = method_points(
            "switch (x) { case 1 -> x = 2; case 2 -> x = 3; default -> x = 0; }",
        );
        assert_eq!(points.case_labels, 3);
        assert_eq!(points.cyclomatic_complexity(), 4);
    }

    #[test]
    fn test_lambda_bodies_are_part_of_the_method() {
        let points = method_points("xs.forEach(s -> { if (s.isEmpty()) { return; } });");
        assert_eq!(points.ifs, 1);
    }
}
