//! Lightweight structural model of one source file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::iter::Sum;
use std::ops::Add;

/// Inclusive 1-based line range of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn lines(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Enum,
    Record,
}

/// Branching constructs found in a method body.
///
/// Loops are kept apart per construct so a caller can see what drove the
/// score; boolean operators are deliberately absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPoints {
    pub ifs: u32,
    pub fors: u32,
    pub for_eaches: u32,
    pub whiles: u32,
    pub do_whiles: u32,
    pub case_labels: u32,
    pub catches: u32,
    pub ternaries: u32,
}

impl DecisionPoints {
    pub fn total(&self) -> u32 {
        self.ifs
            + self.fors
            + self.for_eaches
            + self.whiles
            + self.do_whiles
            + self.case_labels
            + self.catches
            + self.ternaries
    }

    /// McCabe complexity: one path plus one per decision point.
    pub fn cyclomatic_complexity(&self) -> u32 {
        1 + self.total()
    }
}

impl Add for DecisionPoints {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            ifs: self.ifs + rhs.ifs,
            fors: self.fors + rhs.fors,
            for_eaches: self.for_eaches + rhs.for_eaches,
            whiles: self.whiles + rhs.whiles,
            do_whiles: self.do_whiles + rhs.do_whiles,
            case_labels: self.case_labels + rhs.case_labels,
            catches: self.catches + rhs.catches,
            ternaries: self.ternaries + rhs.ternaries,
        }
    }
}

impl Sum for DecisionPoints {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub span: LineSpan,
    pub parameter_count: usize,
    pub is_constructor: bool,
    pub decisions: DecisionPoints,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Simple name for top-level types, `Outer.Inner` for nested ones
    pub name: String,
    pub kind: TypeKind,
    pub span: LineSpan,
    /// Field declarations directly in the body; `int a, b;` is one
    pub field_count: usize,
    /// Written superclass name with type arguments stripped
    pub superclass: Option<String>,
    /// Distinct type names referenced anywhere in the declaration
    pub referenced_types: BTreeSet<String>,
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    /// Last segment of the name, as other types would write it.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }
}

/// Everything the metrics need from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceModel {
    pub package: Option<String>,
    /// Non-interface types in declaration order, outer before inner
    pub types: Vec<TypeDecl>,
}

/// `a.b.C<T>` -> `C`
pub fn simple_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name).trim();
    base.rsplit('.').next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_span_counts_one() {
        assert_eq!(LineSpan { start: 7, end: 7 }.lines(), 1);
        assert_eq!(LineSpan { start: 3, end: 10 }.lines(), 8);
    }

    #[test]
    fn test_decision_points_sum() {
        let a = DecisionPoints {
            ifs: 2,
            catches: 1,
            ..Default::default()
        };
        let b = DecisionPoints {
            case_labels: 3,
            ternaries: 1,
            ..Default::default()
        };

        let total: DecisionPoints = [a, b].into_iter().sum();
        assert_eq!(total.total(), 7);
        assert_eq!(total.cyclomatic_complexity(), 8);
        assert_eq!(DecisionPoints::default().cyclomatic_complexity(), 1);
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("java.util.List<String>"), "List");
        assert_eq!(simple_name("Outer.Inner"), "Inner");
        assert_eq!(simple_name("Base"), "Base");
    }
}
