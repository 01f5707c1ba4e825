//! Metric records derived from a [`SourceModel`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hierarchy::TypeGraph;
use super::model::SourceModel;
use crate::models::{Artifact, ArtifactMetrics, ClassMetrics, MethodMetrics};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodReport {
    pub name: String,
    pub lines_of_code: u32,
    pub parameter_count: u32,
    pub cyclomatic_complexity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub name: String,
    pub lines_of_code: u32,
    pub number_attributes: u32,
    pub number_methods: u32,
    pub dit: u32,
    pub cbo: u32,
    pub noc: u32,
    pub methods: Vec<MethodReport>,
}

/// All metrics for one file, classes in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetrics {
    /// Path relative to the extraction root
    pub path: String,
    pub package: Option<String>,
    pub classes: Vec<ClassReport>,
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn to_i32(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl FileMetrics {
    /// Derive metrics; NOC comes from `graph` when one is supplied, else 0.
    pub fn from_model(path: impl Into<String>, model: SourceModel, graph: Option<&TypeGraph>) -> Self {
        let classes = model
            .types
            .into_iter()
            .map(|decl| {
                let noc = graph.map(|g| g.children_of(decl.simple_name())).unwrap_or(0);
                ClassReport {
                    lines_of_code: to_u32(decl.span.lines()),
                    number_attributes: to_u32(decl.field_count),
                    number_methods: to_u32(decl.methods.len()),
                    dit: u32::from(decl.superclass.is_some()),
                    cbo: to_u32(decl.referenced_types.len()),
                    noc,
                    methods: decl
                        .methods
                        .into_iter()
                        .map(|m| MethodReport {
                            lines_of_code: to_u32(m.span.lines()),
                            parameter_count: to_u32(m.parameter_count),
                            cyclomatic_complexity: m.decisions.cyclomatic_complexity(),
                            name: m.name,
                        })
                        .collect(),
                    name: decl.name,
                }
            })
            .collect();

        Self {
            path: path.into(),
            package: model.package,
            classes,
        }
    }

    pub fn artifact_count(&self) -> usize {
        self.classes.iter().map(|c| 1 + c.methods.len()).sum()
    }

    /// Flatten into persistable records: each class immediately followed by
    /// its methods, which reference it by id.
    pub fn into_artifacts(self, project_id: Uuid) -> Vec<Artifact> {
        let mut artifacts = Vec::with_capacity(self.artifact_count());

        for class in self.classes {
            let class_id = Uuid::new_v4();
            artifacts.push(Artifact {
                id: class_id,
                project_id,
                name: class.name.clone(),
                lines_of_code: to_i32(class.lines_of_code),
                metrics: ArtifactMetrics::Class(ClassMetrics {
                    package: self.package.clone(),
                    source_path: self.path.clone(),
                    number_attributes: to_i32(class.number_attributes),
                    number_methods: to_i32(class.number_methods),
                    dit: to_i32(class.dit),
                    cbo: to_i32(class.cbo),
                    noc: to_i32(class.noc),
                }),
            });

            for method in class.methods {
                artifacts.push(Artifact {
                    id: Uuid::new_v4(),
                    project_id,
                    name: method.name,
                    lines_of_code: to_i32(method.lines_of_code),
                    metrics: ArtifactMetrics::Method(MethodMetrics {
                        class_id,
                        class_name: class.name.clone(),
                        parameter_count: to_i32(method.parameter_count),
                        cyclomatic_complexity: to_i32(method.cyclomatic_complexity),
                    }),
                });
            }
        }

        artifacts
    }
}
