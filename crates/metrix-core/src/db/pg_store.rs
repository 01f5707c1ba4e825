//! Postgres implementation of the persistence boundary.

use async_trait::async_trait;
use metrix_common::types::{ArtifactKind, ProjectStatus};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    Artifact, ArtifactCounts, ArtifactMetrics, ClassMetrics, MethodMetrics, NewProject, Project,
};
use crate::store::{check_chunk_ownership, ArtifactStore, ProjectStore, StoreError, StoreResult};

const PROJECT_COLUMNS: &str =
    "id, name, description, owner_id, status_analysis, created_at, updated_at";

const ARTIFACT_COLUMNS: &str = "id, project_id, kind, name, lines_of_code, package, source_path, \
     number_attributes, number_methods, dit, cbo, noc, class_id, class_name, parameter_count, \
     cyclomatic_complexity";

/// Postgres has a 65535 bind-parameter ceiling per statement
const ARTIFACT_BINDS: usize = 16;
const MAX_ROWS_PER_STATEMENT: usize = u16::MAX as usize / ARTIFACT_BINDS;

#[derive(Debug, Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

fn project_from_row(row: &PgRow) -> StoreResult<Project> {
    let status: String = row.try_get("status_analysis")?;
    Ok(Project {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        owner_id: row.try_get("owner_id")?,
        status: status.parse()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn artifact_from_row(row: &PgRow) -> StoreResult<Artifact> {
    let kind: String = row.try_get("kind")?;
    let metrics = match kind.parse::<ArtifactKind>()? {
        ArtifactKind::Class => ArtifactMetrics::Class(ClassMetrics {
            package: row.try_get("package")?,
            source_path: row.try_get("source_path")?,
            number_attributes: row.try_get("number_attributes")?,
            number_methods: row.try_get("number_methods")?,
            dit: row.try_get("dit")?,
            cbo: row.try_get("cbo")?,
            noc: row.try_get("noc")?,
        }),
        ArtifactKind::Method => ArtifactMetrics::Method(MethodMetrics {
            class_id: row.try_get("class_id")?,
            class_name: row.try_get("class_name")?,
            parameter_count: row.try_get("parameter_count")?,
            cyclomatic_complexity: row.try_get("cyclomatic_complexity")?,
        }),
    };

    Ok(Artifact {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        name: row.try_get("name")?,
        lines_of_code: row.try_get("lines_of_code")?,
        metrics,
    })
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn create_project(&self, new: NewProject) -> StoreResult<Project> {
        let project = new.into_project();

        sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, owner_id, status_analysis, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.owner_id)
        .bind(project.status.as_str())
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.db)
        .await?;

        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Project> {
        let row = sqlx::query(&format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| StoreError::project_not_found(id))?;

        project_from_row(&row)
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM projects ORDER BY created_at, id",
            PROJECT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(project_from_row).collect()
    }

    async fn transition_status(
        &self,
        id: Uuid,
        expected: &[ProjectStatus],
        next: ProjectStatus,
    ) -> StoreResult<bool> {
        let expected: Vec<&str> = expected.iter().map(|s| s.as_str()).collect();

        let result = sqlx::query(
            r#"
            UPDATE projects
            SET status_analysis = $2, updated_at = NOW()
            WHERE id = $1 AND status_analysis = ANY($3)
            "#,
        )
        .bind(id)
        .bind(next.as_str())
        .bind(&expected)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        // Tell a lost race apart from a missing project
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;

        if exists {
            Ok(false)
        } else {
            Err(StoreError::project_not_found(id))
        }
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::project_not_found(id));
        }

        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for PgStore {
    async fn insert_chunk(&self, project_id: Uuid, chunk: &[Artifact]) -> StoreResult<usize> {
        if chunk.is_empty() {
            return Ok(0);
        }

        // Cross-chunk class references are enforced by the composite foreign key
        check_chunk_ownership(project_id, chunk, |_| true)?;

        let mut tx = self.db.begin().await?;

        for rows in chunk.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut query_builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO artifacts ({}) ", ARTIFACT_COLUMNS));

            query_builder.push_values(rows, |mut b, artifact| {
                b.push_bind(artifact.id)
                    .push_bind(artifact.project_id)
                    .push_bind(artifact.kind().as_str())
                    .push_bind(&artifact.name)
                    .push_bind(artifact.lines_of_code);

                match &artifact.metrics {
                    ArtifactMetrics::Class(class) => {
                        b.push_bind(&class.package)
                            .push_bind(Some(&class.source_path))
                            .push_bind(Some(class.number_attributes))
                            .push_bind(Some(class.number_methods))
                            .push_bind(Some(class.dit))
                            .push_bind(Some(class.cbo))
                            .push_bind(Some(class.noc))
                            .push_bind(None::<Uuid>)
                            .push_bind(None::<String>)
                            .push_bind(None::<i32>)
                            .push_bind(None::<i32>);
                    },
                    ArtifactMetrics::Method(method) => {
                        b.push_bind(None::<String>)
                            .push_bind(None::<String>)
                            .push_bind(None::<i32>)
                            .push_bind(None::<i32>)
                            .push_bind(None::<i32>)
                            .push_bind(None::<i32>)
                            .push_bind(None::<i32>)
                            .push_bind(Some(method.class_id))
                            .push_bind(Some(&method.class_name))
                            .push_bind(Some(method.parameter_count))
                            .push_bind(Some(method.cyclomatic_complexity));
                    },
                }
            });

            query_builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        debug!(project_id = %project_id, rows = chunk.len(), "Committed artifact chunk");
        Ok(chunk.len())
    }

    async fn delete_project_artifacts(&self, project_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM artifacts WHERE project_id = $1")
            .bind(project_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_artifacts(&self, project_id: Uuid) -> StoreResult<Vec<Artifact>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM artifacts WHERE project_id = $1 ORDER BY seq",
            ARTIFACT_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(artifact_from_row).collect()
    }

    async fn count_artifacts(&self, project_id: Uuid) -> StoreResult<ArtifactCounts> {
        let rows = sqlx::query(
            "SELECT kind, COUNT(*) AS n FROM artifacts WHERE project_id = $1 GROUP BY kind",
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        let mut counts = ArtifactCounts::default();
        for row in rows {
            let kind: String = row.try_get("kind")?;
            let n: i64 = row.try_get("n")?;
            match kind.parse::<ArtifactKind>()? {
                ArtifactKind::Class => counts.classes = n as u64,
                ArtifactKind::Method => counts.methods = n as u64,
            }
        }

        Ok(counts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn class_row(project_id: Uuid) -> Artifact {
        Artifact {
            id: Uuid::new_v4(),
            project_id,
            name: "com.acme.Order".to_string(),
            lines_of_code: 12,
            metrics: ArtifactMetrics::Class(ClassMetrics {
                package: Some("com.acme".to_string()),
                source_path: "com/acme/Order.java".to_string(),
                number_attributes: 2,
                number_methods: 1,
                dit: 1,
                cbo: 3,
                noc: 0,
            }),
        }
    }

    fn method_row(project_id: Uuid, class_id: Uuid) -> Artifact {
        Artifact {
            id: Uuid::new_v4(),
            project_id,
            name: "total".to_string(),
            lines_of_code: 4,
            metrics: ArtifactMetrics::Method(MethodMetrics {
                class_id,
                class_name: "Order".to_string(),
                parameter_count: 1,
                cyclomatic_complexity: 2,
            }),
        }
    }

    #[test]
    fn test_statement_row_limit_fits_bind_ceiling() {
        assert!(MAX_ROWS_PER_STATEMENT * ARTIFACT_BINDS <= u16::MAX as usize);
        assert_eq!(ARTIFACT_COLUMNS.split(',').count(), ARTIFACT_BINDS);
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_chunk_round_trip(pool: PgPool) -> sqlx::Result<()> {
        let store = PgStore::new(pool);
        let project = store.create_project(NewProject::new("orders")).await.unwrap();

        let class = class_row(project.id);
        let method = method_row(project.id, class.id);
        store.insert_chunk(project.id, &[class.clone()]).await.unwrap();
        store.insert_chunk(project.id, &[method.clone()]).await.unwrap();

        let rows = store.list_artifacts(project.id).await.unwrap();
        assert_eq!(rows, vec![class, method]);

        let counts = store.count_artifacts(project.id).await.unwrap();
        assert_eq!(counts, ArtifactCounts { classes: 1, methods: 1 });
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_failed_chunk_leaves_no_rows(pool: PgPool) -> sqlx::Result<()> {
        let store = PgStore::new(pool);
        let project = store.create_project(NewProject::new("orders")).await.unwrap();

        // The dangling class reference trips the foreign key mid-statement
        let chunk = vec![class_row(project.id), method_row(project.id, Uuid::new_v4())];
        assert!(store.insert_chunk(project.id, &chunk).await.is_err());
        assert_eq!(store.count_artifacts(project.id).await.unwrap().total(), 0);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_status_compare_and_swap(pool: PgPool) -> sqlx::Result<()> {
        let store = PgStore::new(pool);
        let id = store.create_project(NewProject::new("orders")).await.unwrap().id;

        let start = [ProjectStatus::Added, ProjectStatus::Finished, ProjectStatus::Error];
        assert!(store.transition_status(id, &start, ProjectStatus::ProcessingFiles).await.unwrap());
        assert!(!store.transition_status(id, &start, ProjectStatus::ProcessingFiles).await.unwrap());

        let missing = store
            .transition_status(Uuid::new_v4(), &start, ProjectStatus::ProcessingFiles)
            .await;
        assert!(missing.unwrap_err().is_not_found());
        Ok(())
    }
}
