//! Repository for the `workflows` table.

use gaestefotos_core::types::DbId;
use sqlx::PgPool;

use crate::models::workflow::{CreateWorkflow, UpdateWorkflow, Workflow};

const COLUMNS: &str = "id, name, flow_type, description, nodes, edges, is_default, is_active, \
                        created_at, updated_at";

pub struct WorkflowRepo;

impl WorkflowRepo {
    /// Insert a workflow. `flow_type` must be the canonical upper-case name.
    pub async fn create(
        pool: &PgPool,
        flow_type: &str,
        input: &CreateWorkflow,
    ) -> Result<Workflow, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflows (name, flow_type, description, nodes, edges, is_active)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(&input.name)
            .bind(flow_type)
            .bind(&input.description)
            .bind(&input.nodes)
            .bind(&input.edges)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflows WHERE id = $1");
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The active default workflow of a type.
    pub async fn find_default(
        pool: &PgPool,
        flow_type: &str,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflows
             WHERE flow_type = $1 AND is_default = true AND is_active = true"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(flow_type)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        flow_type: Option<&str>,
    ) -> Result<Vec<Workflow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflows
             WHERE ($1::TEXT IS NULL OR flow_type = $1)
             ORDER BY flow_type ASC, is_default DESC, name ASC"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(flow_type)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorkflow,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!(
            "UPDATE workflows SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                nodes = COALESCE($4, nodes),
                edges = COALESCE($5, edges),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.nodes)
            .bind(&input.edges)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Make a workflow the default of its type, clearing the previous
    /// default in the same transaction.
    pub async fn set_default(pool: &PgPool, id: DbId) -> Result<Option<Workflow>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let flow_type: Option<String> =
            sqlx::query_scalar("SELECT flow_type FROM workflows WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(flow_type) = flow_type else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE workflows SET is_default = false
             WHERE flow_type = $1 AND is_default = true AND id <> $2",
        )
        .bind(&flow_type)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE workflows SET is_default = true, is_active = true
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let workflow = sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(workflow))
    }
}
