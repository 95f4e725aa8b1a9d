use async_trait::async_trait;
use serde_json::Value;

use crate::application::repos::{RepoError, ResourceRepo};
use crate::domain::resources::Resource;

use super::{PostgresRepositories, map_sqlx_error};

// Table and column names come from the closed `Resource` catalogue, never from
// request input, so interpolating them is safe.

fn list_sql(resource: Resource) -> String {
    format!(
        "SELECT COALESCE(json_agg(t ORDER BY t.{pk}), '[]'::json) FROM {table} t",
        pk = resource.primary_key(),
        table = resource.table(),
    )
}

fn find_sql(resource: Resource) -> String {
    format!(
        "SELECT row_to_json(t) FROM {table} t WHERE t.{pk} = $1",
        pk = resource.primary_key(),
        table = resource.table(),
    )
}

const DONATION_BY_USER_SQL: &str =
    "SELECT row_to_json(t) FROM donation t WHERE t.user_id = $1 ORDER BY t.id LIMIT 1";

#[async_trait]
impl ResourceRepo for PostgresRepositories {
    async fn list(&self, resource: Resource) -> Result<Value, RepoError> {
        let sql = list_sql(resource);
        sqlx::query_scalar::<_, Value>(&sql)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find(&self, resource: Resource, id: i64) -> Result<Option<Value>, RepoError> {
        let sql = find_sql(resource);
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_donation_by_user(&self, user_id: i64) -> Result<Option<Value>, RepoError> {
        sqlx::query_scalar::<_, Value>(DONATION_BY_USER_SQL)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }
}
