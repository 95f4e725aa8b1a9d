use async_trait::async_trait;
use serde_json::Value;

use crate::application::repos::{RecordRepo, RepoError};
use crate::domain::records::RecordFields;
use crate::domain::resources::Resource;

use super::{PostgresRepositories, map_sqlx_error};

// Column lists come from `RecordFields`, which only admits catalogue columns.
// Values travel as one JSONB parameter and are typed by the table's row type.

fn column_list(fields: &RecordFields) -> String {
    fields.columns().collect::<Vec<_>>().join(", ")
}

fn insert_sql(fields: &RecordFields) -> String {
    let table = fields.resource().table();
    let columns = column_list(fields);
    let selected = fields
        .columns()
        .map(|column| format!("r.{column}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} AS t ({columns}) \
         SELECT {selected} FROM jsonb_populate_record(NULL::{table}, $1) r \
         RETURNING row_to_json(t)"
    )
}

fn update_sql(fields: &RecordFields) -> String {
    let resource = fields.resource();
    let table = resource.table();
    let columns = column_list(fields);
    let selected = fields
        .columns()
        .map(|column| format!("r.{column}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {table} AS t SET ({columns}) = \
         (SELECT {selected} FROM jsonb_populate_record(NULL::{table}, $1) r) \
         WHERE t.{pk} = $2 RETURNING row_to_json(t)",
        pk = resource.primary_key(),
    )
}

fn delete_sql(resource: Resource) -> String {
    format!(
        "DELETE FROM {table} WHERE {pk} = $1",
        table = resource.table(),
        pk = resource.primary_key(),
    )
}

#[async_trait]
impl RecordRepo for PostgresRepositories {
    async fn create(&self, fields: &RecordFields) -> Result<Value, RepoError> {
        let sql = insert_sql(fields);
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(fields.values().clone()))
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn update(&self, id: i64, fields: &RecordFields) -> Result<Option<Value>, RepoError> {
        let sql = update_sql(fields);
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(fields.values().clone()))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete(&self, resource: Resource, id: i64) -> Result<bool, RepoError> {
        let sql = delete_sql(resource);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
