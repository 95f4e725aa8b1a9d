use async_trait::async_trait;
use sqlx::FromRow;

use crate::application::repos::{DonorStatsRepo, RepoError};
use crate::domain::leaderboard::DonorTotals;

use super::{PostgresRepositories, map_sqlx_error};

// Users without donations still appear, with zero totals. Ties keep whatever
// order the planner produces.
const DONOR_TOTALS_SQL: &str = r#"
    SELECT
        u.id::BIGINT AS user_id,
        u.name,
        u.email,
        COALESCE(SUM(d.amount), 0)::BIGINT AS total_donation,
        COUNT(d.id) AS total_transactions
    FROM users u
    LEFT JOIN donation d ON d.user_id = u.id
    GROUP BY u.id, u.name, u.email
    ORDER BY total_donation DESC
"#;

#[derive(Debug, FromRow)]
struct DonorTotalsRow {
    user_id: i64,
    name: Option<String>,
    email: Option<String>,
    total_donation: i64,
    total_transactions: i64,
}

impl From<DonorTotalsRow> for DonorTotals {
    fn from(row: DonorTotalsRow) -> Self {
        Self {
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            total_donation: row.total_donation,
            total_transactions: row.total_transactions,
        }
    }
}

#[async_trait]
impl DonorStatsRepo for PostgresRepositories {
    async fn donor_totals(&self) -> Result<Vec<DonorTotals>, RepoError> {
        let rows = sqlx::query_as::<_, DonorTotalsRow>(DONOR_TOTALS_SQL)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(DonorTotals::from).collect())
    }
}
