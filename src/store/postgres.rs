use super::DocumentStore;
use crate::error::{JsonAdminError, JsonAdminResult};
use crate::model::{ModelMeta, Record};
use crate::path::JsonFieldPath;
use crate::query::QuerySet;
use crate::sql::{distinct_values_statement, select_rows_statement, to_postgres};
use async_trait::async_trait;
use sqlx::PgPool;

/// Store backed by a PostgreSQL table with JSONB document columns
pub struct PgDocumentStore {
	meta: ModelMeta,
	pool: PgPool,
}

impl PgDocumentStore {
	pub fn new(meta: ModelMeta, pool: PgPool) -> Self {
		Self { meta, pool }
	}

	pub fn pool(&self) -> &PgPool {
		&self.pool
	}
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
	fn meta(&self) -> &ModelMeta {
		&self.meta
	}

	async fn distinct_values(&self, path: &JsonFieldPath) -> JsonAdminResult<Vec<String>> {
		let sql = to_postgres(&distinct_values_statement(&self.meta, path)?);
		tracing::debug!(%sql, "listing distinct JSON values");
		sqlx::query_scalar::<_, String>(&sql)
			.fetch_all(&self.pool)
			.await
			.map_err(|e| JsonAdminError::Database(e.to_string()))
	}

	async fn fetch(&self, queryset: &QuerySet) -> JsonAdminResult<Vec<Record>> {
		let sql = to_postgres(&select_rows_statement(&self.meta, queryset)?);
		tracing::debug!(%sql, "fetching records");
		let rows = sqlx::query_scalar::<_, serde_json::Value>(&sql)
			.fetch_all(&self.pool)
			.await
			.map_err(|e| JsonAdminError::Database(e.to_string()))?;
		rows.into_iter().map(Record::from_value).collect()
	}
}
