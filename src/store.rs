//! Record collections the admin components read from
//!
//! A [`DocumentStore`] is the host ORM seen through the two operations the
//! JSON field helpers need: enumerating distinct values at a path and
//! fetching the records a [`QuerySet`] describes.

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgDocumentStore;

use crate::error::JsonAdminResult;
use crate::model::{ModelMeta, Record};
use crate::path::JsonFieldPath;
use crate::query::QuerySet;
use async_trait::async_trait;

/// Access to the records of one model
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Options of the model this store holds
	fn meta(&self) -> &ModelMeta;

	/// Distinct non-null text values at `path` across every record, sorted ascending
	///
	/// Sorting compares bytes (`COLLATE "C"` in PostgreSQL), so `"B"` comes
	/// before `"a"` on every backend.
	async fn distinct_values(&self, path: &JsonFieldPath) -> JsonAdminResult<Vec<String>>;

	/// Records matching the queryset, in its ordering
	async fn fetch(&self, queryset: &QuerySet) -> JsonAdminResult<Vec<Record>>;

	/// Number of records matching the queryset
	async fn count(&self, queryset: &QuerySet) -> JsonAdminResult<usize> {
		Ok(self.fetch(queryset).await?.len())
	}
}
