use super::DocumentStore;
use crate::document::text_value;
use crate::error::JsonAdminResult;
use crate::model::{ModelMeta, Record};
use crate::path::JsonFieldPath;
use crate::query::{FieldRef, QuerySet};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeSet;

/// Store keeping records in memory and evaluating querysets directly
///
/// Primary keys are integers assigned on insert when a record has none.
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{FieldKind, InMemoryStore, ModelMeta, Record};
/// use serde_json::json;
///
/// let store = InMemoryStore::new(ModelMeta::new("people", "person").with_field("data", FieldKind::Json));
/// let saved = store.insert(Record::from_value(json!({"data": {"a": 1}})).unwrap());
/// assert_eq!(saved.get("id"), Some(&json!(1)));
/// assert_eq!(store.len(), 1);
/// ```
pub struct InMemoryStore {
	meta: ModelMeta,
	rows: RwLock<Vec<Record>>,
}

impl InMemoryStore {
	pub fn new(meta: ModelMeta) -> Self {
		Self {
			meta,
			rows: RwLock::new(Vec::new()),
		}
	}

	/// Create a store seeded with records
	pub fn with_records(meta: ModelMeta, records: impl IntoIterator<Item = Record>) -> Self {
		let store = Self::new(meta);
		for record in records {
			store.insert(record);
		}
		store
	}

	fn next_pk(rows: &[Record], pk_field: &str) -> i64 {
		rows.iter()
			.filter_map(|r| r.get(pk_field).and_then(Value::as_i64))
			.max()
			.unwrap_or(0) + 1
	}

	fn push(rows: &mut Vec<Record>, pk_field: &str, mut record: Record) -> Record {
		if record.get(pk_field).is_none_or(Value::is_null) {
			record.set(pk_field, Value::from(Self::next_pk(rows, pk_field)));
		}
		rows.push(record.clone());
		record
	}

	/// Add a record, assigning a primary key if it has none
	pub fn insert(&self, record: Record) -> Record {
		let mut rows = self.rows.write();
		Self::push(&mut rows, self.meta.pk_field(), record)
	}

	/// Insert or replace a record by primary key
	pub fn save(&self, record: Record) -> Record {
		let pk_field = self.meta.pk_field();
		let mut rows = self.rows.write();
		let pk = record.get(pk_field).filter(|v| !v.is_null());
		let existing = pk.and_then(|pk| rows.iter_mut().find(|r| r.get(pk_field) == Some(pk)));
		if let Some(existing) = existing {
			*existing = record.clone();
			return record;
		}
		Self::push(&mut rows, pk_field, record)
	}

	/// Look up a record by primary key
	pub fn get(&self, pk: &Value) -> Option<Record> {
		let pk_field = self.meta.pk_field();
		self.rows
			.read()
			.iter()
			.find(|r| r.get(pk_field) == Some(pk))
			.cloned()
	}

	pub fn len(&self) -> usize {
		self.rows.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.read().is_empty()
	}
}

#[async_trait]
impl DocumentStore for InMemoryStore {
	fn meta(&self) -> &ModelMeta {
		&self.meta
	}

	async fn distinct_values(&self, path: &JsonFieldPath) -> JsonAdminResult<Vec<String>> {
		let target = FieldRef::Json(path.clone());
		let values: BTreeSet<String> = self
			.rows
			.read()
			.iter()
			.filter_map(|record| target.value(record).and_then(text_value))
			.collect();
		Ok(values.into_iter().collect())
	}

	async fn fetch(&self, queryset: &QuerySet) -> JsonAdminResult<Vec<Record>> {
		let mut matched: Vec<Record> = self
			.rows
			.read()
			.iter()
			.filter(|record| queryset.matches(record))
			.cloned()
			.collect();

		let pk_field = self.meta.pk_field();
		matched.sort_by(|a, b| {
			queryset
				.ordering()
				.iter()
				.map(|ordering| ordering.compare(a, b, pk_field))
				.find(|o| o.is_ne())
				.unwrap_or(std::cmp::Ordering::Equal)
		});
		Ok(matched)
	}
}
