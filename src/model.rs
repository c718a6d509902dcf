//! Model metadata and dynamic records
//!
//! The admin operates on dynamic rows (`serde_json::Value` maps) rather than
//! statically-typed models, so field resolution goes through [`ModelMeta`].

use crate::error::{JsonAdminError, JsonAdminResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Alias resolving to the primary key column
pub const PK_ALIAS: &str = "pk";

/// Storage kind of a model field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
	/// Auto-incrementing or integer primary key / column
	Integer,
	/// Character or text column
	Text,
	/// Boolean column
	Boolean,
	/// JSON document column
	Json,
}

/// A single model field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
	pub name: String,
	pub kind: FieldKind,
}

impl FieldMeta {
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
		}
	}

	pub fn is_json(&self) -> bool {
		self.kind == FieldKind::Json
	}
}

/// Model options used by the admin helpers
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{FieldKind, ModelMeta};
///
/// let meta = ModelMeta::new("people", "person")
///     .with_field("name", FieldKind::Text)
///     .with_field("data", FieldKind::Json);
///
/// assert_eq!(meta.table_name(), "people_person");
/// assert!(meta.get_field("data").unwrap().is_json());
/// assert!(meta.get_field("pk").is_none());
/// assert_eq!(meta.resolve_column("pk"), Some("id"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
	app_label: String,
	model_name: String,
	table_name: Option<String>,
	pk_field: String,
	fields: Vec<FieldMeta>,
}

impl ModelMeta {
	/// Create model options with an integer `id` primary key
	pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
		Self {
			app_label: app_label.into(),
			model_name: model_name.into().to_lowercase(),
			table_name: None,
			pk_field: "id".into(),
			fields: vec![FieldMeta::new("id", FieldKind::Integer)],
		}
	}

	pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
		let field = FieldMeta::new(name, kind);
		self.fields.retain(|f| f.name != field.name);
		self.fields.push(field);
		self
	}

	pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
		self.table_name = Some(table_name.into());
		self
	}

	pub fn with_pk_field(mut self, name: impl Into<String>) -> Self {
		self.pk_field = name.into();
		self
	}

	pub fn app_label(&self) -> &str {
		&self.app_label
	}

	pub fn model_name(&self) -> &str {
		&self.model_name
	}

	/// Database table, defaulting to `{app_label}_{model_name}`
	pub fn table_name(&self) -> String {
		self.table_name
			.clone()
			.unwrap_or_else(|| format!("{}_{}", self.app_label, self.model_name))
	}

	pub fn pk_field(&self) -> &str {
		&self.pk_field
	}

	pub fn fields(&self) -> &[FieldMeta] {
		&self.fields
	}

	/// Look up a concrete field by name. Aliases such as `pk` do not resolve.
	pub fn get_field(&self, name: &str) -> Option<&FieldMeta> {
		self.fields.iter().find(|f| f.name == name)
	}

	/// Resolve a name or alias to a column name
	pub fn resolve_column<'a>(&'a self, name: &'a str) -> Option<&'a str> {
		if name == PK_ALIAS {
			return Some(&self.pk_field);
		}
		self.get_field(name).map(|f| f.name.as_str())
	}

	/// Names of all JSON document fields
	pub fn json_fields(&self) -> impl Iterator<Item = &FieldMeta> {
		self.fields.iter().filter(|f| f.is_json())
	}
}

/// A dynamic row: column name to value, in column order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
	pub fn new() -> Self {
		Self(Map::new())
	}

	/// Build a record from a JSON object
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_admin_jsonfield::Record;
	/// use serde_json::json;
	///
	/// let record = Record::from_value(json!({"id": 1, "data": {}})).unwrap();
	/// assert_eq!(record.get("id"), Some(&json!(1)));
	/// assert!(Record::from_value(json!([1, 2])).is_err());
	/// ```
	pub fn from_value(value: Value) -> JsonAdminResult<Self> {
		match value {
			Value::Object(map) => Ok(Self(map)),
			other => Err(JsonAdminError::Database(format!(
				"expected a row object, got {other}"
			))),
		}
	}

	pub fn get(&self, column: &str) -> Option<&Value> {
		self.0.get(column)
	}

	pub fn get_mut(&mut self, column: &str) -> Option<&mut Value> {
		self.0.get_mut(column)
	}

	/// The value of a column, inserting `Null` when absent
	pub fn entry(&mut self, column: &str) -> &mut Value {
		self.0.entry(column.to_string()).or_insert(Value::Null)
	}

	pub fn set(&mut self, column: impl Into<String>, value: Value) {
		self.0.insert(column.into(), value);
	}

	pub fn contains(&self, column: &str) -> bool {
		self.0.contains_key(column)
	}

	pub fn columns(&self) -> impl Iterator<Item = &String> {
		self.0.keys()
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.0)
	}
}

impl From<Map<String, Value>> for Record {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}
