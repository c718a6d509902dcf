//! List filters over keys inside JSON fields
//!
//! [`jsonfield_list_filter`] builds a filter offering every distinct value
//! observed at a JSON path, and narrowing the listing to the selected one.

use crate::error::{JsonAdminError, JsonAdminResult};
use crate::path::JsonFieldPath;
use crate::query::{Filter, Lookup, QuerySet};
use crate::store::DocumentStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

/// A selectable filter option
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::FilterSpec;
///
/// let spec = FilterSpec::new("active", "true", "true");
/// assert_eq!(spec.to_query_param(), "active=true");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterSpec {
	/// Query parameter carrying the selection
	pub parameter: String,
	/// Value sent when the option is selected
	pub value: String,
	/// Display text for the option
	pub display: String,
}

impl FilterSpec {
	pub fn new(
		parameter: impl Into<String>,
		value: impl Into<String>,
		display: impl Into<String>,
	) -> Self {
		Self {
			parameter: parameter.into(),
			value: value.into(),
			display: display.into(),
		}
	}

	/// Convert to query parameter format
	pub fn to_query_param(&self) -> String {
		format!("{}={}", self.parameter, self.value)
	}
}

/// Hook the listing view calls to build a filter sidebar and apply selections
#[async_trait]
pub trait ListFilter: Send + Sync {
	/// Query parameter carrying this filter's selection
	fn parameter_name(&self) -> &str;

	/// Title displayed above the choices
	fn title(&self) -> &str;

	/// Available choices
	async fn lookups(&self, store: &dyn DocumentStore) -> JsonAdminResult<Vec<FilterSpec>>;

	/// Narrow the queryset by the selected value, if any
	fn queryset(&self, value: Option<&str>, queryset: QuerySet) -> QuerySet;

	/// Check if a value is selected
	fn is_selected(&self, value: &str, current_filters: &HashMap<String, String>) -> bool {
		current_filters
			.get(self.parameter_name())
			.is_some_and(|v| v == value)
	}
}

/// Coercion applied to a selected filter value before comparing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
	/// Compare the selection as a JSON string
	#[default]
	Raw,
	/// `true` when the selection case-insensitively equals `"true"`, else `false`
	Bool,
}

impl ValueType {
	/// Parse an optional configured value type; `None` means [`ValueType::Raw`]
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_admin_jsonfield::ValueType;
	///
	/// assert_eq!(ValueType::parse(None).unwrap(), ValueType::Raw);
	/// assert_eq!(ValueType::parse(Some("bool")).unwrap(), ValueType::Bool);
	/// assert!(ValueType::parse(Some("int")).is_err());
	/// ```
	pub fn parse(value_type: Option<&str>) -> JsonAdminResult<Self> {
		value_type.map_or(Ok(ValueType::Raw), str::parse)
	}

	/// Coerce a selected value
	pub fn coerce(self, value: &str) -> Value {
		match self {
			ValueType::Raw => Value::String(value.to_string()),
			ValueType::Bool => Value::Bool(value.eq_ignore_ascii_case("true")),
		}
	}
}

impl FromStr for ValueType {
	type Err = JsonAdminError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"bool" | "boolean" => Ok(ValueType::Bool),
			other => Err(JsonAdminError::UnsupportedValueType(other.to_string())),
		}
	}
}

/// Filter by distinct values at a key inside a JSON field
#[derive(Debug, Clone)]
pub struct JsonFieldListFilter {
	field_path: JsonFieldPath,
	parameter_name: String,
	title: String,
	value_type: ValueType,
}

impl JsonFieldListFilter {
	/// Create a filter; the title defaults to the parameter name
	pub fn new(
		field_path: impl Into<JsonFieldPath>,
		parameter_name: impl Into<String>,
		title: Option<String>,
		value_type: ValueType,
	) -> Self {
		let parameter_name = parameter_name.into();
		Self {
			field_path: field_path.into(),
			title: title.unwrap_or_else(|| parameter_name.clone()),
			parameter_name,
			value_type,
		}
	}

	pub fn field_path(&self) -> &JsonFieldPath {
		&self.field_path
	}

	pub fn value_type(&self) -> ValueType {
		self.value_type
	}
}

#[async_trait]
impl ListFilter for JsonFieldListFilter {
	fn parameter_name(&self) -> &str {
		&self.parameter_name
	}

	fn title(&self) -> &str {
		&self.title
	}

	async fn lookups(&self, store: &dyn DocumentStore) -> JsonAdminResult<Vec<FilterSpec>> {
		let values = store.distinct_values(&self.field_path).await?;
		tracing::debug!(
			path = %self.field_path,
			count = values.len(),
			"computed JSON filter lookups"
		);
		Ok(values
			.into_iter()
			.map(|value| FilterSpec::new(&self.parameter_name, value.clone(), value))
			.collect())
	}

	fn queryset(&self, value: Option<&str>, queryset: QuerySet) -> QuerySet {
		match value {
			None | Some("") => queryset,
			Some(value) => queryset.filter(Filter::json(
				self.field_path.clone(),
				Lookup::Exact(self.value_type.coerce(value)),
			)),
		}
	}
}

/// Build a filter for a JSON field path, validating the value type up front
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{jsonfield_list_filter, ListFilter, JsonAdminError};
///
/// let filter = jsonfield_list_filter("data__active", "active", None, Some("bool")).unwrap();
/// assert_eq!(filter.title(), "active");
///
/// let err = jsonfield_list_filter("data__age", "age", None, Some("int")).unwrap_err();
/// assert!(matches!(err, JsonAdminError::UnsupportedValueType(_)));
/// ```
pub fn jsonfield_list_filter(
	field_path: &str,
	parameter_name: &str,
	title: Option<&str>,
	value_type: Option<&str>,
) -> JsonAdminResult<JsonFieldListFilter> {
	let value_type = ValueType::parse(value_type)?;
	Ok(JsonFieldListFilter::new(
		field_path,
		parameter_name,
		title.map(str::to_string),
		value_type,
	))
}
