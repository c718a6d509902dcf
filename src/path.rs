//! Field path strings addressing keys inside JSON fields
//!
//! A path string uses the ORM lookup separator (`__`) to join a model field
//! name with the keys that lead into the JSON document stored in that field:
//! `"data__name__full"` addresses `data["name"]["full"]`.

use crate::error::{JsonAdminError, JsonAdminResult};
use std::fmt;

/// Separator between path segments
pub const LOOKUP_SEP: &str = "__";

/// Split a field path targeting a JSON field into the field name and the
/// path inside the JSON document.
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::jsonfield_path_split;
///
/// let (field, path) = jsonfield_path_split("data__a__b");
/// assert_eq!(field, "data");
/// assert_eq!(path, vec!["a", "b"]);
///
/// let (field, path) = jsonfield_path_split("data");
/// assert_eq!(field, "data");
/// assert!(path.is_empty());
/// ```
pub fn jsonfield_path_split(path: &str) -> (String, Vec<String>) {
	let mut splits = path.split(LOOKUP_SEP).map(str::to_string);
	// `split` always yields at least one item
	let field_name = splits.next().unwrap_or_default();
	(field_name, splits.collect())
}

/// A parsed field path: a model field plus the nested keys inside it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonFieldPath {
	field: String,
	path: Vec<String>,
}

impl JsonFieldPath {
	/// Parse a path string
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_admin_jsonfield::JsonFieldPath;
	///
	/// let path = JsonFieldPath::parse("data__name__full");
	/// assert_eq!(path.field(), "data");
	/// assert_eq!(path.nested(), ["name", "full"]);
	/// assert_eq!(path.to_string(), "data__name__full");
	/// ```
	pub fn parse(path: &str) -> Self {
		let (field, path) = jsonfield_path_split(path);
		Self { field, path }
	}

	/// Build a path from its parts
	pub fn new(field: impl Into<String>, path: Vec<String>) -> Self {
		Self {
			field: field.into(),
			path,
		}
	}

	/// The model field holding the JSON document
	pub fn field(&self) -> &str {
		&self.field
	}

	/// The keys leading into the document
	pub fn nested(&self) -> &[String] {
		&self.path
	}

	/// Whether the path addresses a key inside the document
	pub fn has_nested(&self) -> bool {
		!self.path.is_empty()
	}

	/// Fail unless the path addresses a key inside the document
	pub fn require_nested(self) -> JsonAdminResult<Self> {
		if self.has_nested() {
			Ok(self)
		} else {
			Err(JsonAdminError::EmptyJsonPath(self.to_string()))
		}
	}

	/// Render the nested keys as a PostgreSQL text array literal
	///
	/// This is the right-hand operand of the `#>` and `#>>` operators.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_admin_jsonfield::JsonFieldPath;
	///
	/// assert_eq!(JsonFieldPath::parse("data__a__b").pg_text_array(), "{a,b}");
	/// assert_eq!(JsonFieldPath::parse("data__a b").pg_text_array(), "{\"a b\"}");
	/// ```
	pub fn pg_text_array(&self) -> String {
		let elements: Vec<String> = self.path.iter().map(|s| pg_array_element(s)).collect();
		format!("{{{}}}", elements.join(","))
	}
}

impl fmt::Display for JsonFieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.field)?;
		for segment in &self.path {
			f.write_str(LOOKUP_SEP)?;
			f.write_str(segment)?;
		}
		Ok(())
	}
}

impl From<&str> for JsonFieldPath {
	fn from(path: &str) -> Self {
		Self::parse(path)
	}
}

fn pg_array_element(segment: &str) -> String {
	let needs_quotes = segment.is_empty()
		|| segment.eq_ignore_ascii_case("null")
		|| segment
			.chars()
			.any(|c| matches!(c, '{' | '}' | ',' | '"' | '\\') || c.is_whitespace());
	if !needs_quotes {
		return segment.to_string();
	}
	let mut quoted = String::with_capacity(segment.len() + 2);
	quoted.push('"');
	for c in segment.chars() {
		if c == '"' || c == '\\' {
			quoted.push('\\');
		}
		quoted.push(c);
	}
	quoted.push('"');
	quoted
}
