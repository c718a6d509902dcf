//! Walking JSON documents along nested paths

use crate::error::{JsonAdminError, JsonAdminResult};
use serde_json::{Map, Value};

/// Outcome of descending into a document for a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
	/// Every intermediate object already existed
	Found,
	/// At least one intermediate object was created
	Created,
}

/// Look up the value at `path`, or `None` when any key is missing.
///
/// Non-object intermediates count as missing.
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::document::get_path;
/// use serde_json::json;
///
/// let doc = json!({"name": {"full": "Ada"}});
/// assert_eq!(get_path(&doc, &["name".into(), "full".into()]), Some(&json!("Ada")));
/// assert_eq!(get_path(&doc, &["name".into(), "short".into()]), None);
/// assert_eq!(get_path(&doc, &["age".into(), "years".into()]), None);
/// ```
pub fn get_path<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
	path.iter()
		.try_fold(doc, |node, key| node.as_object().and_then(|map| map.get(key)))
}

/// Look up the value at `path` treating missing intermediates as empty
/// objects, returning `Value::Null` for a missing leaf.
pub fn get_path_or_null(doc: &Value, path: &[String]) -> Value {
	get_path(doc, path).cloned().unwrap_or(Value::Null)
}

/// Descend through `keys`, creating missing intermediates as empty objects.
///
/// Returns the innermost object and whether any branch was created. An
/// intermediate holding a non-object value is an error rather than being
/// overwritten.
pub fn ensure_branch<'a>(
	doc: &'a mut Map<String, Value>,
	keys: &[String],
) -> JsonAdminResult<(&'a mut Map<String, Value>, Branch)> {
	let mut branch = Branch::Found;
	let mut node = doc;
	let mut walked: Vec<&str> = Vec::with_capacity(keys.len());
	for key in keys {
		walked.push(key);
		let child = node.entry(key.clone()).or_insert_with(|| {
			branch = Branch::Created;
			Value::Object(Map::new())
		});
		node = match child {
			Value::Object(map) => map,
			_ => {
				return Err(JsonAdminError::NotAMapping {
					path: walked.join("__"),
					segment: key.clone(),
				});
			}
		};
	}
	Ok((node, branch))
}

/// Set the value at `path`, creating intermediate objects as needed.
///
/// A `Null` or missing document becomes an empty object first. `path` must
/// not be empty.
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::document::{set_path, Branch};
/// use serde_json::json;
///
/// let mut doc = json!({});
/// let branch = set_path(&mut doc, &["name".into(), "full".into()], json!("Grace")).unwrap();
/// assert_eq!(branch, Branch::Created);
/// assert_eq!(doc, json!({"name": {"full": "Grace"}}));
/// ```
pub fn set_path(doc: &mut Value, path: &[String], value: Value) -> JsonAdminResult<Branch> {
	let Some((leaf, parents)) = path.split_last() else {
		return Err(JsonAdminError::EmptyJsonPath(String::new()));
	};
	if doc.is_null() {
		*doc = Value::Object(Map::new());
	}
	let Value::Object(root) = doc else {
		return Err(JsonAdminError::NotAMapping {
			path: String::new(),
			segment: leaf.clone(),
		});
	};
	let (node, branch) = ensure_branch(root, parents)?;
	node.insert(leaf.clone(), value);
	Ok(branch)
}

/// Text form of a scalar as PostgreSQL's `#>>` operator produces it.
///
/// Strings are returned raw, `null` maps to `None`, and everything else is
/// rendered as JSON.
pub fn text_value(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn keys(path: &[&str]) -> Vec<String> {
		path.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_ensure_branch_found_existing() {
		let mut doc = json!({"name": {"full": "Ada"}});
		let map = doc.as_object_mut().unwrap();
		let (node, branch) = ensure_branch(map, &keys(&["name"])).unwrap();
		assert_eq!(branch, Branch::Found);
		assert_eq!(node.get("full"), Some(&json!("Ada")));
	}

	#[test]
	fn test_ensure_branch_creates_missing() {
		let mut doc = json!({"other": 1});
		let map = doc.as_object_mut().unwrap();
		let (_, branch) = ensure_branch(map, &keys(&["a", "b"])).unwrap();
		assert_eq!(branch, Branch::Created);
		assert_eq!(doc, json!({"other": 1, "a": {"b": {}}}));
	}

	#[test]
	fn test_ensure_branch_rejects_scalar_intermediate() {
		let mut doc = json!({"name": "Ada"});
		let map = doc.as_object_mut().unwrap();
		let err = ensure_branch(map, &keys(&["name", "full"])).unwrap_err();
		assert!(matches!(err, JsonAdminError::NotAMapping { segment, .. } if segment == "name"));
	}

	#[test]
	fn test_set_path_overwrites_leaf() {
		let mut doc = json!({"name": {"full": "Ada", "short": "A"}});
		let branch = set_path(&mut doc, &keys(&["name", "full"]), json!("Grace")).unwrap();
		assert_eq!(branch, Branch::Found);
		assert_eq!(doc, json!({"name": {"full": "Grace", "short": "A"}}));
	}

	#[test]
	fn test_set_path_on_null_document() {
		let mut doc = Value::Null;
		set_path(&mut doc, &keys(&["slug"]), json!("ada")).unwrap();
		assert_eq!(doc, json!({"slug": "ada"}));
	}

	#[test]
	fn test_set_path_empty_path_is_error() {
		let mut doc = json!({});
		assert!(set_path(&mut doc, &[], json!(1)).is_err());
	}

	#[test]
	fn test_get_path_or_null_through_scalar() {
		let doc = json!({"name": "Ada"});
		assert_eq!(get_path_or_null(&doc, &keys(&["name", "full"])), Value::Null);
	}

	#[test]
	fn test_text_value() {
		assert_eq!(text_value(&json!("x")), Some("x".to_string()));
		assert_eq!(text_value(&json!(true)), Some("true".to_string()));
		assert_eq!(text_value(&json!(3)), Some("3".to_string()));
		assert_eq!(text_value(&json!({"a": 1})), Some("{\"a\":1}".to_string()));
		assert_eq!(text_value(&Value::Null), None);
	}
}
