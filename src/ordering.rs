//! Listing ordering by keys inside JSON fields

use crate::model::ModelMeta;
use crate::path::JsonFieldPath;
use crate::query::OrderingExpr;

/// Hook the listing view calls to turn requested ordering into expressions
pub trait OrderingProvider: Send + Sync {
	fn ordering(&self, requested: &[String]) -> Vec<OrderingExpr>;
}

/// Ordering that sorts JSON field paths by the text value at the path
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{FieldKind, JsonOrdering, ModelMeta, OrderingExpr, OrderingProvider};
///
/// let meta = ModelMeta::new("people", "person").with_field("data", FieldKind::Json);
/// let ordering = JsonOrdering::new(meta).ordering(&["-data__name__full".to_string(), "pk".to_string()]);
///
/// assert!(matches!(&ordering[0], OrderingExpr::JsonPath { descending: true, .. }));
/// assert_eq!(ordering[1], OrderingExpr::field("pk"));
/// ```
#[derive(Debug, Clone)]
pub struct JsonOrdering {
	meta: ModelMeta,
}

impl JsonOrdering {
	pub fn new(meta: ModelMeta) -> Self {
		Self { meta }
	}

	fn resolve(&self, entry: &str) -> OrderingExpr {
		let (descending, name) = match entry.strip_prefix('-') {
			Some(name) => (true, name),
			None => (false, entry),
		};
		let path = JsonFieldPath::parse(name);
		match self.meta.get_field(path.field()) {
			Some(field) if field.is_json() && path.has_nested() => {
				OrderingExpr::JsonPath { path, descending }
			}
			Some(_) => OrderingExpr::field(entry),
			None => {
				tracing::debug!(
					model = self.meta.model_name(),
					field = name,
					"ordering by unresolved field name"
				);
				OrderingExpr::field(entry)
			}
		}
	}
}

impl OrderingProvider for JsonOrdering {
	fn ordering(&self, requested: &[String]) -> Vec<OrderingExpr> {
		requested.iter().map(|entry| self.resolve(entry)).collect()
	}
}
