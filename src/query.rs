//! Query description passed between the admin components and the store
//!
//! Components never talk SQL directly: they build a [`QuerySet`] made of
//! [`FilterCondition`]s and [`OrderingExpr`]s. A [`DocumentStore`] then
//! either evaluates it in memory or compiles it with [`crate::sql`].
//!
//! [`DocumentStore`]: crate::store::DocumentStore

use crate::document::{get_path, text_value};
use crate::model::Record;
use crate::path::JsonFieldPath;
use serde_json::Value;
use std::cmp::Ordering;

/// What a filter compares against
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef {
	/// A concrete table column
	Column(String),
	/// A key inside a JSON column
	Json(JsonFieldPath),
}

impl FieldRef {
	/// Resolve the referenced value of a record
	pub fn value<'a>(&self, record: &'a Record) -> Option<&'a Value> {
		match self {
			FieldRef::Column(column) => record.get(column),
			FieldRef::Json(path) => record
				.get(path.field())
				.and_then(|doc| get_path(doc, path.nested())),
		}
	}
}

/// Comparison applied to a [`FieldRef`]
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
	/// Equal as JSON values
	Exact(Value),
	/// Equal as text, ignoring case
	IExact(String),
	/// Text contains the term, ignoring case
	IContains(String),
	/// Text starts with the term, ignoring case
	IStartsWith(String),
	/// Value is present and not null
	IsNotNull,
}

/// A single comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
	pub target: FieldRef,
	pub lookup: Lookup,
}

impl Filter {
	pub fn new(target: FieldRef, lookup: Lookup) -> Self {
		Self { target, lookup }
	}

	pub fn column(column: impl Into<String>, lookup: Lookup) -> Self {
		Self::new(FieldRef::Column(column.into()), lookup)
	}

	pub fn json(path: JsonFieldPath, lookup: Lookup) -> Self {
		Self::new(FieldRef::Json(path), lookup)
	}

	/// Evaluate the comparison against a record
	pub fn matches(&self, record: &Record) -> bool {
		let value = self.target.value(record);
		match &self.lookup {
			Lookup::Exact(expected) => value.is_some_and(|v| v == expected),
			Lookup::IsNotNull => value.is_some_and(|v| !v.is_null()),
			Lookup::IExact(term) => text_of(value).is_some_and(|t| t == term.to_lowercase()),
			Lookup::IContains(term) => {
				text_of(value).is_some_and(|t| t.contains(&term.to_lowercase()))
			}
			Lookup::IStartsWith(term) => {
				text_of(value).is_some_and(|t| t.starts_with(&term.to_lowercase()))
			}
		}
	}
}

fn text_of(value: Option<&Value>) -> Option<String> {
	value.and_then(text_value).map(|t| t.to_lowercase())
}

/// Composite filter with AND/OR logic
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
	Single(Filter),
	/// All conditions hold; empty is always true
	And(Vec<FilterCondition>),
	/// Any condition holds; empty is always false
	Or(Vec<FilterCondition>),
}

impl FilterCondition {
	pub fn matches(&self, record: &Record) -> bool {
		match self {
			FilterCondition::Single(filter) => filter.matches(record),
			FilterCondition::And(conditions) => conditions.iter().all(|c| c.matches(record)),
			FilterCondition::Or(conditions) => conditions.iter().any(|c| c.matches(record)),
		}
	}
}

impl From<Filter> for FilterCondition {
	fn from(filter: Filter) -> Self {
		FilterCondition::Single(filter)
	}
}

/// One ORDER BY entry
#[derive(Debug, Clone, PartialEq)]
pub enum OrderingExpr {
	/// Order by a column (or an alias the store resolves)
	Field { name: String, descending: bool },
	/// Order by the text value at a key inside a JSON column
	JsonPath {
		path: JsonFieldPath,
		descending: bool,
	},
}

impl OrderingExpr {
	/// Parse a `-`-prefixed field ordering without resolving JSON paths
	pub fn field(spec: &str) -> Self {
		match spec.strip_prefix('-') {
			Some(name) => OrderingExpr::Field {
				name: name.to_string(),
				descending: true,
			},
			None => OrderingExpr::Field {
				name: spec.to_string(),
				descending: false,
			},
		}
	}

	pub fn is_descending(&self) -> bool {
		match self {
			OrderingExpr::Field { descending, .. } | OrderingExpr::JsonPath { descending, .. } => {
				*descending
			}
		}
	}

	/// Compare two records; missing values sort last ascending, first descending
	pub fn compare(&self, a: &Record, b: &Record, pk_field: &str) -> Ordering {
		let ordering = match self {
			OrderingExpr::Field { name, .. } => {
				let column = if name == crate::model::PK_ALIAS {
					pk_field
				} else {
					name.as_str()
				};
				compare_values(a.get(column), b.get(column))
			}
			OrderingExpr::JsonPath { path, .. } => {
				let target = FieldRef::Json(path.clone());
				let left = target.value(a).and_then(text_value);
				let right = target.value(b).and_then(text_value);
				nulls_last(left.as_ref(), right.as_ref(), |l, r| l.cmp(r))
			}
		};
		if self.is_descending() {
			ordering.reverse()
		} else {
			ordering
		}
	}
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
	let a = a.filter(|v| !v.is_null());
	let b = b.filter(|v| !v.is_null());
	nulls_last(a, b, |l, r| match (l, r) {
		(Value::Number(l), Value::Number(r)) => l
			.as_f64()
			.partial_cmp(&r.as_f64())
			.unwrap_or(Ordering::Equal),
		(Value::Bool(l), Value::Bool(r)) => l.cmp(r),
		(Value::String(l), Value::String(r)) => l.cmp(r),
		(l, r) => l.to_string().cmp(&r.to_string()),
	})
}

fn nulls_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
	match (a, b) {
		(Some(l), Some(r)) => cmp(&l, &r),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}

/// A lazily described record collection
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{Filter, JsonFieldPath, Lookup, QuerySet};
/// use serde_json::json;
///
/// let qs = QuerySet::all().filter(Filter::json(
///     JsonFieldPath::parse("data__active"),
///     Lookup::Exact(json!(true)),
/// ));
/// assert!(qs.condition().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySet {
	condition: Option<FilterCondition>,
	ordering: Vec<OrderingExpr>,
}

impl QuerySet {
	/// Every record, unordered
	pub fn all() -> Self {
		Self::default()
	}

	/// Narrow the collection (AND with any existing condition)
	pub fn filter(mut self, condition: impl Into<FilterCondition>) -> Self {
		let condition = condition.into();
		self.condition = Some(match self.condition.take() {
			None => condition,
			Some(FilterCondition::And(mut conditions)) => {
				conditions.push(condition);
				FilterCondition::And(conditions)
			}
			Some(existing) => FilterCondition::And(vec![existing, condition]),
		});
		self
	}

	/// Records in either collection; the left-hand ordering is kept
	pub fn union(mut self, other: QuerySet) -> Self {
		self.condition = match (self.condition.take(), other.condition) {
			(Some(left), Some(right)) => Some(FilterCondition::Or(vec![left, right])),
			_ => None,
		};
		self
	}

	/// Replace the ordering
	pub fn order_by(mut self, ordering: Vec<OrderingExpr>) -> Self {
		self.ordering = ordering;
		self
	}

	pub fn condition(&self) -> Option<&FilterCondition> {
		self.condition.as_ref()
	}

	pub fn ordering(&self) -> &[OrderingExpr] {
		&self.ordering
	}

	/// Evaluate the condition against a record
	pub fn matches(&self, record: &Record) -> bool {
		self.condition.as_ref().is_none_or(|c| c.matches(record))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn record(value: Value) -> Record {
		Record::from_value(value).unwrap()
	}

	#[rstest]
	#[case(Lookup::Exact(json!("Ada")), true)]
	#[case(Lookup::Exact(json!("ada")), false)]
	#[case(Lookup::IExact("ada".into()), true)]
	#[case(Lookup::IContains("DA".into()), true)]
	#[case(Lookup::IContains("race".into()), false)]
	#[case(Lookup::IStartsWith("ad".into()), true)]
	#[case(Lookup::IsNotNull, true)]
	fn test_json_lookups(#[case] lookup: Lookup, #[case] expected: bool) {
		let row = record(json!({"id": 1, "data": {"name": {"full": "Ada"}}}));
		let filter = Filter::json(JsonFieldPath::parse("data__name__full"), lookup);
		assert_eq!(filter.matches(&row), expected);
	}

	#[test]
	fn test_is_not_null_rejects_json_null_and_missing() {
		let path = JsonFieldPath::parse("data__a");
		let filter = Filter::json(path, Lookup::IsNotNull);
		assert!(!filter.matches(&record(json!({"data": {"a": null}}))));
		assert!(!filter.matches(&record(json!({"data": {}}))));
		assert!(!filter.matches(&record(json!({}))));
	}

	#[test]
	fn test_icontains_on_integer_column() {
		let filter = Filter::column("id", Lookup::IContains("2".into()));
		assert!(filter.matches(&record(json!({"id": 123}))));
		assert!(!filter.matches(&record(json!({"id": 45}))));
	}

	#[test]
	fn test_empty_or_is_false_and_empty_and_is_true() {
		let row = record(json!({}));
		assert!(!FilterCondition::Or(vec![]).matches(&row));
		assert!(FilterCondition::And(vec![]).matches(&row));
	}

	#[test]
	fn test_filter_chains_with_and() {
		let qs = QuerySet::all()
			.filter(Filter::column("a", Lookup::Exact(json!(1))))
			.filter(Filter::column("b", Lookup::Exact(json!(2))))
			.filter(Filter::column("c", Lookup::Exact(json!(3))));
		match qs.condition() {
			Some(FilterCondition::And(conditions)) => assert_eq!(conditions.len(), 3),
			other => panic!("unexpected condition: {other:?}"),
		}
	}

	#[test]
	fn test_union_with_unfiltered_is_unfiltered() {
		let filtered = QuerySet::all().filter(Filter::column("a", Lookup::IsNotNull));
		assert!(filtered.clone().union(QuerySet::all()).condition().is_none());
		assert!(matches!(
			filtered.clone().union(filtered).condition(),
			Some(FilterCondition::Or(_))
		));
	}

	#[test]
	fn test_json_ordering_compares_text() {
		let a = record(json!({"data": {"n": "b"}}));
		let b = record(json!({"data": {"n": "a"}}));
		let missing = record(json!({"data": {}}));
		let asc = OrderingExpr::JsonPath {
			path: JsonFieldPath::parse("data__n"),
			descending: false,
		};
		let desc = OrderingExpr::JsonPath {
			path: JsonFieldPath::parse("data__n"),
			descending: true,
		};
		assert_eq!(asc.compare(&a, &b, "id"), Ordering::Greater);
		assert_eq!(desc.compare(&a, &b, "id"), Ordering::Less);
		assert_eq!(asc.compare(&missing, &a, "id"), Ordering::Greater);
		assert_eq!(desc.compare(&missing, &a, "id"), Ordering::Less);
	}

	#[test]
	fn test_field_ordering_parses_sign() {
		assert_eq!(
			OrderingExpr::field("-name"),
			OrderingExpr::Field {
				name: "name".into(),
				descending: true
			}
		);
		let pk = OrderingExpr::field("pk");
		let one = record(json!({"id": 1}));
		let two = record(json!({"id": 2}));
		assert_eq!(pk.compare(&one, &two, "id"), Ordering::Less);
	}
}
