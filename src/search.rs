//! Listing search over regular fields and keys inside JSON fields
//!
//! Search terms are split on whitespace. Every token must match at least one
//! configured field (OR across fields, AND across tokens).

use crate::error::{JsonAdminError, JsonAdminResult};
use crate::model::ModelMeta;
use crate::path::JsonFieldPath;
use crate::query::{FieldRef, Filter, FilterCondition, Lookup, QuerySet};

/// Hook the listing view calls to apply the search box term
pub trait SearchProvider: Send + Sync {
	/// Configured standard search fields; the search box shows when non-empty
	fn search_fields(&self) -> &[String];

	/// Narrow the queryset to records matching `term`
	fn search(&self, queryset: QuerySet, term: &str) -> QuerySet;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchMode {
	StartsWith,
	Exact,
	Contains,
}

impl SearchMode {
	fn lookup(self, bit: &str) -> Lookup {
		match self {
			SearchMode::StartsWith => Lookup::IStartsWith(bit.to_string()),
			SearchMode::Exact => Lookup::IExact(bit.to_string()),
			SearchMode::Contains => Lookup::IContains(bit.to_string()),
		}
	}
}

/// Split a search field into its lookup mode and name
///
/// `^name` starts-with, `=name` exact, `@name` and bare `name` contains.
fn parse_search_field(field: &str) -> (SearchMode, &str) {
	if let Some(name) = field.strip_prefix('^') {
		(SearchMode::StartsWith, name)
	} else if let Some(name) = field.strip_prefix('=') {
		(SearchMode::Exact, name)
	} else if let Some(name) = field.strip_prefix('@') {
		(SearchMode::Contains, name)
	} else {
		(SearchMode::Contains, field)
	}
}

/// Build the AND-of-ORs condition for a search term, or `None` for a blank term
fn construct_search(targets: &[(FieldRef, SearchMode)], term: &str) -> Option<FilterCondition> {
	let bits: Vec<&str> = term.split_whitespace().collect();
	if bits.is_empty() || targets.is_empty() {
		return None;
	}
	Some(FilterCondition::And(
		bits.into_iter()
			.map(|bit| {
				FilterCondition::Or(
					targets
						.iter()
						.map(|(target, mode)| {
							FilterCondition::Single(Filter::new(target.clone(), mode.lookup(bit)))
						})
						.collect(),
				)
			})
			.collect(),
	))
}

/// Search over the model's regular `search_fields`
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{FieldKind, ModelMeta, QuerySet, SearchProvider, StandardSearch};
///
/// let meta = ModelMeta::new("people", "person").with_field("name", FieldKind::Text);
/// let search = StandardSearch::new(&meta, vec!["pk".into(), "^name".into()]);
/// assert!(search.search(QuerySet::all(), "ada").condition().is_some());
/// assert!(search.search(QuerySet::all(), "   ").condition().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct StandardSearch {
	search_fields: Vec<String>,
	targets: Vec<(FieldRef, SearchMode)>,
}

impl StandardSearch {
	pub fn new(meta: &ModelMeta, search_fields: Vec<String>) -> Self {
		let targets = search_fields
			.iter()
			.map(|field| {
				let (mode, name) = parse_search_field(field);
				let path = JsonFieldPath::parse(name);
				let target = match meta.get_field(path.field()) {
					Some(base) if base.is_json() && path.has_nested() => FieldRef::Json(path),
					_ => FieldRef::Column(meta.resolve_column(name).unwrap_or(name).to_string()),
				};
				(target, mode)
			})
			.collect();
		Self {
			search_fields,
			targets,
		}
	}
}

impl SearchProvider for StandardSearch {
	fn search_fields(&self) -> &[String] {
		&self.search_fields
	}

	fn search(&self, queryset: QuerySet, term: &str) -> QuerySet {
		match construct_search(&self.targets, term) {
			Some(condition) => queryset.filter(condition),
			None => queryset,
		}
	}
}

/// Standard search extended with case-insensitive matching inside JSON fields
///
/// The JSON match set is unioned with the standard match set.
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{FieldKind, JsonAdminError, JsonSearch, ModelMeta};
///
/// let meta = ModelMeta::new("people", "person").with_field("data", FieldKind::Json);
///
/// let search = JsonSearch::new("PersonAdmin", &meta, vec!["pk".into()], vec!["data__name__full".into()]);
/// assert!(search.is_ok());
///
/// let err = JsonSearch::new("PersonAdmin", &meta, vec![], vec!["data__name__full".into()]).unwrap_err();
/// assert!(matches!(err, JsonAdminError::SearchFieldsRequired { .. }));
/// ```
#[derive(Debug, Clone)]
pub struct JsonSearch {
	admin: String,
	standard: StandardSearch,
	json_search_fields: Vec<JsonFieldPath>,
}

impl JsonSearch {
	/// Create the search, failing when JSON paths are set without standard fields
	pub fn new(
		admin: impl Into<String>,
		meta: &ModelMeta,
		search_fields: Vec<String>,
		json_search_fields: Vec<String>,
	) -> JsonAdminResult<Self> {
		let admin = admin.into();
		if !json_search_fields.is_empty() && search_fields.is_empty() {
			return Err(JsonAdminError::SearchFieldsRequired { admin });
		}
		Ok(Self {
			admin,
			standard: StandardSearch::new(meta, search_fields),
			json_search_fields: json_search_fields
				.iter()
				.map(|path| JsonFieldPath::parse(path))
				.collect(),
		})
	}

	pub fn admin(&self) -> &str {
		&self.admin
	}

	pub fn json_search_fields(&self) -> &[JsonFieldPath] {
		&self.json_search_fields
	}
}

impl SearchProvider for JsonSearch {
	fn search_fields(&self) -> &[String] {
		self.standard.search_fields()
	}

	fn search(&self, queryset: QuerySet, term: &str) -> QuerySet {
		let search_qs = self.standard.search(queryset.clone(), term);

		let targets: Vec<(FieldRef, SearchMode)> = self
			.json_search_fields
			.iter()
			.map(|path| (FieldRef::Json(path.clone()), SearchMode::Contains))
			.collect();
		match construct_search(&targets, term) {
			Some(condition) => {
				tracing::debug!(
					admin = %self.admin,
					paths = self.json_search_fields.len(),
					"searching inside JSON fields"
				);
				search_qs.union(queryset.filter(condition))
			}
			None => search_qs,
		}
	}
}
