//! Admin listing view
//!
//! [`IndexView`] is where list filters, search and ordering meet: a request's
//! query parameters are turned into a [`QuerySet`] and run against a
//! [`DocumentStore`].

use crate::error::JsonAdminResult;
use crate::filters::{FilterSpec, ListFilter};
use crate::model::{ModelMeta, Record};
use crate::ordering::{JsonOrdering, OrderingProvider};
use crate::query::QuerySet;
use crate::search::SearchProvider;
use crate::store::DocumentStore;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::collections::HashMap;

/// Query parameter carrying the search term
pub const SEARCH_VAR: &str = "q";
/// Query parameter carrying comma-separated ordering entries
pub const ORDER_VAR: &str = "o";

/// Parameters of one listing request
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::ListRequest;
///
/// let request = ListRequest::from_query("q=ada+lovelace&o=-data__name,pk&active=true");
/// assert_eq!(request.search_term.as_deref(), Some("ada lovelace"));
/// assert_eq!(request.ordering, vec!["-data__name", "pk"]);
/// assert_eq!(request.filters["active"], "true");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
	pub search_term: Option<String>,
	pub filters: HashMap<String, String>,
	pub ordering: Vec<String>,
}

impl ListRequest {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_search(mut self, term: impl Into<String>) -> Self {
		self.search_term = Some(term.into());
		self
	}

	pub fn with_filter(mut self, parameter: impl Into<String>, value: impl Into<String>) -> Self {
		self.filters.insert(parameter.into(), value.into());
		self
	}

	pub fn with_ordering<S: Into<String>>(mut self, ordering: impl IntoIterator<Item = S>) -> Self {
		self.ordering = ordering.into_iter().map(Into::into).collect();
		self
	}

	/// Parse a URL query string; unknown parameters become filter selections
	pub fn from_query(query: &str) -> Self {
		let mut request = Self::new();
		for pair in query.trim_start_matches('?').split('&') {
			if pair.is_empty() {
				continue;
			}
			let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
			let key = decode_component(key);
			let value = decode_component(value);
			match key.as_str() {
				SEARCH_VAR => request.search_term = Some(value),
				ORDER_VAR => {
					request.ordering = value
						.split(',')
						.map(str::trim)
						.filter(|s| !s.is_empty())
						.map(str::to_string)
						.collect();
				}
				_ => {
					request.filters.insert(key, value);
				}
			}
		}
		request
	}
}

fn decode_component(component: &str) -> String {
	let spaced = component.replace('+', " ");
	percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Choices of one list filter, ready for rendering the sidebar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterChoices {
	pub parameter: String,
	pub title: String,
	pub choices: Vec<FilterSpec>,
	pub selected: Option<String>,
}

/// Listing view of one model
pub struct IndexView {
	meta: ModelMeta,
	search: Option<Box<dyn SearchProvider>>,
	ordering: Box<dyn OrderingProvider>,
	list_filters: Vec<Box<dyn ListFilter>>,
	default_ordering: Vec<String>,
}

impl IndexView {
	/// Create a view with JSON-aware ordering, no search and no filters
	///
	/// Without requested ordering the listing is newest first (`-pk`).
	pub fn new(meta: ModelMeta) -> Self {
		Self {
			ordering: Box::new(JsonOrdering::new(meta.clone())),
			meta,
			search: None,
			list_filters: Vec::new(),
			default_ordering: vec!["-pk".to_string()],
		}
	}

	pub fn with_search(mut self, search: impl SearchProvider + 'static) -> Self {
		self.search = Some(Box::new(search));
		self
	}

	pub fn with_ordering(mut self, ordering: impl OrderingProvider + 'static) -> Self {
		self.ordering = Box::new(ordering);
		self
	}

	pub fn with_list_filter(mut self, filter: impl ListFilter + 'static) -> Self {
		self.list_filters.push(Box::new(filter));
		self
	}

	pub fn with_default_ordering(mut self, ordering: Vec<String>) -> Self {
		self.default_ordering = ordering;
		self
	}

	pub fn meta(&self) -> &ModelMeta {
		&self.meta
	}

	pub fn list_filters(&self) -> &[Box<dyn ListFilter>] {
		&self.list_filters
	}

	/// Whether the listing shows a search box
	pub fn has_search(&self) -> bool {
		self.search
			.as_ref()
			.is_some_and(|s| !s.search_fields().is_empty())
	}

	/// Apply list filters, then search, then ordering
	pub fn get_queryset(&self, request: &ListRequest) -> QuerySet {
		let mut queryset = QuerySet::all();
		for filter in &self.list_filters {
			let selected = request
				.filters
				.get(filter.parameter_name())
				.map(String::as_str);
			queryset = filter.queryset(selected, queryset);
		}

		if let Some(search) = &self.search
			&& let Some(term) = request.search_term.as_deref()
		{
			queryset = search.search(queryset, term);
		}

		let requested = if request.ordering.is_empty() {
			&self.default_ordering
		} else {
			&request.ordering
		};
		queryset.order_by(self.ordering.ordering(requested))
	}

	/// Records for the request
	pub async fn list(
		&self,
		store: &dyn DocumentStore,
		request: &ListRequest,
	) -> JsonAdminResult<Vec<Record>> {
		let queryset = self.get_queryset(request);
		let records = store.fetch(&queryset).await?;
		tracing::debug!(
			model = self.meta.model_name(),
			count = records.len(),
			"listed records"
		);
		Ok(records)
	}

	/// Choices for every list filter, with the request's selection marked
	pub async fn filter_choices(
		&self,
		store: &dyn DocumentStore,
		request: &ListRequest,
	) -> JsonAdminResult<Vec<FilterChoices>> {
		let mut result = Vec::with_capacity(self.list_filters.len());
		for filter in &self.list_filters {
			result.push(FilterChoices {
				parameter: filter.parameter_name().to_string(),
				title: filter.title().to_string(),
				choices: filter.lookups(store).await?,
				selected: request.filters.get(filter.parameter_name()).cloned(),
			});
		}
		Ok(result)
	}
}
