//! Listing view tests over an in-memory store
//!
//! Exercises list filters, JSON search and JSON ordering together through
//! `IndexView`, the way the admin changelist drives them.

use reinhardt_admin_jsonfield::{
	DocumentStore, FieldKind, IndexView, InMemoryStore, JsonAdminSettings, JsonOrdering,
	JsonSearch, ListRequest, ModelMeta, Record, StandardSearch, jsonfield_list_filter,
};
use rstest::*;
use serde_json::{Value, json};

fn person_meta() -> ModelMeta {
	ModelMeta::new("people", "person")
		.with_field("name", FieldKind::Text)
		.with_field("data", FieldKind::Json)
}

#[fixture]
fn store() -> InMemoryStore {
	InMemoryStore::with_records(
		person_meta(),
		[
			json!({"name": "ada", "data": {"name": {"full": "Ada Lovelace"}, "active": true, "city": "London"}}),
			json!({"name": "grace", "data": {"name": {"full": "Grace Hopper"}, "active": false, "city": "New York"}}),
			json!({"name": "alan", "data": {"name": {"full": "Alan Turing"}, "active": true, "city": "London"}}),
			json!({"name": "nobody", "data": {"active": null}}),
			json!({"name": "yonath", "data": {"name": {"full": "Ada Yonath"}, "active": true, "city": "Rehovot"}}),
		]
		.into_iter()
		.map(|v| Record::from_value(v).unwrap()),
	)
}

#[fixture]
fn view() -> IndexView {
	IndexView::new(person_meta())
		.with_search(
			JsonSearch::new(
				"PersonAdmin",
				&person_meta(),
				vec!["name".into()],
				vec!["data__name__full".into(), "data__city".into()],
			)
			.unwrap(),
		)
		.with_list_filter(jsonfield_list_filter("data__active", "active", None, Some("bool")).unwrap())
		.with_list_filter(jsonfield_list_filter("data__city", "city", Some("City"), None).unwrap())
}

async fn ids(view: &IndexView, store: &InMemoryStore, request: ListRequest) -> Vec<i64> {
	view.list(store, &request)
		.await
		.unwrap()
		.iter()
		.map(|r| r.get("id").and_then(Value::as_i64).unwrap())
		.collect()
}

// ==================== LIST FILTERS ====================

#[rstest]
#[tokio::test]
async fn test_filter_choices_are_sorted_distinct_non_null(view: IndexView, store: InMemoryStore) {
	let choices = view
		.filter_choices(&store, &ListRequest::new().with_filter("city", "London"))
		.await
		.unwrap();

	assert_eq!(choices.len(), 2);
	let active: Vec<_> = choices[0].choices.iter().map(|c| c.value.as_str()).collect();
	assert_eq!(active, vec!["false", "true"]);
	assert_eq!(choices[0].title, "active");
	assert_eq!(choices[0].selected, None);

	let cities: Vec<_> = choices[1].choices.iter().map(|c| c.display.as_str()).collect();
	assert_eq!(cities, vec!["London", "New York", "Rehovot"]);
	assert_eq!(choices[1].title, "City");
	assert_eq!(choices[1].selected.as_deref(), Some("London"));
}

#[rstest]
#[case("true", vec![5, 3, 1])]
#[case("True", vec![5, 3, 1])]
#[case("false", vec![2])]
#[case("nonsense", vec![2])]
#[case("", vec![5, 4, 3, 2, 1])]
#[tokio::test]
async fn test_bool_filter_selection(
	view: IndexView,
	store: InMemoryStore,
	#[case] selected: &str,
	#[case] expected: Vec<i64>,
) {
	let request = ListRequest::new().with_filter("active", selected);
	assert_eq!(ids(&view, &store, request).await, expected);
}

#[rstest]
#[tokio::test]
async fn test_combined_filters(view: IndexView, store: InMemoryStore) {
	let request = ListRequest::from_query("active=true&city=London");
	assert_eq!(ids(&view, &store, request).await, vec![3, 1]);
}

// ==================== SEARCH ====================

#[rstest]
#[tokio::test]
async fn test_search_unions_standard_and_json_matches(view: IndexView, store: InMemoryStore) {
	// "ada" matches record 1 by name and by document, record 5 only by document
	let request = ListRequest::new().with_search("ada");
	assert_eq!(ids(&view, &store, request).await, vec![5, 1]);
}

#[rstest]
#[case("ada love", vec![1])]
#[case("ADA london", vec![1])]
#[case("london", vec![3, 1])]
#[case("ada paris", vec![])]
#[tokio::test]
async fn test_every_token_must_match_some_path(
	view: IndexView,
	store: InMemoryStore,
	#[case] term: &str,
	#[case] expected: Vec<i64>,
) {
	let request = ListRequest::new().with_search(term);
	assert_eq!(ids(&view, &store, request).await, expected);
}

#[rstest]
#[tokio::test]
async fn test_standard_search_alone_ignores_documents(store: InMemoryStore) {
	let view = IndexView::new(person_meta())
		.with_search(StandardSearch::new(&person_meta(), vec!["^name".into()]));
	let request = ListRequest::new().with_search("a");
	assert_eq!(ids(&view, &store, request).await, vec![3, 1]);
}

// ==================== ORDERING ====================

#[rstest]
#[case("data__name__full", vec![1, 5, 3, 2, 4])]
#[case("-data__name__full", vec![4, 2, 3, 5, 1])]
#[case("data__city,-pk", vec![3, 1, 2, 5, 4])]
#[case("pk", vec![1, 2, 3, 4, 5])]
#[tokio::test]
async fn test_ordering_by_json_path(
	view: IndexView,
	store: InMemoryStore,
	#[case] ordering: &str,
	#[case] expected: Vec<i64>,
) {
	let request = ListRequest::from_query(&format!("o={ordering}"));
	assert_eq!(ids(&view, &store, request).await, expected);
}

#[rstest]
#[tokio::test]
async fn test_filter_search_and_ordering_together(view: IndexView, store: InMemoryStore) {
	let request = ListRequest::from_query("city=London&q=a&o=-data__name__full");
	assert_eq!(ids(&view, &store, request).await, vec![3, 1]);
}

#[rstest]
#[tokio::test]
async fn test_custom_ordering_provider(store: InMemoryStore) {
	let view = IndexView::new(person_meta())
		.with_ordering(JsonOrdering::new(person_meta()))
		.with_default_ordering(vec!["name".into()]);
	let names: Vec<_> = view
		.list(&store, &ListRequest::new())
		.await
		.unwrap()
		.iter()
		.map(|r| r.get("name").cloned().unwrap())
		.collect();
	assert_eq!(
		names,
		vec![json!("ada"), json!("alan"), json!("grace"), json!("nobody"), json!("yonath")]
	);
}

// ==================== CONFIGURED ADMIN ====================

#[rstest]
#[tokio::test]
async fn test_view_built_from_settings(store: InMemoryStore) {
	let settings = JsonAdminSettings::from_toml(
		r#"
[[admin]]
name = "PersonAdmin"
app_label = "people"
model = "person"
search_fields = ["name"]
json_search_fields = ["data__name__full"]
ordering = ["data__name__full"]

[admin.fields]
name = "text"
data = "json"

[[admin.list_filter]]
field_path = "data__active"
parameter_name = "active"
value_type = "bool"
"#,
	)
	.unwrap();
	let view = settings.admin("PersonAdmin").unwrap().index_view().unwrap();

	assert!(view.has_search());
	assert_eq!(
		ids(&view, &store, ListRequest::from_query("active=true")).await,
		vec![1, 5, 3]
	);
	assert_eq!(
		store
			.count(&view.get_queryset(&ListRequest::from_query("q=turing")))
			.await
			.unwrap(),
		1
	);
}
