//! URL helper tests against a registry built from settings

use reinhardt_admin_jsonfield::{
	AdminUrlHelper, JsonAdminError, JsonAdminSettings, PageAdminUrlHelper, UrlRegistry,
};
use rstest::*;
use std::collections::HashMap;

#[fixture]
fn settings() -> JsonAdminSettings {
	JsonAdminSettings::from_toml(
		r#"
url_mount = "/cms/"

[[admin]]
name = "ArticleAdmin"
app_label = "news"
model = "ArticlePage"

[admin.urls]
prefix = ""
suffix = "list"
separator = "_"
"#,
	)
	.unwrap()
}

#[fixture]
fn registry(settings: JsonAdminSettings) -> UrlRegistry {
	let mut registry = settings.url_registry();
	registry.register("admin_pages:edit", "pages/{page_id}/edit/");
	registry.register("admin_pages:add", "pages/add/{app_label}/{model_name}/{parent_id}/");
	registry
}

#[rstest]
fn test_configured_helper(settings: JsonAdminSettings) {
	let helper = settings.admin("ArticleAdmin").unwrap().url_helper();
	assert_eq!(helper.model_name_part(), "articlepage_list");
	assert_eq!(helper.action_url_name("index"), "news_articlepage_list_modeladmin_index");
	assert_eq!(helper.action_url_pattern("index"), "news/articlepage_list/");
}

#[rstest]
fn test_registry_reverses_configured_routes(settings: JsonAdminSettings, registry: UrlRegistry) {
	let helper = settings.admin("ArticleAdmin").unwrap().url_helper();
	assert_eq!(registry.len(), 7);
	assert_eq!(
		helper.index_url(&registry).unwrap(),
		"/cms/news/articlepage_list/"
	);
	assert_eq!(
		helper.object_action_url(&registry, "inspect", "abc-1").unwrap(),
		"/cms/news/articlepage_list/inspect/abc-1/"
	);
}

#[rstest]
#[case("edit", &[("page_id", "9")], "/cms/pages/9/edit/?next=/cms/news/articlepage_list/")]
#[case(
	"add",
	&[("app_label", "news"), ("model_name", "articlepage"), ("parent_id", "2")],
	"/cms/pages/add/news/articlepage/2/?next=/cms/news/articlepage_list/"
)]
fn test_page_editor_actions(
	settings: JsonAdminSettings,
	registry: UrlRegistry,
	#[case] action: &str,
	#[case] params: &[(&str, &str)],
	#[case] expected: &str,
) {
	let helper = PageAdminUrlHelper::new(settings.admin("ArticleAdmin").unwrap().url_helper());
	let params: HashMap<String, String> = params
		.iter()
		.map(|(k, v)| (k.to_string(), v.to_string()))
		.collect();
	assert_eq!(helper.action_url(&registry, action, &params).unwrap(), expected);
}

#[rstest]
fn test_unregistered_page_action(settings: JsonAdminSettings, registry: UrlRegistry) {
	let helper = PageAdminUrlHelper::new(settings.admin("ArticleAdmin").unwrap().url_helper());
	let err = helper
		.action_url(&registry, "unpublish", &HashMap::new())
		.unwrap_err();
	assert!(matches!(err, JsonAdminError::RouteNotFound(ref name) if name == "admin_pages:unpublish"));
}

#[rstest]
fn test_default_helper_on_default_registry() {
	let mut registry = UrlRegistry::default();
	let helper = AdminUrlHelper::new("shop", "Product");
	helper.register(&mut registry);
	assert_eq!(
		helper.create_url(&registry).unwrap(),
		"/admin/shop/custom-product/create/"
	);
}
