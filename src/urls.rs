//! URL patterns and named routes for custom admin screens
//!
//! [`AdminUrlHelper`] produces the patterns and route names for a model admin
//! screen set, and [`UrlRegistry`] reverses those names back into paths.
//!
//! ```text
//! people/custom-person/                 people_custom-person_modeladmin_index
//! people/custom-person/create/          people_custom-person_modeladmin_create
//! people/custom-person/edit/{instance_pk}/   people_custom-person_modeladmin_edit
//! ```

use crate::error::{JsonAdminError, JsonAdminResult};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::HashMap;

/// Placeholder for the primary key in object-specific patterns
pub const INSTANCE_PK_PARAM: &str = "instance_pk";

/// Actions the host page editor owns
pub const PAGE_EDITOR_ACTIONS: &[&str] = &["add", "edit", "delete", "unpublish", "copy"];

/// Characters left unescaped in a `next` query value
const NEXT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'/')
	.remove(b'_')
	.remove(b'.')
	.remove(b'-')
	.remove(b'~');

/// Reverse a named route into a path
pub trait UrlReverser: Send + Sync {
	fn reverse(&self, name: &str, params: &HashMap<String, String>) -> JsonAdminResult<String>;
}

/// A named route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRoute {
	pub name: String,
	pub pattern: String,
	pub action: String,
}

/// Extract `{name}` placeholders from a pattern, in order
fn extract_param_names(pattern: &str) -> Vec<String> {
	let mut names = Vec::new();
	let mut chars = pattern.chars();
	while let Some(ch) = chars.next() {
		if ch == '{' {
			let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
			if !name.is_empty() {
				names.push(name);
			}
		}
	}
	names
}

/// Reject values that would change the shape of the reversed path
fn validate_reverse_param(value: &str) -> bool {
	!value.is_empty()
		&& !value.contains(['/', '\\', '?', '#', '%'])
		&& value != ".."
		&& value != "."
}

/// Named routes mounted under a common prefix
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{UrlRegistry, UrlReverser};
/// use std::collections::HashMap;
///
/// let mut registry = UrlRegistry::new();
/// registry.register("people_edit", "people/edit/{instance_pk}/");
///
/// let params = HashMap::from([("instance_pk".to_string(), "7".to_string())]);
/// assert_eq!(registry.reverse("people_edit", &params).unwrap(), "/admin/people/edit/7/");
/// assert!(registry.reverse("missing", &params).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct UrlRegistry {
	mount: String,
	routes: HashMap<String, String>,
}

impl Default for UrlRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl UrlRegistry {
	/// Create an empty registry mounted at `/admin/`
	pub fn new() -> Self {
		Self {
			mount: "/admin/".to_string(),
			routes: HashMap::new(),
		}
	}

	/// Mount every route under `mount`, normalized to start and end with `/`
	pub fn with_mount(mut self, mount: &str) -> Self {
		let trimmed = mount.trim_matches('/');
		self.mount = if trimmed.is_empty() {
			"/".to_string()
		} else {
			format!("/{trimmed}/")
		};
		self
	}

	pub fn mount(&self) -> &str {
		&self.mount
	}

	/// Register a pattern under `name`, replacing any existing one
	pub fn register(&mut self, name: impl Into<String>, pattern: impl Into<String>) {
		let name = name.into();
		if let Some(previous) = self.routes.insert(name.clone(), pattern.into()) {
			tracing::warn!(route = %name, %previous, "replacing registered route");
		}
	}

	pub fn register_routes(&mut self, routes: impl IntoIterator<Item = AdminRoute>) {
		for route in routes {
			self.register(route.name, route.pattern);
		}
	}

	pub fn contains(&self, name: &str) -> bool {
		self.routes.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}

impl UrlReverser for UrlRegistry {
	fn reverse(&self, name: &str, params: &HashMap<String, String>) -> JsonAdminResult<String> {
		let pattern = self
			.routes
			.get(name)
			.ok_or_else(|| JsonAdminError::RouteNotFound(name.to_string()))?;

		for param in extract_param_names(pattern) {
			let value = params
				.get(&param)
				.ok_or_else(|| JsonAdminError::MissingRouteParameter {
					route: name.to_string(),
					param: param.clone(),
				})?;
			if !validate_reverse_param(value) {
				return Err(JsonAdminError::InvalidRouteParameter(param));
			}
		}

		let mut path = String::with_capacity(self.mount.len() + pattern.len());
		path.push_str(&self.mount);
		let mut chars = pattern.chars();
		while let Some(ch) = chars.next() {
			if ch == '{' {
				let param: String = chars.by_ref().take_while(|&c| c != '}').collect();
				if let Some(value) = params.get(&param) {
					path.push_str(value);
				}
			} else {
				path.push(ch);
			}
		}
		Ok(path)
	}
}

/// URL patterns and route names for one model's admin screens
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::AdminUrlHelper;
///
/// let helper = AdminUrlHelper::new("people", "Person");
/// assert_eq!(helper.model_name_part(), "custom-person");
/// assert_eq!(helper.action_url_pattern("index"), "people/custom-person/");
/// assert_eq!(helper.action_url_pattern("create"), "people/custom-person/create/");
/// assert_eq!(
///     helper.object_action_url_pattern("edit"),
///     "people/custom-person/edit/{instance_pk}/"
/// );
/// assert_eq!(helper.action_url_name("edit"), "people_custom-person_modeladmin_edit");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUrlHelper {
	app_label: String,
	model_name: String,
	url_prefix: Option<String>,
	url_suffix: Option<String>,
	separator: String,
}

impl AdminUrlHelper {
	pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
		Self {
			app_label: app_label.into(),
			model_name: model_name.into().to_lowercase(),
			url_prefix: Some("custom".to_string()),
			url_suffix: None,
			separator: "-".to_string(),
		}
	}

	/// Replace the prefix; `None` drops it
	pub fn with_url_prefix(mut self, prefix: Option<&str>) -> Self {
		self.url_prefix = prefix.map(str::to_string);
		self
	}

	pub fn with_url_suffix(mut self, suffix: Option<&str>) -> Self {
		self.url_suffix = suffix.map(str::to_string);
		self
	}

	pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
		self.separator = separator.into();
		self
	}

	pub fn app_label(&self) -> &str {
		&self.app_label
	}

	pub fn model_name(&self) -> &str {
		&self.model_name
	}

	/// Non-empty parts of prefix, model name and suffix joined by the separator
	pub fn model_name_part(&self) -> String {
		[
			self.url_prefix.as_deref(),
			Some(self.model_name.as_str()),
			self.url_suffix.as_deref(),
		]
		.into_iter()
		.flatten()
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join(&self.separator)
	}

	pub fn action_url_pattern(&self, action: &str) -> String {
		if action == "index" {
			format!("{}/{}/", self.app_label, self.model_name_part())
		} else {
			format!("{}/{}/{}/", self.app_label, self.model_name_part(), action)
		}
	}

	pub fn object_action_url_pattern(&self, action: &str) -> String {
		format!(
			"{}/{}/{}/{{{}}}/",
			self.app_label,
			self.model_name_part(),
			action,
			INSTANCE_PK_PARAM
		)
	}

	pub fn action_url_name(&self, action: &str) -> String {
		format!(
			"{}_{}_modeladmin_{}",
			self.app_label,
			self.model_name_part(),
			action
		)
	}

	/// Routes for the index, create and per-object screens
	pub fn routes(&self) -> Vec<AdminRoute> {
		let collection = ["index", "create"].into_iter().map(|action| AdminRoute {
			name: self.action_url_name(action),
			pattern: self.action_url_pattern(action),
			action: action.to_string(),
		});
		let object = ["edit", "delete", "inspect"]
			.into_iter()
			.map(|action| AdminRoute {
				name: self.action_url_name(action),
				pattern: self.object_action_url_pattern(action),
				action: action.to_string(),
			});
		collection.chain(object).collect()
	}

	pub fn register(&self, registry: &mut UrlRegistry) {
		let routes = self.routes();
		tracing::debug!(
			app = %self.app_label,
			model = %self.model_name,
			count = routes.len(),
			"registering admin routes"
		);
		registry.register_routes(routes);
	}

	pub fn action_url(
		&self,
		reverser: &dyn UrlReverser,
		action: &str,
		params: &HashMap<String, String>,
	) -> JsonAdminResult<String> {
		reverser.reverse(&self.action_url_name(action), params)
	}

	/// Reverse an object-specific action for `pk`
	pub fn object_action_url(
		&self,
		reverser: &dyn UrlReverser,
		action: &str,
		pk: &str,
	) -> JsonAdminResult<String> {
		let params = HashMap::from([(INSTANCE_PK_PARAM.to_string(), pk.to_string())]);
		self.action_url(reverser, action, &params)
	}

	pub fn index_url(&self, reverser: &dyn UrlReverser) -> JsonAdminResult<String> {
		self.action_url(reverser, "index", &HashMap::new())
	}

	pub fn create_url(&self, reverser: &dyn UrlReverser) -> JsonAdminResult<String> {
		self.action_url(reverser, "create", &HashMap::new())
	}
}

/// URL helper for page models edited through the host page editor
///
/// Page editor actions reverse `admin_pages:{action}` and carry a `next`
/// parameter pointing back at the custom index screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAdminUrlHelper {
	base: AdminUrlHelper,
}

impl PageAdminUrlHelper {
	pub fn new(base: AdminUrlHelper) -> Self {
		Self { base }
	}

	pub fn base(&self) -> &AdminUrlHelper {
		&self.base
	}

	pub fn action_url(
		&self,
		reverser: &dyn UrlReverser,
		action: &str,
		params: &HashMap<String, String>,
	) -> JsonAdminResult<String> {
		if !PAGE_EDITOR_ACTIONS.contains(&action) {
			return self.base.action_url(reverser, action, params);
		}
		let url = reverser.reverse(&format!("admin_pages:{action}"), params)?;
		let next = self.base.index_url(reverser)?;
		Ok(format!(
			"{url}?next={}",
			utf8_percent_encode(&next, NEXT_ENCODE_SET)
		))
	}

	pub fn index_url(&self, reverser: &dyn UrlReverser) -> JsonAdminResult<String> {
		self.base.index_url(reverser)
	}
}
