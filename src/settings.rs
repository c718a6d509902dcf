//! Admin configuration loaded from TOML
//!
//! ```toml
//! url_mount = "/admin/"
//!
//! [[admin]]
//! name = "PersonAdmin"
//! app_label = "people"
//! model = "person"
//! search_fields = ["pk", "name"]
//! json_search_fields = ["data__name__full"]
//!
//! [admin.fields]
//! name = "text"
//! data = "json"
//!
//! [admin.formfield_to_jsonfield_path]
//! name_full = "data__name__full"
//!
//! [[admin.list_filter]]
//! field_path = "data__active"
//! parameter_name = "active"
//! value_type = "bool"
//! ```
//!
//! Parsing validates every admin by building its components, so a bad value
//! type or JSON search without search fields is reported at load time.

use crate::error::JsonAdminResult;
use crate::filters::{JsonFieldListFilter, jsonfield_list_filter};
use crate::forms::JsonFieldExposure;
use crate::model::{FieldKind, ModelMeta};
use crate::ordering::JsonOrdering;
use crate::search::JsonSearch;
use crate::urls::{AdminUrlHelper, UrlRegistry};
use crate::views::IndexView;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

fn default_url_mount() -> String {
	"/admin/".to_string()
}

fn default_url_prefix() -> String {
	"custom".to_string()
}

fn default_separator() -> String {
	"-".to_string()
}

/// Top-level settings: every configured model admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonAdminSettings {
	#[serde(default = "default_url_mount")]
	pub url_mount: String,
	#[serde(default, rename = "admin")]
	pub admins: Vec<ModelAdminSettings>,
}

impl Default for JsonAdminSettings {
	fn default() -> Self {
		Self {
			url_mount: default_url_mount(),
			admins: Vec::new(),
		}
	}
}

impl JsonAdminSettings {
	/// Read and validate settings from a TOML file
	pub fn from_file(path: impl AsRef<Path>) -> JsonAdminResult<Self> {
		let content = std::fs::read_to_string(path.as_ref())?;
		tracing::debug!(path = %path.as_ref().display(), "loading admin settings");
		Self::from_toml(&content)
	}

	/// Parse and validate settings from a TOML string
	pub fn from_toml(content: &str) -> JsonAdminResult<Self> {
		let settings: Self = toml::from_str(content)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Build every admin's components once, returning the first failure
	pub fn validate(&self) -> JsonAdminResult<()> {
		for admin in &self.admins {
			admin.validate()?;
		}
		Ok(())
	}

	pub fn admin(&self, name: &str) -> Option<&ModelAdminSettings> {
		self.admins.iter().find(|a| a.name == name)
	}

	/// Registry holding the routes of every configured admin
	pub fn url_registry(&self) -> UrlRegistry {
		let mut registry = UrlRegistry::new().with_mount(&self.url_mount);
		for admin in &self.admins {
			admin.url_helper().register(&mut registry);
		}
		registry
	}
}

/// One list filter entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilterSettings {
	pub field_path: String,
	pub parameter_name: String,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub value_type: Option<String>,
}

/// URL options for a model admin's custom screens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlSettings {
	/// An empty prefix drops it from the model name part
	#[serde(default = "default_url_prefix")]
	pub prefix: String,
	#[serde(default)]
	pub suffix: Option<String>,
	#[serde(default = "default_separator")]
	pub separator: String,
}

impl Default for UrlSettings {
	fn default() -> Self {
		Self {
			prefix: default_url_prefix(),
			suffix: None,
			separator: default_separator(),
		}
	}
}

/// Configuration of one model admin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAdminSettings {
	/// Admin name, used in configuration error messages
	pub name: String,
	pub app_label: String,
	pub model: String,
	#[serde(default)]
	pub table: Option<String>,
	#[serde(default)]
	pub pk_field: Option<String>,
	#[serde(default)]
	pub fields: BTreeMap<String, FieldKind>,
	#[serde(default)]
	pub search_fields: Vec<String>,
	#[serde(default)]
	pub json_search_fields: Vec<String>,
	#[serde(default)]
	pub ordering: Vec<String>,
	#[serde(default)]
	pub list_filter: Vec<ListFilterSettings>,
	#[serde(default)]
	pub formfield_to_jsonfield_path: BTreeMap<String, String>,
	#[serde(default)]
	pub urls: UrlSettings,
}

impl ModelAdminSettings {
	pub fn model_meta(&self) -> ModelMeta {
		let mut meta = ModelMeta::new(&self.app_label, &self.model);
		if let Some(pk_field) = &self.pk_field {
			meta = meta.with_pk_field(pk_field);
		}
		if let Some(table) = &self.table {
			meta = meta.with_table_name(table);
		}
		for (name, kind) in &self.fields {
			meta = meta.with_field(name, *kind);
		}
		meta
	}

	pub fn list_filters(&self) -> JsonAdminResult<Vec<JsonFieldListFilter>> {
		self.list_filter
			.iter()
			.map(|f| {
				jsonfield_list_filter(
					&f.field_path,
					&f.parameter_name,
					f.title.as_deref(),
					f.value_type.as_deref(),
				)
			})
			.collect()
	}

	pub fn json_search(&self) -> JsonAdminResult<JsonSearch> {
		JsonSearch::new(
			&self.name,
			&self.model_meta(),
			self.search_fields.clone(),
			self.json_search_fields.clone(),
		)
	}

	pub fn json_ordering(&self) -> JsonOrdering {
		JsonOrdering::new(self.model_meta())
	}

	pub fn exposure(&self) -> JsonAdminResult<JsonFieldExposure> {
		JsonFieldExposure::new(
			self.formfield_to_jsonfield_path
				.iter()
				.map(|(formfield, path)| (formfield.as_str(), path.as_str())),
		)
	}

	pub fn url_helper(&self) -> AdminUrlHelper {
		AdminUrlHelper::new(&self.app_label, &self.model)
			.with_url_prefix(Some(self.urls.prefix.as_str()))
			.with_url_suffix(self.urls.suffix.as_deref())
			.with_separator(&self.urls.separator)
	}

	/// Assemble the listing view with search, ordering and list filters
	pub fn index_view(&self) -> JsonAdminResult<IndexView> {
		let mut view = IndexView::new(self.model_meta())
			.with_search(self.json_search()?)
			.with_ordering(self.json_ordering());
		if !self.ordering.is_empty() {
			view = view.with_default_ordering(self.ordering.clone());
		}
		for filter in self.list_filters()? {
			view = view.with_list_filter(filter);
		}
		Ok(view)
	}

	pub fn validate(&self) -> JsonAdminResult<()> {
		self.index_view()?;
		self.exposure()?;
		Ok(())
	}
}
