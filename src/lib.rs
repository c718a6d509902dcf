//! # reinhardt-admin-jsonfield
//!
//! Admin helpers for models that keep part of their data in JSON document
//! fields.
//!
//! Nested keys are addressed with the usual `__` lookup syntax
//! (`data__name__full`) and exposed to the admin as if they were columns:
//!
//! - **filters**: list filters offering the distinct values found at a path
//! - **search**: case-insensitive search inside JSON fields, unioned with the
//!   regular search over `search_fields`
//! - **ordering**: sorting the listing by the text value at a path
//! - **forms**: extra form fields bound to nested keys, and a pretty JSON widget
//! - **urls**: patterns and named routes for custom admin screens
//!
//! Queries are described as [`QuerySet`]s and run by a [`DocumentStore`].
//! [`InMemoryStore`] evaluates them directly; with the `postgres` feature
//! `PgDocumentStore` executes the JSONB SQL built by the [`sql`] module.
//!
//! ## Features
//!
//! - `default`: No features enabled by default
//! - `postgres`: PostgreSQL store backed by `sqlx`
//!
//! ## Examples
//!
//! ```
//! use reinhardt_admin_jsonfield::{JsonAdminSettings, ListRequest};
//!
//! let settings = JsonAdminSettings::from_toml(r#"
//! [[admin]]
//! name = "PersonAdmin"
//! app_label = "people"
//! model = "person"
//! search_fields = ["pk"]
//! json_search_fields = ["data__name__full"]
//!
//! [admin.fields]
//! data = "json"
//! "#).unwrap();
//!
//! let view = settings.admin("PersonAdmin").unwrap().index_view().unwrap();
//! let queryset = view.get_queryset(&ListRequest::from_query("q=ada&o=-data__name__full"));
//! assert!(queryset.condition().is_some());
//! ```

pub mod document;
pub mod error;
pub mod filters;
pub mod forms;
pub mod model;
pub mod ordering;
pub mod path;
pub mod query;
pub mod search;
pub mod settings;
pub mod sql;
pub mod store;
pub mod urls;
pub mod views;

pub use document::Branch;
pub use error::{JsonAdminError, JsonAdminResult};
pub use filters::{FilterSpec, JsonFieldListFilter, ListFilter, ValueType, jsonfield_list_filter};
pub use forms::{
	ExposedJsonForm, FieldType, FormFieldSpec, JsonFieldExposure, ModelForm, PrettyJsonForm,
	PrettyJsonMode, PrettyJsonWidget, Widget, prettify_json_fields,
};
pub use model::{FieldKind, FieldMeta, ModelMeta, PK_ALIAS, Record};
pub use ordering::{JsonOrdering, OrderingProvider};
pub use path::{JsonFieldPath, LOOKUP_SEP, jsonfield_path_split};
pub use query::{FieldRef, Filter, FilterCondition, Lookup, OrderingExpr, QuerySet};
pub use search::{JsonSearch, SearchProvider, StandardSearch};
pub use settings::{JsonAdminSettings, ListFilterSettings, ModelAdminSettings, UrlSettings};
pub use store::{DocumentStore, InMemoryStore};
#[cfg(feature = "postgres")]
pub use store::PgDocumentStore;
pub use urls::{AdminRoute, AdminUrlHelper, PageAdminUrlHelper, UrlRegistry, UrlReverser};
pub use views::{FilterChoices, IndexView, ListRequest};
