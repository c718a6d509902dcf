//! Admin model forms for records carrying JSON document fields
//!
//! - [`ModelForm`]: binds, cleans and saves the model's own fields
//! - [`JsonFieldExposure`] / [`ExposedJsonForm`]: edit keys nested inside a
//!   JSON field through extra top-level form fields
//! - [`PrettyJsonWidget`] / [`PrettyJsonForm`]: interactive editor for JSON fields

pub mod exposure;
pub mod model_form;
pub mod widgets;

pub use exposure::{ExposedJsonForm, JsonFieldExposure};
pub use model_form::{FieldType, FormFieldSpec, ModelForm, Widget};
pub use widgets::{PrettyJsonForm, PrettyJsonMode, PrettyJsonWidget, prettify_json_fields};
