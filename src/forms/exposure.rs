//! Top-level form fields backed by keys nested inside JSON fields

use super::model_form::ModelForm;
use crate::document::{Branch, get_path_or_null, set_path};
use crate::error::JsonAdminResult;
use crate::model::Record;
use crate::path::JsonFieldPath;
use serde_json::Value;
use std::collections::HashMap;

/// Mapping from extra form field names to nested JSON field paths
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{JsonFieldExposure, Record};
/// use serde_json::json;
///
/// let exposure = JsonFieldExposure::new([("name_full", "data__name__full")]).unwrap();
/// let record = Record::from_value(json!({"data": {"name": {"full": "Ada"}}})).unwrap();
/// assert_eq!(exposure.initial_values(&record)["name_full"], json!("Ada"));
///
/// assert!(JsonFieldExposure::new([("slug", "data")]).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonFieldExposure {
	mapping: Vec<(String, JsonFieldPath)>,
}

impl JsonFieldExposure {
	/// Create from `(form field, path)` pairs; every path needs a nested key
	pub fn new<K, P>(mapping: impl IntoIterator<Item = (K, P)>) -> JsonAdminResult<Self>
	where
		K: Into<String>,
		P: AsRef<str>,
	{
		let mapping = mapping
			.into_iter()
			.map(|(formfield, path)| {
				JsonFieldPath::parse(path.as_ref())
					.require_nested()
					.map(|path| (formfield.into(), path))
			})
			.collect::<JsonAdminResult<Vec<_>>>()?;
		Ok(Self { mapping })
	}

	pub fn mapping(&self) -> &[(String, JsonFieldPath)] {
		&self.mapping
	}

	/// Read each mapped value out of `record`; a missing key yields `Value::Null`
	pub fn initial_values(&self, record: &Record) -> HashMap<String, Value> {
		self.mapping
			.iter()
			.map(|(formfield, path)| {
				let value = record
					.get(path.field())
					.map_or(Value::Null, |doc| get_path_or_null(doc, path.nested()));
				(formfield.clone(), value)
			})
			.collect()
	}

	/// Move each mapped cleaned value into its path within `record`
	///
	/// Missing intermediate objects are created. Form fields absent from
	/// `cleaned_data` are skipped.
	pub fn apply(
		&self,
		cleaned_data: &mut HashMap<String, Value>,
		record: &mut Record,
	) -> JsonAdminResult<Vec<(String, Branch)>> {
		let mut applied = Vec::with_capacity(self.mapping.len());
		for (formfield, path) in &self.mapping {
			let Some(value) = cleaned_data.remove(formfield) else {
				tracing::debug!(field = %formfield, "no cleaned value for exposed field");
				continue;
			};
			let branch = set_path(record.entry(path.field()), path.nested(), value)?;
			if branch == Branch::Created {
				tracing::debug!(path = %path, "created missing JSON branch");
			}
			applied.push((formfield.clone(), branch));
		}
		Ok(applied)
	}
}

/// A model form editing nested JSON keys through extra fields
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{
///     ExposedJsonForm, FieldKind, FieldType, FormFieldSpec, JsonFieldExposure, ModelForm, ModelMeta, Record,
/// };
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let meta = ModelMeta::new("people", "person").with_field("data", FieldKind::Json);
/// let form = ModelForm::new(meta).with_field(FormFieldSpec::new("name_full", FieldType::Char));
/// let exposure = JsonFieldExposure::new([("name_full", "data__name__full")]).unwrap();
/// let instance = Record::from_value(json!({"id": 1, "data": {"name": {"full": "Ada"}}})).unwrap();
///
/// let mut form = ExposedJsonForm::new(form, exposure, instance);
/// assert_eq!(form.form().initial()["name_full"], json!("Ada"));
///
/// form.bind(HashMap::from([("name_full".to_string(), json!("Grace"))]));
/// assert!(form.is_valid());
/// let saved = form.save().unwrap();
/// assert_eq!(saved.get("data"), Some(&json!({"name": {"full": "Grace"}})));
/// ```
#[derive(Debug, Clone)]
pub struct ExposedJsonForm {
	form: ModelForm,
	exposure: JsonFieldExposure,
	instance: Record,
}

impl ExposedJsonForm {
	/// Wrap `form`, seeding exposed fields from `instance`
	pub fn new(form: ModelForm, exposure: JsonFieldExposure, instance: Record) -> Self {
		let mut form = form.with_instance(&instance);
		for (formfield, value) in exposure.initial_values(&instance) {
			form.set_initial(formfield, value);
		}
		Self {
			form,
			exposure,
			instance,
		}
	}

	pub fn form(&self) -> &ModelForm {
		&self.form
	}

	pub fn form_mut(&mut self) -> &mut ModelForm {
		&mut self.form
	}

	pub fn instance(&self) -> &Record {
		&self.instance
	}

	pub fn bind(&mut self, data: HashMap<String, Value>) {
		self.form.bind(data);
	}

	pub fn is_valid(&mut self) -> bool {
		self.form.is_valid()
	}

	/// Write model fields, then exposed values into their JSON paths
	///
	/// Exposed values never land on the record as columns of their own. The
	/// instance is replaced only when every write succeeds, and saving the
	/// same binding again gives the same record.
	pub fn save(&mut self) -> JsonAdminResult<Record> {
		let mut instance = self.instance.clone();
		let mut cleaned_data = self.form.cleaned_data().clone();
		self.form.save(&mut instance)?;
		self.exposure.apply(&mut cleaned_data, &mut instance)?;
		self.instance = instance;
		Ok(self.instance.clone())
	}
}
