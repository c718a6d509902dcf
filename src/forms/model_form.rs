use super::widgets::PrettyJsonWidget;
use crate::error::{JsonAdminError, JsonAdminResult};
use crate::model::{FieldKind, ModelMeta, Record};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::Value;
use std::collections::HashMap;

const REQUIRED_MESSAGE: &str = "This field is required.";

/// Kind of value a form field cleans to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
	Char,
	Boolean,
	Integer,
	Json,
}

impl FieldType {
	fn default_widget(self) -> Widget {
		match self {
			FieldType::Char => Widget::TextInput,
			FieldType::Boolean => Widget::CheckboxInput,
			FieldType::Integer => Widget::NumberInput,
			FieldType::Json => Widget::TextArea,
		}
	}

	fn clean(self, value: Option<&Value>, required: bool) -> Result<Value, String> {
		let value = value.unwrap_or(&Value::Null);
		let cleaned = match self {
			FieldType::Char => match value {
				Value::Null => Value::String(String::new()),
				Value::String(s) => Value::String(s.trim().to_string()),
				other => Value::String(other.to_string()),
			},
			FieldType::Boolean => Value::Bool(match value {
				Value::Bool(b) => *b,
				Value::String(s) => matches!(s.to_lowercase().as_str(), "true" | "on" | "1"),
				Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
				_ => false,
			}),
			FieldType::Integer => match value {
				Value::Null => Value::Null,
				Value::String(s) if s.trim().is_empty() => Value::Null,
				Value::String(s) => s
					.trim()
					.parse::<i64>()
					.map(Value::from)
					.map_err(|_| "Enter a whole number.".to_string())?,
				Value::Number(n) if n.is_i64() => value.clone(),
				_ => return Err("Enter a whole number.".to_string()),
			},
			FieldType::Json => match value {
				Value::String(s) if s.trim().is_empty() => Value::Null,
				Value::String(s) => {
					serde_json::from_str(s).map_err(|_| "Enter a valid JSON.".to_string())?
				}
				other => other.clone(),
			},
		};

		let empty = match &cleaned {
			Value::Null => true,
			Value::String(s) => s.is_empty(),
			Value::Bool(b) => !b,
			_ => false,
		};
		if required && empty {
			return Err(REQUIRED_MESSAGE.to_string());
		}
		Ok(cleaned)
	}
}

impl From<FieldKind> for FieldType {
	fn from(kind: FieldKind) -> Self {
		match kind {
			FieldKind::Integer => FieldType::Integer,
			FieldKind::Text => FieldType::Char,
			FieldKind::Boolean => FieldType::Boolean,
			FieldKind::Json => FieldType::Json,
		}
	}
}

/// How a form field is rendered
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
	TextInput,
	NumberInput,
	CheckboxInput,
	TextArea,
	PrettyJson(PrettyJsonWidget),
}

impl Widget {
	/// Render the widget as HTML for `name` holding `value`
	pub fn render(&self, name: &str, value: &Value) -> String {
		let attr = encode_double_quoted_attribute(name);
		match self {
			Widget::TextInput | Widget::NumberInput => {
				let input_type = if matches!(self, Widget::NumberInput) {
					"number"
				} else {
					"text"
				};
				format!(
					r#"<input type="{input_type}" name="{attr}" id="id_{attr}" value="{}">"#,
					encode_double_quoted_attribute(&display_value(value))
				)
			}
			Widget::CheckboxInput => {
				let checked = if value.as_bool().unwrap_or(false) {
					" checked"
				} else {
					""
				};
				format!(r#"<input type="checkbox" name="{attr}" id="id_{attr}"{checked}>"#)
			}
			Widget::TextArea => format!(
				r#"<textarea name="{attr}" id="id_{attr}">{}</textarea>"#,
				encode_text(&display_value(value))
			),
			Widget::PrettyJson(widget) => widget.render(name, value),
		}
	}
}

fn display_value(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// A single form field definition
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{FieldType, FormFieldSpec, Widget};
///
/// let field = FormFieldSpec::new("name_full", FieldType::Char).with_label("Full name");
/// assert_eq!(field.label(), "Full name");
/// assert_eq!(field.widget, Widget::TextInput);
/// assert!(!field.required);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FormFieldSpec {
	pub name: String,
	pub label: Option<String>,
	pub field_type: FieldType,
	pub widget: Widget,
	pub required: bool,
}

impl FormFieldSpec {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			label: None,
			field_type,
			widget: field_type.default_widget(),
			required: false,
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_widget(mut self, widget: Widget) -> Self {
		self.widget = widget;
		self
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Label text, the field name when none was given
	pub fn label(&self) -> &str {
		self.label.as_deref().unwrap_or(&self.name)
	}

	pub fn is_json(&self) -> bool {
		self.field_type == FieldType::Json
	}
}

/// A form over a model's fields, plus any extra non-model fields
///
/// Saving writes only cleaned values of fields the model declares, so extra
/// fields never reach the record as columns.
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::{FieldKind, ModelForm, ModelMeta, Record};
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let meta = ModelMeta::new("people", "person").with_field("name", FieldKind::Text);
/// let mut form = ModelForm::for_model(meta, &["name"]).unwrap();
///
/// form.bind(HashMap::from([("name".to_string(), json!("Ada"))]));
/// assert!(form.is_valid());
///
/// let mut record = Record::new();
/// form.save(&mut record).unwrap();
/// assert_eq!(record.get("name"), Some(&json!("Ada")));
/// ```
#[derive(Debug, Clone)]
pub struct ModelForm {
	meta: ModelMeta,
	fields: Vec<FormFieldSpec>,
	initial: HashMap<String, Value>,
	data: HashMap<String, Value>,
	cleaned_data: HashMap<String, Value>,
	errors: HashMap<String, Vec<String>>,
	is_bound: bool,
	validated: bool,
}

impl ModelForm {
	/// Create a form with no fields
	pub fn new(meta: ModelMeta) -> Self {
		Self {
			meta,
			fields: Vec::new(),
			initial: HashMap::new(),
			data: HashMap::new(),
			cleaned_data: HashMap::new(),
			errors: HashMap::new(),
			is_bound: false,
			validated: false,
		}
	}

	/// Create a form over the named model fields
	pub fn for_model(meta: ModelMeta, field_names: &[&str]) -> JsonAdminResult<Self> {
		let mut fields = Vec::with_capacity(field_names.len());
		for name in field_names {
			let field = meta.get_field(name).ok_or_else(|| {
				JsonAdminError::Config(format!(
					"Unknown field '{}' specified for {}",
					name,
					meta.model_name()
				))
			})?;
			fields.push(FormFieldSpec::new(field.name.clone(), field.kind.into()));
		}
		let mut form = Self::new(meta);
		form.fields = fields;
		Ok(form)
	}

	/// Add a field, replacing any field of the same name
	pub fn with_field(mut self, field: FormFieldSpec) -> Self {
		self.add_field(field);
		self
	}

	pub fn add_field(&mut self, field: FormFieldSpec) {
		match self.fields.iter_mut().find(|f| f.name == field.name) {
			Some(existing) => *existing = field,
			None => self.fields.push(field),
		}
	}

	/// Seed initial values from an existing record's model fields
	pub fn with_instance(mut self, instance: &Record) -> Self {
		for field in &self.fields {
			if self.meta.get_field(&field.name).is_some()
				&& let Some(value) = instance.get(&field.name)
			{
				self.initial.insert(field.name.clone(), value.clone());
			}
		}
		self
	}

	pub fn meta(&self) -> &ModelMeta {
		&self.meta
	}

	pub fn fields(&self) -> &[FormFieldSpec] {
		&self.fields
	}

	pub fn fields_mut(&mut self) -> &mut [FormFieldSpec] {
		&mut self.fields
	}

	pub fn get_field(&self, name: &str) -> Option<&FormFieldSpec> {
		self.fields.iter().find(|f| f.name == name)
	}

	pub fn initial(&self) -> &HashMap<String, Value> {
		&self.initial
	}

	pub fn set_initial(&mut self, name: impl Into<String>, value: Value) {
		self.initial.insert(name.into(), value);
	}

	/// Bind submitted data; results of any earlier validation are dropped
	pub fn bind(&mut self, data: HashMap<String, Value>) {
		self.data = data;
		self.is_bound = true;
		self.validated = false;
		self.cleaned_data.clear();
		self.errors.clear();
	}

	pub fn is_bound(&self) -> bool {
		self.is_bound
	}

	/// Clean every field, collecting errors; an unbound form is never valid
	pub fn is_valid(&mut self) -> bool {
		if !self.is_bound {
			return false;
		}

		self.errors.clear();
		self.cleaned_data.clear();

		for field in &self.fields {
			match field
				.field_type
				.clean(self.data.get(&field.name), field.required)
			{
				Ok(cleaned) => {
					self.cleaned_data.insert(field.name.clone(), cleaned);
				}
				Err(e) => {
					self.errors.entry(field.name.clone()).or_default().push(e);
				}
			}
		}

		self.validated = true;
		self.errors.is_empty()
	}

	pub fn cleaned_data(&self) -> &HashMap<String, Value> {
		&self.cleaned_data
	}

	pub fn cleaned_data_mut(&mut self) -> &mut HashMap<String, Value> {
		&mut self.cleaned_data
	}

	pub fn errors(&self) -> &HashMap<String, Vec<String>> {
		&self.errors
	}

	/// Write cleaned model field values into `record`
	///
	/// The current binding must have passed [`ModelForm::is_valid`].
	pub fn save(&self, record: &mut Record) -> JsonAdminResult<()> {
		if !self.is_bound {
			return Err(JsonAdminError::InvalidForm("form is not bound".to_string()));
		}
		if !self.validated {
			return Err(JsonAdminError::InvalidForm(
				"form has not been validated".to_string(),
			));
		}
		if !self.errors.is_empty() {
			let mut names: Vec<&str> = self.errors.keys().map(String::as_str).collect();
			names.sort_unstable();
			return Err(JsonAdminError::InvalidForm(names.join(", ")));
		}
		for field in &self.fields {
			if self.meta.get_field(&field.name).is_none() {
				continue;
			}
			if let Some(value) = self.cleaned_data.get(&field.name) {
				record.set(field.name.clone(), value.clone());
			}
		}
		Ok(())
	}

	/// Current value shown for a field: bound data, else initial
	pub fn value(&self, name: &str) -> Value {
		let source = if self.is_bound {
			&self.data
		} else {
			&self.initial
		};
		source.get(name).cloned().unwrap_or(Value::Null)
	}

	/// Render every field with its label as HTML
	pub fn render(&self) -> String {
		self.fields
			.iter()
			.map(|field| {
				format!(
					r#"<label for="id_{}">{}</label>{}"#,
					encode_double_quoted_attribute(&field.name),
					encode_text(field.label()),
					field.widget.render(&field.name, &self.value(&field.name))
				)
			})
			.collect::<Vec<_>>()
			.join("\n")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use serde_json::json;

	#[fixture]
	fn meta() -> ModelMeta {
		ModelMeta::new("people", "person")
			.with_field("name", FieldKind::Text)
			.with_field("age", FieldKind::Integer)
			.with_field("active", FieldKind::Boolean)
			.with_field("data", FieldKind::Json)
	}

	#[rstest]
	#[case(FieldType::Char, json!("  Ada "), json!("Ada"))]
	#[case(FieldType::Char, Value::Null, json!(""))]
	#[case(FieldType::Boolean, json!("on"), json!(true))]
	#[case(FieldType::Boolean, Value::Null, json!(false))]
	#[case(FieldType::Integer, json!("42"), json!(42))]
	#[case(FieldType::Integer, json!(""), Value::Null)]
	#[case(FieldType::Json, json!(r#"{"a": 1}"#), json!({"a": 1}))]
	#[case(FieldType::Json, json!({"a": 1}), json!({"a": 1}))]
	fn test_clean(#[case] field_type: FieldType, #[case] input: Value, #[case] expected: Value) {
		assert_eq!(field_type.clean(Some(&input), false), Ok(expected));
	}

	#[rstest]
	#[case(FieldType::Integer, json!("abc"))]
	#[case(FieldType::Json, json!("{not json"))]
	fn test_clean_rejects(#[case] field_type: FieldType, #[case] input: Value) {
		assert!(field_type.clean(Some(&input), false).is_err());
	}

	#[rstest]
	fn test_required_field_missing(meta: ModelMeta) {
		let mut form =
			ModelForm::new(meta).with_field(FormFieldSpec::new("name", FieldType::Char).required());
		form.bind(HashMap::new());
		assert!(!form.is_valid());
		assert_eq!(form.errors()["name"], vec![REQUIRED_MESSAGE.to_string()]);
		assert!(matches!(
			form.save(&mut Record::new()),
			Err(JsonAdminError::InvalidForm(_))
		));
	}

	#[rstest]
	fn test_unknown_model_field(meta: ModelMeta) {
		let err = ModelForm::for_model(meta, &["nickname"]).unwrap_err();
		assert!(err.is_configuration());
	}

	#[rstest]
	fn test_save_skips_extra_fields(meta: ModelMeta) {
		let mut form = ModelForm::for_model(meta, &["name"])
			.unwrap()
			.with_field(FormFieldSpec::new("name_full", FieldType::Char));
		form.bind(HashMap::from([
			("name".to_string(), json!("Ada")),
			("name_full".to_string(), json!("Ada Lovelace")),
		]));
		assert!(form.is_valid());

		let mut record = Record::new();
		form.save(&mut record).unwrap();
		assert_eq!(record.get("name"), Some(&json!("Ada")));
		assert!(!record.contains("name_full"));
	}

	#[rstest]
	fn test_save_requires_validation_of_current_binding(meta: ModelMeta) {
		let mut form = ModelForm::for_model(meta, &["name"]).unwrap();
		form.bind(HashMap::from([("name".to_string(), json!("old"))]));
		let err = form.save(&mut Record::new()).unwrap_err();
		assert!(matches!(err, JsonAdminError::InvalidForm(ref m) if m == "form has not been validated"));

		assert!(form.is_valid());
		form.bind(HashMap::from([("name".to_string(), json!("new"))]));
		assert!(form.cleaned_data().is_empty());
		let mut record = Record::new();
		assert!(matches!(
			form.save(&mut record),
			Err(JsonAdminError::InvalidForm(_))
		));
		assert!(record.get("name").is_none());

		assert!(form.is_valid());
		form.save(&mut record).unwrap();
		assert_eq!(record.get("name"), Some(&json!("new")));
	}

	#[rstest]
	fn test_unbound_form_uses_instance_initial(meta: ModelMeta) {
		let instance = Record::from_value(json!({"id": 1, "name": "Ada", "age": 36})).unwrap();
		let form = ModelForm::for_model(meta, &["name", "age"])
			.unwrap()
			.with_instance(&instance);
		assert!(!form.is_bound());
		assert_eq!(form.value("name"), json!("Ada"));
		assert_eq!(form.value("age"), json!(36));
	}

	#[rstest]
	fn test_render_escapes_values(meta: ModelMeta) {
		let mut form = ModelForm::for_model(meta, &["name"]).unwrap();
		form.set_initial("name", json!("<b>\"x\"</b>"));
		let html = form.render();
		assert!(html.contains(r#"<label for="id_name">name</label>"#));
		assert!(!html.contains("<b>"));
	}
}
