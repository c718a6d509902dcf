//! Interactive editing widget for JSON document fields

use super::model_form::{ModelForm, Widget};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fmt;

/// What the client-side editor receives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrettyJsonMode {
	/// Parse the value and pretty-print it; unparsable text is shown as is
	#[default]
	Parsed,
	/// Show string values verbatim without reformatting
	Raw,
}

impl fmt::Display for PrettyJsonMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PrettyJsonMode::Parsed => write!(f, "parsed"),
			PrettyJsonMode::Raw => write!(f, "raw"),
		}
	}
}

/// Textarea carrying pretty-printed JSON plus `data-*` hooks for the editor script
///
/// # Examples
///
/// ```
/// use reinhardt_admin_jsonfield::PrettyJsonWidget;
/// use serde_json::json;
///
/// let html = PrettyJsonWidget::default().render("data", &json!({"a": "<b>"}));
/// assert!(html.starts_with("<textarea"));
/// assert!(html.contains(r#"data-json-editor="parsed""#));
/// assert!(html.contains("&lt;b&gt;"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrettyJsonWidget {
	pub mode: PrettyJsonMode,
	pub indent: usize,
}

impl Default for PrettyJsonWidget {
	fn default() -> Self {
		Self {
			mode: PrettyJsonMode::Parsed,
			indent: 2,
		}
	}
}

impl PrettyJsonWidget {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_mode(mut self, mode: PrettyJsonMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn with_indent(mut self, indent: usize) -> Self {
		self.indent = indent;
		self
	}

	/// Text placed inside the textarea, before HTML escaping
	pub fn format_value(&self, value: &Value) -> String {
		match (self.mode, value) {
			(_, Value::Null) => String::new(),
			(PrettyJsonMode::Raw, Value::String(s)) => s.clone(),
			(PrettyJsonMode::Raw, other) => other.to_string(),
			(PrettyJsonMode::Parsed, Value::String(s)) => match serde_json::from_str::<Value>(s) {
				Ok(parsed) => self.pretty(&parsed),
				Err(_) => s.clone(),
			},
			(PrettyJsonMode::Parsed, other) => self.pretty(other),
		}
	}

	fn pretty(&self, value: &Value) -> String {
		let indent = " ".repeat(self.indent);
		let mut buf = Vec::new();
		let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
		match value.serialize(&mut ser) {
			Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
			Err(_) => value.to_string(),
		}
	}

	pub fn render(&self, name: &str, value: &Value) -> String {
		let content = self.format_value(value);
		let rows = content.lines().count().clamp(4, 30);
		let attr = encode_double_quoted_attribute(name);
		format!(
			r#"<textarea name="{attr}" id="id_{attr}" class="json-editor" rows="{rows}" data-json-editor="{}" data-json-indent="{}">{}</textarea>"#,
			self.mode,
			self.indent,
			encode_text(&content)
		)
	}
}

/// Swap the widget of every JSON-typed field for [`PrettyJsonWidget`]
///
/// Returns the number of fields changed.
pub fn prettify_json_fields(form: &mut ModelForm) -> usize {
	let mut changed = 0;
	for field in form.fields_mut().iter_mut().filter(|f| f.is_json()) {
		field.widget = Widget::PrettyJson(PrettyJsonWidget::default());
		changed += 1;
	}
	tracing::debug!(fields = changed, "using pretty JSON widget");
	changed
}

/// A model form whose JSON fields render with [`PrettyJsonWidget`]
#[derive(Debug, Clone)]
pub struct PrettyJsonForm {
	form: ModelForm,
}

impl PrettyJsonForm {
	pub fn new(mut form: ModelForm) -> Self {
		prettify_json_fields(&mut form);
		Self { form }
	}

	pub fn form(&self) -> &ModelForm {
		&self.form
	}

	pub fn form_mut(&mut self) -> &mut ModelForm {
		&mut self.form
	}

	pub fn into_inner(self) -> ModelForm {
		self.form
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::forms::model_form::{FieldType, FormFieldSpec};
	use crate::model::{FieldKind, ModelMeta};
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(PrettyJsonMode::Parsed, json!({"a": [1]}), "{\n  \"a\": [\n    1\n  ]\n}")]
	#[case(PrettyJsonMode::Parsed, json!("{\"a\":1}"), "{\n  \"a\": 1\n}")]
	#[case(PrettyJsonMode::Parsed, json!("{broken"), "{broken")]
	#[case(PrettyJsonMode::Raw, json!("{\"a\":1}"), "{\"a\":1}")]
	#[case(PrettyJsonMode::Raw, json!({"a": 1}), "{\"a\":1}")]
	#[case(PrettyJsonMode::Parsed, Value::Null, "")]
	fn test_format_value(#[case] mode: PrettyJsonMode, #[case] value: Value, #[case] expected: &str) {
		let widget = PrettyJsonWidget::new().with_mode(mode);
		assert_eq!(widget.format_value(&value), expected);
	}

	#[test]
	fn test_custom_indent() {
		let widget = PrettyJsonWidget::new().with_indent(4);
		assert_eq!(widget.format_value(&json!({"a": 1})), "{\n    \"a\": 1\n}");
	}

	#[test]
	fn test_prettify_only_touches_json_fields() {
		let meta = ModelMeta::new("people", "person")
			.with_field("name", FieldKind::Text)
			.with_field("data", FieldKind::Json);
		let form = PrettyJsonForm::new(
			ModelForm::for_model(meta, &["name", "data"])
				.unwrap()
				.with_field(FormFieldSpec::new("extra", FieldType::Json)),
		);
		let widgets: Vec<_> = form.form().fields().iter().map(|f| &f.widget).collect();
		assert_eq!(widgets[0], &Widget::TextInput);
		assert_eq!(widgets[1], &Widget::PrettyJson(PrettyJsonWidget::default()));
		assert_eq!(widgets[2], &Widget::PrettyJson(PrettyJsonWidget::default()));
	}

	#[test]
	fn test_render_escapes_name_and_content() {
		let html = PrettyJsonWidget::new().render("a\"b", &json!({"k": "</textarea>"}));
		assert!(html.contains(r#"name="a&quot;b""#));
		assert_eq!(html.matches("</textarea>").count(), 1);
	}
}
