//! Error types for JSON field admin helpers

use thiserror::Error;

/// Errors raised by the JSON field admin helpers
///
/// Configuration errors are returned from constructors so a misconfigured
/// admin fails before it serves any request.
#[derive(Debug, Error)]
pub enum JsonAdminError {
	/// A list filter was configured with a value type it cannot coerce to
	#[error("The value type {0:?} is not supported, only none or \"bool\"")]
	UnsupportedValueType(String),

	/// JSON search paths were configured on an admin without standard search fields
	#[error(
		"'search_fields' must be defined on admin {admin} before 'json_search_fields' will work properly. \
		 Define at least `search_fields = [\"pk\"]` if no other fields are appropriate for searching"
	)]
	SearchFieldsRequired { admin: String },

	/// A path string that must address a nested key has no nested segment
	#[error("Field path '{0}' does not address a key inside a JSON field")]
	EmptyJsonPath(String),

	/// A field or table name cannot be used as an SQL identifier
	#[error("Invalid identifier '{0}'")]
	InvalidIdentifier(String),

	/// A value along a document path exists but is not a JSON object
	#[error("Cannot descend into '{segment}' of '{path}': value is not an object")]
	NotAMapping { path: String, segment: String },

	/// A form was saved while it has validation errors
	#[error("Form is not valid: {0}")]
	InvalidForm(String),

	/// No route is registered under the requested name
	#[error("No route named '{0}'")]
	RouteNotFound(String),

	/// A route pattern placeholder was not supplied when reversing
	#[error("Missing parameter '{param}' for route '{route}'")]
	MissingRouteParameter { route: String, param: String },

	/// A reverse parameter contains path or query delimiters
	#[error("Invalid parameter value for '{0}'")]
	InvalidRouteParameter(String),

	/// Settings could not be parsed
	#[error("Configuration error: {0}")]
	Config(String),

	/// Settings file could not be read
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// The backing store failed
	#[error("Database error: {0}")]
	Database(String),
}

impl From<toml::de::Error> for JsonAdminError {
	fn from(err: toml::de::Error) -> Self {
		JsonAdminError::Config(err.to_string())
	}
}

/// Result type for JSON field admin helpers
pub type JsonAdminResult<T> = Result<T, JsonAdminError>;

impl JsonAdminError {
	/// Whether this error is a configuration mistake rather than a runtime failure
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			JsonAdminError::UnsupportedValueType(_)
				| JsonAdminError::SearchFieldsRequired { .. }
				| JsonAdminError::EmptyJsonPath(_)
				| JsonAdminError::InvalidIdentifier(_)
				| JsonAdminError::Config(_)
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_search_fields_required_names_admin() {
		let err = JsonAdminError::SearchFieldsRequired {
			admin: "PersonAdmin".to_string(),
		};
		let msg = err.to_string();
		assert!(msg.contains("PersonAdmin"));
		assert!(msg.contains("search_fields"));
		assert!(err.is_configuration());
	}

	#[test]
	fn test_runtime_errors_are_not_configuration() {
		assert!(!JsonAdminError::Database("boom".into()).is_configuration());
		assert!(!JsonAdminError::RouteNotFound("x".into()).is_configuration());
	}
}
