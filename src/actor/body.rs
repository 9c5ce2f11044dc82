//! Typed access to message body fields.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde_json::Value;

// Layer 3: Internal module imports
use super::error::ActorError;

/// Field accessors for JSON message bodies.
///
/// Each accessor turns an absent or mistyped field into an
/// [`ActorError::MalformedBody`] naming the offending key, so handlers can
/// lean on `?` instead of unwrapping options.
pub trait BodyExt {
    /// A required string field.
    fn str_field(&self, key: &str) -> Result<&str, ActorError>;

    /// A required unsigned integer field.
    fn u64_field(&self, key: &str) -> Result<u64, ActorError>;

    /// A required boolean field.
    fn bool_field(&self, key: &str) -> Result<bool, ActorError>;
}

impl BodyExt for Value {
    fn str_field(&self, key: &str) -> Result<&str, ActorError> {
        self.get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| ActorError::MalformedBody(format!("expected string field `{key}`")))
    }

    fn u64_field(&self, key: &str) -> Result<u64, ActorError> {
        self.get(key)
            .and_then(Value::as_u64)
            .ok_or_else(|| ActorError::MalformedBody(format!("expected integer field `{key}`")))
    }

    fn bool_field(&self, key: &str) -> Result<bool, ActorError> {
        self.get(key)
            .and_then(Value::as_bool)
            .ok_or_else(|| ActorError::MalformedBody(format!("expected boolean field `{key}`")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_present_fields() {
        let body = json!({ "name": "droid", "hp": 50, "infected": true });

        assert_eq!(body.str_field("name").unwrap(), "droid");
        assert_eq!(body.u64_field("hp").unwrap(), 50);
        assert!(body.bool_field("infected").unwrap());
    }

    #[test]
    fn test_missing_field_names_key() {
        let body = json!({});
        let err = body.str_field("room").unwrap_err();

        assert!(err.to_string().contains("`room`"));
    }

    #[test]
    fn test_mistyped_field_is_malformed() {
        let body = json!({ "hp": "lots" });

        assert!(matches!(
            body.u64_field("hp"),
            Err(ActorError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_null_body() {
        assert!(Value::Null.str_field("anything").is_err());
    }
}
