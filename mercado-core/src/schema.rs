//! Structural contracts for response bodies. A schema lists required field
//! names and their primitive kinds; validation checks presence and type,
//! never deep value equality, and ignores fields it does not know about.

use serde_json::Value;

use crate::{Error, Result};

/// Primitive kind a required field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Str => write!(f, "string"),
            FieldKind::Int => write!(f, "integer"),
        }
    }
}

/// A structural contract for a JSON object body.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    required: Vec<(String, FieldKind)>,
}

impl Schema {
    pub fn object() -> Schema {
        Schema::default()
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Schema {
        self.required.push((name.into(), kind));
        self
    }

    /// Validate a body against the contract, failing on the first missing or
    /// mistyped field with field-level detail.
    pub fn validate(&self, body: &Value) -> Result<()> {
        let Some(object) = body.as_object() else {
            return Err(Error::Schema {
                field: "$".into(),
                detail: format!("expected a JSON object, got {}", kind_of(body)),
            });
        };

        for (name, kind) in &self.required {
            let Some(value) = object.get(name) else {
                return Err(Error::Schema {
                    field: name.clone(),
                    detail: "required field is missing".into(),
                });
            };

            let matches = match kind {
                FieldKind::Str => value.is_string(),
                FieldKind::Int => value.is_i64() || value.is_u64(),
            };
            if !matches {
                return Err(Error::Schema {
                    field: name.clone(),
                    detail: format!("expected {kind}, got {}", kind_of(value)),
                });
            }
        }

        Ok(())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn mercado_schema() -> Schema {
        Schema::object()
            .field("cnpj", FieldKind::Str)
            .field("endereco", FieldKind::Str)
            .field("id", FieldKind::Int)
            .field("nome", FieldKind::Str)
    }

    #[test]
    fn accepts_matching_object() {
        let body = json!({
            "cnpj": "12345678901234",
            "endereco": "Rua das Flores, 10",
            "id": 7,
            "nome": "Feira Central",
        });
        assert!(mercado_schema().validate(&body).is_ok());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let body = json!({
            "cnpj": "12345678901234",
            "endereco": "Rua das Flores, 10",
            "id": 7,
            "nome": "Feira Central",
            "produtos": [],
        });
        assert!(mercado_schema().validate(&body).is_ok());
    }

    #[test]
    fn missing_field_is_named_in_the_error() {
        let body = json!({
            "cnpj": "12345678901234",
            "endereco": "Rua das Flores, 10",
            "nome": "Feira Central",
        });
        let err = mercado_schema().validate(&body).unwrap_err();
        assert!(matches!(&err, Error::Schema { field, .. } if field == "id"));
    }

    #[test_case(json!({"id": "7"}), "id"; "string where integer expected")]
    #[test_case(json!({"id": 7.5}), "id"; "float where integer expected")]
    #[test_case(json!({"id": null}), "id"; "null where integer expected")]
    fn wrong_primitive_type_fails(body: Value, field: &str) {
        let schema = Schema::object().field("id", FieldKind::Int);
        let err = schema.validate(&body).unwrap_err();
        assert!(matches!(&err, Error::Schema { field: f, .. } if f == field));
    }

    #[test]
    fn non_object_body_fails() {
        let err = mercado_schema().validate(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(&err, Error::Schema { field, .. } if field == "$"));
    }
}
