//! Assertion evaluator. Expectations are evaluated on a captured response in
//! order; the status code is always checked before any schema expectation,
//! and the first unmet expectation fails the step. Every evaluated
//! expectation publishes a per-step check event to the runner channel so
//! reporters can render it.

use serde_json::Value;

use crate::{
    http::{Response, StatusCode},
    runner::{self, Check},
    schema::Schema,
    Error, Result,
};

/// A terminalized response: status code plus decoded JSON body, ready to be
/// bound under a key for later steps.
#[derive(Debug, Clone)]
pub struct Capture {
    pub status: StatusCode,
    pub body: Value,
}

impl Capture {
    pub fn int(&self, field: &str) -> Result<i64> {
        self.body
            .get(field)
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Schema {
                field: field.into(),
                detail: "expected an integer field".into(),
            })
    }

    pub fn str(&self, field: &str) -> Result<&str> {
        self.body
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Schema {
                field: field.into(),
                detail: "expected a string field".into(),
            })
    }

    /// The entity identifier assigned by the remote service on creation.
    pub fn id(&self) -> Result<i64> {
        self.int("id")
    }
}

impl Response {
    /// Expect an exact status code.
    pub fn expect_status(self, expected: StatusCode) -> Result<Response> {
        let actual = self.status();
        if actual != expected {
            let err = Error::StatusMismatch {
                url: self.url().to_string(),
                expected,
                actual,
            };
            runner::publish_check(Check::failed(err.to_string()));
            return Err(err);
        }

        runner::publish_check(Check::passed(format!(
            "{} {} responded {actual}",
            self.method, self.url
        )));
        Ok(self)
    }

    /// Expect the body to satisfy a structural contract.
    pub fn expect_schema(self, schema: &Schema) -> Result<Response> {
        let body: Value = self.json()?;
        if let Err(err) = schema.validate(&body) {
            runner::publish_check(Check::failed(err.to_string()));
            return Err(err);
        }

        runner::publish_check(Check::passed(format!(
            "{} {} body matched the schema",
            self.method, self.url
        )));
        Ok(self)
    }

    /// Terminalize into a capture, decoding the body as JSON.
    pub fn capture(self) -> Result<Capture> {
        Ok(Capture {
            status: self.status(),
            body: self.json()?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::Method;
    use crate::schema::FieldKind;
    use pretty_assertions::assert_eq;

    fn response(status: StatusCode, body: &str) -> Response {
        Response {
            method: Method::GET,
            url: "http://localhost/mercado/1".into(),
            status,
            text: body.into(),
        }
    }

    #[test]
    fn matching_status_passes_through() -> Result<()> {
        let res = response(StatusCode::OK, "{}").expect_status(StatusCode::OK)?;
        assert_eq!(res.status(), StatusCode::OK);
        Ok(())
    }

    #[test]
    fn status_mismatch_reports_expected_and_actual() {
        let err = response(StatusCode::BAD_REQUEST, "{}")
            .expect_status(StatusCode::CREATED)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("201"), "missing expected status: {msg}");
        assert!(msg.contains("400"), "missing actual status: {msg}");
    }

    #[test]
    fn status_is_checked_before_schema() {
        // Body would also fail validation, but the status error must win.
        let schema = Schema::object().field("id", FieldKind::Int);
        let err = response(StatusCode::NOT_FOUND, r#"{"nome": "x"}"#)
            .expect_status(StatusCode::OK)
            .and_then(|res| res.expect_schema(&schema))
            .unwrap_err();
        assert!(matches!(err, Error::StatusMismatch { .. }));
    }

    #[test]
    fn schema_failure_carries_field_detail() {
        let schema = Schema::object().field("id", FieldKind::Int);
        let err = response(StatusCode::OK, r#"{"nome": "x"}"#)
            .expect_schema(&schema)
            .unwrap_err();
        assert!(matches!(&err, Error::Schema { field, .. } if field == "id"));
    }

    #[test]
    fn capture_exposes_typed_fields() -> Result<()> {
        let capture =
            response(StatusCode::CREATED, r#"{"id": 42, "nome": "Feira"}"#).capture()?;
        assert_eq!(capture.status, StatusCode::CREATED);
        assert_eq!(capture.id()?, 42);
        assert_eq!(capture.str("nome")?, "Feira");
        assert!(capture.int("nome").is_err());
        Ok(())
    }

    #[test]
    fn capture_of_non_json_body_fails() {
        let err = response(StatusCode::OK, "not json").capture().unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
