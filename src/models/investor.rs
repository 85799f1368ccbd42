use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    static ref PAN_RE: Regex = Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]{1}$").unwrap();
    static ref MOBILE_RE: Regex = Regex::new(r"^(\+91|0)?[6-9]\d{9}$").unwrap();
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
            .unwrap();
}

/// Raw onboarding form as posted by the site. Fields are kept as untyped JSON
/// so that a missing or wrongly typed field is reported alongside the other
/// validation failures.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvestorSubmission {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String)]
    pub full_name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String, example = "ABCDE1234F")]
    pub pan_number: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String)]
    pub email: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String, example = "+919876543210")]
    pub mobile_number: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String)]
    pub address: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = bool)]
    pub alignment_confirm: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = bool)]
    pub ready_to_proceed: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = bool)]
    pub acknowledge_timelines: Option<Value>,
}

/// A validated seed partner application.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestorApplication {
    pub full_name: String,
    pub pan_number: String,
    pub email: String,
    pub mobile_number: String,
    pub address: String,
    pub alignment_confirm: bool,
    pub ready_to_proceed: bool,
    pub acknowledge_timelines: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct FieldError {
    pub path: Vec<String>,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            path: vec![field.to_string()],
            message: message.to_string(),
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_RE.is_match(email)
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only an absent key is `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(errors: &mut Vec<FieldError>, field: &str, expected: &str, value: &Value) {
    let message = format!("Expected {}, received {}", expected, json_type(value));
    errors.push(FieldError::new(field, &message));
}

fn check_string(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&Value>,
    message: &str,
    valid: impl Fn(&str) -> bool,
) -> String {
    match value {
        None => {
            errors.push(FieldError::new(field, "Required"));
            String::new()
        }
        Some(Value::String(v)) => {
            if !valid(v) {
                errors.push(FieldError::new(field, message));
            }
            v.clone()
        }
        Some(other) => {
            wrong_type(errors, field, "string", other);
            String::new()
        }
    }
}

fn check_bool(errors: &mut Vec<FieldError>, field: &str, value: Option<&Value>) -> bool {
    match value {
        None => {
            errors.push(FieldError::new(field, "Required"));
            false
        }
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            wrong_type(errors, field, "boolean", other);
            false
        }
    }
}

impl InvestorSubmission {
    pub fn validate(&self) -> Result<InvestorApplication, Vec<FieldError>> {
        let mut errors = Vec::new();

        let full_name = check_string(
            &mut errors,
            "fullName",
            self.full_name.as_ref(),
            "Full name is required",
            |v| !v.is_empty(),
        );
        let pan_number = check_string(
            &mut errors,
            "panNumber",
            self.pan_number.as_ref(),
            "Invalid PAN format",
            |v| PAN_RE.is_match(v),
        );
        let email = check_string(
            &mut errors,
            "email",
            self.email.as_ref(),
            "Invalid email format",
            is_valid_email,
        );
        let mobile_number = check_string(
            &mut errors,
            "mobileNumber",
            self.mobile_number.as_ref(),
            "Invalid mobile number",
            |v| MOBILE_RE.is_match(v),
        );
        let address = check_string(
            &mut errors,
            "address",
            self.address.as_ref(),
            "Address is required",
            |v| !v.is_empty(),
        );
        let alignment_confirm =
            check_bool(&mut errors, "alignmentConfirm", self.alignment_confirm.as_ref());
        let ready_to_proceed =
            check_bool(&mut errors, "readyToProceed", self.ready_to_proceed.as_ref());
        let acknowledge_timelines =
            check_bool(&mut errors, "acknowledgeTimelines", self.acknowledge_timelines.as_ref());

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(InvestorApplication {
            full_name,
            pan_number,
            email,
            mobile_number,
            address,
            alignment_confirm,
            ready_to_proceed,
            acknowledge_timelines,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_submission() -> InvestorSubmission {
    InvestorSubmission {
        full_name: Some("Asha Rao".into()),
        pan_number: Some("ABCDE1234F".into()),
        email: Some("asha@example.com".into()),
        mobile_number: Some("+919876543210".into()),
        address: Some("12 MG Road, Bengaluru".into()),
        alignment_confirm: Some(true.into()),
        ready_to_proceed: Some(true.into()),
        acknowledge_timelines: Some(false.into()),
    }
}
