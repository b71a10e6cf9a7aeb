//! Wire payload submitted by the questionnaire form.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Epoch-millisecond submission-start timestamp.
///
/// The form serializes the page-load clock; decoding is lenient and accepts a
/// JSON number, a numeric string, or (tolerated but unusable) anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(f64),
    Text(String),
    Other(Value),
}

impl Timestamp {
    /// Finite epoch-millis value, if the raw form parses as one.
    pub fn as_millis(&self) -> Option<f64> {
        let millis = match self {
            Timestamp::Millis(millis) => *millis,
            Timestamp::Text(raw) => raw.trim().parse().ok()?,
            Timestamp::Other(_) => return None,
        };
        millis.is_finite().then_some(millis)
    }
}

/// One questionnaire submission, exactly as POSTed to the relay.
///
/// Decoding is tolerant: scalar fields accept any JSON scalar (coerced to its
/// string form), multi-select fields accept an array, a bare scalar, or
/// nothing at all (never null for validation purposes — absent means empty),
/// and unknown keys are ignored. Enumerated fields stay raw `String` codes;
/// unmapped codes flow through to the formatter and display literally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionPayload {
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub last_name_kana: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub first_name_kana: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub living_issues: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub property_types: Vec<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub site_area: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub building_age: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub loan_balance: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub debt_status: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub delinquency_period: Option<String>,
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Honeypot field. Hidden on the page; real users never fill it.
    #[serde(deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Epoch-millis timestamp captured when the form was first shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_started_at: Option<Timestamp>,
}

fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(coerce))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().filter_map(coerce).collect(),
        Some(scalar) => coerce(scalar).into_iter().collect(),
    })
}

/// JSON scalar → its string form. Everything arrives as a string from real
/// form submissions; this keeps hand-crafted numeric payloads readable too.
fn coerce(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_a_regular_submission() {
        let payload: SubmissionPayload = serde_json::from_value(json!({
            "lastName": "田中",
            "firstName": "太郎",
            "postalCode": "1000001",
            "livingIssues": ["mortgage", "other"],
            "propertyTypes": ["house"],
            "website": "",
            "formStartedAt": "1754500000000",
        }))
        .unwrap();

        assert_eq!(payload.last_name.as_deref(), Some("田中"));
        assert_eq!(payload.living_issues, vec!["mortgage", "other"]);
        assert_eq!(payload.property_types, vec!["house"]);
        assert_eq!(payload.website.as_deref(), Some(""));
        assert_eq!(
            payload.form_started_at.unwrap().as_millis(),
            Some(1_754_500_000_000.0)
        );
    }

    #[test]
    fn coerces_scalars_and_ignores_unknown_keys() {
        let payload: SubmissionPayload = serde_json::from_value(json!({
            "siteArea": 120,
            "buildingAge": null,
            "notes": true,
            "somethingElse": {"nested": 1},
        }))
        .unwrap();

        assert_eq!(payload.site_area.as_deref(), Some("120"));
        assert_eq!(payload.building_age, None);
        assert_eq!(payload.notes.as_deref(), Some("true"));
    }

    #[test]
    fn multi_select_tolerates_null_and_bare_scalars() {
        let payload: SubmissionPayload = serde_json::from_value(json!({
            "livingIssues": null,
            "propertyTypes": "land",
        }))
        .unwrap();

        assert!(payload.living_issues.is_empty());
        assert_eq!(payload.property_types, vec!["land"]);
    }

    #[test]
    fn timestamp_variants() {
        let numeric: Timestamp = serde_json::from_value(json!(1754500000000u64)).unwrap();
        assert_eq!(numeric.as_millis(), Some(1_754_500_000_000.0));

        let text: Timestamp = serde_json::from_value(json!(" 1754500000000 ")).unwrap();
        assert_eq!(text.as_millis(), Some(1_754_500_000_000.0));

        let garbage: Timestamp = serde_json::from_value(json!("soon")).unwrap();
        assert_eq!(garbage.as_millis(), None);

        let structured: Timestamp = serde_json::from_value(json!({"at": 1})).unwrap();
        assert_eq!(structured.as_millis(), None);
    }

    #[test]
    fn serializes_camel_case() {
        let payload = SubmissionPayload {
            last_name: Some("田中".into()),
            living_issues: vec!["mortgage".into()],
            form_started_at: Some(Timestamp::Millis(5.0)),
            ..Default::default()
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["lastName"], "田中");
        assert_eq!(value["livingIssues"][0], "mortgage");
        assert_eq!(value["formStartedAt"], 5.0);
        assert!(value.get("firstName").is_none());
    }
}
