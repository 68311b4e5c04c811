use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// JSON carried in the `data` multipart field.
///
/// Unknown keys are ignored, and so is any client-supplied `profileImage`:
/// the stored upload name always wins. Scalars are cast loosely the way
/// form front-ends send them (`42` as a string, `"yes"`/`"1"` as `true`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionData {
    #[serde(default, deserialize_with = "loose_required_string")]
    pub username: String,
    #[serde(default, deserialize_with = "loose_required_string")]
    pub email: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub profession: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub address_line1: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub plan: Option<String>,
    #[serde(default, deserialize_with = "loose_bool")]
    pub newsletter: Option<bool>,
}

fn loose_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "Cast to string failed for value {other}"
        ))),
    }
}

fn loose_required_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_string(d)?.unwrap_or_default())
}

fn loose_bool<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let cast = match &value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    };
    cast.map(Some).ok_or_else(|| {
        D::Error::custom(format!("Cast to Boolean failed for value {value}"))
    })
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
}
