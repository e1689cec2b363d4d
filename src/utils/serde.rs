/*!
 * Serde utilities for the loosely typed shapes found in CSV input and
 * directory API responses.
 *
 * The directory service hands out numeric identifiers on some deployments
 * and string identifiers on others; CSV cells arrive as strings where an
 * empty cell means "not provided".
 */

use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Uint(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Int(i) => i.to_string(),
            RawId::Uint(u) => u.to_string(),
        }
    }
}

/// Deserialize an identifier that may be represented as a number or a string.
///
/// ```rust
/// use serde::Deserialize;
/// use orgsync::utils::serde::deserialize_id;
///
/// #[derive(Deserialize)]
/// struct Item {
///     #[serde(deserialize_with = "deserialize_id")]
///     id: String,
/// }
///
/// let item: Item = serde_json::from_str(r#"{"id": 17}"#).unwrap();
/// assert_eq!(item.id, "17");
/// ```
pub fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}

/// Optional variant of [`deserialize_id`]; `null`, `0` and `""` all map to `None`
/// because the service uses `0` for "no parent" on root departments.
pub fn deserialize_optional_id<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<RawId> = Option::deserialize(deserializer)?;
    Ok(value
        .map(RawId::into_string)
        .filter(|id| !id.is_empty() && id != "0"))
}

/// Serialize an identifier back in the service's native shape: canonical
/// integers go out as JSON numbers, anything else (including zero-padded
/// digits such as `"007"`) as a string.
pub fn serialize_id<S>(id: &str, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id.parse::<u64>() {
        Ok(numeric) if numeric.to_string() == id => serializer.serialize_u64(numeric),
        _ => serializer.serialize_str(id),
    }
}

/// Optional variant of [`serialize_id`].
pub fn serialize_optional_id<S>(
    id: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id {
        Some(id) => serialize_id(id, serializer),
        None => serializer.serialize_none(),
    }
}

/// Deserialize an optional string, trimming it and treating blank as `None`.
pub fn deserialize_blank_as_none<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Deserialize a required string cell, trimming surrounding whitespace.
///
/// A missing cell becomes an empty string; required-field checks happen in
/// validation so every offending row can be reported with its row number.
pub fn deserialize_trimmed<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()).unwrap_or_default())
}

/// Parse a CSV boolean flag: `"true"` (any case) is true, any other value is
/// false, and a blank cell is `None` so the caller's default applies.
pub fn deserialize_optional_flag<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_blank_as_none(deserializer)?.map(|s| s.eq_ignore_ascii_case("true")))
}
