use serde::{Deserialize, Serialize};

use crate::constants::user_defaults;
use crate::utils::serde::{
    deserialize_blank_as_none, deserialize_id, deserialize_optional_flag, deserialize_trimmed,
    serialize_id,
};

/// UserRecord is one row of user input
/// Identified by `nickname`; placed in the department named by `dept_external_id`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    pub nickname: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    pub first: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    pub last: String,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub middle: Option<String>,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    pub dept_external_id: String,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub timezone: Option<String>,
    #[serde(
        default,
        rename = "externalId",
        deserialize_with = "deserialize_blank_as_none"
    )]
    pub external_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_blank_as_none",
        skip_serializing
    )]
    pub password: Option<String>,
    #[serde(
        default,
        rename = "passwordChangeRequired",
        deserialize_with = "deserialize_optional_flag"
    )]
    pub password_change_required: Option<bool>,
}

impl UserRecord {
    pub fn new(
        nickname: impl Into<String>,
        first: impl Into<String>,
        last: impl Into<String>,
        dept_external_id: impl Into<String>,
    ) -> Self {
        Self {
            nickname: nickname.into(),
            first: first.into(),
            last: last.into(),
            dept_external_id: dept_external_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserName {
    pub first: String,
    pub last: String,
    pub middle: String,
}

/// New user for creation, with every optional field resolved to its default
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub nickname: String,
    #[serde(serialize_with = "serialize_id")]
    pub department_id: String,
    pub name: UserName,
    pub position: String,
    pub language: String,
    pub timezone: String,
    pub external_id: String,
    pub password: String,
    pub password_change_required: bool,
}

impl NewUser {
    pub fn from_record(record: &UserRecord, department_id: impl Into<String>) -> Self {
        Self {
            nickname: record.nickname.clone(),
            department_id: department_id.into(),
            name: UserName {
                first: record.first.clone(),
                last: record.last.clone(),
                middle: record.middle.clone().unwrap_or_default(),
            },
            position: record.position.clone().unwrap_or_default(),
            language: record
                .language
                .clone()
                .unwrap_or_else(|| user_defaults::LANGUAGE.to_string()),
            timezone: record
                .timezone
                .clone()
                .unwrap_or_else(|| user_defaults::TIMEZONE.to_string()),
            external_id: record.external_id.clone().unwrap_or_default(),
            password: record.password.clone().unwrap_or_default(),
            password_change_required: record
                .password_change_required
                .unwrap_or(user_defaults::PASSWORD_CHANGE_REQUIRED),
        }
    }
}

/// RemoteUser is the service's echo of a created user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub nickname: String,
}
