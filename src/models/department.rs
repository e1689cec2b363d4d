use serde::{Deserialize, Serialize};

use crate::utils::serde::{
    deserialize_blank_as_none, deserialize_id, deserialize_optional_id, deserialize_trimmed,
    serialize_optional_id,
};

/// DepartmentRecord is one row of department input
/// Identified by a caller-supplied `external_id`; an absent parent means root
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DepartmentRecord {
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    pub external_id: String,
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub parent_external_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub description: Option<String>,
}

impl DepartmentRecord {
    pub fn new(external_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_external_id: impl Into<String>) -> Self {
        self.parent_external_id = Some(parent_external_id.into());
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parent link, with an empty string treated as "no parent".
    pub fn parent(&self) -> Option<&str> {
        self.parent_external_id
            .as_deref()
            .filter(|parent| !parent.is_empty())
    }
}

/// RemoteDepartment is a department as held by the directory service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDepartment {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Empty for legacy departments not yet managed by this tool.
    #[serde(default, deserialize_with = "deserialize_trimmed")]
    pub external_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RemoteDepartment {
    pub fn is_managed(&self) -> bool {
        !self.external_id.is_empty()
    }
}

/// One page of the paginated department listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPage {
    #[serde(default)]
    pub departments: Vec<RemoteDepartment>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

fn default_pages() -> u32 {
    1
}

/// New department for creation (without service-assigned fields)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartment {
    pub name: String,
    pub external_id: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_id"
    )]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewDepartment {
    pub fn from_record(record: &DepartmentRecord, parent_id: Option<String>) -> Self {
        Self {
            name: record.name.clone(),
            external_id: record.external_id.clone(),
            parent_id,
            label: record.label.clone(),
            description: record.description.clone(),
        }
    }
}

/// Partial update applied when adopting a legacy department
///
/// Only management metadata is ever patched; name and parent are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPatch {
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DepartmentPatch {
    pub fn adopt(record: &DepartmentRecord) -> Self {
        Self {
            external_id: record.external_id.clone(),
            label: record.label.clone(),
            description: record.description.clone(),
        }
    }
}
