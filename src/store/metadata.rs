//! Datapackage-style descriptive metadata attached to a dataset.

use super::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub title: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Contributor {
    pub fn new(title: impl Into<String>, role: impl Into<String>) -> Self {
        Self { title: title.into(), role: role.into(), path: None }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    pub path: String,
    pub title: String,
}

impl License {
    pub fn cc_by_4() -> Self {
        Self {
            name: "CC-BY-4.0".to_string(),
            path: "https://creativecommons.org/licenses/by/4.0/".to_string(),
            title: "Creative Commons Attribution 4.0 International".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub name: String,
    pub description: String,
    pub contributors: Vec<Contributor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    pub created: DateTime<Utc>,
    pub licenses: Vec<License>,
}

impl DatasetMetadata {
    /// Created now, licensed CC-BY-4.0.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        contributors: Vec<Contributor>,
    ) -> Result<Self, StoreError> {
        let metadata = Self {
            name: name.into(),
            description: description.into(),
            contributors,
            homepage: None,
            created: Utc::now(),
            licenses: vec![License::cc_by_4()],
        };
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::InvalidMetadata("name is empty".into()));
        }
        if self.description.trim().is_empty() {
            return Err(StoreError::InvalidMetadata(format!("description of `{}` is empty", self.name)));
        }
        for (i, contributor) in self.contributors.iter().enumerate() {
            if contributor.title.trim().is_empty() || contributor.role.trim().is_empty() {
                return Err(StoreError::InvalidMetadata(format!("contributor {i} needs a title and a role")));
            }
        }
        Ok(())
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    pub fn with_licenses(mut self, licenses: Vec<License>) -> Self {
        self.licenses = licenses;
        self
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Plain strings, dates and vectors: serializing to a Value cannot fail.
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }
}
