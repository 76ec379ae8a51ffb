//! Decoding of the JSON the diff processor prints for each of its commands.
//!
//! The diff processor writes Go structs without field tags, so keys are
//! PascalCase and absent lists come through as `null`.

use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BreakingChange {
    pub message: String,
    #[serde(default)]
    pub documentation_reference: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SimpleSchemaDiff {
    #[serde(default, deserialize_with = "null_as_default")]
    pub added_resources: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified_resources: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub removed_resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MissingTestInfo {
    #[serde(default)]
    pub suggested_test: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tests: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MissingDocInfo {
    pub name: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MissingDocsSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource: Vec<MissingDocInfo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_source: Vec<MissingDocInfo>,
}

/// Missing tests keyed by resource name.
pub type MissingTests = BTreeMap<String, MissingTestInfo>;

/// `breaking-changes` prints nothing at all when there are none.
pub fn parse_breaking_changes(output: &str) -> Result<Vec<BreakingChange>, Error> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_str::<Option<Vec<BreakingChange>>>(output)?.unwrap_or_default())
}

pub fn parse_schema_diff(output: &str) -> Result<SimpleSchemaDiff, Error> {
    Ok(serde_json::from_str(output)?)
}

pub fn parse_missing_tests(output: &str) -> Result<MissingTests, Error> {
    Ok(serde_json::from_str::<Option<MissingTests>>(output)?.unwrap_or_default())
}

pub fn parse_missing_docs(output: &str) -> Result<Option<MissingDocsSummary>, Error> {
    Ok(serde_json::from_str(output)?)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
