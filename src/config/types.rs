use serde::{Deserialize, Serialize};

/// The persisted config record. Field names follow the on-disk camelCase
/// schema; every field is optional so partial files load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    #[serde(
        default,
        alias = "bodyTemplate",
        skip_serializing_if = "Option::is_none"
    )]
    pub body_temp: Option<String>,
    #[serde(default, alias = "endpoints", skip_serializing_if = "Option::is_none")]
    pub ip_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qps: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<i64>,
    #[serde(default)]
    pub param_mappings: Vec<MappingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_gaps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfig {
    /// Column index or header name.
    #[serde(default)]
    pub csv_column: String,
    #[serde(default)]
    pub param_name: String,
    #[serde(default)]
    pub param_type: String,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub array_index: i64,
}
