//! [Doc](https://developer.apple.com/documentation/walletpasses/pass)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Error as SerdeJsonError, Map, Value};

/// Top-level `pass.json` keys that override the model's values.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PassProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_type_identifier: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_identifier: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_text: Option<Box<str>>,
    // rgb(r, g, b)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_color: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping_identifier: Option<Box<str>>,
    #[serde(rename = "webServiceURL", skip_serializing_if = "Option::is_none")]
    pub web_service_url: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_token: Option<Box<str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharing_prohibited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voided: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_date: Option<DateTime<Utc>>,
}

impl PassProps {
    pub fn to_json_map(&self) -> Result<Map<String, Value>, SerdeJsonError> {
        serde_json::to_value(self).map(|value| match value {
            Value::Object(map) => map,
            _ => Map::new(),
        })
    }
}
