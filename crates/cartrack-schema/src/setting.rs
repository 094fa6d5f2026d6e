use serde::{Deserialize, Serialize};

/// Settings key holding the login PIN.
pub const LOGIN_PIN_KEY: &str = "LoginPIN";

/// PIN accepted when the settings table has no `LoginPIN` row.
pub const FALLBACK_LOGIN_PIN: &str = "1234";

/// One key/value row of the settings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    #[serde(rename = "Setting")]
    pub key: String,
    #[serde(rename = "Value", default)]
    pub value: String,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
