use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8181";
pub const DEFAULT_USER: &str = "onos";
pub const DEFAULT_PASSWORD: &str = "rocks";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Connection settings for the southbound flow controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfigDto {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ControllerConfigDto {
    fn default() -> Self {
        Self { base_url: default_base_url(), user: default_user(), password: default_password(), timeout_ms: default_timeout_ms() }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dto: ControllerConfigDto = serde_json::from_str(r#"{"baseUrl": "http://10.1.1.1:8181"}"#).unwrap();

        assert_eq!(dto.base_url, "http://10.1.1.1:8181");
        assert_eq!(dto.user, DEFAULT_USER);
        assert_eq!(dto.password, DEFAULT_PASSWORD);
        assert_eq!(dto.timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
