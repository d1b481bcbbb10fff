pub const CONFIG_FILE_STEM: &str = "aeroadmin";

pub const ENV_BASE_URL: &str = "AEROADMIN_BASE_URL";
pub const ENV_TIMEOUT: &str = "AEROADMIN_TIMEOUT";
pub const ENV_CREDENTIAL_MODE: &str = "AEROADMIN_CREDENTIAL_MODE";
pub const ENV_DB_USER: &str = "AEROADMIN_DB_USER";
pub const ENV_DB_PASSWORD: &str = "AEROADMIN_DB_PASSWORD";
pub const ENV_HOME: &str = "AEROADMIN_HOME";
pub const ENV_VERBOSE: &str = "AEROADMIN_VERBOSE";

pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}
