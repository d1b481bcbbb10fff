use regex::Regex;
use std::env;
use std::sync::OnceLock;

fn env_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern"))
}

/// Expand `${VAR_NAME}` references; unknown variables are left as written.
pub fn expand_env_var_in_string(value: &str) -> String {
    env_ref_pattern()
        .replace_all(value, |caps: &regex::Captures<'_>| {
            env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Trim, expand and drop empty values.
pub fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| expand_env_var_in_string(v.trim()))
        .filter(|v| !v.is_empty())
}

/// Base URLs must be absolute http(s) addresses.
pub fn validate_base_url(url: &str) -> Result<String, String> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(format!(
            "invalid base URL '{}': expected http:// or https://",
            url
        ));
    }
    if url.len() <= "https://".len() && !url.contains("://localhost") {
        return Err(format!("invalid base URL '{}': missing host", url));
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_known_and_unknown_vars() {
        env::set_var("AEROADMIN_TEST_EXPAND", "secret");
        assert_eq!(
            expand_env_var_in_string("pw-${AEROADMIN_TEST_EXPAND}"),
            "pw-secret"
        );
        assert_eq!(
            expand_env_var_in_string("${AEROADMIN_TEST_UNSET_VAR}"),
            "${AEROADMIN_TEST_UNSET_VAR}"
        );
    }

    #[test]
    fn test_validate_base_url() {
        assert_eq!(
            validate_base_url("http://localhost:8000/").unwrap(),
            "http://localhost:8000"
        );
        assert!(validate_base_url("localhost:8000").is_err());
        assert!(validate_base_url("https://").is_err());
    }

    #[test]
    fn test_normalize_drops_blank() {
        assert_eq!(normalize(Some("  ".to_string())), None);
        assert_eq!(normalize(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(normalize(None), None);
    }
}
