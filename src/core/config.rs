use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    // Only the proxy server reads this. Clients use the key stored in
    // their own settings for direct calls.
    pub gemini_api_key: Option<String>,
    pub gemini_api_hostname: String,
    pub proxy_url: String,
    pub default_model: String,
    pub system_message: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = "127.0.0.1";
        let port = "2222";
        let storage_path = env::var("PARLEY_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/parley.db", storage_path.trim_end_matches('/'));
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let gemini_api_hostname = env::var("PARLEY_GEMINI_API_HOSTNAME")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let proxy_url =
            env::var("PARLEY_PROXY_URL").unwrap_or(format!("http://{}:{}", host, port));
        let default_model =
            env::var("PARLEY_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
        let system_message = env::var("PARLEY_SYSTEM_MESSAGE")
            .unwrap_or_else(|_| "You are a helpful AI assistant.".to_string());

        Self {
            storage_path,
            db_path,
            gemini_api_key,
            gemini_api_hostname,
            proxy_url,
            default_model,
            system_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "PARLEY_STORAGE_PATH",
            "GEMINI_API_KEY",
            "PARLEY_GEMINI_API_HOSTNAME",
            "PARLEY_PROXY_URL",
            "PARLEY_MODEL",
            "PARLEY_SYSTEM_MESSAGE",
        ] {
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = AppConfig::default();
        assert_eq!(config.db_path, "./parley.db");
        assert_eq!(config.gemini_api_key, None);
        assert_eq!(
            config.gemini_api_hostname,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(config.proxy_url, "http://127.0.0.1:2222");
        assert_eq!(config.default_model, "gemini-2.0-flash");
        assert_eq!(config.system_message, "You are a helpful AI assistant.");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            env::set_var("PARLEY_STORAGE_PATH", "/tmp/parley/");
            env::set_var("GEMINI_API_KEY", "server-key");
            env::set_var("PARLEY_MODEL", "gemini-2.5-flash");
        }
        let config = AppConfig::default();
        assert_eq!(config.db_path, "/tmp/parley/parley.db");
        assert_eq!(config.gemini_api_key.as_deref(), Some("server-key"));
        assert_eq!(config.default_model, "gemini-2.5-flash");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_blank_api_key_is_unset() {
        clear_env();
        unsafe { env::set_var("GEMINI_API_KEY", "  ") };
        let config = AppConfig::default();
        assert_eq!(config.gemini_api_key, None);
        clear_env();
    }
}
