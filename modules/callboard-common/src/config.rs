use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Redis
    pub redis_url: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    /// Permissive mode: a GET for an unknown slug creates an ownerless
    /// event instead of returning 404. Off by default; incompatible with
    /// strict ownership, so only enable it for deployments that never
    /// register accounts.
    pub auto_create_events: bool,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            redis_url: required_env("REDIS_URL"),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            auto_create_events: env::var("CALLBOARD_AUTO_CREATE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
