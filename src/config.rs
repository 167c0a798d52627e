use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "web/dist";
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 280;
pub const DEFAULT_MAX_NAME_LEN: usize = 24;
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;
pub const DEFAULT_RATE_PER_SECOND: f64 = 5.0;
pub const DEFAULT_RATE_BURST: f64 = 10.0;
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Limits applied to every chat connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub max_message_len: usize,
    pub max_name_len: usize,
    pub queue_capacity: usize,
    pub rate_per_second: f64,
    pub rate_burst: f64,
    pub write_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            rate_per_second: DEFAULT_RATE_PER_SECOND,
            rate_burst: DEFAULT_RATE_BURST,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    pub chat_enabled: bool,
    pub metrics_enabled: bool,
    pub chat: ChatConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let static_dir = match std::env::var("RELAY_STATIC_DIR") {
            Ok(dir) if dir.trim().is_empty() => None,
            Ok(dir) => Some(PathBuf::from(dir)),
            Err(_) => Some(PathBuf::from(DEFAULT_STATIC_DIR)),
        };

        let chat = ChatConfig {
            max_message_len: positive_env("RELAY_MAX_MESSAGE_LEN", DEFAULT_MAX_MESSAGE_LEN),
            max_name_len: positive_env("RELAY_MAX_NAME_LEN", DEFAULT_MAX_NAME_LEN),
            queue_capacity: positive_env("RELAY_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY),
            rate_per_second: rate_env("RELAY_RATE_PER_SECOND", DEFAULT_RATE_PER_SECOND),
            rate_burst: rate_env("RELAY_RATE_BURST", DEFAULT_RATE_BURST),
            write_timeout: Duration::from_millis(positive_env(
                "RELAY_WRITE_TIMEOUT_MS",
                DEFAULT_WRITE_TIMEOUT.as_millis() as u64,
            )),
        };

        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            static_dir,
            chat_enabled: bool_env("RELAY_CHAT_ENABLED", true),
            metrics_enabled: bool_env("RELAY_METRICS_ENABLED", false),
            chat,
        }
    }
}

/// Reads a numeric variable; unparsable, zero and negative values yield `default`.
fn positive_env<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
        .unwrap_or(default)
}

/// Like `positive_env`, but `inf` also yields `default`.
fn rate_env(key: &str, default: f64) -> f64 {
    Some(positive_env(key, default))
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("PORT");
        std::env::remove_var("RELAY_STATIC_DIR");
        std::env::remove_var("RELAY_CHAT_ENABLED");
        std::env::remove_var("RELAY_METRICS_ENABLED");
        std::env::remove_var("RELAY_MAX_MESSAGE_LEN");
        std::env::remove_var("RELAY_MAX_NAME_LEN");
        std::env::remove_var("RELAY_QUEUE_CAPACITY");
        std::env::remove_var("RELAY_RATE_PER_SECOND");
        std::env::remove_var("RELAY_RATE_BURST");
        std::env::remove_var("RELAY_WRITE_TIMEOUT_MS");
    }

    #[test]
    #[serial]
    fn test_default_config() {
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, Some(PathBuf::from("web/dist")));
        assert!(config.chat_enabled);
        assert!(!config.metrics_enabled);
        assert_eq!(config.chat, ChatConfig::default());
        assert_eq!(config.chat.max_message_len, 280);
        assert_eq!(config.chat.max_name_len, 24);
        assert_eq!(config.chat.queue_capacity, 16);
        assert_eq!(config.chat.rate_per_second, 5.0);
        assert_eq!(config.chat.rate_burst, 10.0);
        assert_eq!(config.chat.write_timeout, Duration::from_secs(2));
    }

    #[test]
    #[serial]
    fn test_port_from_env() {
        clear_env();
        std::env::set_var("PORT", "9000");
        let config = Config::from_env();
        assert_eq!(config.port, 9000);
    }

    #[test]
    #[serial]
    fn test_invalid_port_falls_back_to_default() {
        clear_env();
        std::env::set_var("PORT", "not_a_number");
        let config = Config::from_env();
        assert_eq!(config.port, 8080);
    }

    #[test]
    #[serial]
    fn test_empty_static_dir_disables_static_files() {
        clear_env();
        std::env::set_var("RELAY_STATIC_DIR", "");
        let config = Config::from_env();
        assert!(config.static_dir.is_none());
    }

    #[test]
    #[serial]
    fn test_chat_limits_from_env() {
        clear_env();
        std::env::set_var("RELAY_MAX_MESSAGE_LEN", "140");
        std::env::set_var("RELAY_MAX_NAME_LEN", "12");
        std::env::set_var("RELAY_QUEUE_CAPACITY", "4");
        std::env::set_var("RELAY_RATE_PER_SECOND", "0.5");
        std::env::set_var("RELAY_RATE_BURST", "3");
        std::env::set_var("RELAY_WRITE_TIMEOUT_MS", "250");
        let config = Config::from_env();
        assert_eq!(config.chat.max_message_len, 140);
        assert_eq!(config.chat.max_name_len, 12);
        assert_eq!(config.chat.queue_capacity, 4);
        assert_eq!(config.chat.rate_per_second, 0.5);
        assert_eq!(config.chat.rate_burst, 3.0);
        assert_eq!(config.chat.write_timeout, Duration::from_millis(250));
    }

    #[test]
    #[serial]
    fn test_non_positive_limits_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("RELAY_MAX_MESSAGE_LEN", "0");
        std::env::set_var("RELAY_RATE_PER_SECOND", "-2");
        std::env::set_var("RELAY_RATE_BURST", "abc");
        let config = Config::from_env();
        assert_eq!(config.chat.max_message_len, 280);
        assert_eq!(config.chat.rate_per_second, 5.0);
        assert_eq!(config.chat.rate_burst, 10.0);
    }

    #[test]
    #[serial]
    fn test_infinite_rates_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("RELAY_RATE_PER_SECOND", "inf");
        std::env::set_var("RELAY_RATE_BURST", "+infinity");
        let config = Config::from_env();
        assert_eq!(config.chat.rate_per_second, 5.0);
        assert_eq!(config.chat.rate_burst, 10.0);

        std::env::set_var("RELAY_RATE_PER_SECOND", "NaN");
        std::env::set_var("RELAY_RATE_BURST", "1e400");
        let config = Config::from_env();
        assert_eq!(config.chat.rate_per_second, 5.0);
        assert_eq!(config.chat.rate_burst, 10.0);
    }

    #[test]
    #[serial]
    fn test_feature_flags() {
        clear_env();
        std::env::set_var("RELAY_CHAT_ENABLED", "false");
        std::env::set_var("RELAY_METRICS_ENABLED", "1");
        let config = Config::from_env();
        assert!(!config.chat_enabled);
        assert!(config.metrics_enabled);
    }
}
