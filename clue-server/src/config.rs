use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::websocket::rate_limiter::RateLimit;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Empty means any origin is allowed.
    pub allowed_origins: Vec<String>,
    /// JSON word bank; `None` uses the built-in list.
    pub words_file: Option<PathBuf>,
    pub rate_limit: RateLimit,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source. Unset keys fall back to
    /// their defaults; set but unparseable keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = parse_or(&lookup, "HOST", defaults.host)?;
        let port = parse_or(&lookup, "PORT", defaults.port)?;

        let allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(&raw)?,
            None => defaults.allowed_origins,
        };

        let words_file = lookup("WORDS_FILE")
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        let burst: u32 = parse_or(&lookup, "RATE_LIMIT_BURST", defaults.rate_limit.burst)?;
        if burst == 0 {
            return Err(ConfigError::Zero {
                name: "RATE_LIMIT_BURST",
            });
        }
        let refill_ms: u64 = parse_or(
            &lookup,
            "RATE_LIMIT_REFILL_MS",
            defaults.rate_limit.refill.as_millis() as u64,
        )?;
        if refill_ms == 0 {
            return Err(ConfigError::Zero {
                name: "RATE_LIMIT_REFILL_MS",
            });
        }

        Ok(Self {
            host,
            port,
            allowed_origins,
            words_file,
            rate_limit: RateLimit {
                burst,
                refill: Duration::from_millis(refill_ms),
            },
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            allowed_origins: Vec::new(),
            words_file: None,
            rate_limit: RateLimit::default(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        }),
        None => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            // warp panics on origins it cannot parse, so check the scheme here
            if origin.starts_with("http://") || origin.starts_with("https://") {
                Ok(origin.trim_end_matches('/').to_string())
            } else {
                Err(ConfigError::Invalid {
                    name: "ALLOWED_ORIGINS",
                    value: origin.to_string(),
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        assert!(config.allowed_origins.is_empty());
        assert!(config.words_file.is_none());
        assert_eq!(config.rate_limit.burst, 30);
        assert_eq!(config.rate_limit.refill, Duration::from_millis(500));
    }

    #[test]
    fn test_reads_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("ALLOWED_ORIGINS", "http://localhost:3000, https://clue.example.com/"),
            ("WORDS_FILE", "./words.json"),
            ("RATE_LIMIT_BURST", "5"),
            ("RATE_LIMIT_REFILL_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8081");
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000", "https://clue.example.com"]
        );
        assert_eq!(config.words_file, Some(PathBuf::from("./words.json")));
        assert_eq!(config.rate_limit.burst, 5);
        assert_eq!(config.rate_limit.refill, Duration::from_millis(250));
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert_eq!(
            config_from(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                name: "PORT",
                value: "eighty".into()
            }
        );
        assert!(config_from(&[("HOST", "not-an-ip")]).is_err());
        assert!(config_from(&[("ALLOWED_ORIGINS", "localhost:3000")]).is_err());
        assert_eq!(
            config_from(&[("RATE_LIMIT_BURST", "0")]).unwrap_err(),
            ConfigError::Zero {
                name: "RATE_LIMIT_BURST"
            }
        );
    }

    #[test]
    fn test_blank_words_file_means_builtin() {
        let config = config_from(&[("WORDS_FILE", "  ")]).unwrap();
        assert!(config.words_file.is_none());
    }
}
