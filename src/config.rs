use axum::http::HeaderValue;
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
    pub cors_allow_origin: CorsOrigin,
}

/// Validated `CORS_ALLOW_ORIGIN`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigin {
    /// `*`
    Any,
    Exact(HeaderValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(AppError::configuration(
                "APP_ENV must be one of development, test, production",
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Test => write!(f, "test"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            environment: parse_var(&lookup, "APP_ENV", "development")?,
            server: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_var(&lookup, "API_PORT", "8000")?,
                // Used only for debugging/observability. If unset, fall back to HOSTNAME if
                // present (e.g. Docker/Kubernetes), otherwise "unknown".
                instance_id: lookup("INSTANCE_ID")
                    .or_else(|| lookup("HOSTNAME"))
                    .unwrap_or_else(|| "unknown".to_string()),
                cors_allow_origin: parse_cors_origin(&lookup)?,
            },
        })
    }

    /// Settings used by the test suite
    pub fn for_tests() -> Self {
        Config {
            environment: Environment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                instance_id: "test".to_string(),
                cors_allow_origin: CorsOrigin::Any,
            },
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: &str) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(name).unwrap_or_else(|| default.to_string());
    raw.parse().map_err(|_| invalid_var(name, &raw))
}

fn parse_cors_origin<F>(lookup: &F) -> AppResult<CorsOrigin>
where
    F: Fn(&str) -> Option<String>,
{
    const NAME: &str = "CORS_ALLOW_ORIGIN";

    let raw = lookup(NAME).unwrap_or_else(|| "*".to_string());
    if raw == "*" {
        return Ok(CorsOrigin::Any);
    }
    if raw.trim().is_empty() {
        return Err(invalid_var(NAME, &raw));
    }

    HeaderValue::from_str(&raw)
        .map(CorsOrigin::Exact)
        .map_err(|_| invalid_var(NAME, &raw))
}

fn invalid_var(name: &str, raw: &str) -> AppError {
    AppError::configuration(format!("{name} has an invalid value"))
        .with_detail("variable", name)
        .with_detail("value", raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server_address(), "0.0.0.0:8000");
        assert_eq!(config.server.instance_id, "unknown");
        assert_eq!(config.server.cors_allow_origin, CorsOrigin::Any);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "3000"),
            ("HOSTNAME", "pod-7"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server_address(), "127.0.0.1:3000");
        assert_eq!(config.server.instance_id, "pod-7");
    }

    #[test]
    fn test_invalid_port_is_configuration_error() {
        let err = Config::from_lookup(lookup_from(&[("API_PORT", "eighty")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.details()["variable"], "API_PORT");
        assert_eq!(err.details()["value"], "eighty");
    }

    #[test]
    fn test_invalid_environment_is_configuration_error() {
        let err = Config::from_lookup(lookup_from(&[("APP_ENV", "staging")])).unwrap_err();
        assert_eq!(err.error_type(), "CONFIGURATION_ERROR");
        assert_eq!(err.details()["variable"], "APP_ENV");
    }

    #[test]
    fn test_exact_cors_origin() {
        let config =
            Config::from_lookup(lookup_from(&[("CORS_ALLOW_ORIGIN", "https://app.example")]))
                .unwrap();
        assert_eq!(
            config.server.cors_allow_origin,
            CorsOrigin::Exact(HeaderValue::from_static("https://app.example"))
        );
    }

    #[test]
    fn test_invalid_cors_origin_is_configuration_error() {
        for raw in ["https://a.example\nx", "   "] {
            let err =
                Config::from_lookup(lookup_from(&[("CORS_ALLOW_ORIGIN", raw)])).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration);
            assert_eq!(err.details()["variable"], "CORS_ALLOW_ORIGIN");
            assert_eq!(err.details()["value"], raw);
        }
    }

    #[test]
    fn test_for_tests_settings() {
        let config = Config::for_tests();
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.environment.to_string(), "test");
    }
}
