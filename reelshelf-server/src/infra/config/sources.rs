use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub lending: FileLendingConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ttl_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLendingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_borrowed: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movies_per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_per_page: Option<u32>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub secret_key: Option<String>,
    pub password_pepper: Option<String>,
    pub token_ttl_secs: Option<u64>,
    pub auth_token_ttl_secs: Option<u64>,
    pub admin_email: Option<String>,
    pub max_borrowed: Option<i32>,
    pub movies_per_page: Option<u32>,
    pub json_per_page: Option<u32>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    /// Read the process environment.
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read values through `lookup`, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |name: &str| {
            lookup(name).filter(|value| !value.trim().is_empty())
        };

        Self {
            config_path: text("REELSHELF_CONFIG").map(PathBuf::from),
            server_host: text("SERVER_HOST"),
            server_port: parse_var(text("SERVER_PORT")),
            database_url: text("DATABASE_URL"),
            secret_key: text("SECRET_KEY"),
            password_pepper: text("AUTH_PASSWORD_PEPPER"),
            token_ttl_secs: parse_var(text("TOKEN_TTL_SECS")),
            auth_token_ttl_secs: parse_var(text("AUTH_TOKEN_TTL_SECS")),
            admin_email: text("REELSHELF_ADMIN"),
            max_borrowed: parse_var(text("MAX_BORROWED_NUMBER")),
            movies_per_page: parse_var(text("MOVIES_PER_PAGE")),
            json_per_page: parse_var(text("JSONS_PER_PAGE")),
            dev_mode: text("DEV_MODE").and_then(|raw| parse_bool(&raw)),
        }
    }
}

fn parse_var<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|raw| raw.trim().parse().ok())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> EnvConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn parses_typed_values() {
        let env = env(&[
            ("SERVER_PORT", "8080"),
            ("MAX_BORROWED_NUMBER", "3"),
            ("DEV_MODE", "yes"),
            ("REELSHELF_ADMIN", "root@example.com"),
        ]);
        assert_eq!(env.server_port, Some(8080));
        assert_eq!(env.max_borrowed, Some(3));
        assert_eq!(env.dev_mode, Some(true));
        assert_eq!(env.admin_email.as_deref(), Some("root@example.com"));
    }

    #[test]
    fn ignores_blank_and_malformed_values() {
        let env = env(&[
            ("SERVER_PORT", "99999"),
            ("DATABASE_URL", "   "),
            ("DEV_MODE", "maybe"),
        ]);
        assert_eq!(env.server_port, None);
        assert_eq!(env.database_url, None);
        assert_eq!(env.dev_mode, None);
    }
}
