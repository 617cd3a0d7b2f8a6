use thiserror::Error;

use super::models::{AuthConfig, Config};

const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("authentication secret {field} {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("{field} must be {requirement}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.dev_mode {
        if config.auth.is_default_secret_key() || config.auth.is_default_pepper() {
            warnings.push_with_hint(
                "Using placeholder authentication secrets",
                "Set SECRET_KEY and AUTH_PASSWORD_PEPPER before leaving DEV_MODE",
            );
        }
    } else {
        enforce_secrets(&config.auth)?;
    }

    if config.lending.max_borrowed < 0 {
        return Err(ConfigGuardRailError::OutOfRange {
            field: "MAX_BORROWED_NUMBER",
            requirement: "zero or greater",
        });
    }
    if config.lending.json_per_page == 0 || config.lending.movies_per_page == 0 {
        return Err(ConfigGuardRailError::OutOfRange {
            field: "MOVIES_PER_PAGE/JSONS_PER_PAGE",
            requirement: "at least 1",
        });
    }
    if config.auth.token_ttl_secs == 0 || config.auth.auth_token_ttl_secs == 0 {
        return Err(ConfigGuardRailError::OutOfRange {
            field: "TOKEN_TTL_SECS/AUTH_TOKEN_TTL_SECS",
            requirement: "at least 1 second",
        });
    }

    if config.database.url.is_none() {
        warnings.push_with_hint(
            "DATABASE_URL not configured; data lives in memory and is lost on exit",
            "Set DATABASE_URL to a PostgreSQL connection string",
        );
    }

    if config.lending.admin_email.is_none() {
        warnings.push_with_hint(
            "REELSHELF_ADMIN not set; no account will be granted the Administrator role",
            "Set REELSHELF_ADMIN to the address of the first administrator",
        );
    }

    Ok(warnings)
}

fn enforce_secrets(auth: &AuthConfig) -> Result<(), ConfigGuardRailError> {
    if auth.is_default_secret_key() {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "SECRET_KEY",
            reason: "uses the default placeholder value".into(),
        });
    }

    if auth.secret_key.len() < MIN_SECRET_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "SECRET_KEY",
            reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
        });
    }

    if auth.is_default_pepper() {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            reason: "uses the default placeholder value".into(),
        });
    }

    if auth.password_pepper.len() < MIN_SECRET_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_PASSWORD_PEPPER",
            reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
        });
    }

    Ok(())
}
