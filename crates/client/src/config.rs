use std::time::Duration;

use changedesk_core::pagination::DEFAULT_PER_PAGE;
use changedesk_core::roles::{Actor, Role};
use changedesk_core::types::DbId;

/// Default per-call timeout, matching the remote API gateway.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default attempts for idempotent reads.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without trailing slash, e.g. `https://desk.example.com/api`.
    pub api_url: String,
    /// Bearer token with any `Bearer ` prefix removed.
    pub api_token: String,
    pub actor: Actor,
    pub request_timeout: Duration,
    pub retry_max_attempts: u32,
    pub per_page: usize,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `CHANGEDESK_API_URL`    | yes      | --      |
    /// | `CHANGEDESK_API_TOKEN`  | yes      | --      |
    /// | `CHANGEDESK_ACTOR_ID`   | yes      | --      |
    /// | `CHANGEDESK_ACTOR_ROLE` | yes      | --      |
    /// | `REQUEST_TIMEOUT_SECS`  | no       | `120`   |
    /// | `RETRY_MAX_ATTEMPTS`    | no       | `3`     |
    /// | `PER_PAGE`              | no       | `15`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let api_url = required("CHANGEDESK_API_URL")?
            .trim_end_matches('/')
            .to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "CHANGEDESK_API_URL",
                value: api_url,
                reason: "must start with http:// or https://".into(),
            });
        }

        let api_token = strip_bearer(&required("CHANGEDESK_API_TOKEN")?).to_string();
        if api_token.is_empty() {
            return Err(ConfigError::Missing("CHANGEDESK_API_TOKEN"));
        }

        let user_id: DbId = parse_var("CHANGEDESK_ACTOR_ID", required("CHANGEDESK_ACTOR_ID")?)?;
        let role_name = required("CHANGEDESK_ACTOR_ROLE")?;
        let role = Role::from_name(&role_name).map_err(|e| ConfigError::Invalid {
            var: "CHANGEDESK_ACTOR_ROLE",
            value: role_name.clone(),
            reason: e.to_string(),
        })?;

        let request_timeout_secs: u64 = optional_var(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let retry_max_attempts: u32 =
            optional_var(&lookup, "RETRY_MAX_ATTEMPTS", DEFAULT_RETRY_MAX_ATTEMPTS)?;
        let per_page: usize = optional_var(&lookup, "PER_PAGE", DEFAULT_PER_PAGE)?;

        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "REQUEST_TIMEOUT_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        if per_page == 0 {
            return Err(ConfigError::Invalid {
                var: "PER_PAGE",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            api_url,
            api_token,
            actor: Actor::new(user_id, role),
            request_timeout: Duration::from_secs(request_timeout_secs),
            retry_max_attempts: retry_max_attempts.max(1),
            per_page,
        })
    }
}

/// Remove a leading `Bearer ` (any case) from a stored token.
pub fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    match token.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => token[7..].trim_start(),
        _ => token,
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

fn optional_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(var).map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => parse_var(var, v),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("CHANGEDESK_API_URL", "https://desk.example.com/api/"),
        ("CHANGEDESK_API_TOKEN", "Bearer abc123"),
        ("CHANGEDESK_ACTOR_ID", "7"),
        ("CHANGEDESK_ACTOR_ROLE", "dept_head"),
    ];

    #[test]
    fn loads_required_and_defaults() {
        let config = ClientConfig::from_lookup(env(BASE)).unwrap();
        assert_eq!(config.api_url, "https://desk.example.com/api");
        assert_eq!(config.api_token, "abc123");
        assert_eq!(config.actor, Actor::new(7, Role::DeptHead));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.retry_max_attempts, 3);
        assert_eq!(config.per_page, 15);
    }

    #[test]
    fn missing_token_is_reported() {
        let pairs: Vec<_> = BASE
            .iter()
            .copied()
            .filter(|(k, _)| *k != "CHANGEDESK_API_TOKEN")
            .collect();
        assert_eq!(
            ClientConfig::from_lookup(env(&pairs)).unwrap_err(),
            ConfigError::Missing("CHANGEDESK_API_TOKEN")
        );
    }

    #[test]
    fn invalid_numbers_are_errors_not_panics() {
        let mut pairs = BASE.to_vec();
        pairs.push(("PER_PAGE", "lots"));
        assert_matches!(
            ClientConfig::from_lookup(env(&pairs)),
            Err(ConfigError::Invalid { var: "PER_PAGE", .. })
        );
    }

    #[test]
    fn unknown_role_is_invalid() {
        let mut pairs = BASE.to_vec();
        pairs.retain(|(k, _)| *k != "CHANGEDESK_ACTOR_ROLE");
        pairs.push(("CHANGEDESK_ACTOR_ROLE", "admin"));
        assert_matches!(
            ClientConfig::from_lookup(env(&pairs)),
            Err(ConfigError::Invalid { var: "CHANGEDESK_ACTOR_ROLE", .. })
        );
    }

    #[test]
    fn bearer_prefix_stripping() {
        assert_eq!(strip_bearer("Bearer  xyz"), "xyz");
        assert_eq!(strip_bearer("bearer xyz"), "xyz");
        assert_eq!(strip_bearer("xyz"), "xyz");
        assert_eq!(strip_bearer("Bear"), "Bear");
    }
}
