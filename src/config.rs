use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: Option<String>,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginLimitConfig {
    pub max_attempts: usize,
    pub window_minutes: u64,
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub session: SessionConfig,
    pub login_limit: LoginLimitConfig,
    pub openai: OpenAiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let production = std::env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let session = SessionConfig {
            secret: non_empty_var("SESSION_SECRET"),
            ttl_minutes: parsed_var("SESSION_TTL_MINUTES", 120),
            cookie_secure: production,
        };
        let login_limit = LoginLimitConfig {
            max_attempts: parsed_var("LOGIN_MAX_ATTEMPTS", 5),
            window_minutes: parsed_var("LOGIN_WINDOW_MINUTES", 15),
            trust_forwarded_for: parsed_var("TRUST_FORWARDED_FOR", false),
        };
        let openai = OpenAiConfig {
            api_key: non_empty_var("OPENAI_API_KEY"),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            timeout_secs: parsed_var("OPENAI_TIMEOUT_SECS", 20),
            max_tokens: parsed_var("OPENAI_MAX_TOKENS", 700),
        };

        Ok(Self {
            database_url,
            database_max_connections: parsed_var("DATABASE_MAX_CONNECTIONS", 10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_var("APP_PORT", 5000),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            session,
            login_limit,
            openai,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_addr_combines_host_and_port() {
        let mut cfg = crate::state::test_config();
        cfg.host = "127.0.0.1".into();
        cfg.port = 5050;
        assert_eq!(cfg.listen_addr().unwrap().to_string(), "127.0.0.1:5050");
    }

    #[test]
    fn listen_addr_rejects_garbage_host() {
        let mut cfg = crate::state::test_config();
        cfg.host = "not a host".into();
        assert!(cfg.listen_addr().is_err());
    }

    #[test]
    fn parsed_var_falls_back_on_missing_key() {
        let v: u64 = parsed_var("PLUME_TEST_SURELY_UNSET_VARIABLE", 42);
        assert_eq!(v, 42);
    }
}
