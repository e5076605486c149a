use std::env;
use std::time::Duration;

use anyhow::Context;

use crate::wellness::TimeWindow;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    /// Postgres document store; the in-memory store is used when unset.
    pub database_url: Option<String>,

    /// HS256 secret shared with the identity provider that issues tokens.
    pub jwt_secret: String,

    pub recompute_debounce: Duration,
    pub default_window: TimeWindow,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .context("PORT must be a number")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),

            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,

            recompute_debounce: Duration::from_millis(
                env::var("RECOMPUTE_DEBOUNCE_MS")
                    .unwrap_or_else(|_| "750".into())
                    .parse()
                    .context("RECOMPUTE_DEBOUNCE_MS must be a number")?,
            ),
            default_window: TimeWindow::parse(
                &env::var("DEFAULT_WINDOW").unwrap_or_else(|_| "week".into()),
            ),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for tests and local tooling: in-memory store, no debounce delay.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: Vec::new(),
            database_url: None,
            jwt_secret: jwt_secret.into(),
            recompute_debounce: Duration::ZERO,
            default_window: TimeWindow::Week,
        }
    }
}
