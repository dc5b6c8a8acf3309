//! Client configuration: credentials, default program token, server.

use std::fmt;

use crate::error::{HyperwalletError, Result};

/// Server used when none is configured.
pub const DEFAULT_SERVER: &str = "https://sandbox.hyperwallet.com";

/// Immutable settings shared by every request a client makes.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    username: String,
    password: String,
    program_token: Option<String>,
    server: String,
}

impl Config {
    /// Both `username` and `password` must be non-empty.
    pub fn new(username: &str, password: &str) -> Result<Self> {
        if username.is_empty() || password.is_empty() {
            return Err(HyperwalletError::Argument(
                "You need to specify your API username and password!".to_string(),
            ));
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
            program_token: None,
            server: DEFAULT_SERVER.to_string(),
        })
    }

    /// Program token injected into created users and payments that lack one.
    /// An empty token leaves the default unset.
    pub fn with_program_token(mut self, program_token: impl Into<String>) -> Self {
        let program_token = program_token.into();
        self.program_token = (!program_token.is_empty()).then_some(program_token);
        self
    }

    pub fn with_server(mut self, server: &str) -> Self {
        self.server = server.trim_end_matches('/').to_string();
        self
    }

    /// Read `HYPERWALLET_USERNAME`, `HYPERWALLET_PASSWORD`,
    /// `HYPERWALLET_PROGRAM_TOKEN` and `HYPERWALLET_SERVER`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup("HYPERWALLET_USERNAME").unwrap_or_default();
        let password = lookup("HYPERWALLET_PASSWORD").unwrap_or_default();
        let mut config = Self::new(&username, &password)?;
        if let Some(program_token) = lookup("HYPERWALLET_PROGRAM_TOKEN") {
            config = config.with_program_token(program_token);
        }
        if let Some(server) = lookup("HYPERWALLET_SERVER").filter(|s| !s.is_empty()) {
            config = config.with_server(&server);
        }
        Ok(config)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn program_token(&self) -> Option<&str> {
        self.program_token.as_deref()
    }

    pub fn server(&self) -> &str {
        &self.server
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("program_token", &self.program_token)
            .field("server", &self.server)
            .finish()
    }
}
