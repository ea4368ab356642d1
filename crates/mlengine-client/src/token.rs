//! Bearer-token capability.
//!
//! The client asks its provider for a token on every `predict` call and never
//! caches one itself; providers that mint tokens over the network are expected
//! to do their own caching.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::PredictError;

/// Environment variable pointing tooling at a service-account key file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A currently valid bearer token.
    async fn get(&self) -> Result<String, PredictError>;
}

/// A fixed token, e.g. one minted out of band.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn get(&self) -> Result<String, PredictError> {
        Ok(self.0.clone())
    }
}

/// Obtains a token by running an external program and reading its stdout.
///
/// When a credential locator is set it is exported to the program as
/// `GOOGLE_APPLICATION_CREDENTIALS`.
#[derive(Debug, Clone)]
pub struct CommandToken {
    program: String,
    args: Vec<String>,
    credentials: Option<String>,
}

impl CommandToken {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            credentials: None,
        }
    }

    /// `gcloud auth application-default print-access-token`
    pub fn gcloud(credentials: Option<String>) -> Self {
        Self::new(
            "gcloud",
            ["auth", "application-default", "print-access-token"],
        )
        .with_credentials(credentials)
    }

    pub fn with_credentials(mut self, credentials: Option<String>) -> Self {
        self.credentials = credentials;
        self
    }
}

#[async_trait]
impl TokenProvider for CommandToken {
    async fn get(&self) -> Result<String, PredictError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);
        if let Some(path) = &self.credentials {
            cmd.env(CREDENTIALS_ENV, path);
        }

        debug!(program = %self.program, "fetching access token");
        let output = cmd.output().await.map_err(PredictError::auth)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PredictError::auth(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let token = String::from_utf8(output.stdout).map_err(PredictError::auth)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(PredictError::auth(format!(
                "`{}` printed no token",
                self.program
            )));
        }
        Ok(token.to_string())
    }
}
