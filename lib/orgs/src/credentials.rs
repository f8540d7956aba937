//! API key retrieval.
//!
//! The connection manager asks a [`CredentialProvider`] for the secret key
//! once, when it builds the connection. Whatever error the provider returns
//! is propagated as-is.

use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Environment variable read by [`EnvCredentials`].
pub const API_KEY_ENV: &str = "HEROKU_API_KEY";

/// Source of the API key.
pub trait CredentialProvider: Send + Sync {
    /// Fetch the secret key.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is available.
    fn api_key(&self) -> Result<SecretString>;
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Result<SecretString> + Send + Sync,
{
    fn api_key(&self) -> Result<SecretString> {
        self()
    }
}

/// A key known up front.
#[derive(Debug)]
pub struct StaticCredentials {
    key: SecretString,
}

impl StaticCredentials {
    /// Wrap an API key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: SecretString::from(key.into()),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Result<SecretString> {
        Ok(SecretString::from(self.key.expose_secret().to_owned()))
    }
}

/// Reads the key from an environment variable, [`API_KEY_ENV`] by default.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl EnvCredentials {
    /// Read the key from `var`.
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Result<SecretString> {
        match std::env::var(&self.var) {
            Ok(key) if !key.trim().is_empty() => Ok(SecretString::from(key.trim().to_owned())),
            Ok(_) => Err(Error::credentials(format!("{} is empty", self.var))),
            Err(err) => Err(Error::credentials(format!("{}: {err}", self.var))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_credentials() {
        let provider = StaticCredentials::new("s3cr3t");
        let key = provider.api_key().expect("key");
        assert_eq!(key.expose_secret(), "s3cr3t");
        assert!(!format!("{provider:?}").contains("s3cr3t"));
    }

    #[test]
    fn env_credentials() {
        temp_env::with_var(API_KEY_ENV, Some("from-env\n"), || {
            let key = EnvCredentials::default().api_key().expect("key");
            assert_eq!(key.expose_secret(), "from-env");
        });
    }

    #[test]
    fn env_credentials_missing() {
        temp_env::with_var_unset("ORGS_TEST_MISSING_KEY", || {
            let err = EnvCredentials::new("ORGS_TEST_MISSING_KEY")
                .api_key()
                .expect_err("missing");
            assert!(matches!(err, Error::Credentials(_)));
            assert!(err.to_string().contains("ORGS_TEST_MISSING_KEY"));
        });
    }

    #[test]
    fn env_credentials_empty() {
        temp_env::with_var(API_KEY_ENV, Some(""), || {
            let err = EnvCredentials::default().api_key().expect_err("empty");
            assert!(matches!(err, Error::Credentials(_)));
        });
    }

    #[test]
    fn closure_provider() {
        let provider = || -> Result<SecretString> { Ok(SecretString::from("closure".to_owned())) };
        assert_eq!(provider.api_key().expect("key").expose_secret(), "closure");
    }
}
