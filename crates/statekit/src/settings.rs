//! Explicit AWS connection settings.
//!
//! Everything the backend needs to reach AWS is carried here instead of
//! being picked up implicitly. Fields left unset fall back to the SDK's
//! default provider chain (environment, shared config files, instance role).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::DEFAULT_REGION;

/// Static access key credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCredentials {
    /// AWS access key id
    pub access_key_id: String,
    /// AWS secret access key
    pub secret_access_key: String,
    /// Optional STS session token
    #[serde(default)]
    pub session_token: Option<String>,
}

// Keep the secret out of logs.
impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Connection settings for the AWS backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsSettings {
    /// Region for both clients and the bucket location constraint
    pub region: String,
    /// Named profile from the shared config files
    #[serde(default)]
    pub profile: Option<String>,
    /// Custom endpoint (LocalStack, MinIO...)
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Static credentials, overriding the provider chain
    #[serde(default)]
    pub credentials: Option<StaticCredentials>,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

impl AwsSettings {
    /// Settings for a region, everything else from the provider chain.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
            endpoint_url: None,
            credentials: None,
        }
    }

    /// Use a named profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Send requests to a custom endpoint.
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Use static credentials.
    pub fn with_credentials(mut self, credentials: StaticCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Short description of where credentials come from.
    pub fn credential_source(&self) -> String {
        match (&self.credentials, &self.profile) {
            (Some(creds), _) => format!("static key {}", creds.access_key_id),
            (None, Some(profile)) => format!("profile {profile}"),
            (None, None) => "default provider chain".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_region() {
        assert_eq!(AwsSettings::default().region, "eu-central-1");
    }

    #[test]
    fn test_credential_source() {
        let settings = AwsSettings::new("us-east-1");
        assert_eq!(settings.credential_source(), "default provider chain");

        let settings = settings.with_profile("customers");
        assert_eq!(settings.credential_source(), "profile customers");

        let settings = settings.with_credentials(StaticCredentials {
            access_key_id: "AKIATEST".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: None,
        });
        assert_eq!(settings.credential_source(), "static key AKIATEST");
    }

    #[test]
    fn test_debug_hides_secret() {
        let creds = StaticCredentials {
            access_key_id: "AKIATEST".to_string(),
            secret_access_key: "very-secret".to_string(),
            session_token: Some("token".to_string()),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("AKIATEST"));
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("\"token\""));
    }
}
