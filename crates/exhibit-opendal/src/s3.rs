//! Amazon S3 configuration.

use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Placeholder values shipped in sample `.env` files.
const PLACEHOLDER_ENDPOINT: &str = "your-s3-compatible-endpoint";
const PLACEHOLDER_ACCESS_KEY: &str = "your-access-key";

/// Amazon S3 configuration.
///
/// Every field is optional so an incomplete environment can still start the
/// service; see [`StorageConfig::s3_or_memory`](crate::StorageConfig::s3_or_memory).
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct S3Config {
    /// S3 endpoint URL (AWS or any S3-compatible service)
    #[cfg_attr(feature = "config", arg(long = "s3-endpoint", env = "S3_ENDPOINT"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// S3 region
    #[cfg_attr(feature = "config", arg(long = "s3-region", env = "S3_REGION"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Bucket that receives uploaded images
    #[cfg_attr(feature = "config", arg(long = "s3-bucket", env = "S3_BUCKET"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Access key ID
    #[cfg_attr(feature = "config", arg(long = "s3-access-key", env = "S3_ACCESS_KEY"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    /// Secret access key
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-secret-key", env = "S3_SECRET_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,

    /// Base URL for public image links (defaults to the AWS virtual-hosted URL)
    #[cfg_attr(feature = "config", arg(long = "s3-public-url", env = "S3_PUBLIC_URL"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

impl S3Config {
    /// Creates a new S3 configuration for a bucket in a region.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            region: Some(region.into()),
            ..Self::default()
        }
    }

    /// Sets the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Sets the base URL used for public image links.
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.public_url = Some(public_url.into());
        self
    }

    /// Returns whether all settings are present and none is a sample placeholder.
    pub fn is_configured(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

        present(&self.endpoint)
            && present(&self.region)
            && present(&self.bucket)
            && present(&self.access_key_id)
            && present(&self.secret_access_key)
            && !self
                .endpoint
                .as_deref()
                .is_some_and(|v| v.contains(PLACEHOLDER_ENDPOINT))
            && !self
                .access_key_id
                .as_deref()
                .is_some_and(|v| v.contains(PLACEHOLDER_ACCESS_KEY))
    }

    /// Returns the base URL that object keys are appended to.
    ///
    /// Uses the AWS virtual-hosted style unless a public URL is set.
    pub fn public_base_url(&self) -> Option<String> {
        if let Some(public_url) = &self.public_url {
            return Some(public_url.clone());
        }

        let bucket = self.bucket.as_deref()?;
        let region = self.region.as_deref()?;
        Some(format!("https://{bucket}.s3.{region}.amazonaws.com/"))
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .field("public_url", &self.public_url)
            .finish()
    }
}
