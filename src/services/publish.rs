// src/services/publish.rs

//! Static hosting publisher (Netlify file-digest deploys).
//!
//! A deploy is created with the SHA-1 digest of every file; the service
//! answers with the digests it does not have yet, and only those files are
//! uploaded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

use crate::error::{AppError, Result};
use crate::models::PublishConfig;

/// Environment variable holding the site identifier.
pub const SITE_ID_VAR: &str = "NETLIFY_SITE_ID";

/// Environment variable holding the access token.
pub const AUTH_TOKEN_VAR: &str = "NETLIFY_AUTH_TOKEN";

/// Hosting credentials, supplied out-of-band.
#[derive(Clone)]
pub struct PublishCredentials {
    pub site_id: String,
    pub token: String,
}

impl std::fmt::Debug for PublishCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishCredentials")
            .field("site_id", &self.site_id)
            .field("token", &"***")
            .finish()
    }
}

impl PublishCredentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::config(format!("{name} is not set")))
        };

        Ok(Self {
            site_id: read(SITE_ID_VAR)?,
            token: read(AUTH_TOKEN_VAR)?,
        })
    }
}

/// SHA-1 hex digest used as the file's content hash.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// Result of a publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub deploy_id: String,
    pub digest: String,
    pub uploaded: bool,
}

/// Publishes one file to a static hosting target.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, path: &str, bytes: &[u8]) -> Result<PublishOutcome>;
}

#[derive(Debug, Serialize)]
struct CreateDeployRequest<'a> {
    files: BTreeMap<&'a str, &'a str>,
}

#[derive(Debug, Deserialize)]
struct CreateDeployResponse {
    id: String,
    #[serde(default)]
    required: Vec<String>,
}

impl CreateDeployResponse {
    /// Whether the service asked for the file with this digest.
    fn needs_upload(&self, digest: &str) -> bool {
        self.required.iter().any(|required| required == digest)
    }
}

/// Netlify deploy API client.
pub struct NetlifyPublisher {
    client: reqwest::Client,
    api_base: String,
    credentials: PublishCredentials,
}

impl NetlifyPublisher {
    pub fn new(client: reqwest::Client, config: &PublishConfig, credentials: PublishCredentials) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn deploys_url(&self) -> String {
        format!("{}/sites/{}/deploys", self.api_base, self.credentials.site_id)
    }

    fn upload_url(&self, deploy_id: &str, path: &str) -> String {
        format!("{}/deploys/{}/files{}", self.api_base, deploy_id, path)
    }

    /// Turn a non-success response into [`AppError::Publish`].
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Publish {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Publisher for NetlifyPublisher {
    async fn publish(&self, path: &str, bytes: &[u8]) -> Result<PublishOutcome> {
        let digest = content_digest(bytes);
        let request = CreateDeployRequest {
            files: BTreeMap::from([(path, digest.as_str())]),
        };

        let response = self
            .client
            .post(self.deploys_url())
            .bearer_auth(&self.credentials.token)
            .json(&request)
            .send()
            .await?;
        let deploy: CreateDeployResponse = Self::check(response).await?.json().await?;
        log::info!(
            "Created deploy {} ({} file(s) required)",
            deploy.id,
            deploy.required.len()
        );

        let uploaded = deploy.needs_upload(&digest);
        if uploaded {
            let response = self
                .client
                .put(self.upload_url(&deploy.id, path))
                .bearer_auth(&self.credentials.token)
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(bytes.to_vec())
                .send()
                .await?;
            Self::check(response).await?;
            log::info!("Uploaded {} ({} bytes)", path, bytes.len());
        } else {
            log::info!("{} unchanged on the hosting service, upload skipped", path);
        }

        Ok(PublishOutcome {
            deploy_id: deploy.id,
            digest,
            uploaded,
        })
    }
}
