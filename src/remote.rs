//! Remote shader service and title metadata
//!
//! The traits are the seam the download and share flows are written
//! against; [`HttpRemote`] is the production implementation.

use crate::config::schema::RemoteConfig;
use crate::error::{ShaderkitError, ShaderkitResult};
use crate::title::TitleId;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Streamed response body
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// A remote archive body and its advertised length
pub struct ArchiveStream {
    /// `Content-Length`, when the server sent one
    pub total_length: Option<u64>,
    pub body: ByteStream,
}

/// Community shader cache service
#[async_trait]
pub trait ShaderRemote: Send + Sync {
    /// Sidecar bytes for `title`, or `None` if nothing is published
    async fn fetch_info(&self, title: &TitleId) -> ShaderkitResult<Option<Bytes>>;

    /// Open the archive body for `title`
    async fn fetch_archive(&self, title: &TitleId) -> ShaderkitResult<ArchiveStream>;

    /// Number of shaders the service holds for `title`
    async fn fetch_shader_count(&self, title: &TitleId) -> ShaderkitResult<Option<u64>>;

    /// Post a human-readable announcement
    async fn post_announcement(&self, message: &str) -> ShaderkitResult<()>;
}

/// Display metadata for a title
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TitleMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "titleId")]
    pub title_id: String,
}

impl TitleMetadata {
    /// Metadata carrying only the raw id
    pub fn fallback(title: &TitleId) -> Self {
        Self {
            title: None,
            title_id: title.to_string(),
        }
    }

    /// Human-readable name, falling back to the id
    pub fn display_name(&self) -> &str {
        match self.title.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.title_id,
        }
    }
}

/// Resolves title ids to display metadata
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, title: &TitleId) -> ShaderkitResult<TitleMetadata>;
}

/// HTTP client for the shader service API
pub struct HttpRemote {
    client: Client,
    api_url: String,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

impl HttpRemote {
    pub fn new(config: &RemoteConfig) -> ShaderkitResult<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    async fn get(&self, path: &str) -> ShaderkitResult<Response> {
        let url = self.url(path);
        debug!("GET {}", url);
        Ok(self.client.get(&url).send().await?)
    }
}

fn ensure_success(response: Response) -> ShaderkitResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ShaderkitError::RemoteStatus {
            url: response.url().to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl ShaderRemote for HttpRemote {
    async fn fetch_info(&self, title: &TitleId) -> ShaderkitResult<Option<Bytes>> {
        let response = self.get(&format!("shaders/{}/info", title.upper())).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let bytes = ensure_success(response)?.bytes().await?;
        Ok((!bytes.is_empty()).then_some(bytes))
    }

    async fn fetch_archive(&self, title: &TitleId) -> ShaderkitResult<ArchiveStream> {
        let response = ensure_success(self.get(&format!("shaders/{}/zip", title.upper())).await?)?;
        let total_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other))
            .boxed();

        Ok(ArchiveStream { total_length, body })
    }

    async fn fetch_shader_count(&self, title: &TitleId) -> ShaderkitResult<Option<u64>> {
        let response = self.get(&format!("shaders/{}/count", title.upper())).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: CountResponse = ensure_success(response)?.json().await?;
        Ok(Some(body.count))
    }

    async fn post_announcement(&self, message: &str) -> ShaderkitResult<()> {
        let url = self.url("messages");
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }
}

#[async_trait]
impl MetadataResolver for HttpRemote {
    async fn resolve(&self, title: &TitleId) -> ShaderkitResult<TitleMetadata> {
        let response = ensure_success(self.get(&format!("titles/{}", title.upper())).await?)?;
        let mut metadata: TitleMetadata = response.json().await?;
        if metadata.title_id.is_empty() {
            metadata.title_id = title.to_string();
        }
        Ok(metadata)
    }
}
