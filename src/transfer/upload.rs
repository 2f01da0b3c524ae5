//! Uploading a packaged shader cache

use super::progress::{completion_due, ProgressEvent, ProgressSink, ProgressTracker};
use crate::config::schema::RemoteConfig;
use crate::error::{ShaderkitError, ShaderkitResult};
use crate::title::TitleId;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

/// Successful upload response of the file host
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: bool,
    pub data: UploadData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadData {
    pub file: UploadedFile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub url: UploadUrls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadUrls {
    pub short: String,
    #[serde(default)]
    pub full: Option<String>,
}

impl UploadResponse {
    /// Short link to the uploaded artifact
    pub fn short_link(&self) -> &str {
        &self.data.file.url.short
    }
}

/// Sends a packaged archive somewhere it can be downloaded from
#[async_trait]
pub trait ArchiveUploader: Send + Sync {
    /// Upload `archive`, reporting progress for `title`.
    ///
    /// `None` means the upload failed; the cause has already been logged.
    async fn upload(
        &self,
        archive: &Path,
        title: &TitleId,
        sink: &dyn ProgressSink,
    ) -> Option<UploadResponse>;
}

/// Multipart uploader for the configured file host
pub struct HttpUploader {
    client: Client,
    endpoint: String,
}

impl HttpUploader {
    pub fn new(config: &RemoteConfig) -> ShaderkitResult<Self> {
        if config.insecure_upload {
            warn!(
                "TLS certificate validation is disabled for uploads to {}",
                config.upload_url
            );
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .danger_accept_invalid_certs(config.insecure_upload)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.upload_url.clone(),
        })
    }

    async fn try_upload(
        &self,
        archive: &Path,
        title: &TitleId,
        sink: &dyn ProgressSink,
    ) -> ShaderkitResult<UploadResponse> {
        let size = tokio::fs::metadata(archive)
            .await
            .map_err(|e| ShaderkitError::io(format!("reading size of {}", archive.display()), e))?
            .len();
        let file = tokio::fs::File::open(archive)
            .await
            .map_err(|e| ShaderkitError::io(format!("opening {}", archive.display()), e))?;

        // The body stream is moved into the client, so events travel back
        // over a channel and reach the sink on this task.
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tracker = ProgressTracker::new(title.clone(), size);
        let counted = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                if let Some(event) = tracker.advance(bytes.len() as u64, Instant::now()) {
                    let _ = tx.send(event);
                }
            }
            chunk
        });

        let file_name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.zip".to_string());
        let part = Part::stream_with_length(Body::wrap_stream(counted), size).file_name(file_name);
        let form = Form::new().part("file", part);

        debug!("Uploading {} ({} bytes) to {}", archive.display(), size, self.endpoint);
        let request = self.client.post(&self.endpoint).multipart(form).send();
        tokio::pin!(request);

        let mut last: Option<ProgressEvent> = None;
        let mut relay = |event: ProgressEvent| {
            sink.on_progress(&event);
            last = Some(event);
        };
        let response = loop {
            tokio::select! {
                Some(event) = rx.recv() => relay(event),
                response = &mut request => break response?,
            }
        };
        while let Ok(event) = rx.try_recv() {
            relay(event);
        }

        let response = response.error_for_status()?;
        let parsed = response.json::<UploadResponse>().await?;

        // Throttling may have swallowed the last chunks; close the bar at 100%.
        if size > 0 {
            if let Some(due) = completion_due(last.as_ref(), Instant::now()) {
                tokio::time::sleep_until(due.into()).await;
                sink.on_progress(&ProgressEvent::complete(title.clone(), Instant::now()));
            }
        }
        Ok(parsed)
    }
}

#[async_trait]
impl ArchiveUploader for HttpUploader {
    async fn upload(
        &self,
        archive: &Path,
        title: &TitleId,
        sink: &dyn ProgressSink,
    ) -> Option<UploadResponse> {
        match self.try_upload(archive, title, sink).await {
            Ok(response) => {
                info!("Uploaded shader cache for {}: {}", title, response.short_link());
                Some(response)
            }
            Err(e) => {
                warn!("Shader upload for {} failed: {}", title, e);
                None
            }
        }
    }
}
