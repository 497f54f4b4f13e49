//! Chunked photo upload
//!
//! An upload runs as its own task. It sends fixed-size chunks through the
//! [`PhotoIngestionPort`], publishes progress on a `watch` channel, and
//! stops at the next chunk boundary when its [`CancellationToken`] fires.
//! Transient port errors are retried with the configured backoff. A
//! cancelled or failed upload keeps its partial data on the ingestion side
//! and can be resumed from the acknowledged offset.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use core_kernel::{RetryPolicy, UploadId};

use crate::error::ClaimError;
use crate::photo::Photo;
use crate::ports::{PhotoIngestionPort, PhotoUploadRequest};

/// Default chunk size, 64 KiB
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Upload tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub chunk_size: usize,
    pub retry: RetryPolicy,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

/// Where an upload is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadState {
    Pending,
    Uploading,
    Completed,
    Cancelled,
    Failed { reason: String },
}

impl UploadState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, UploadState::Pending | UploadState::Uploading)
    }
}

/// A progress snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub upload_id: UploadId,
    pub bytes_sent: u64,
    pub total_bytes: u64,
    pub state: UploadState,
}

impl UploadProgress {
    /// Whole-number percentage; an empty upload counts as done
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 100;
        }
        ((self.bytes_sent.min(self.total_bytes) * 100) / self.total_bytes) as u8
    }
}

/// A running upload
#[derive(Debug)]
pub struct UploadHandle {
    upload_id: UploadId,
    progress: watch::Receiver<UploadProgress>,
    cancel: CancellationToken,
    task: JoinHandle<Result<Photo, ClaimError>>,
}

impl UploadHandle {
    pub fn upload_id(&self) -> UploadId {
        self.upload_id
    }

    /// Subscribes to progress updates
    pub fn progress(&self) -> watch::Receiver<UploadProgress> {
        self.progress.clone()
    }

    /// Latest progress snapshot
    pub fn latest(&self) -> UploadProgress {
        self.progress.borrow().clone()
    }

    /// Stops the upload at the next chunk boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the upload to finish
    pub async fn wait(self) -> Result<Photo, ClaimError> {
        self.task.await.map_err(|e| {
            ClaimError::port(
                "photo upload",
                core_kernel::PortError::internal(format!("upload task failed: {e}")),
            )
        })?
    }
}

/// Drives uploads against an ingestion port
#[derive(Clone)]
pub struct PhotoUploader {
    port: Arc<dyn PhotoIngestionPort>,
    config: UploadConfig,
}

impl PhotoUploader {
    pub fn new(port: Arc<dyn PhotoIngestionPort>, config: UploadConfig) -> Self {
        Self { port, config }
    }

    /// Opens an upload for `data` and starts sending it
    pub async fn start(
        &self,
        request: PhotoUploadRequest,
        data: Arc<Vec<u8>>,
    ) -> Result<UploadHandle, ClaimError> {
        if request.size_bytes != data.len() as u64 {
            return Err(ClaimError::validation(format!(
                "announced size {} does not match {} bytes of data",
                request.size_bytes,
                data.len()
            )));
        }
        let upload_id = self
            .port
            .begin_upload(request)
            .await
            .map_err(|e| ClaimError::port("begin upload", e))?;
        Ok(self.spawn(upload_id, data, 0))
    }

    /// Continues an interrupted upload from the acknowledged offset
    pub async fn resume(
        &self,
        upload_id: UploadId,
        data: Arc<Vec<u8>>,
    ) -> Result<UploadHandle, ClaimError> {
        let offset = self
            .port
            .acknowledged_offset(upload_id)
            .await
            .map_err(|e| ClaimError::port("resume upload", e))?;
        if offset > data.len() as u64 {
            return Err(ClaimError::validation(format!(
                "acknowledged offset {offset} is past the end of the data"
            )));
        }
        debug!(%upload_id, offset, "Resuming photo upload");
        Ok(self.spawn(upload_id, data, offset))
    }

    fn spawn(&self, upload_id: UploadId, data: Arc<Vec<u8>>, offset: u64) -> UploadHandle {
        let (tx, rx) = watch::channel(UploadProgress {
            upload_id,
            bytes_sent: offset,
            total_bytes: data.len() as u64,
            state: UploadState::Pending,
        });
        let cancel = CancellationToken::new();
        let transfer = Transfer {
            port: Arc::clone(&self.port),
            config: self.config.clone(),
            upload_id,
            data,
            progress: tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(transfer.run(offset));

        UploadHandle {
            upload_id,
            progress: rx,
            cancel,
            task,
        }
    }
}

struct Transfer {
    port: Arc<dyn PhotoIngestionPort>,
    config: UploadConfig,
    upload_id: UploadId,
    data: Arc<Vec<u8>>,
    progress: watch::Sender<UploadProgress>,
    cancel: CancellationToken,
}

impl Transfer {
    fn publish(&self, bytes_sent: u64, state: UploadState) {
        self.progress.send_modify(|p| {
            p.bytes_sent = p.bytes_sent.max(bytes_sent);
            p.state = state;
        });
    }

    fn cancelled(&self, bytes_sent: u64) -> ClaimError {
        self.publish(bytes_sent, UploadState::Cancelled);
        debug!(upload_id = %self.upload_id, bytes_sent, "Photo upload cancelled");
        ClaimError::UploadCancelled {
            upload_id: self.upload_id,
            bytes_sent,
        }
    }

    async fn run(self, mut offset: u64) -> Result<Photo, ClaimError> {
        let total = self.data.len() as u64;
        let chunk_size = self.config.chunk_size.max(1) as u64;
        self.publish(offset, UploadState::Uploading);

        while offset < total {
            let end = (offset + chunk_size).min(total);
            let chunk = self.data[offset as usize..end as usize].to_vec();
            let acknowledged = self.send_chunk(offset, chunk).await?;
            if acknowledged <= offset {
                let reason = format!("ingestion did not advance past offset {offset}");
                self.publish(offset, UploadState::Failed { reason: reason.clone() });
                return Err(ClaimError::port(
                    "upload chunk",
                    core_kernel::PortError::internal(reason),
                ));
            }
            offset = acknowledged;
            self.publish(offset, UploadState::Uploading);
        }

        if self.cancel.is_cancelled() {
            return Err(self.cancelled(offset));
        }
        match self.port.complete_upload(self.upload_id).await {
            Ok(photo) => {
                self.publish(total, UploadState::Completed);
                Ok(photo)
            }
            Err(e) => {
                self.publish(offset, UploadState::Failed { reason: e.to_string() });
                Err(ClaimError::port("complete upload", e))
            }
        }
    }

    async fn send_chunk(&self, offset: u64, chunk: Vec<u8>) -> Result<u64, ClaimError> {
        let mut attempt = 0;
        loop {
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.cancelled(offset)),
                result = self.port.put_chunk(self.upload_id, offset, chunk.clone()) => result,
            };

            match result {
                Ok(acknowledged) => return Ok(acknowledged),
                Err(e) if self.config.retry.should_retry(attempt, &e) => {
                    attempt += 1;
                    let delay = self.config.retry.delay_for(attempt);
                    warn!(
                        upload_id = %self.upload_id,
                        offset,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Chunk write failed, retrying"
                    );
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Err(self.cancelled(offset)),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => {
                    self.publish(offset, UploadState::Failed { reason: e.to_string() });
                    return Err(ClaimError::port("upload chunk", e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryPhotoStore;
    use core_kernel::ClaimId;

    fn request(size: usize) -> PhotoUploadRequest {
        PhotoUploadRequest {
            claim_id: ClaimId::new(),
            filename: "front-damage-1.jpg".into(),
            content_type: "image/jpeg".into(),
            size_bytes: size as u64,
        }
    }

    fn config(chunk_size: usize) -> UploadConfig {
        UploadConfig {
            chunk_size,
            retry: RetryPolicy {
                max_retries: 3,
                retry_delay_ms: 1,
                max_delay_ms: 5,
            },
        }
    }

    #[test]
    fn test_percent() {
        let progress = UploadProgress {
            upload_id: UploadId::new(),
            bytes_sent: 25,
            total_bytes: 100,
            state: UploadState::Uploading,
        };
        assert_eq!(progress.percent(), 25);

        let empty = UploadProgress {
            total_bytes: 0,
            bytes_sent: 0,
            ..progress
        };
        assert_eq!(empty.percent(), 100);
    }

    #[tokio::test]
    async fn test_upload_completes_in_chunks() {
        let store = Arc::new(InMemoryPhotoStore::new());
        let uploader = PhotoUploader::new(store.clone(), config(4));
        let data = Arc::new((0u8..10).collect::<Vec<_>>());

        let handle = uploader.start(request(10), data.clone()).await.unwrap();
        let progress = handle.progress();
        let photo = handle.wait().await.unwrap();

        assert_eq!(photo.size_bytes, 10);
        assert_eq!(store.content(photo.id).await.unwrap(), *data);
        let last = progress.borrow().clone();
        assert_eq!(last.state, UploadState::Completed);
        assert_eq!(last.percent(), 100);
    }

    #[tokio::test]
    async fn test_size_mismatch_rejected() {
        let store = Arc::new(InMemoryPhotoStore::new());
        let uploader = PhotoUploader::new(store, config(4));
        let result = uploader.start(request(3), Arc::new(vec![1, 2])).await;
        assert!(matches!(result, Err(ClaimError::Validation(_))));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let store = Arc::new(InMemoryPhotoStore::new());
        store.fail_next_chunks(2);
        let uploader = PhotoUploader::new(store, config(4));

        let handle = uploader.start(request(8), Arc::new(vec![7; 8])).await.unwrap();
        assert!(handle.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_cancel_then_resume() {
        let store = Arc::new(InMemoryPhotoStore::new());
        store.fail_next_chunks(u32::MAX);
        let slow_retry = UploadConfig {
            chunk_size: 4,
            retry: RetryPolicy {
                max_retries: 100,
                retry_delay_ms: 10_000,
                max_delay_ms: 10_000,
            },
        };
        let uploader = PhotoUploader::new(store.clone(), slow_retry);
        let data = Arc::new(vec![3u8; 8]);

        let handle = uploader.start(request(8), data.clone()).await.unwrap();
        let upload_id = handle.upload_id();
        handle.cancel();
        let err = handle.wait().await.unwrap_err();
        assert!(matches!(
            err,
            ClaimError::UploadCancelled { bytes_sent: 0, .. }
        ));

        store.fail_next_chunks(0);
        let resumed = uploader.resume(upload_id, data).await.unwrap();
        let photo = resumed.wait().await.unwrap();
        assert_eq!(photo.size_bytes, 8);
    }

    #[tokio::test]
    async fn test_resume_starts_at_acknowledged_offset() {
        let store = Arc::new(InMemoryPhotoStore::new());
        let data: Vec<u8> = (0u8..8).collect();
        let upload_id = store.begin_upload(request(8)).await.unwrap();
        store.put_chunk(upload_id, 0, data[..4].to_vec()).await.unwrap();

        let uploader = PhotoUploader::new(store.clone(), config(4));
        let handle = uploader.resume(upload_id, Arc::new(data.clone())).await.unwrap();
        assert!(handle.latest().bytes_sent >= 4);
        let photo = handle.wait().await.unwrap();
        assert_eq!(store.content(photo.id).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_failures_beyond_retry_budget_fail_upload() {
        let store = Arc::new(InMemoryPhotoStore::new());
        store.fail_next_chunks(10);
        let uploader = PhotoUploader::new(store, config(4));

        let handle = uploader.start(request(8), Arc::new(vec![7; 8])).await.unwrap();
        let progress = handle.progress();
        let err = handle.wait().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(progress.borrow().state, UploadState::Failed { .. }));
    }
}
