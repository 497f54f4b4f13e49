//! In-memory photo ingestion

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, PhotoId, PortError, UploadId,
};

use crate::photo::Photo;
use crate::ports::{PhotoIngestionPort, PhotoUploadRequest};

#[derive(Debug)]
struct PendingUpload {
    request: PhotoUploadRequest,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct Inner {
    pending: HashMap<UploadId, PendingUpload>,
    stored: HashMap<PhotoId, Vec<u8>>,
}

/// Keeps photo binaries in process memory
///
/// Chunks must arrive in order: a chunk is only accepted at the current
/// acknowledged offset. `fail_next_chunks` makes the next `n` chunk writes
/// fail with a transient connection error, which is how the upload retry
/// and resume paths are exercised.
#[derive(Debug, Default)]
pub struct InMemoryPhotoStore {
    inner: Mutex<Inner>,
    injected_failures: AtomicU32,
}

impl InMemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next `n` chunk writes with a connection error
    pub fn fail_next_chunks(&self, n: u32) {
        self.injected_failures.store(n, Ordering::SeqCst);
    }

    /// Content of a completed photo
    pub async fn content(&self, photo_id: PhotoId) -> Option<Vec<u8>> {
        self.inner.lock().await.stored.get(&photo_id).cloned()
    }

    pub async fn pending_uploads(&self) -> usize {
        self.inner.lock().await.pending.len()
    }

    pub async fn stored_photos(&self) -> usize {
        self.inner.lock().await.stored.len()
    }

    fn take_injected_failure(&self) -> bool {
        self.injected_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl DomainPort for InMemoryPhotoStore {}

#[async_trait]
impl HealthCheckable for InMemoryPhotoStore {
    async fn health_check(&self) -> HealthCheckResult {
        let inner = self.inner.lock().await;
        HealthCheckResult::healthy("in-memory-photo-store").with_message(format!(
            "{} stored, {} in flight",
            inner.stored.len(),
            inner.pending.len()
        ))
    }
}

#[async_trait]
impl PhotoIngestionPort for InMemoryPhotoStore {
    async fn begin_upload(&self, request: PhotoUploadRequest) -> Result<UploadId, PortError> {
        if request.filename.trim().is_empty() {
            return Err(PortError::validation_field("filename is required", "filename"));
        }
        if !request.content_type.starts_with("image/") {
            return Err(PortError::validation_field(
                format!("{} is not an image type", request.content_type),
                "content_type",
            ));
        }

        let upload_id = UploadId::new_v7();
        self.inner.lock().await.pending.insert(
            upload_id,
            PendingUpload {
                data: Vec::with_capacity(request.size_bytes as usize),
                request,
            },
        );
        Ok(upload_id)
    }

    async fn put_chunk(
        &self,
        upload_id: UploadId,
        offset: u64,
        chunk: Vec<u8>,
    ) -> Result<u64, PortError> {
        if self.take_injected_failure() {
            return Err(PortError::connection("connection reset while writing chunk"));
        }

        let mut inner = self.inner.lock().await;
        let upload = inner
            .pending
            .get_mut(&upload_id)
            .ok_or_else(|| PortError::not_found("Upload", upload_id))?;

        let acknowledged = upload.data.len() as u64;
        if offset != acknowledged {
            return Err(PortError::conflict(format!(
                "chunk offset {offset} does not match acknowledged offset {acknowledged}"
            )));
        }
        if acknowledged + chunk.len() as u64 > upload.request.size_bytes {
            return Err(PortError::validation("chunk exceeds announced upload size"));
        }

        upload.data.extend_from_slice(&chunk);
        Ok(upload.data.len() as u64)
    }

    async fn acknowledged_offset(&self, upload_id: UploadId) -> Result<u64, PortError> {
        self.inner
            .lock()
            .await
            .pending
            .get(&upload_id)
            .map(|upload| upload.data.len() as u64)
            .ok_or_else(|| PortError::not_found("Upload", upload_id))
    }

    async fn complete_upload(&self, upload_id: UploadId) -> Result<Photo, PortError> {
        let mut inner = self.inner.lock().await;
        let received = inner
            .pending
            .get(&upload_id)
            .map(|upload| (upload.data.len() as u64, upload.request.size_bytes))
            .ok_or_else(|| PortError::not_found("Upload", upload_id))?;
        if received.0 != received.1 {
            return Err(PortError::conflict(format!(
                "upload incomplete: {} of {} bytes",
                received.0, received.1
            )));
        }

        let upload = inner
            .pending
            .remove(&upload_id)
            .ok_or_else(|| PortError::not_found("Upload", upload_id))?;
        let photo_id = PhotoId::new_v7();
        let photo = Photo::new(
            photo_id,
            format!("memory://photos/{}/{}", photo_id, upload.request.filename),
            upload.request.filename,
            upload.request.content_type,
            upload.request.size_bytes,
        );
        inner.stored.insert(photo_id, upload.data);
        Ok(photo)
    }

    async fn abort_upload(&self, upload_id: UploadId) -> Result<(), PortError> {
        self.inner
            .lock()
            .await
            .pending
            .remove(&upload_id)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Upload", upload_id))
    }

    async fn discard_photo(&self, photo_id: PhotoId) -> Result<(), PortError> {
        self.inner
            .lock()
            .await
            .stored
            .remove(&photo_id)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Photo", photo_id))
    }
}
