use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;

/// How long an upload URL stays valid.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("presigning failed: {0}")]
    Presign(String),
}

/// MediaStore
///
/// Object storage for artisans' portfolio images. Uploads go straight from the
/// browser to the bucket through a short-lived signed URL.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Creates the bucket when missing. Only called at local startup.
    async fn ensure_bucket_exists(&self);

    /// Signed PUT URL for `key`, constrained to `content_type`. Implementations
    /// sign `sanitize_key(key)`, never the raw key.
    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<String, StorageError>;
}

pub type MediaStoreState = Arc<dyn MediaStore>;

/// S3MediaStore
///
/// AWS SDK client pointed at any S3-compatible endpoint (MinIO locally).
/// Path-style addressing is required by MinIO.
#[derive(Clone)]
pub struct S3MediaStore {
    client: s3::Client,
    bucket: String,
}

impl S3MediaStore {
    pub fn new(endpoint: &str, region: &str, access_key: &str, secret_key: &str, bucket: &str) -> Self {
        let credentials = s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket on an existing bucket errors harmlessly.
        if let Err(e) = self.client.create_bucket().bucket(&self.bucket).send().await {
            tracing::debug!(bucket = %self.bucket, error = %e, "create_bucket skipped");
        }
    }

    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<String, StorageError> {
        let presigning =
            PresigningConfig::expires_in(UPLOAD_URL_TTL).map_err(|e| StorageError::Presign(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(sanitize_key(key))
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}

/// sanitize_key
///
/// Drops empty, `.` and `..` segments so a caller-influenced key cannot climb
/// out of its prefix.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockMediaStore
///
/// Deterministic store for tests; no network.
#[derive(Clone, Default)]
pub struct MockMediaStore {
    /// When true, every presign call fails.
    pub should_fail: bool,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn ensure_bucket_exists(&self) {}

    async fn presign_upload(&self, key: &str, _content_type: &str) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError::Presign("simulated failure".to_string()));
        }
        Ok(format!(
            "http://localhost:9000/mock-bucket/{}?signature=fake",
            sanitize_key(key)
        ))
    }
}
