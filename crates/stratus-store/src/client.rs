//! High-level object-store client.
//!
//! [`ObjectStore`] keeps one OpenDAL operator per registered bucket and
//! routes object operations to it. Buckets are registered with
//! [`create_bucket`](ObjectStore::create_bucket); operations against an
//! unregistered bucket fail with [`StoreError::NotFound`], mirroring the
//! NoSuchBucket behavior of the real service.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::TryStreamExt;
use opendal::{Operator, services};
use tracing::{debug, error, info};

use crate::config::StoreConfig;
use crate::region::Region;
use crate::{
    StoreError, StoreResult, TRACING_TARGET_BUCKETS, TRACING_TARGET_CLIENT, TRACING_TARGET_OBJECTS,
};

/// Receipt for a completed put or upload.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Object key that was written.
    pub key: String,
    /// Size of the written object in bytes.
    pub size: u64,
    /// Wall-clock duration of the write.
    pub duration: Duration,
}

/// Receipt for a completed download.
#[derive(Debug, Clone)]
pub struct DownloadReceipt {
    /// Object key that was read.
    pub key: String,
    /// Size of the downloaded object in bytes.
    pub size: u64,
    /// Wall-clock duration of the read.
    pub duration: Duration,
}

/// Descriptor of a registered bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    /// Bucket name.
    pub name: String,
    /// Region the bucket was created in.
    pub region: Region,
}

#[derive(Clone)]
struct BucketHandle {
    operator: Operator,
    region: Region,
}

/// Object-store client managing bucket-scoped operators.
pub struct ObjectStore {
    config: StoreConfig,
    buckets: RwLock<HashMap<String, BucketHandle>>,
}

impl ObjectStore {
    /// Creates a client for the given provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        info!(
            target: TRACING_TARGET_CLIENT,
            provider = config.provider_name(),
            "object store client initialized"
        );

        Ok(Self {
            config,
            buckets: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the provider configuration.
    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Registers a bucket in the given region.
    ///
    /// For the in-memory provider this materializes a fresh namespace. For
    /// S3 the bucket must already exist on the service; registration checks
    /// that it is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if the name is taken, or a
    /// backend error if the reachability check fails.
    pub async fn create_bucket(&self, bucket: &str, region: Region) -> StoreResult<()> {
        if bucket.is_empty() {
            return Err(StoreError::config("bucket name cannot be empty"));
        }

        debug!(
            target: TRACING_TARGET_BUCKETS,
            bucket = %bucket,
            region = %region,
            "creating bucket"
        );

        let start = Instant::now();
        let operator = self.build_operator(bucket, region)?;

        if matches!(self.config, StoreConfig::S3(_)) {
            operator.check().await.map_err(|e| {
                error!(
                    target: TRACING_TARGET_BUCKETS,
                    bucket = %bucket,
                    region = %region,
                    error = %e,
                    "bucket is not reachable"
                );
                StoreError::from(e)
            })?;
        }

        {
            let mut buckets = lock_write(&self.buckets)?;
            if buckets.contains_key(bucket) {
                return Err(StoreError::already_exists(format!("bucket '{bucket}'")));
            }
            buckets.insert(bucket.to_string(), BucketHandle { operator, region });
        }

        info!(
            target: TRACING_TARGET_BUCKETS,
            bucket = %bucket,
            region = %region,
            elapsed = ?start.elapsed(),
            "bucket created"
        );

        Ok(())
    }

    /// Writes an object body under the given key.
    ///
    /// A second put to the same key replaces the body.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unregistered bucket, or a
    /// backend error if the write fails.
    pub async fn put(&self, bucket: &str, key: &str, body: Bytes) -> StoreResult<UploadReceipt> {
        let handle = self.handle(bucket)?;
        let size = body.len() as u64;

        debug!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            key = %key,
            size = %size,
            "putting object"
        );

        let start = Instant::now();
        let result = handle.operator.write(key, body.to_vec()).await;
        let elapsed = start.elapsed();

        match result {
            Ok(_) => {
                info!(
                    target: TRACING_TARGET_OBJECTS,
                    bucket = %bucket,
                    key = %key,
                    size = %size,
                    elapsed = ?elapsed,
                    "object written"
                );

                Ok(UploadReceipt {
                    key: key.to_string(),
                    size,
                    duration: elapsed,
                })
            }
            Err(e) => {
                error!(
                    target: TRACING_TARGET_OBJECTS,
                    bucket = %bucket,
                    key = %key,
                    error = %e,
                    elapsed = ?elapsed,
                    "failed to write object"
                );
                Err(e.into())
            }
        }
    }

    /// Reads an object body.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unregistered bucket or a
    /// missing key.
    pub async fn get(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        let handle = self.handle(bucket)?;

        debug!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            key = %key,
            "getting object"
        );

        let start = Instant::now();
        let result = handle.operator.read(key).await;
        let elapsed = start.elapsed();

        match result {
            Ok(buffer) => {
                let body = Bytes::from(buffer.to_vec());

                debug!(
                    target: TRACING_TARGET_OBJECTS,
                    bucket = %bucket,
                    key = %key,
                    size = body.len(),
                    elapsed = ?elapsed,
                    "object read"
                );

                Ok(body)
            }
            Err(e) => {
                error!(
                    target: TRACING_TARGET_OBJECTS,
                    bucket = %bucket,
                    key = %key,
                    error = %e,
                    elapsed = ?elapsed,
                    "failed to read object"
                );
                Err(e.into())
            }
        }
    }

    /// Uploads a local file under the given key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read, or any error
    /// [`put`](Self::put) can return.
    pub async fn upload(
        &self,
        bucket: &str,
        key: &str,
        file_path: &Path,
    ) -> StoreResult<UploadReceipt> {
        let data = tokio::fs::read(file_path).await?;
        self.put(bucket, key, Bytes::from(data)).await
    }

    /// Downloads an object to a local file.
    ///
    /// # Errors
    ///
    /// Returns any error [`get`](Self::get) can return, or
    /// [`StoreError::Io`] if the file cannot be written.
    pub async fn download(
        &self,
        bucket: &str,
        key: &str,
        file_path: &Path,
    ) -> StoreResult<DownloadReceipt> {
        let start = Instant::now();
        let body = self.get(bucket, key).await?;
        tokio::fs::write(file_path, &body).await?;

        Ok(DownloadReceipt {
            key: key.to_string(),
            size: body.len() as u64,
            duration: start.elapsed(),
        })
    }

    /// Deletes an object.
    ///
    /// Deleting a key that does not exist is not an error, matching the
    /// underlying service semantics.
    pub async fn delete(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let handle = self.handle(bucket)?;

        debug!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            key = %key,
            "deleting object"
        );

        handle.operator.delete(key).await?;
        Ok(())
    }

    /// Checks whether an object exists.
    pub async fn exists(&self, bucket: &str, key: &str) -> StoreResult<bool> {
        let handle = self.handle(bucket)?;
        Ok(handle.operator.exists(key).await?)
    }

    /// Lists the keys in a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unregistered bucket.
    pub async fn list(&self, bucket: &str) -> StoreResult<Vec<String>> {
        let handle = self.handle(bucket)?;

        let entries: Vec<_> = handle.operator.lister("").await?.try_collect().await?;
        let keys: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.path().to_string())
            .collect();

        debug!(
            target: TRACING_TARGET_OBJECTS,
            bucket = %bucket,
            count = keys.len(),
            "objects listed"
        );

        Ok(keys)
    }

    /// Lists all registered buckets, sorted by name.
    pub fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        let buckets = lock_read(&self.buckets)?;

        let mut infos: Vec<BucketInfo> = buckets
            .iter()
            .map(|(name, handle)| BucketInfo {
                name: name.clone(),
                region: handle.region,
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(infos)
    }

    /// Returns the region a bucket was registered in.
    pub fn bucket_region(&self, bucket: &str) -> StoreResult<Region> {
        Ok(self.handle(bucket)?.region)
    }

    fn handle(&self, bucket: &str) -> StoreResult<BucketHandle> {
        let buckets = lock_read(&self.buckets)?;
        buckets
            .get(bucket)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("bucket '{bucket}' does not exist")))
    }

    fn build_operator(&self, bucket: &str, region: Region) -> StoreResult<Operator> {
        match &self.config {
            StoreConfig::Memory => Operator::new(services::Memory::default())
                .map(|op| op.finish())
                .map_err(StoreError::from),
            StoreConfig::S3(settings) => {
                let mut builder = services::S3::default()
                    .bucket(bucket)
                    .region(&region.to_string())
                    .access_key_id(&settings.credentials.access_key)
                    .secret_access_key(&settings.credentials.secret_key);

                if let Some(endpoint) = &settings.endpoint {
                    builder = builder.endpoint(endpoint.as_str());
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(StoreError::from)
            }
        }
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("provider", &self.config.provider_name())
            .finish()
    }
}

fn lock_read<'a>(
    buckets: &'a RwLock<HashMap<String, BucketHandle>>,
) -> StoreResult<std::sync::RwLockReadGuard<'a, HashMap<String, BucketHandle>>> {
    buckets
        .read()
        .map_err(|_| StoreError::config("bucket registry lock poisoned"))
}

fn lock_write<'a>(
    buckets: &'a RwLock<HashMap<String, BucketHandle>>,
) -> StoreResult<std::sync::RwLockWriteGuard<'a, HashMap<String, BucketHandle>>> {
    buckets
        .write()
        .map_err(|_| StoreError::config("bucket registry lock poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> ObjectStore {
        ObjectStore::new(StoreConfig::memory()).unwrap()
    }

    #[tokio::test]
    async fn put_then_get_round_trip() {
        let store = memory_store();
        store.create_bucket("test-bucket", Region::UsEast1).await.unwrap();

        let receipt = store
            .put("test-bucket", "test-key", Bytes::from_static(b"hello object store"))
            .await
            .unwrap();
        assert_eq!(receipt.key, "test-key");
        assert_eq!(receipt.size, 18);

        let body = store.get("test-bucket", "test-key").await.unwrap();
        assert_eq!(body, Bytes::from_static(b"hello object store"));
    }

    #[tokio::test]
    async fn put_to_unknown_bucket_fails_with_not_found() {
        let store = memory_store();

        let result = store
            .put("non-existent-bucket", "test-key", Bytes::from_static(b"this will fail"))
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_missing_key_fails_with_not_found() {
        let store = memory_store();
        store.create_bucket("test-bucket", Region::UsEast1).await.unwrap();

        let result = store.get("test-bucket", "non-existent-key").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_bucket_fails_with_already_exists() {
        let store = memory_store();
        store.create_bucket("test-bucket", Region::UsEast1).await.unwrap();

        let result = store.create_bucket("test-bucket", Region::UsWest2).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn overwrite_replaces_body() {
        let store = memory_store();
        store.create_bucket("test-bucket", Region::UsEast1).await.unwrap();

        store
            .put("test-bucket", "test-key", Bytes::from_static(b"original content"))
            .await
            .unwrap();
        let body = store.get("test-bucket", "test-key").await.unwrap();
        assert_eq!(body, Bytes::from_static(b"original content"));

        store
            .put("test-bucket", "test-key", Bytes::from_static(b"updated content"))
            .await
            .unwrap();
        let body = store.get("test-bucket", "test-key").await.unwrap();
        assert_eq!(body, Bytes::from_static(b"updated content"));
    }

    #[tokio::test]
    async fn buckets_in_different_regions_are_independent() {
        let store = memory_store();
        store.create_bucket("bucket-east", Region::UsEast1).await.unwrap();
        store.create_bucket("bucket-west", Region::UsWest2).await.unwrap();

        store
            .put("bucket-east", "path/to/file1.txt", Bytes::from_static(b"east file"))
            .await
            .unwrap();
        store
            .put("bucket-west", "path/to/file2.txt", Bytes::from_static(b"west file"))
            .await
            .unwrap();

        assert_eq!(
            store.get("bucket-east", "path/to/file1.txt").await.unwrap(),
            Bytes::from_static(b"east file")
        );
        assert_eq!(
            store.get("bucket-west", "path/to/file2.txt").await.unwrap(),
            Bytes::from_static(b"west file")
        );

        // The other bucket's key does not bleed over.
        assert!(!store.exists("bucket-east", "path/to/file2.txt").await.unwrap());
        assert!(
            store
                .get("bucket-west", "path/to/file1.txt")
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn list_returns_all_keys() {
        let store = memory_store();
        store.create_bucket("test-bucket", Region::UsEast1).await.unwrap();

        store
            .put("test-bucket", "file1.txt", Bytes::from_static(b"content of file1"))
            .await
            .unwrap();
        store
            .put("test-bucket", "file2.txt", Bytes::from_static(b"content of file2"))
            .await
            .unwrap();

        let keys = store.list("test-bucket").await.unwrap();
        assert!(keys.iter().any(|k| k == "file1.txt"));
        assert!(keys.iter().any(|k| k == "file2.txt"));
    }

    #[tokio::test]
    async fn upload_and_download_files() {
        let store = memory_store();
        store.create_bucket("test-bucket", Region::UsEast1).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.txt");
        let target = dir.path().join("target.txt");
        tokio::fs::write(&source, b"this is a test file").await.unwrap();

        let receipt = store.upload("test-bucket", "test-key", &source).await.unwrap();
        assert_eq!(receipt.size, 19);

        let receipt = store.download("test-bucket", "test-key", &target).await.unwrap();
        assert_eq!(receipt.size, 19);

        let round_tripped = tokio::fs::read(&target).await.unwrap();
        assert_eq!(round_tripped, b"this is a test file");
    }

    #[tokio::test]
    async fn delete_then_exists_is_false() {
        let store = memory_store();
        store.create_bucket("test-bucket", Region::UsEast1).await.unwrap();

        store
            .put("test-bucket", "test-key", Bytes::from_static(b"ephemeral"))
            .await
            .unwrap();
        assert!(store.exists("test-bucket", "test-key").await.unwrap());

        store.delete("test-bucket", "test-key").await.unwrap();
        assert!(!store.exists("test-bucket", "test-key").await.unwrap());
    }

    #[tokio::test]
    async fn list_buckets_reports_regions() {
        let store = memory_store();
        store.create_bucket("bucket-b", Region::EuWest1).await.unwrap();
        store.create_bucket("bucket-a", Region::ApSouth1).await.unwrap();

        let buckets = store.list_buckets().unwrap();
        assert_eq!(
            buckets,
            vec![
                BucketInfo {
                    name: "bucket-a".to_string(),
                    region: Region::ApSouth1,
                },
                BucketInfo {
                    name: "bucket-b".to_string(),
                    region: Region::EuWest1,
                },
            ]
        );

        assert_eq!(store.bucket_region("bucket-a").unwrap(), Region::ApSouth1);
    }
}
