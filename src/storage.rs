//! Object-store access for swatch, element and variant images.
//!
//! Two backends sit behind the [`ObjectStore`] trait: the Supabase Storage
//! REST API for deployments and an in-memory store for tests and local
//! development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Bucket holding couleur swatch images.
pub const BUCKET_BASES_TEXTILES: &str = "bases-textiles";
/// Bucket holding overlay element images.
pub const BUCKET_ELEMENTS_SUPERPOSABLES: &str = "elements-superposables";
/// Bucket holding motif variant images.
pub const BUCKET_VARIANTES_IMAGES: &str = "variantes-images";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads an object; fails if the name already exists.
    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ServiceError>;

    /// Public URL for an object, derivable without a round trip.
    fn public_url(&self, bucket: &str, object: &str) -> String;

    /// Removes an object. Removing a missing object is not an error.
    async fn remove(&self, bucket: &str, object: &str) -> Result<(), ServiceError>;
}

/// Collision-free object name: millisecond timestamp plus a random base36
/// suffix, keeping the original extension.
pub fn unique_object_name(original: &str) -> String {
    let ext = original.rsplit('.').next().filter(|e| *e != original);
    let timestamp = chrono::Utc::now().timestamp_millis();
    let suffix: String = {
        let mut rng = rand::thread_rng();
        (0..6)
            .map(|_| {
                let n = rng.gen_range(0..36u32);
                std::char::from_digit(n, 36).unwrap_or('0')
            })
            .collect()
    };
    match ext {
        Some(ext) => format!("{}-{}.{}", timestamp, suffix, ext.to_ascii_lowercase()),
        None => format!("{}-{}", timestamp, suffix),
    }
}

/// Extracts the object name from a public URL (its last path segment).
pub fn object_name_from_url(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|s| !s.is_empty())
}

/// Content type derived from the object name extension.
pub fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next().map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "webp" => "image/webp",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Supabase Storage backend.
pub struct SupabaseStorage {
    base_url: String,
    service_key: String,
    client: reqwest::Client,
}

impl SupabaseStorage {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn object_endpoint(&self, bucket: &str, object: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, object)
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ServiceError> {
        debug!(bucket, object, "uploading object");
        let response = self
            .client
            .post(self.object_endpoint(bucket, object))
            .bearer_auth(&self.service_key)
            .header(http::header::CONTENT_TYPE, content_type)
            .header(http::header::CACHE_CONTROL, "max-age=3600")
            .body(data)
            .send()
            .await
            .map_err(|e| ServiceError::StorageError(format!("upload failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::StorageError(format!(
                "upload of {bucket}/{object} rejected ({status}): {body}"
            )));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, object: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, object
        )
    }

    async fn remove(&self, bucket: &str, object: &str) -> Result<(), ServiceError> {
        debug!(bucket, object, "removing object");
        let response = self
            .client
            .delete(self.object_endpoint(bucket, object))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| ServiceError::StorageError(format!("remove failed: {e}")))?;

        // A missing object is treated as already removed.
        if !response.status().is_success() && response.status() != http::StatusCode::NOT_FOUND {
            let status = response.status();
            return Err(ServiceError::StorageError(format!(
                "removal of {bucket}/{object} rejected ({status})"
            )));
        }
        Ok(())
    }
}

/// In-memory backend keyed by `(bucket, object)`.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, bucket: &str, object: &str) -> bool {
        self.objects
            .read()
            .await
            .contains_key(&(bucket.to_string(), object.to_string()))
    }

    pub async fn object_count(&self, bucket: &str) -> usize {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .count()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), ServiceError> {
        let mut objects = self.objects.write().await;
        let key = (bucket.to_string(), object.to_string());
        if objects.contains_key(&key) {
            return Err(ServiceError::StorageError(format!(
                "object {bucket}/{object} already exists"
            )));
        }
        objects.insert(key, data);
        Ok(())
    }

    fn public_url(&self, bucket: &str, object: &str) -> String {
        format!("memory://{}/{}", bucket, object)
    }

    async fn remove(&self, bucket: &str, object: &str) -> Result<(), ServiceError> {
        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), object.to_string()));
        Ok(())
    }
}

/// Best-effort removal used during cleanup paths, where a storage failure
/// must not abort the surrounding operation.
pub async fn remove_logged(store: &Arc<dyn ObjectStore>, bucket: &str, url: &str) {
    let Some(object) = object_name_from_url(url) else {
        warn!(bucket, url, "could not derive object name from url");
        return;
    };
    if let Err(err) = store.remove(bucket, object).await {
        warn!(bucket, object, "failed to remove object: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_names_keep_the_extension() {
        let name = unique_object_name("Photo Été.PNG");
        assert!(name.ends_with(".png"));
        let (stem, _) = name.rsplit_once('.').unwrap();
        let (timestamp, suffix) = stem.split_once('-').unwrap();
        assert!(timestamp.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 6);
    }

    #[test]
    fn unique_names_do_not_collide() {
        let first = unique_object_name("a.png");
        let second = unique_object_name("a.png");
        assert_ne!(first, second);
    }

    #[test]
    fn object_name_round_trips_through_public_url() {
        let store = InMemoryObjectStore::new();
        let url = store.public_url(BUCKET_VARIANTES_IMAGES, "123-abc.png");
        assert_eq!(object_name_from_url(&url), Some("123-abc.png"));
    }

    #[tokio::test]
    async fn in_memory_store_upload_remove() {
        let store = InMemoryObjectStore::new();
        store
            .upload(BUCKET_BASES_TEXTILES, "x.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert!(store.contains(BUCKET_BASES_TEXTILES, "x.png").await);

        // Second upload with the same name is rejected, like upsert=false.
        assert!(store
            .upload(BUCKET_BASES_TEXTILES, "x.png", vec![4], "image/png")
            .await
            .is_err());

        store.remove(BUCKET_BASES_TEXTILES, "x.png").await.unwrap();
        assert!(!store.contains(BUCKET_BASES_TEXTILES, "x.png").await);
        // Removing again is a no-op.
        store.remove(BUCKET_BASES_TEXTILES, "x.png").await.unwrap();
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
