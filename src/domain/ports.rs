use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn narrative_endpoint(&self) -> &str;
    fn narrative_model(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn narrative_enabled(&self) -> bool;
    fn timeout_seconds(&self) -> u64;
    fn sample_rows(&self) -> usize;
    fn output_path(&self) -> &str;
    fn requests_per_minute(&self) -> usize;
    fn max_file_bytes(&self) -> usize;
}

/// Turns a statistics digest into prose. Any failure is reported as an error
/// and the caller decides how to degrade.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, digest: &str) -> Result<String>;
}

#[async_trait]
impl<T: NarrativeGenerator + ?Sized> NarrativeGenerator for Box<T> {
    async fn generate(&self, digest: &str) -> Result<String> {
        (**self).generate(digest).await
    }
}

/// Per-caller admission timestamps (milliseconds since the Unix epoch).
pub trait RateLimitStore: Send + Sync {
    fn timestamps(&self, caller: &str) -> Vec<i64>;
    fn append(&self, caller: &str, timestamp_ms: i64);
    fn prune(&self, caller: &str, older_than_ms: i64);
    /// Prune every caller and forget the ones left without timestamps.
    fn cleanup(&self, older_than_ms: i64);
}
