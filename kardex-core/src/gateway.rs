//! Backend command gateway
//!
//! Every catalog operation crosses a single async boundary. The trait is the
//! seam between the reactive layer and whatever actually owns the data, and
//! [`RetryPolicy`] wraps calls through it with bounded backoff for transient
//! transport failures.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use kardex_cache::GatewayError;
use kardex_types::{DiseaseInfo, Tag, Template, TemplateId, TemplateTypeInfo};

/// Result alias for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Async command boundary to the backing store.
///
/// Implementations must be safe to call concurrently; callers clone an
/// `Arc<dyn Gateway>` freely and may issue overlapping requests.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Prepares the backing store. Idempotent.
    async fn init_store(&self) -> GatewayResult<()>;

    async fn list_templates(&self) -> GatewayResult<Vec<Template>>;

    async fn get_template(&self, id: &TemplateId) -> GatewayResult<Template>;

    /// Creates or replaces a template. Returns the stored copy, which may
    /// carry backend-assigned fields such as a refreshed `updated_at`.
    async fn save_template(&self, template: Template) -> GatewayResult<Template>;

    async fn delete_template(&self, id: &TemplateId) -> GatewayResult<()>;

    /// Flips the favorite flag and returns the new value.
    async fn toggle_favorite(&self, id: &TemplateId) -> GatewayResult<bool>;

    /// Backend-side keyword search over titles and section text.
    async fn search_templates(&self, keyword: &str) -> GatewayResult<Vec<Template>>;

    async fn list_diseases(&self) -> GatewayResult<Vec<DiseaseInfo>>;

    async fn list_template_types(&self) -> GatewayResult<Vec<TemplateTypeInfo>>;

    async fn list_tags(&self) -> GatewayResult<Vec<Tag>>;

    async fn save_disease(&self, name: &str) -> GatewayResult<()>;

    async fn save_template_type(&self, name: &str) -> GatewayResult<()>;

    async fn save_tag(&self, tag: Tag) -> GatewayResult<Tag>;

    /// Installs the built-in starter catalog. Only meaningful on an empty
    /// store; implementations may overwrite.
    async fn seed_sample_data(&self) -> GatewayResult<()>;
}

/// Bounded retry with doubling backoff, applied only to transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Ceiling on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy for read traffic: three attempts, 1s base, 30s cap.
    pub const fn reads() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Policy for writes: one retry only, so a flaky transport gets a second
    /// chance but a genuinely failing mutation surfaces quickly.
    pub const fn writes() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Runs `op`, retrying transient errors with doubling delays. Permanent
    /// errors (not found, validation) return immediately.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> GatewayResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let mut delay = self.base_delay;
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient gateway failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.max_delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
