use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::ImageCache;
use crate::prompt::image_prompt;
use crate::provider::ImageProvider;
use crate::types::PLACEHOLDER_IMAGE;

/// Resolves a recipe name to an image URL, calling the provider at most once per name.
///
/// The attempted mark is set before the provider call, so concurrent
/// requests for the same recipe do not start a second generation; they get
/// the placeholder until the first call has stored its URL.
#[derive(Clone)]
pub struct ImageResolver {
    provider: Arc<dyn ImageProvider>,
    cache: Arc<dyn ImageCache>,
}

impl ImageResolver {
    pub fn new(provider: Arc<dyn ImageProvider>, cache: Arc<dyn ImageCache>) -> Self {
        Self { provider, cache }
    }

    pub fn cache(&self) -> &Arc<dyn ImageCache> {
        &self.cache
    }

    /// Never fails: anything short of a generated URL yields the placeholder.
    pub async fn resolve(&self, name: &str, description: Option<&str>) -> String {
        let name = name.trim();
        if name.is_empty() {
            debug!("No recipe name given, using placeholder image");
            return PLACEHOLDER_IMAGE.to_string();
        }

        if let Some(url) = self.cache.get(name).await {
            info!(recipe = %name, "Using cached image");
            return url;
        }

        if !self.cache.mark_attempted(name).await {
            // Another caller may have stored its URL since the lookup above
            if let Some(url) = self.cache.get(name).await {
                info!(recipe = %name, "Using cached image");
                return url;
            }
            debug!(recipe = %name, "Image already attempted, using placeholder");
            return PLACEHOLDER_IMAGE.to_string();
        }

        let prompt = image_prompt(name, description);
        match self.provider.generate(&prompt).await {
            Ok(url) if !url.trim().is_empty() => {
                info!(recipe = %name, model = self.provider.model_name(), "Generated new image");
                self.cache.put(name, url.clone()).await;
                url
            }
            Ok(_) => {
                warn!(recipe = %name, "Image provider returned no URL");
                PLACEHOLDER_IMAGE.to_string()
            }
            Err(e) => {
                warn!(recipe = %name, error = %e, "Image generation failed");
                PLACEHOLDER_IMAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryImageCache;
    use crate::provider::FakeImageProvider;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    /// Misses the first lookup, as if the URL landed just after it.
    struct LateStoreCache {
        inner: InMemoryImageCache,
        missed: AtomicBool,
    }

    #[async_trait]
    impl ImageCache for LateStoreCache {
        async fn get(&self, name: &str) -> Option<String> {
            if !self.missed.swap(true, Ordering::SeqCst) {
                return None;
            }
            self.inner.get(name).await
        }

        async fn put(&self, name: &str, url: String) {
            self.inner.put(name, url).await
        }

        async fn has_attempted(&self, name: &str) -> bool {
            self.inner.has_attempted(name).await
        }

        async fn mark_attempted(&self, name: &str) -> bool {
            self.inner.mark_attempted(name).await
        }

        async fn len(&self) -> usize {
            self.inner.len().await
        }
    }

    fn resolver(provider: Arc<FakeImageProvider>) -> ImageResolver {
        ImageResolver::new(provider, Arc::new(InMemoryImageCache::new()))
    }

    #[tokio::test]
    async fn test_second_call_uses_cache() {
        let provider = Arc::new(FakeImageProvider::with_url("https://img.example/soup.png"));
        let resolver = resolver(provider.clone());

        let first = resolver.resolve("Tomato Soup", Some("Smooth and warm")).await;
        let second = resolver.resolve("tomato soup ", None).await;

        assert_eq!(first, "https://img.example/soup.png");
        assert_eq!(second, first);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_yields_placeholder_and_is_not_retried() {
        let provider = Arc::new(FakeImageProvider::failing("billing limit"));
        let resolver = resolver(provider.clone());

        assert_eq!(resolver.resolve("Curry", None).await, PLACEHOLDER_IMAGE);
        assert_eq!(resolver.resolve("Curry", None).await, PLACEHOLDER_IMAGE);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_url_yields_placeholder() {
        let provider = Arc::new(FakeImageProvider::with_url("  "));
        assert_eq!(resolver(provider).resolve("Curry", None).await, PLACEHOLDER_IMAGE);
    }

    #[tokio::test]
    async fn test_blank_name_skips_provider() {
        let provider = Arc::new(FakeImageProvider::with_url("https://img.example/x.png"));
        let resolver = resolver(provider.clone());

        assert_eq!(resolver.resolve("   ", None).await, PLACEHOLDER_IMAGE);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_url_stored_after_lookup_is_returned() {
        let inner = InMemoryImageCache::new();
        assert!(inner.mark_attempted("Gumbo").await);
        inner.put("Gumbo", "https://img.example/gumbo.png".to_string()).await;

        let provider = Arc::new(FakeImageProvider::with_url("https://img.example/other.png"));
        let resolver = ImageResolver::new(
            provider.clone(),
            Arc::new(LateStoreCache {
                inner,
                missed: AtomicBool::new(false),
            }),
        );

        assert_eq!(
            resolver.resolve("Gumbo", None).await,
            "https://img.example/gumbo.png"
        );
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_requests_make_one_call() {
        let provider = Arc::new(
            FakeImageProvider::with_url("https://img.example/pie.png")
                .with_delay(Duration::from_millis(50)),
        );
        let resolver = resolver(provider.clone());

        let (a, b) = tokio::join!(
            resolver.resolve("Apple Pie", None),
            resolver.resolve("Apple Pie", None)
        );

        assert_eq!(provider.calls(), 1);
        let mut urls = [a, b];
        urls.sort();
        assert_eq!(urls, [PLACEHOLDER_IMAGE.to_string(), "https://img.example/pie.png".to_string()]);

        assert_eq!(
            resolver.resolve("Apple Pie", None).await,
            "https://img.example/pie.png"
        );
    }
}
