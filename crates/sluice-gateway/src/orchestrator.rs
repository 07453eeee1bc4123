//! Gateway orchestrator
//!
//! Composes the selection engine, health tracker, provider registry, and
//! both cache tiers into the per-request lifecycle:
//! classify → cache check → select → invoke with fallback → record → respond.

use crate::error::{Error, Result};
use crate::types::{ChatRequest, ChatResponse, RouteReport};
use crate::usage::{UsageRecord, UsageStats, UsageTracker};
use chrono::Utc;
use sluice_cache::{cache_key, CacheStats, SemanticCache, TtlCache};
use sluice_llm::{ProviderRegistry, SharedEmbeddingProvider};
use sluice_router::{Engine, HealthTracker, IntentClassifier, UserTier};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Model tag for exact-cache hits
const CACHE_MODEL: &str = "cache";

/// Model tag for semantic-cache hits
const SEMANTIC_CACHE_MODEL: &str = "SemanticCache";

/// Gateway tuning knobs
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Exact-cache capacity
    pub cache_max_size: usize,
    /// Exact-cache default TTL
    pub cache_default_ttl: Duration,
    /// Semantic-cache similarity threshold
    pub semantic_threshold: f32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cache_max_size: 5000,
            cache_default_ttl: Duration::from_secs(1800),
            semantic_threshold: 0.95,
        }
    }
}

/// The request orchestrator
pub struct Gateway {
    engine: Engine,
    health: HealthTracker,
    providers: ProviderRegistry,
    classifier: IntentClassifier,
    exact: Arc<TtlCache<String>>,
    semantic: SemanticCache,
    usage: UsageTracker,
}

impl Gateway {
    /// Assemble a gateway from its collaborators
    #[must_use]
    pub fn new(
        engine: Engine,
        providers: ProviderRegistry,
        embedder: SharedEmbeddingProvider,
        config: GatewayConfig,
    ) -> Self {
        let health = HealthTracker::new(engine.candidates().iter().map(|c| c.name.clone()));
        let exact = Arc::new(TtlCache::new(
            config.cache_max_size,
            config.cache_default_ttl,
        ));
        let semantic = SemanticCache::new(embedder, config.semantic_threshold);

        Self {
            engine,
            health,
            providers,
            classifier: IntentClassifier::new(),
            exact,
            semantic,
            usage: UsageTracker::new(),
        }
    }

    /// Serve one chat request end to end
    #[instrument(skip(self, req), fields(request_id))]
    pub async fn handle(&self, req: ChatRequest) -> Result<ChatResponse> {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));

        let query = req.query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let start = Instant::now();
        let intent = self.classifier.classify(query);

        // Exact cache applies to deterministic requests only. The key is
        // shared across users: identical questions share answers.
        let exact_key = if req.temperature == 0.0 {
            let key = cache_key(
                query,
                None,
                &[
                    ("temperature", req.temperature.to_string()),
                    ("user_tier", req.user_tier.as_str().to_string()),
                ],
            );
            if let Some(text) = self.exact.get(&key) {
                info!(intent = %intent, "Exact cache hit");
                self.record_usage(request_id, CACHE_MODEL, Some(intent), 0.0, start, true)
                    .await;
                return Ok(ChatResponse {
                    text,
                    model: CACHE_MODEL.to_string(),
                    cost: 0.0,
                    latency: round3(start.elapsed().as_secs_f64()),
                    intent: Some(intent.to_string()),
                });
            }
            Some(key)
        } else {
            None
        };

        // Approximate match over prior answers. An unavailable embedder
        // degrades this tier to always-miss.
        match self.semantic.find_match(query).await {
            Ok(Some(text)) => {
                info!("Semantic cache hit");
                self.record_usage(request_id, SEMANTIC_CACHE_MODEL, None, 0.0, start, true)
                    .await;
                return Ok(ChatResponse {
                    text,
                    model: SEMANTIC_CACHE_MODEL.to_string(),
                    cost: 0.0,
                    latency: round3(start.elapsed().as_secs_f64()),
                    intent: None,
                });
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Semantic lookup degraded to miss"),
        }

        let healthy = self.health.healthy(self.engine.candidates());
        let primary = self.engine.select(&healthy, req.user_tier, intent)?;
        let order = self.engine.attempt_order(&primary);
        debug!(?order, "Attempt order resolved");

        let mut attempted = Vec::with_capacity(order.len());
        let mut answer: Option<(String, String)> = None;
        for model in &order {
            attempted.push(model.clone());
            match self.providers.invoke(model, query, req.max_tokens).await {
                Ok(text) => {
                    answer = Some((model.clone(), text));
                    break;
                }
                Err(err) => {
                    warn!(model = %model, error = %err, "Invocation failed, advancing to next candidate");
                }
            }
        }

        let Some((model, text)) = answer else {
            warn!(?attempted, "All candidates exhausted");
            return Err(Error::AllCandidatesExhausted { attempted });
        };

        // Price of the model that actually answered, not the primary
        let cost =
            self.engine.price_of(&model).unwrap_or(0.0) * f64::from(req.max_tokens) / 1000.0;

        if let Some(key) = exact_key {
            self.exact.set_with_intent_ttl(key, text.clone(), intent);
        }
        if let Err(err) = self.semantic.add(query, &text).await {
            warn!(error = %err, "Semantic cache record skipped");
        }

        info!(model = %model, intent = %intent, cost, "Request served");
        self.record_usage(request_id, &model, Some(intent), cost, start, false)
            .await;

        Ok(ChatResponse {
            text,
            model,
            cost: round6(cost),
            latency: round3(start.elapsed().as_secs_f64()),
            intent: Some(intent.to_string()),
        })
    }

    /// Score all healthy candidates for a query without invoking anything
    #[must_use]
    pub fn debug_route(&self, query: &str, tier: UserTier) -> RouteReport {
        let intent = self.classifier.classify(query);
        let healthy = self.health.healthy(self.engine.candidates());
        RouteReport {
            query: query.to_string(),
            intent: intent.to_string(),
            scored: self.engine.score_all(&healthy, tier, intent),
        }
    }

    /// Flip a model's health flag. Returns false for unknown names.
    pub fn set_model_health(&self, model: &str, healthy: bool) -> bool {
        self.health.set(model, healthy)
    }

    /// Number of currently healthy models
    #[must_use]
    pub fn healthy_model_count(&self) -> usize {
        self.health.healthy(self.engine.candidates()).len()
    }

    /// Empty the exact cache
    pub fn clear_cache(&self) {
        self.exact.clear();
    }

    /// Exact-cache counter snapshot
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.exact.stats()
    }

    /// Usage statistics over recent requests
    pub async fn usage_stats(&self) -> UsageStats {
        self.usage.stats().await
    }

    /// Handle to the exact cache, for the background sweeper
    #[must_use]
    pub fn exact_cache(&self) -> Arc<TtlCache<String>> {
        Arc::clone(&self.exact)
    }

    async fn record_usage(
        &self,
        request_id: Uuid,
        model: &str,
        intent: Option<&str>,
        cost: f64,
        start: Instant,
        served_from_cache: bool,
    ) {
        self.usage
            .record(UsageRecord {
                request_id,
                timestamp: Utc::now(),
                model: model.to_string(),
                intent: intent.map(str::to_string),
                cost,
                latency_ms: start.elapsed().as_millis() as u64,
                served_from_cache,
            })
            .await;
    }
}

fn round3(value: f64) -> f64 {
    (value * 1e3).round() / 1e3
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sluice_llm::{EmbeddingProvider, MockProvider};
    use sluice_router::{CandidateSpec, RoutingConfig, TierWeights};
    use std::collections::{BTreeMap, HashMap};

    /// Always fails: semantic tier degrades to miss
    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> sluice_llm::Result<Vec<f32>> {
            Err(sluice_llm::Error::Embedding("down".to_string()))
        }

        fn dimensions(&self) -> usize {
            0
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Maps known strings to fixed vectors; unknown strings fail
    struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl StubEmbedder {
        fn new(pairs: &[(&str, &[f32])]) -> Arc<Self> {
            Arc::new(Self {
                vectors: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_vec()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, text: &str) -> sluice_llm::Result<Vec<f32>> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| sluice_llm::Error::Embedding(format!("no vector for {text}")))
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn spec(price: f64, quality: f64, intents: &[&str]) -> CandidateSpec {
        CandidateSpec {
            price_per_1k: price,
            quality_score: quality,
            supported_intents: intents.iter().map(|s| s.to_string()).collect(),
            max_rpm: 60,
        }
    }

    fn routing_config() -> RoutingConfig {
        let mut models = BTreeMap::new();
        models.insert("alpha".to_string(), spec(0.01, 0.9, &["code"]));
        models.insert("beta".to_string(), spec(0.002, 0.5, &["general"]));
        models.insert("gamma".to_string(), spec(0.03, 0.95, &["medical"]));
        RoutingConfig {
            models,
            default_model: "beta".to_string(),
            fallback_chain: vec!["beta".to_string(), "gamma".to_string()],
            rules: vec![],
            weights: TierWeights::default(),
        }
    }

    struct TestHarness {
        gateway: Gateway,
        alpha: Arc<MockProvider>,
        beta: Arc<MockProvider>,
        gamma: Arc<MockProvider>,
    }

    fn harness(embedder: SharedEmbeddingProvider) -> TestHarness {
        let engine = Engine::new(routing_config());
        let alpha = Arc::new(MockProvider::new("alpha"));
        let beta = Arc::new(MockProvider::new("beta"));
        let gamma = Arc::new(MockProvider::new("gamma"));

        let mut registry = ProviderRegistry::new();
        registry.register("alpha", alpha.clone());
        registry.register("beta", beta.clone());
        registry.register("gamma", gamma.clone());

        let gateway = Gateway::new(engine, registry, embedder, GatewayConfig::default());
        TestHarness {
            gateway,
            alpha,
            beta,
            gamma,
        }
    }

    #[tokio::test]
    async fn test_live_invocation_happy_path() {
        let h = harness(Arc::new(FailingEmbedder));
        h.beta.push_response("the answer");

        let response = h
            .gateway
            .handle(ChatRequest::new("what's on today"))
            .await
            .unwrap();

        // Cheapest model wins at the free tier on cost score
        assert_eq!(response.model, "beta");
        assert_eq!(response.text, "the answer");
        assert!((response.cost - 0.002).abs() < 1e-9);
        assert_eq!(response.intent.as_deref(), Some("general"));
        assert!(response.latency >= 0.0);
    }

    #[tokio::test]
    async fn test_fallback_fires_on_primary_failure() {
        let h = harness(Arc::new(FailingEmbedder));
        h.beta.push_failure("503 from upstream");
        h.gamma.push_response("fallback answer");

        let response = h
            .gateway
            .handle(ChatRequest::new("what's on today"))
            .await
            .unwrap();

        assert_eq!(response.model, "gamma");
        assert_eq!(response.text, "fallback answer");
        // Cost follows the model that answered, not the primary
        assert!((response.cost - 0.03).abs() < 1e-9);
        assert_eq!(h.beta.call_count(), 1);
        assert_eq!(h.gamma.call_count(), 1);
    }

    #[tokio::test]
    async fn test_all_candidates_exhausted() {
        let h = harness(Arc::new(FailingEmbedder));
        // Empty mock queues fail every invocation

        let err = h
            .gateway
            .handle(ChatRequest::new("what's on today"))
            .await
            .unwrap_err();

        match err {
            Error::AllCandidatesExhausted { attempted } => {
                assert_eq!(attempted, vec!["beta", "gamma"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        // A failed request must never populate the cache
        assert_eq!(h.gateway.cache_stats().size, 0);
    }

    #[tokio::test]
    async fn test_deterministic_repeat_served_from_exact_cache() {
        let h = harness(Arc::new(FailingEmbedder));
        h.beta.push_response("first answer");

        let first = h
            .gateway
            .handle(ChatRequest::new("what's on today"))
            .await
            .unwrap();
        assert_eq!(first.model, "beta");

        let second = h
            .gateway
            .handle(ChatRequest::new("what's on today"))
            .await
            .unwrap();
        assert_eq!(second.model, "cache");
        assert_eq!(second.text, "first answer");
        assert_eq!(second.cost, 0.0);
        assert_eq!(second.intent.as_deref(), Some("general"));
        assert_eq!(h.beta.call_count(), 1);
    }

    #[tokio::test]
    async fn test_nondeterministic_requests_skip_exact_cache() {
        let h = harness(Arc::new(FailingEmbedder));
        h.beta.push_response("one");
        h.beta.push_response("two");

        let request = ChatRequest::new("what's on today").with_temperature(0.7);
        h.gateway.handle(request.clone()).await.unwrap();
        let second = h.gateway.handle(request).await.unwrap();

        assert_eq!(second.model, "beta");
        assert_eq!(h.beta.call_count(), 2);
    }

    #[tokio::test]
    async fn test_medical_intent_is_never_cached() {
        let h = harness(Arc::new(FailingEmbedder));
        h.beta.push_response("see a doctor");
        h.beta.push_response("see a doctor");

        let request = ChatRequest::new("what are the symptoms of flu");
        let first = h.gateway.handle(request.clone()).await.unwrap();
        assert_eq!(first.intent.as_deref(), Some("medical"));

        let second = h.gateway.handle(request).await.unwrap();
        assert_eq!(second.model, "beta");
        assert_eq!(h.beta.call_count(), 2);
    }

    #[tokio::test]
    async fn test_semantic_cache_serves_rephrased_query() {
        let embedder = StubEmbedder::new(&[
            ("tell me about cats", &[1.0, 0.0, 0.0]),
            ("describe cats please", &[1.0, 0.01, 0.0]),
        ]);
        let h = harness(embedder);
        h.beta.push_response("cats are great");

        let first = h
            .gateway
            .handle(ChatRequest::new("tell me about cats").with_temperature(0.7))
            .await
            .unwrap();
        assert_eq!(first.model, "beta");

        let second = h
            .gateway
            .handle(ChatRequest::new("describe cats please").with_temperature(0.7))
            .await
            .unwrap();
        assert_eq!(second.model, "SemanticCache");
        assert_eq!(second.text, "cats are great");
        assert_eq!(second.cost, 0.0);
        // Semantic hits carry no intent
        assert_eq!(second.intent, None);
        assert_eq!(h.beta.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let h = harness(Arc::new(FailingEmbedder));
        let err = h.gateway.handle(ChatRequest::new("   ")).await.unwrap_err();
        assert!(matches!(err, Error::EmptyQuery));
    }

    #[tokio::test]
    async fn test_unhealthy_model_excluded_from_selection() {
        let h = harness(Arc::new(FailingEmbedder));
        h.alpha.push_response("from alpha");

        assert!(h.gateway.set_model_health("beta", false));
        assert_eq!(h.gateway.healthy_model_count(), 2);

        // With beta out of the pool, alpha wins the free-tier comparison
        let response = h
            .gateway
            .handle(ChatRequest::new("what's on today"))
            .await
            .unwrap();
        assert_eq!(response.model, "alpha");
    }

    #[tokio::test]
    async fn test_all_unhealthy_fails_selection() {
        let h = harness(Arc::new(FailingEmbedder));
        for model in ["alpha", "beta", "gamma"] {
            h.gateway.set_model_health(model, false);
        }

        let err = h
            .gateway
            .handle(ChatRequest::new("what's on today"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Selection(sluice_router::Error::NoCandidatesAvailable)
        ));
    }

    #[tokio::test]
    async fn test_debug_route_scores_sorted() {
        let h = harness(Arc::new(FailingEmbedder));
        let report = h.gateway.debug_route("fix this bug", UserTier::Premium);

        assert_eq!(report.intent, "code");
        assert_eq!(report.scored.len(), 3);
        assert!(report.scored.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[tokio::test]
    async fn test_usage_records_cache_tiers() {
        let h = harness(Arc::new(FailingEmbedder));
        h.beta.push_response("answer");

        h.gateway
            .handle(ChatRequest::new("what's on today"))
            .await
            .unwrap();
        h.gateway
            .handle(ChatRequest::new("what's on today"))
            .await
            .unwrap();

        let stats = h.gateway.usage_stats().await;
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.by_model["beta"], 1);
        assert_eq!(stats.by_model["cache"], 1);
    }
}
