//! Integration tests for Sluice
//!
//! These tests verify the integration between the crates:
//! - sluice-router: YAML config loading and rule-driven selection
//! - sluice-llm: provider registry dispatch
//! - sluice-cache: exact-cache behavior through the request path
//! - sluice-gateway: the full request lifecycle

use async_trait::async_trait;
use sluice_gateway::{ChatRequest, Gateway, GatewayConfig};
use sluice_llm::{EmbeddingProvider, MockProvider, ProviderRegistry};
use sluice_router::{Engine, RoutingConfig, UserTier};
use std::sync::Arc;

const ROUTING_YAML: &str = r#"
models:
  gpt-4o:
    price_per_1k: 0.01
    quality_score: 0.95
    supported_intents: [code, medical, general]
  deepseek-chat:
    price_per_1k: 0.002
    quality_score: 0.8
    supported_intents: [general, code]
  llama3.2:
    price_per_1k: 0.0
    quality_score: 0.55
    supported_intents: [general]
default_model: deepseek-chat
fallback_chain: [deepseek-chat, llama3.2]
rules:
  - name: medical-safety
    when: { intent: medical }
    pool: [gpt-4o]
"#;

struct NoEmbedder;

#[async_trait]
impl EmbeddingProvider for NoEmbedder {
    async fn embed(&self, _text: &str) -> sluice_llm::Result<Vec<f32>> {
        Err(sluice_llm::Error::Embedding("disabled".to_string()))
    }

    fn dimensions(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "none"
    }
}

struct Stack {
    gateway: Gateway,
    gpt: Arc<MockProvider>,
    deepseek: Arc<MockProvider>,
    llama: Arc<MockProvider>,
}

fn build_stack() -> Stack {
    let mut routing: RoutingConfig = serde_yaml::from_str(ROUTING_YAML).expect("valid yaml");
    routing.validate().expect("valid config");
    let engine = Engine::new(routing);

    let gpt = Arc::new(MockProvider::new("openai"));
    let deepseek = Arc::new(MockProvider::new("deepseek"));
    let llama = Arc::new(MockProvider::new("ollama"));

    let mut registry = ProviderRegistry::new();
    registry.register("gpt-4o", gpt.clone());
    registry.register("deepseek-chat", deepseek.clone());
    registry.register("llama3.2", llama.clone());

    let gateway = Gateway::new(engine, registry, Arc::new(NoEmbedder), GatewayConfig::default());
    Stack {
        gateway,
        gpt,
        deepseek,
        llama,
    }
}

#[tokio::test]
async fn test_general_query_routes_to_cheapest_and_caches() {
    let stack = build_stack();
    stack.llama.push_response("the capital is Paris");

    // At the free tier, the zero-price local model dominates the cost score
    let request = ChatRequest::new("what is the capital of France");
    let first = stack.gateway.handle(request.clone()).await.unwrap();
    assert_eq!(first.model, "llama3.2");
    assert_eq!(first.intent.as_deref(), Some("general"));
    assert_eq!(first.cost, 0.0);

    let second = stack.gateway.handle(request).await.unwrap();
    assert_eq!(second.model, "cache");
    assert_eq!(second.text, "the capital is Paris");
    assert_eq!(second.cost, 0.0);
    assert_eq!(stack.llama.call_count(), 1);

    let stats = stack.gateway.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_medical_rule_routes_to_premium_pool() {
    let stack = build_stack();
    stack.gpt.push_response("please consult a doctor");

    let response = stack
        .gateway
        .handle(ChatRequest::new("I have a fever, what treatment helps?"))
        .await
        .unwrap();

    // The medical-safety rule pins the pool to gpt-4o despite its price
    assert_eq!(response.model, "gpt-4o");
    assert_eq!(response.intent.as_deref(), Some("medical"));
    assert!((response.cost - 0.01).abs() < 1e-9);
    // Medical responses are never cached
    assert_eq!(stack.gateway.cache_stats().size, 0);
}

#[tokio::test]
async fn test_fallback_chain_recovers_and_health_flag_reroutes() {
    let stack = build_stack();

    // Primary (llama3.2) has nothing queued and fails; the chain recovers
    // on deepseek-chat
    stack.deepseek.push_response("fallback answer");
    let response = stack
        .gateway
        .handle(ChatRequest::new("hello there"))
        .await
        .unwrap();
    assert_eq!(response.model, "deepseek-chat");
    assert!((response.cost - 0.002).abs() < 1e-9);
    assert_eq!(stack.llama.call_count(), 1);
    assert_eq!(stack.deepseek.call_count(), 1);

    // Marking llama unhealthy removes it from selection entirely, so the
    // next request goes straight to deepseek
    assert!(stack.gateway.set_model_health("llama3.2", false));
    stack.gateway.clear_cache();
    stack.deepseek.push_response("direct answer");
    let rerouted = stack
        .gateway
        .handle(ChatRequest::new("hello there"))
        .await
        .unwrap();
    assert_eq!(rerouted.model, "deepseek-chat");
    assert_eq!(stack.llama.call_count(), 1);
}

#[tokio::test]
async fn test_debug_route_reports_all_scores() {
    let stack = build_stack();
    let report = stack
        .gateway
        .debug_route("refactor this function", UserTier::Premium);

    assert_eq!(report.intent, "code");
    assert_eq!(report.scored.len(), 3);
    assert!(report.scored.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[tokio::test]
async fn test_usage_stats_accumulate() {
    let stack = build_stack();
    stack.gpt.push_response("medical advice");
    stack.llama.push_response("general answer");

    stack
        .gateway
        .handle(ChatRequest::new("what treatment for a headache"))
        .await
        .unwrap();
    stack
        .gateway
        .handle(ChatRequest::new("what is the capital of France"))
        .await
        .unwrap();
    stack
        .gateway
        .handle(ChatRequest::new("what is the capital of France"))
        .await
        .unwrap();

    let usage = stack.gateway.usage_stats().await;
    assert_eq!(usage.total_requests, 3);
    assert_eq!(usage.cache_hits, 1);
    // Only the gpt-4o medical answer carries cost
    assert!(usage.total_cost > 0.0);
    assert_eq!(usage.by_model["gpt-4o"], 1);
    assert_eq!(usage.by_model["cache"], 1);
}
