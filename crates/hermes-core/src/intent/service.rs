//! Intent analysis service
//!
//! Orchestrates the AI and heuristic classifiers, arbitrates their
//! outputs, caches results, and records metrics. `analyze` never fails:
//! every internal error degrades to the heuristic path and shows up in
//! the error counter instead of the return type.
//!
//! The service is an explicitly constructed instance passed to callers by
//! reference; `reset` restores a fresh state for test harnesses.

use crate::agent::AgentType;
use crate::intent::{
    AnalysisMethod, HeuristicClassifier, IntentAnalysis, IntentContext,
};
use crate::intent::ai::AiClassifier;
use dashmap::DashMap;
use hermes_llm::ChatModel;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Confidence boost applied to user-preferred agents on the heuristic path
const PREFERRED_BOOST: f32 = 0.1;

/// How many runner-up candidates an analysis carries
const MAX_ALTERNATIVES: usize = 3;

/// Tuning knobs for the service
#[derive(Debug, Clone)]
pub struct IntentServiceConfig {
    /// Minimum AI confidence for direct adoption
    pub confidence_threshold: f32,
    /// How long cached analyses stay valid
    pub cache_ttl: Duration,
}

impl Default for IntentServiceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

struct CacheEntry {
    analysis: IntentAnalysis,
    inserted_at: Instant,
}

#[derive(Default)]
struct Counters {
    total: AtomicU64,
    ai_successes: AtomicU64,
    heuristic_fallbacks: AtomicU64,
    cache_hits: AtomicU64,
    errors: AtomicU64,
    latency_total_ms: AtomicU64,
}

/// Point-in-time view of the service counters
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct IntentMetricsSnapshot {
    /// Total analyses requested
    pub total_analyses: u64,
    /// Analyses where the AI verdict was adopted or blended
    pub ai_successes: u64,
    /// Analyses that fell back to the heuristic path
    pub heuristic_fallbacks: u64,
    /// Analyses answered from cache
    pub cache_hits: u64,
    /// Internal errors absorbed into fallback
    pub errors: u64,
    /// Mean processing time across all analyses
    pub average_latency_ms: f64,
    /// Fraction of analyses answered from cache
    pub cache_hit_ratio: f64,
}

/// Intent analysis orchestrator
pub struct IntentService {
    config: IntentServiceConfig,
    heuristic: HeuristicClassifier,
    ai: AiClassifier,
    cache: DashMap<String, CacheEntry>,
    counters: Counters,
}

impl Default for IntentService {
    fn default() -> Self {
        Self::new(IntentServiceConfig::default())
    }
}

impl IntentService {
    /// Create a service with the given configuration
    #[must_use]
    pub fn new(config: IntentServiceConfig) -> Self {
        Self {
            config,
            heuristic: HeuristicClassifier::new(),
            ai: AiClassifier::new(),
            cache: DashMap::new(),
            counters: Counters::default(),
        }
    }

    /// Replace the AI classifier (custom timeout, test doubles)
    #[must_use]
    pub fn with_ai_classifier(mut self, ai: AiClassifier) -> Self {
        self.ai = ai;
        self
    }

    /// Analyze intent for the given context.
    ///
    /// With a model client the AI classifier runs first; its verdict is
    /// adopted outright at or above the confidence threshold and blended
    /// with the heuristic ranking below it (the higher-confidence
    /// candidate wins; an exact tie keeps the AI candidate). Without a
    /// client, or when AI classification fails, the heuristic path is
    /// used. This method never returns an error.
    #[instrument(skip_all, fields(locale = %ctx.locale))]
    pub async fn analyze(
        &self,
        ctx: &IntentContext,
        model: Option<&dyn ChatModel>,
        model_id: Option<&str>,
    ) -> IntentAnalysis {
        let start = Instant::now();
        self.counters.total.fetch_add(1, Ordering::Relaxed);

        let key = cache_key(&ctx.query, &ctx.locale);
        if let Some(hit) = self.cache_lookup(&key) {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Intent cache hit");
            return hit;
        }

        let mut analysis = match model {
            Some(model) => {
                let model_id = model_id.unwrap_or_else(|| model.default_model());
                match self.ai.classify(ctx, model, model_id).await {
                    Ok(ai_analysis) => self.arbitrate(ctx, ai_analysis),
                    Err(e) => {
                        warn!(error = %e, "AI classification failed, using heuristic");
                        self.counters.errors.fetch_add(1, Ordering::Relaxed);
                        self.heuristic_analysis(ctx)
                    }
                }
            }
            None => self.heuristic_analysis(ctx),
        };

        analysis = enforce_disabled(analysis, &ctx.disabled_agents);
        analysis.processing_time_ms = start.elapsed().as_millis() as u64;

        match analysis.method {
            AnalysisMethod::Heuristic => {
                self.counters.heuristic_fallbacks.fetch_add(1, Ordering::Relaxed);
            }
            AnalysisMethod::Ai | AnalysisMethod::Hybrid => {
                self.counters.ai_successes.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.counters
            .latency_total_ms
            .fetch_add(analysis.processing_time_ms, Ordering::Relaxed);

        self.cache.insert(
            key,
            CacheEntry {
                analysis: analysis.clone(),
                inserted_at: Instant::now(),
            },
        );

        analysis
    }

    /// Current metrics
    #[must_use]
    pub fn metrics(&self) -> IntentMetricsSnapshot {
        let total = self.counters.total.load(Ordering::Relaxed);
        let cache_hits = self.counters.cache_hits.load(Ordering::Relaxed);
        IntentMetricsSnapshot {
            total_analyses: total,
            ai_successes: self.counters.ai_successes.load(Ordering::Relaxed),
            heuristic_fallbacks: self.counters.heuristic_fallbacks.load(Ordering::Relaxed),
            cache_hits,
            errors: self.counters.errors.load(Ordering::Relaxed),
            average_latency_ms: if total == 0 {
                0.0
            } else {
                self.counters.latency_total_ms.load(Ordering::Relaxed) as f64 / total as f64
            },
            cache_hit_ratio: if total == 0 {
                0.0
            } else {
                cache_hits as f64 / total as f64
            },
        }
    }

    /// Clear the cache and zero every counter. For test harnesses.
    pub fn reset(&self) {
        self.cache.clear();
        self.counters.total.store(0, Ordering::Relaxed);
        self.counters.ai_successes.store(0, Ordering::Relaxed);
        self.counters.heuristic_fallbacks.store(0, Ordering::Relaxed);
        self.counters.cache_hits.store(0, Ordering::Relaxed);
        self.counters.errors.store(0, Ordering::Relaxed);
        self.counters.latency_total_ms.store(0, Ordering::Relaxed);
    }

    fn cache_lookup(&self, key: &str) -> Option<IntentAnalysis> {
        let entry = self.cache.get(key)?;
        if entry.inserted_at.elapsed() > self.config.cache_ttl {
            drop(entry);
            self.cache.remove(key);
            return None;
        }
        let mut analysis = entry.analysis.clone();
        analysis.processing_time_ms = 0;
        Some(analysis)
    }

    /// Adopt the AI verdict at or above the threshold; blend below it.
    fn arbitrate(&self, ctx: &IntentContext, ai: IntentAnalysis) -> IntentAnalysis {
        if ai.confidence >= self.config.confidence_threshold {
            return ai;
        }

        let heuristic = self.heuristic_analysis(ctx);
        // Equal confidence keeps the AI candidate: it carries extracted
        // parameters and reasoning the heuristic lacks.
        let mut blended = if heuristic.confidence > ai.confidence {
            heuristic
        } else {
            ai
        };
        blended.method = AnalysisMethod::Hybrid;
        blended
    }

    /// Build an analysis from the heuristic ranking, honoring user hints.
    fn heuristic_analysis(&self, ctx: &IntentContext) -> IntentAnalysis {
        let mut ranked = self.heuristic.classify(&ctx.query);

        for (agent, score) in &mut ranked {
            if ctx.preferred_agents.contains(agent) {
                *score = (*score + PREFERRED_BOOST).min(1.0);
            }
        }
        ranked.retain(|(agent, _)| !ctx.disabled_agents.contains(agent));
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.heuristic_priority().cmp(&b.0.heuristic_priority()))
        });

        let (recommended, confidence) = ranked
            .first()
            .copied()
            .unwrap_or((AgentType::StandardChat, 0.1));
        let alternatives = ranked
            .iter()
            .skip(1)
            .take(MAX_ALTERNATIVES)
            .copied()
            .collect();

        IntentAnalysis::new(
            recommended,
            confidence,
            alternatives,
            AnalysisMethod::Heuristic,
            ctx.locale.clone(),
        )
        .with_reasoning(format!(
            "keyword scoring selected {} at {:.2}",
            recommended, confidence
        ))
    }
}

/// Never recommend a disabled agent: demote to the best allowed
/// alternative, or plain chat when none remains.
fn enforce_disabled(analysis: IntentAnalysis, disabled: &[AgentType]) -> IntentAnalysis {
    if !disabled.contains(&analysis.recommended) {
        return analysis;
    }

    let replacement = analysis
        .alternatives
        .iter()
        .find(|(agent, _)| !disabled.contains(agent))
        .copied()
        .unwrap_or((AgentType::StandardChat, 0.1));

    let remaining: Vec<(AgentType, f32)> = analysis
        .alternatives
        .iter()
        .filter(|(agent, _)| !disabled.contains(agent))
        .copied()
        .collect();

    let mut demoted = IntentAnalysis::new(
        replacement.0,
        replacement.1,
        remaining,
        analysis.method,
        analysis.locale.clone(),
    )
    .with_parameters(analysis.parameters.clone())
    .with_reasoning(format!(
        "{} (recommended agent is disabled for this user)",
        analysis.reasoning
    ));
    demoted.processing_time_ms = analysis.processing_time_ms;
    demoted
}

/// Cache key: whitespace-collapsed lowercase query plus locale.
fn cache_key(query: &str, locale: &str) -> String {
    let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{}|{}", normalized.to_lowercase(), locale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_heuristic_path_without_model() {
        let service = IntentService::default();
        let ctx = IntentContext::new("What's the weather in Paris?");
        let analysis = service.analyze(&ctx, None, None).await;

        assert_eq!(analysis.recommended, AgentType::WebSearch);
        assert_eq!(analysis.method, AnalysisMethod::Heuristic);
        assert!(analysis.confidence > 0.0);
    }

    #[tokio::test]
    async fn test_cache_returns_identical_analysis() {
        let service = IntentService::default();
        let ctx = IntentContext::new("latest rust news");

        let first = service.analyze(&ctx, None, None).await;
        let second = service.analyze(&ctx, None, None).await;

        assert_eq!(first.recommended, second.recommended);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.alternatives, second.alternatives);
        assert_eq!(service.metrics().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_cache_key_ignores_whitespace_and_case() {
        let service = IntentService::default();
        let a = IntentContext::new("Latest   Rust news");
        let b = IntentContext::new("latest rust news");

        service.analyze(&a, None, None).await;
        service.analyze(&b, None, None).await;
        assert_eq!(service.metrics().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_distinct_locale_distinct_cache_entry() {
        let service = IntentService::default();
        let a = IntentContext::new("latest rust news").with_locale("en-US");
        let b = IntentContext::new("latest rust news").with_locale("ko-KR");

        service.analyze(&a, None, None).await;
        service.analyze(&b, None, None).await;
        assert_eq!(service.metrics().cache_hits, 0);
    }

    #[tokio::test]
    async fn test_disabled_agent_is_never_recommended() {
        let service = IntentService::default();
        let ctx = IntentContext::new("What's the weather in Paris?")
            .with_disabled_agents(vec![AgentType::WebSearch]);
        let analysis = service.analyze(&ctx, None, None).await;
        assert_ne!(analysis.recommended, AgentType::WebSearch);
    }

    #[tokio::test]
    async fn test_preferred_agent_boost() {
        let service = IntentService::default();
        let plain = service
            .analyze(&IntentContext::new("tell me about rust"), None, None)
            .await;
        let boosted = service
            .analyze(
                &IntentContext::new("tell me about rust in my document")
                    .with_preferred_agents(vec![AgentType::LocalKnowledge]),
                None,
                None,
            )
            .await;
        assert!(boosted.confidence >= plain.confidence);
        assert_eq!(boosted.recommended, AgentType::LocalKnowledge);
    }

    #[tokio::test]
    async fn test_metrics_accumulate() {
        let service = IntentService::default();
        service
            .analyze(&IntentContext::new("hello there"), None, None)
            .await;
        service
            .analyze(&IntentContext::new("something else"), None, None)
            .await;

        let metrics = service.metrics();
        assert_eq!(metrics.total_analyses, 2);
        assert_eq!(metrics.heuristic_fallbacks, 2);
        assert_eq!(metrics.ai_successes, 0);
    }

    #[tokio::test]
    async fn test_reset_clears_state() {
        let service = IntentService::default();
        service
            .analyze(&IntentContext::new("hello there"), None, None)
            .await;
        service.reset();

        let metrics = service.metrics();
        assert_eq!(metrics.total_analyses, 0);
        assert_eq!(metrics.cache_hits, 0);

        // previous queries are re-analyzed, not served from cache
        service
            .analyze(&IntentContext::new("hello there"), None, None)
            .await;
        assert_eq!(service.metrics().cache_hits, 0);
    }

    #[test]
    fn test_cache_key_shape() {
        assert_eq!(cache_key("  Hello   World ", "en-US"), "hello world|en-US");
    }
}
