// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The completion facade: active-adapter selection plus the
//! moderate-then-complete pipeline for one inbound message.

use arc_swap::ArcSwapOption;
use std::sync::Arc;

use banter_context::ChatContext;
use banter_core::{
    BanterError, HarmCategory, Message, ModelDescription, ModerationGate, ProviderAdapter,
};
use tracing::{info, warn};

/// System-authored reply substituted when a backend answers with an empty
/// completion.
const FALLBACK_COMPLETION: &str = "(the model didn't have anything to say)";

/// The result of running one inbound message through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The message was clean; the backend's reply has been appended.
    Completed(Message),
    /// The message was flagged and never reached the context or a backend.
    /// `dominant` is the first flagged category in canonical order with its
    /// score, for caller-side reporting.
    Flagged {
        dominant: Option<(HarmCategory, f64)>,
    },
}

/// Swappable-adapter completion engine.
///
/// The active adapter is engine-wide, not per-conversation: sharing one
/// engine across all guilds means a model switch affects every guild.
/// Callers wanting per-guild models pass an explicit adapter per call
/// instead.
#[derive(Default)]
pub struct CompletionEngine {
    active: ArcSwapOption<Box<dyn ProviderAdapter>>,
}

impl CompletionEngine {
    /// Creates an engine with no active adapter. Completions fail with
    /// [`BanterError::NotInitialized`] until one is set or passed.
    pub fn new() -> Self {
        Self {
            active: ArcSwapOption::empty(),
        }
    }

    /// Replaces the active adapter for all subsequent completions.
    pub fn set_active_adapter(&self, adapter: Box<dyn ProviderAdapter>) {
        info!(model = %adapter.description().model_name, "active adapter set");
        self.active.store(Some(Arc::new(adapter)));
    }

    /// Metadata of the active adapter's model, if one is set.
    pub fn active_description(&self) -> Option<ModelDescription> {
        self.active.load().as_ref().map(|a| a.description())
    }

    /// Renders `ctx`, completes it through `adapter` (or the active one),
    /// and appends the reply via the context's normal insertion path so
    /// eviction and staleness run.
    ///
    /// An empty completion is replaced by a fixed system-authored fallback
    /// rather than surfaced raw. Transport and API failures propagate
    /// unmodified and leave the context untouched.
    pub async fn get_completion(
        &self,
        ctx: &mut ChatContext,
        adapter: Option<&dyn ProviderAdapter>,
    ) -> Result<Message, BanterError> {
        let active = self.active.load_full();
        let adapter: &dyn ProviderAdapter = match adapter {
            Some(explicit) => explicit,
            None => active
                .as_deref()
                .map(|boxed| boxed.as_ref())
                .ok_or(BanterError::NotInitialized)?,
        };

        let rendered = ctx.render();
        match adapter.complete(&rendered).await {
            Ok(reply) => {
                ctx.add_message(reply.clone());
                Ok(reply)
            }
            Err(BanterError::EmptyCompletion) => {
                warn!(
                    model = %adapter.description().model_name,
                    "backend returned an empty completion, substituting fallback"
                );
                let fallback = Message::system_with(FALLBACK_COMPLETION, ctx.counter());
                ctx.add_message(fallback.clone());
                Ok(fallback)
            }
            Err(err) => Err(err),
        }
    }

    /// Runs one inbound user message through moderate-then-complete.
    ///
    /// A flagged message short-circuits: it is not appended to the context
    /// and no backend is contacted. Clean messages are appended and the
    /// context is completed through the active adapter.
    pub async fn run_turn(
        &self,
        ctx: &mut ChatContext,
        gate: &dyn ModerationGate,
        text: &str,
    ) -> Result<TurnOutcome, BanterError> {
        let mut inbound = Message::user_with(text, ctx.counter());
        let verdict = inbound.ensure_moderated(gate).await?;
        if verdict.flagged() {
            let dominant = verdict.dominant();
            info!(?dominant, "inbound message flagged, skipping completion");
            return Ok(TurnOutcome::Flagged { dominant });
        }

        ctx.add_message(inbound);
        let reply = self.get_completion(ctx, None).await?;
        Ok(TurnOutcome::Completed(reply))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use banter_core::{ModerationResult, Role, TokenCounter, WireMessage};

    use super::*;

    /// Adapter double returning a canned outcome and counting calls.
    struct StubAdapter {
        calls: AtomicUsize,
        reply: Result<String, fn() -> BanterError>,
    }

    impl StubAdapter {
        fn replying(text: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Ok(text.to_string()),
            }
        }

        fn failing(err: fn() -> BanterError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Err(err),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        fn description(&self) -> ModelDescription {
            ModelDescription::new("stub-model", 4096, 1024)
        }

        fn to_provider_format(&self, rendered: &[WireMessage]) -> serde_json::Value {
            serde_json::json!({ "messages": rendered.len() })
        }

        fn parse_response(&self, _raw: serde_json::Value) -> Result<Message, BanterError> {
            Err(BanterError::EmptyCompletion)
        }

        async fn complete(&self, _rendered: &[WireMessage]) -> Result<Message, BanterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(Message::assistant_with(text.clone(), &TokenCounter::Words)),
                Err(err) => Err(err()),
            }
        }
    }

    /// Gate double with a fixed verdict.
    struct StubGate {
        calls: AtomicUsize,
        result: ModerationResult,
    }

    impl StubGate {
        fn clean() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: ModerationResult::unflagged(),
            }
        }

        fn flagging(category: HarmCategory, score: f64) -> Self {
            let mut flags = HashMap::new();
            flags.insert(category, true);
            let mut scores = HashMap::new();
            scores.insert(category, score);
            Self {
                calls: AtomicUsize::new(0),
                result: ModerationResult::new(flags, scores),
            }
        }
    }

    #[async_trait]
    impl ModerationGate for StubGate {
        async fn classify(&self, _text: &str) -> Result<ModerationResult, BanterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result.clone())
        }
    }

    fn context() -> ChatContext {
        ChatContext::new(100, 24, TokenCounter::Words)
    }

    #[tokio::test]
    async fn completion_without_adapter_is_not_initialized() {
        let engine = CompletionEngine::new();
        let mut ctx = context();
        let err = engine.get_completion(&mut ctx, None).await.unwrap_err();
        assert!(matches!(err, BanterError::NotInitialized));
        assert!(ctx.messages().is_empty());
    }

    #[tokio::test]
    async fn completion_appends_reply_through_context() {
        let engine = CompletionEngine::new();
        engine.set_active_adapter(Box::new(StubAdapter::replying("hello back")));
        let mut ctx = context();
        ctx.add_message("hello");

        let reply = engine.get_completion(&mut ctx, None).await.unwrap();
        assert_eq!(reply.content(), "hello back");
        assert_eq!(ctx.messages().len(), 2);
        assert_eq!(ctx.latest().unwrap().role(), Role::Assistant);
    }

    #[tokio::test]
    async fn explicit_adapter_overrides_the_active_one() {
        let engine = CompletionEngine::new();
        engine.set_active_adapter(Box::new(StubAdapter::replying("from active")));
        let explicit = StubAdapter::replying("from explicit");
        let mut ctx = context();

        let reply = engine
            .get_completion(&mut ctx, Some(&explicit))
            .await
            .unwrap();
        assert_eq!(reply.content(), "from explicit");
        assert_eq!(explicit.calls(), 1);
    }

    #[tokio::test]
    async fn swapping_the_adapter_takes_effect_for_later_calls() {
        let engine = CompletionEngine::new();
        engine.set_active_adapter(Box::new(StubAdapter::replying("first")));
        let mut ctx = context();
        let reply = engine.get_completion(&mut ctx, None).await.unwrap();
        assert_eq!(reply.content(), "first");

        engine.set_active_adapter(Box::new(StubAdapter::replying("second")));
        let reply = engine.get_completion(&mut ctx, None).await.unwrap();
        assert_eq!(reply.content(), "second");
        assert_eq!(
            engine.active_description().unwrap().model_name,
            "stub-model"
        );
    }

    #[tokio::test]
    async fn empty_completion_substitutes_the_fallback() {
        let engine = CompletionEngine::new();
        engine.set_active_adapter(Box::new(StubAdapter::failing(|| {
            BanterError::EmptyCompletion
        })));
        let mut ctx = context();
        ctx.add_message("hello");

        let reply = engine.get_completion(&mut ctx, None).await.unwrap();
        assert_eq!(reply.role(), Role::System);
        assert_eq!(reply.content(), FALLBACK_COMPLETION);
        assert_eq!(ctx.messages().len(), 2);
    }

    #[tokio::test]
    async fn transport_failure_leaves_the_context_unmutated() {
        let engine = CompletionEngine::new();
        engine.set_active_adapter(Box::new(StubAdapter::failing(|| {
            BanterError::Provider {
                message: "connection refused".into(),
                source: None,
            }
        })));
        let mut ctx = context();
        ctx.add_message("hello");

        let err = engine.get_completion(&mut ctx, None).await.unwrap_err();
        assert!(matches!(err, BanterError::Provider { .. }));
        assert_eq!(ctx.messages().len(), 1);
    }

    #[tokio::test]
    async fn clean_turn_appends_user_message_and_reply() {
        let engine = CompletionEngine::new();
        engine.set_active_adapter(Box::new(StubAdapter::replying("nice to meet you")));
        let gate = StubGate::clean();
        let mut ctx = context();

        let outcome = engine.run_turn(&mut ctx, &gate, "hi there").await.unwrap();
        let TurnOutcome::Completed(reply) = outcome else {
            panic!("expected a completion");
        };
        assert_eq!(reply.content(), "nice to meet you");
        assert_eq!(ctx.messages().len(), 2);
        assert_eq!(ctx.messages()[0].content(), "hi there");
    }

    #[tokio::test]
    async fn flagged_turn_short_circuits_without_touching_anything() {
        let engine = CompletionEngine::new();
        let adapter = StubAdapter::replying("should never run");
        let gate = StubGate::flagging(HarmCategory::Harassment, 0.91);
        let mut ctx = context();

        let outcome = engine.run_turn(&mut ctx, &gate, "rude text").await.unwrap();
        assert_eq!(
            outcome,
            TurnOutcome::Flagged {
                dominant: Some((HarmCategory::Harassment, 0.91))
            }
        );
        assert!(ctx.messages().is_empty());
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn gate_failure_propagates_before_any_mutation() {
        struct FailingGate;

        #[async_trait]
        impl ModerationGate for FailingGate {
            async fn classify(&self, _text: &str) -> Result<ModerationResult, BanterError> {
                Err(BanterError::ModerationService {
                    message: "gate down".into(),
                    source: None,
                })
            }
        }

        let engine = CompletionEngine::new();
        engine.set_active_adapter(Box::new(StubAdapter::replying("unused")));
        let mut ctx = context();

        let err = engine
            .run_turn(&mut ctx, &FailingGate, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, BanterError::ModerationService { .. }));
        assert!(ctx.messages().is_empty());
    }
}
