// SPDX-FileCopyrightText: 2026 Banter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guild-to-context map with lazy creation.

use std::sync::Arc;

use banter_core::{BanterError, GuildId, Message};
use banter_config::{AgentConfig, BanterConfig, ContextConfig};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::context::ChatContext;
use crate::preload::Preload;

/// Holds one [`ChatContext`] per guild, created on first touch.
///
/// Each context sits behind its own async mutex so one guild's in-flight
/// turn never blocks another guild's. New contexts are seeded from the
/// registry's defaults (system prompt, preload, budget, TTL, counter).
#[derive(Debug)]
pub struct GuildRegistry {
    contexts: DashMap<GuildId, Arc<Mutex<ChatContext>>>,
    system_prompt: String,
    preload: Option<Preload>,
    context_config: ContextConfig,
}

impl GuildRegistry {
    /// Builds a registry seeding new contexts from the agent and context
    /// config sections. `preload` is applied to every new context.
    pub fn new(agent: &AgentConfig, context: &ContextConfig, preload: Option<Preload>) -> Self {
        Self {
            contexts: DashMap::new(),
            system_prompt: agent.system_prompt.clone().unwrap_or_default(),
            preload,
            context_config: context.clone(),
        }
    }

    /// Builds a registry from a loaded config, reading the preload file
    /// named by `agent.preload_file` when one is set.
    pub fn from_config(config: &BanterConfig) -> Result<Self, BanterError> {
        let preload = config
            .agent
            .preload_file
            .as_deref()
            .map(|path| Preload::load(path, &config.context.counter))
            .transpose()?;
        Ok(Self::new(&config.agent, &config.context, preload))
    }

    /// Returns the guild's context, creating it on first access.
    pub fn get_or_create(&self, guild: &GuildId) -> Arc<Mutex<ChatContext>> {
        if let Some(existing) = self.contexts.get(guild) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .contexts
            .entry(guild.clone())
            .or_insert_with(|| {
                debug!(guild = %guild, "creating conversation context");
                Arc::new(Mutex::new(self.fresh_context()))
            });
        Arc::clone(entry.value())
    }

    /// Whether a context already exists for the guild. Never creates one.
    pub fn contains(&self, guild: &GuildId) -> bool {
        self.contexts.contains_key(guild)
    }

    /// Number of contexts created so far.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Drops the guild's context entirely. The next access starts fresh.
    pub fn remove(&self, guild: &GuildId) -> bool {
        self.contexts.remove(guild).is_some()
    }

    fn fresh_context(&self) -> ChatContext {
        let mut ctx = ChatContext::from_config(&self.context_config);
        let prompt = Message::system_with(self.system_prompt.clone(), ctx.counter());
        // Always system-role by construction.
        let _ = ctx.set_system_prompt(prompt);
        if let Some(preload) = &self.preload {
            preload.apply_to(&mut ctx);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_core::{Role, TokenCounter};

    fn registry() -> GuildRegistry {
        let agent = AgentConfig {
            system_prompt: Some("be helpful".to_string()),
            ..AgentConfig::default()
        };
        let context = ContextConfig {
            max_tokens: 32,
            ttl_hours: 24,
            counter: TokenCounter::Words,
        };
        GuildRegistry::new(&agent, &context, None)
    }

    #[tokio::test]
    async fn contexts_are_created_lazily() {
        let registry = registry();
        let guild = GuildId::from("guild-1");
        assert!(!registry.contains(&guild));
        assert!(registry.is_empty());

        let ctx = registry.get_or_create(&guild);
        assert!(registry.contains(&guild));
        assert_eq!(registry.len(), 1);
        assert_eq!(ctx.lock().await.system_prompt().content(), "be helpful");
    }

    #[tokio::test]
    async fn repeated_access_returns_the_same_context() {
        let registry = registry();
        let guild = GuildId::from("guild-1");

        let first = registry.get_or_create(&guild);
        first.lock().await.add_message("remember me");

        let second = registry.get_or_create(&guild);
        assert_eq!(second.lock().await.messages().len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn guilds_are_isolated() {
        let registry = registry();
        let a = registry.get_or_create(&GuildId::from("guild-a"));
        let b = registry.get_or_create(&GuildId::from("guild-b"));

        a.lock().await.add_message("only in a");
        assert_eq!(a.lock().await.messages().len(), 1);
        assert!(b.lock().await.messages().is_empty());
    }

    #[tokio::test]
    async fn remove_resets_a_guild() {
        let registry = registry();
        let guild = GuildId::from("guild-1");
        registry
            .get_or_create(&guild)
            .lock()
            .await
            .add_message("soon gone");

        assert!(registry.remove(&guild));
        assert!(!registry.contains(&guild));
        let fresh = registry.get_or_create(&guild);
        assert!(fresh.lock().await.messages().is_empty());
    }

    #[test]
    fn from_config_reports_a_missing_preload_file() {
        let mut config = BanterConfig::default();
        config.agent.preload_file = Some("/nonexistent/preload.toml".into());
        let err = GuildRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, banter_core::BanterError::Config(_)));
    }

    #[test]
    fn from_config_without_preload_file_succeeds() {
        let registry = GuildRegistry::from_config(&BanterConfig::default()).unwrap();
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn new_contexts_carry_preload() {
        let preload = Preload::parse(
            r#"
            system_prompt = "from preload"

            [[turns]]
            user = "what is two plus two"
            assistant = "four"
            "#,
            &TokenCounter::Words,
        )
        .unwrap();
        let agent = AgentConfig::default();
        let context = ContextConfig {
            max_tokens: 64,
            ttl_hours: 24,
            counter: TokenCounter::Words,
        };
        let registry = GuildRegistry::new(&agent, &context, Some(preload));

        let ctx = registry.get_or_create(&GuildId::from("guild-1"));
        let ctx = ctx.lock().await;
        assert_eq!(ctx.system_prompt().content(), "from preload");
        assert_eq!(ctx.preload().len(), 2);
        assert_eq!(ctx.preload()[0].role(), Role::User);
        assert_eq!(ctx.preload()[1].role(), Role::Assistant);
    }
}
