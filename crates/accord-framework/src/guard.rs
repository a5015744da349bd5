//! Guards: boolean gates evaluated before a handler runs.
//!
//! A guard returning `false` silently aborts the invocation pipeline; no
//! handler runs and no error is surfaced. A guard that errors propagates as
//! a dispatch error instead. Guards registered class-level on a manifest run
//! before method-level guards, each set in registration order.

use async_trait::async_trait;

use accord_core::AccessEvaluator;

use crate::context::InvocationContext;
use crate::error::HandlerError;

/// A boolean gate evaluated before a handler runs.
#[async_trait]
pub trait Guard: Send + Sync {
    /// Returns whether the invocation may proceed.
    async fn can_activate(&self, ctx: &InvocationContext) -> Result<bool, HandlerError>;
}

/// Blanket implementation for plain predicate functions.
#[async_trait]
impl<F> Guard for F
where
    F: Fn(&InvocationContext) -> bool + Send + Sync,
{
    async fn can_activate(&self, ctx: &InvocationContext) -> Result<bool, HandlerError> {
        Ok(self(ctx))
    }
}

/// Built-in guard composing the [`AccessEvaluator`] predicates.
///
/// Denies interactions addressed to a command outside its allowed channels
/// and any event from a guild that is not allowed or is explicitly denied.
/// Denial is a `false` result, never an error.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    evaluator: AccessEvaluator,
}

impl AccessGuard {
    /// Creates the guard over an access evaluator.
    pub fn new(evaluator: AccessEvaluator) -> Self {
        Self { evaluator }
    }
}

#[async_trait]
impl Guard for AccessGuard {
    async fn can_activate(&self, ctx: &InvocationContext) -> Result<bool, HandlerError> {
        let event = ctx.event();
        if !self.evaluator.is_allowed_guild(&**event) || self.evaluator.is_denied_guild(&**event) {
            return Ok(false);
        }
        if let (Some(interaction), Some(channel_id)) =
            (event.as_interaction(), event.channel_id())
        {
            let path = interaction.command_path();
            if !self.evaluator.is_allowed_channel(&path.command, channel_id) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_core::{AccessConfig, ChannelRestriction, CommandInteraction, MessageEvent};
    use std::sync::Arc;

    fn ctx_for(event: impl accord_core::Event) -> InvocationContext {
        InvocationContext::new(Arc::new(event), None, None)
    }

    fn guard(config: AccessConfig) -> AccessGuard {
        AccessGuard::new(AccessEvaluator::new(config))
    }

    #[tokio::test]
    async fn channel_restriction_gates_matching_command() {
        let guard = guard(AccessConfig {
            channels: vec![ChannelRestriction {
                command_name: "ban".into(),
                channels: vec!["C1".into()],
            }],
            ..AccessConfig::default()
        });

        let allowed = ctx_for(CommandInteraction::new("ban").channel("C1"));
        let blocked = ctx_for(CommandInteraction::new("ban").channel("C2"));
        let unrelated = ctx_for(CommandInteraction::new("kick").channel("C2"));

        assert!(guard.can_activate(&allowed).await.unwrap());
        assert!(!guard.can_activate(&blocked).await.unwrap());
        assert!(guard.can_activate(&unrelated).await.unwrap());
    }

    #[tokio::test]
    async fn denied_guild_blocks_without_error() {
        let guard = guard(AccessConfig {
            deny_guilds: vec!["G2".into()],
            ..AccessConfig::default()
        });

        let denied = ctx_for(MessageEvent::new("hi").guild("G2"));
        let plain = ctx_for(MessageEvent::new("hi"));

        assert!(!guard.can_activate(&denied).await.unwrap());
        assert!(guard.can_activate(&plain).await.unwrap());
    }

    #[tokio::test]
    async fn predicate_functions_are_guards() {
        let guard = |_: &InvocationContext| false;
        let ctx = ctx_for(MessageEvent::new("hi"));
        assert!(!Guard::can_activate(&guard, &ctx).await.unwrap());
    }
}
