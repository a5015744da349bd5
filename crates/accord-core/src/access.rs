//! Allow/deny evaluation for channels and guilds.
//!
//! The evaluator exposes pure boolean predicates over a read-only
//! [`AccessConfig`]. Denial is never an error: a `false` result is meant to
//! be translated into a pipeline abort by the guard composing these checks,
//! not thrown.
//!
//! Guild-scoped checks fail open: an event without guild context passes the
//! allow check and is never considered denied, since absence of a guild means
//! "not restricted".

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Per-command channel restriction entry.
///
/// A restriction is scoped strictly to its command name; entries for other
/// commands never restrict unrelated commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelRestriction {
    /// The command this restriction applies to.
    pub command_name: String,
    /// Channels in which the command is allowed.
    pub channels: Vec<String>,
}

/// The allow/deny configuration consumed by the evaluator.
///
/// Read-only at evaluation time; typically loaded from the runtime config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Per-command channel restrictions.
    pub channels: Vec<ChannelRestriction>,
    /// Guilds the bot is allowed in. Empty means all guilds are allowed.
    pub allow_guilds: Vec<String>,
    /// Guilds the bot is denied in.
    pub deny_guilds: Vec<String>,
}

/// Pure allow/deny predicates over an [`AccessConfig`].
#[derive(Debug, Clone, Default)]
pub struct AccessEvaluator {
    config: AccessConfig,
}

impl AccessEvaluator {
    /// Creates an evaluator over the given configuration.
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Whether `command_name` may run in `channel_id`.
    ///
    /// Commands without a restriction entry are allowed everywhere. A command
    /// with one or more entries is allowed only in the listed channels.
    pub fn is_allowed_channel(&self, command_name: &str, channel_id: &str) -> bool {
        let mut restricted = false;
        for entry in &self.config.channels {
            if entry.command_name != command_name {
                continue;
            }
            if entry.channels.iter().any(|c| c == channel_id) {
                return true;
            }
            restricted = true;
        }
        !restricted
    }

    /// Whether the event's guild is on the allow list.
    ///
    /// Events without guild context pass. An empty allow list allows all
    /// guilds.
    pub fn is_allowed_guild(&self, event: &dyn Event) -> bool {
        match event.guild_id() {
            Some(guild_id) => self.guild_allowed(guild_id),
            None => true,
        }
    }

    /// Whether the event's guild is on the deny list.
    ///
    /// Events without guild context are never denied.
    pub fn is_denied_guild(&self, event: &dyn Event) -> bool {
        match event.guild_id() {
            Some(guild_id) => self.guild_denied(guild_id),
            None => false,
        }
    }

    /// Allow-list check over an argument list.
    ///
    /// Scans for the first argument exposing a guild and delegates to the
    /// allow list. Best-effort convenience: argument shapes are
    /// caller-defined, so no guild context simply passes.
    pub fn is_allowed_guild_in(&self, args: &[&dyn Event]) -> bool {
        match args.iter().find_map(|event| event.guild_id()) {
            Some(guild_id) => self.guild_allowed(guild_id),
            None => true,
        }
    }

    /// Deny-list check over an argument list; see
    /// [`is_allowed_guild_in`](Self::is_allowed_guild_in).
    pub fn is_denied_guild_in(&self, args: &[&dyn Event]) -> bool {
        match args.iter().find_map(|event| event.guild_id()) {
            Some(guild_id) => self.guild_denied(guild_id),
            None => false,
        }
    }

    fn guild_allowed(&self, guild_id: &str) -> bool {
        self.config.allow_guilds.is_empty()
            || self.config.allow_guilds.iter().any(|g| g == guild_id)
    }

    fn guild_denied(&self, guild_id: &str) -> bool {
        self.config.deny_guilds.iter().any(|g| g == guild_id)
    }
}
