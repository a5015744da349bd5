//! Event system for the Accord framework.
//!
//! This module provides the core event infrastructure:
//!
//! - [`Event`] - Base trait for all platform-delivered events
//! - [`EventKind`] - High-level event classification (interaction, message)
//! - [`Interaction`] - Contract for command-shaped events carrying options
//! - [`BoxedEvent`] - Type-erased, cheaply cloneable event handle
//!
//! The routing layer only requires three things from an incoming event: its
//! kind, a command-name path, and a per-name option-value lookup with a
//! required flag. Everything else (payload shape, platform specifics) stays
//! behind `as_any` downcasting.

use std::any::Any;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::error::OptionError;

// ============================================================================
// Event Kind Classification
// ============================================================================

/// Classification of incoming events.
///
/// Used by the router to decide whether an event can carry a command path
/// without knowing the concrete event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Command-shaped interaction events (slash commands and the like).
    Interaction,
    /// Plain chat messages.
    Message,
    /// Other/unknown event kinds.
    Other,
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "interaction" | "interaction_create" => EventKind::Interaction,
            "message" | "message_create" => EventKind::Message,
            _ => EventKind::Other,
        })
    }
}

// ============================================================================
// Command Path
// ============================================================================

/// The command-name path carried by an interaction.
///
/// Mirrors the three-level nesting of the command tree: a top-level command,
/// an optional sub-command group, and an optional sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPath {
    /// Top-level command name.
    pub command: String,
    /// Sub-command group, if the interaction addresses one.
    pub group: Option<String>,
    /// Sub-command, if the interaction addresses one.
    pub subcommand: Option<String>,
}

impl CommandPath {
    /// Creates a path addressing a top-level command.
    pub fn command(name: impl Into<String>) -> Self {
        Self {
            command: name.into(),
            group: None,
            subcommand: None,
        }
    }

    /// Creates a path addressing a sub-command, optionally inside a group.
    pub fn subcommand(
        command: impl Into<String>,
        group: Option<String>,
        subcommand: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            group,
            subcommand: Some(subcommand.into()),
        }
    }

    /// Returns the path as an ordered list of tree segments.
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = vec![self.command.as_str()];
        if let Some(group) = &self.group {
            segments.push(group.as_str());
        }
        if let Some(subcommand) = &self.subcommand {
            segments.push(subcommand.as_str());
        }
        segments
    }
}

// ============================================================================
// Core Event Trait
// ============================================================================

/// The base trait for all events in the Accord framework.
///
/// Events are type-erased as `dyn Event` and can be downcast to concrete
/// types via [`as_any`](Event::as_any). Guild and channel accessors default
/// to `None`; events without guild context deliberately pass guild-scoped
/// access checks (fail-open, see [`AccessEvaluator`](crate::AccessEvaluator)).
pub trait Event: Any + Send + Sync {
    /// Returns the platform event name (e.g. `"interaction_create"`).
    ///
    /// Listener registration matches on this name.
    fn event_name(&self) -> &str;

    /// Returns the high-level classification of this event.
    fn kind(&self) -> EventKind;

    /// The guild this event originated from, if any.
    fn guild_id(&self) -> Option<&str> {
        None
    }

    /// The channel this event originated from, if any.
    fn channel_id(&self) -> Option<&str> {
        None
    }

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the interaction view of this event, if it is command-shaped.
    fn as_interaction(&self) -> Option<&dyn Interaction> {
        None
    }
}

/// Contract for command-shaped events.
///
/// An interaction reports the command path it addresses and exposes a
/// per-name option-value lookup. The `required` flag controls whether a
/// missing option is an error at the event-source boundary or is tolerated
/// and yields `None`.
pub trait Interaction: Event {
    /// The command/group/sub-command path this interaction addresses.
    fn command_path(&self) -> CommandPath;

    /// Looks up an option value by its external name.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::MissingRequired`] when `required` is set and no
    /// option of that name is present on the interaction.
    fn option(&self, name: &str, required: bool) -> Result<Option<Value>, OptionError>;
}

/// A type-erased, cheaply cloneable event handle.
pub type BoxedEvent = Arc<dyn Event>;

/// Downcasts a boxed event to a concrete event type.
pub fn downcast_event<T: Event>(event: &dyn Event) -> Option<&T> {
    event.as_any().downcast_ref::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_path_segments() {
        let path = CommandPath::command("ping");
        assert_eq!(path.segments(), vec!["ping"]);

        let path = CommandPath::subcommand("mod", Some("user".into()), "ban");
        assert_eq!(path.segments(), vec!["mod", "user", "ban"]);

        let path = CommandPath::subcommand("mod", None, "ban");
        assert_eq!(path.segments(), vec!["mod", "ban"]);
    }

    #[test]
    fn event_kind_from_str() {
        assert_eq!(
            "interaction_create".parse::<EventKind>(),
            Ok(EventKind::Interaction)
        );
        assert_eq!("message".parse::<EventKind>(), Ok(EventKind::Message));
        assert_eq!("heartbeat".parse::<EventKind>(), Ok(EventKind::Other));
    }
}
