//! Concrete event types for simple integrations and tests.
//!
//! Adapters are free to implement [`Event`]/[`Interaction`] on their own
//! wire types; these serde-deserializable structs cover the common case of a
//! slash-command interaction and a plain chat message.

use std::any::Any;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OptionError;
use crate::event::{CommandPath, Event, EventKind, Interaction};

/// One named option value carried by an interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOption {
    /// External option name.
    pub name: String,
    /// The raw option value.
    pub value: Value,
}

/// A slash-command interaction event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandInteraction {
    /// Top-level command name.
    pub name: String,
    /// Sub-command group, if addressed.
    pub group: Option<String>,
    /// Sub-command, if addressed.
    pub subcommand: Option<String>,
    /// Named option values.
    pub options: Vec<CommandOption>,
    /// Originating channel.
    pub channel_id: Option<String>,
    /// Originating guild.
    pub guild_id: Option<String>,
}

impl CommandInteraction {
    /// Creates an interaction addressing a top-level command.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the sub-command group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the sub-command.
    pub fn subcommand(mut self, subcommand: impl Into<String>) -> Self {
        self.subcommand = Some(subcommand.into());
        self
    }

    /// Adds a named option value.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.push(CommandOption {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Sets the originating channel.
    pub fn channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Sets the originating guild.
    pub fn guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }
}

impl Event for CommandInteraction {
    fn event_name(&self) -> &str {
        "interaction_create"
    }

    fn kind(&self) -> EventKind {
        EventKind::Interaction
    }

    fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_interaction(&self) -> Option<&dyn Interaction> {
        Some(self)
    }
}

impl Interaction for CommandInteraction {
    fn command_path(&self) -> CommandPath {
        CommandPath {
            command: self.name.clone(),
            group: self.group.clone(),
            subcommand: self.subcommand.clone(),
        }
    }

    fn option(&self, name: &str, required: bool) -> Result<Option<Value>, OptionError> {
        match self.options.iter().find(|o| o.name == name) {
            Some(option) => Ok(Some(option.value.clone())),
            None if required => Err(OptionError::MissingRequired(name.to_string())),
            None => Ok(None),
        }
    }
}

/// A plain chat message event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageEvent {
    /// Message text.
    pub content: String,
    /// Author id.
    pub author_id: Option<String>,
    /// Originating channel.
    pub channel_id: Option<String>,
    /// Originating guild.
    pub guild_id: Option<String>,
}

impl MessageEvent {
    /// Creates a message event with the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Sets the author id.
    pub fn author(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    /// Sets the originating channel.
    pub fn channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Sets the originating guild.
    pub fn guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }
}

impl Event for MessageEvent {
    fn event_name(&self) -> &str {
        "message_create"
    }

    fn kind(&self) -> EventKind {
        EventKind::Message
    }

    fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_lookup_enforces_required_at_the_boundary() {
        let interaction = CommandInteraction::new("ban").with_option("target", "user#1");

        assert_eq!(
            interaction.option("target", true).unwrap(),
            Some(Value::String("user#1".into()))
        );
        assert_eq!(interaction.option("reason", false).unwrap(), None);
        assert_eq!(
            interaction.option("reason", true),
            Err(OptionError::MissingRequired("reason".into()))
        );
    }

    #[test]
    fn interaction_reports_its_command_path() {
        let interaction = CommandInteraction::new("mod")
            .group("user")
            .subcommand("ban");
        assert_eq!(
            interaction.command_path().segments(),
            vec!["mod", "user", "ban"]
        );
    }

    #[test]
    fn interaction_deserializes_from_wire_json() {
        let interaction: CommandInteraction = serde_json::from_str(
            r#"{
                "name": "ping",
                "options": [{"name": "target", "value": "world"}],
                "channel_id": "C1"
            }"#,
        )
        .expect("valid interaction");
        assert_eq!(interaction.name, "ping");
        assert_eq!(interaction.channel_id.as_deref(), Some("C1"));
        assert_eq!(interaction.options.len(), 1);
        assert!(interaction.guild_id.is_none());
    }
}
