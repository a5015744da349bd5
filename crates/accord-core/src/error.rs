//! Error types for the Accord foundation layer.

use thiserror::Error;

/// Errors raised while looking up option values on an interaction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    /// A required option was not present on the interaction.
    #[error("required option '{0}' missing from interaction")]
    MissingRequired(String),
}

/// Fatal configuration errors surfaced during startup resolution.
///
/// Any of these aborts the whole startup; no partial-readiness state exists.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two leaf registrations collided on the same sibling name.
    #[error("duplicate command '{name}' under '{parent}'")]
    DuplicateCommand {
        /// Parent path (or `<root>` for top-level commands).
        parent: String,
        /// The colliding sibling name.
        name: String,
    },

    /// A node on a registered path was reused with a different kind.
    #[error("node '{name}' registered as {existing} but reused as {requested}")]
    KindMismatch {
        /// The conflicting node name.
        name: String,
        /// Kind recorded by the earlier registration.
        existing: &'static str,
        /// Kind requested by the later registration.
        requested: &'static str,
    },

    /// A DTO schema declared a parameter for a property the DTO lacks.
    #[error("schema for '{dto}' declares unknown property '{property}'")]
    UnknownProperty {
        /// DTO type name.
        dto: String,
        /// The undeclared property.
        property: String,
    },

    /// A DTO template could not be built from the type's default value.
    #[error("DTO '{dto}' does not serialize to an object: {reason}")]
    InvalidTemplate {
        /// DTO type name.
        dto: String,
        /// Serialization failure detail.
        reason: String,
    },

    /// A second client handle was bound during resolution.
    #[error("client '{existing}' already bound, cannot bind '{requested}'")]
    ClientAlreadyBound {
        /// Id of the client bound first.
        existing: String,
        /// Id of the rejected client.
        requested: String,
    },

    /// Tree invariant violation detected after resolution.
    #[error("command tree invariant violated at '{node}': {reason}")]
    InvalidTree {
        /// Offending node path.
        node: String,
        /// Which invariant failed.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_context() {
        let err = RegistryError::DuplicateCommand {
            parent: "<root>".into(),
            name: "ping".into(),
        };
        assert_eq!(err.to_string(), "duplicate command 'ping' under '<root>'");

        let err = OptionError::MissingRequired("target".into());
        assert!(err.to_string().contains("target"));
    }
}
