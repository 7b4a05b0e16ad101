//! Error types for schema compilation and emission.

use thiserror::Error;

/// Errors raised while turning a schema document into emitted source.
///
/// Everything here is fatal for the generation run, except that an
/// [`GenError::EmitterFailure`] only kills its own target; the CLI still
/// writes the targets that succeeded and exits non-zero.
#[derive(Debug, Error)]
pub enum GenError {
    /// The input schema is malformed or uses an unsupported construct in a
    /// required position. `pointer` is the JSON pointer of the offending node.
    #[error("invalid schema at {pointer}: {reason}")]
    SchemaInvalid { pointer: String, reason: String },

    /// A `$ref` points outside the document or at a missing definition.
    #[error("unresolvable reference {reference} at {pointer}")]
    ReferenceUnresolvable { pointer: String, reference: String },

    /// A chain of `$ref` aliases loops back on itself.
    #[error("cyclic definition: {cycle}")]
    CyclicDefinition { cycle: String },

    /// Two type declarations would receive the same qualified name.
    #[error("name collision: two types would be named `{name}`")]
    NameCollision { name: String },

    /// A back-end cannot render a construct. Fatal for that target only.
    #[error("{target} emitter: {reason}")]
    EmitterFailure { target: String, reason: String },
}

impl GenError {
    pub fn schema_invalid(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaInvalid { pointer: pointer.into(), reason: reason.into() }
    }

    pub fn emitter(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EmitterFailure { target: target.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
