//! The identity contract shared by every entity in a ReqIF graph.

use std::{fmt, hash, marker::PhantomData};

use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;

/// Common identity and metadata carried by every ReqIF entity.
///
/// The identifier must be non-empty by the time the entity is written and is
/// expected to be unique within the collection that owns the entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    identifier: String,
    long_name: Option<String>,
    description: Option<String>,
    last_change: DateTime<FixedOffset>,
    alternative_id: Option<AlternativeId>,
}

impl Identity {
    /// Create an identity with a freshly generated identifier.
    ///
    /// Identifiers take the `_<uuid>` shape. XML identifiers may not start
    /// with a digit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_identifier(format!("_{}", Uuid::new_v4()))
    }

    /// Create an identity with the given identifier, stamped with the current
    /// time.
    #[must_use]
    pub fn with_identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            long_name: None,
            description: None,
            last_change: Utc::now().fixed_offset(),
            alternative_id: None,
        }
    }

    /// The entity's identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Change the identifier.
    ///
    /// The alternative id back-link follows the new identifier.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
        if let Some(alternative_id) = &mut self.alternative_id {
            alternative_id.owner.clone_from(&self.identifier);
        }
    }

    /// The human readable name.
    #[must_use]
    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    /// Set the human readable name.
    pub fn set_long_name(&mut self, long_name: Option<String>) {
        self.long_name = long_name;
    }

    /// The free-text description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Set the free-text description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// When the entity was last changed.
    #[must_use]
    pub const fn last_change(&self) -> DateTime<FixedOffset> {
        self.last_change
    }

    /// Set the last-change timestamp.
    pub const fn set_last_change(&mut self, last_change: DateTime<FixedOffset>) {
        self.last_change = last_change;
    }

    /// The tool-specific alternative identifier, if any.
    #[must_use]
    pub const fn alternative_id(&self) -> Option<&AlternativeId> {
        self.alternative_id.as_ref()
    }

    /// Attach an alternative identifier, replacing any existing one.
    ///
    /// Returns the attached record, whose owner is this identity.
    pub fn set_alternative_id(&mut self, identifier: Option<String>) -> &AlternativeId {
        self.alternative_id.insert(AlternativeId {
            identifier,
            owner: self.identifier.clone(),
        })
    }

    /// Remove the alternative identifier.
    pub fn clear_alternative_id(&mut self) -> Option<AlternativeId> {
        self.alternative_id.take()
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

/// An identifier assigned to an entity by an external tool.
///
/// The record knows its owner by identifier; it is only ever created through
/// [`Identity::set_alternative_id`], which keeps the link consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeId {
    identifier: Option<String>,
    owner: String,
}

impl AlternativeId {
    /// The external identifier.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Identifier of the entity this record belongs to.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

/// Implemented by every entity that carries an [`Identity`].
pub trait Identifiable {
    /// Name of the entity kind, used in diagnostics (e.g. `SpecObject`).
    const KIND: &'static str;

    /// Shared identity data.
    fn identity(&self) -> &Identity;

    /// Mutable identity data.
    fn identity_mut(&mut self) -> &mut Identity;

    /// Shortcut for `identity().identifier()`.
    fn identifier(&self) -> &str {
        self.identity().identifier()
    }

    /// Shortcut for `identity().long_name()`.
    fn long_name(&self) -> Option<&str> {
        self.identity().long_name()
    }
}

/// Description given to placeholders fabricated for dangling references.
#[must_use]
pub fn placeholder_description(kind: &str) -> String {
    format!("This {kind} was not found in the source file.")
}

/// A non-owning, identifier-based reference to an entity of type `T`.
///
/// References are resolved through [`ReqIfContent`](crate::ReqIfContent),
/// which returns the first registered entity carrying the identifier.
pub struct Ref<T> {
    identifier: String,
    target: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    /// Create a reference to the entity with the given identifier.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            target: PhantomData,
        }
    }

    /// The identifier of the referenced entity.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl<T: Identifiable> Ref<T> {
    /// Create a reference to an existing entity.
    #[must_use]
    pub fn to(entity: &T) -> Self {
        Self::new(entity.identifier())
    }

    /// Whether this reference points at `entity`.
    #[must_use]
    pub fn refers_to(&self, entity: &T) -> bool {
        self.identifier == entity.identifier()
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self::new(self.identifier.clone())
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl<T> Eq for Ref<T> {}

impl<T> hash::Hash for Ref<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({})", self.identifier)
    }
}

impl<T> fmt::Display for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}
