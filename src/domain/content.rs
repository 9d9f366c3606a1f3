//! The content aggregate: every top-level collection of a document, and the
//! single authority for resolving identifier references.
//!
//! Resolution happens during a single forward pass. A reference to an
//! identifier that has not been registered (yet) fabricates a placeholder of
//! the expected kind, so the graph is fully linked once reading finishes.

use std::{collections::HashMap, fmt};

use tracing::trace;

use super::{
    attribute_value::AttributeValue,
    datatype::{DataKind, DatatypeDefinition, DatatypeKind, EnumValue},
    identifiable::{Identifiable, Identity, Ref, placeholder_description},
    spec_element::{
        RelationGroup, SpecElementWithAttributes, SpecObject, SpecRelation, Specification,
    },
    spec_type::{AttributeDefinition, AttributeDefinitionKind, SpecType, SpecTypeKind},
};

/// An ordered collection with an identifier index.
///
/// Insertion order is preserved. When several entities share an identifier,
/// lookups return the first one registered.
pub struct Collection<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Identifiable> Collection<T> {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append an entity.
    pub fn push(&mut self, item: T) {
        let position = self.items.len();
        self.index
            .entry(item.identifier().to_string())
            .or_insert(position);
        self.items.push(item);
    }

    /// The first entity with the given identifier.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&T> {
        self.find(identifier, |_| true)
    }

    /// The first entity with the given identifier that satisfies `accept`.
    pub fn find(&self, identifier: &str, accept: impl Fn(&T) -> bool) -> Option<&T> {
        self.position(identifier, accept).map(|i| &self.items[i])
    }

    /// Mutable access to the first entity with the given identifier.
    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut T> {
        self.position(identifier, |_| true)
            .map(|i| &mut self.items[i])
    }

    /// Whether an entity with the given identifier is registered.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    fn position(&self, identifier: &str, accept: impl Fn(&T) -> bool) -> Option<usize> {
        // The index may be stale if identifiers were changed through
        // `iter_mut`, so a hit is verified before use.
        if let Some(&i) = self.index.get(identifier) {
            let item = &self.items[i];
            if item.identifier() == identifier && accept(item) {
                return Some(i);
            }
        }
        self.items
            .iter()
            .position(|item| item.identifier() == identifier && accept(item))
    }

    /// Rebuild the identifier index after identifiers were edited in place.
    pub fn reindex(&mut self) {
        self.index.clear();
        for (position, item) in self.items.iter().enumerate() {
            self.index
                .entry(item.identifier().to_string())
                .or_insert(position);
        }
    }
}

impl<T> Collection<T> {
    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterate mutably in insertion order.
    ///
    /// Call [`Collection::reindex`] after changing identifiers.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// The entities as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Identifiable> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            index: self.index.clone(),
        }
    }
}

impl<T: PartialEq> PartialEq for Collection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: fmt::Debug> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<T: Identifiable> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        for item in iter {
            collection.push(item);
        }
        collection
    }
}

impl<T: Identifiable> Extend<T> for Collection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// The body of a ReqIF document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReqIfContent {
    /// `DATATYPES`
    pub datatypes: Collection<DatatypeDefinition>,
    /// `SPEC-TYPES`
    pub spec_types: Collection<SpecType>,
    /// `SPEC-OBJECTS`
    pub spec_objects: Collection<SpecObject>,
    /// `SPEC-RELATIONS`
    pub spec_relations: Collection<SpecRelation>,
    /// `SPECIFICATIONS`
    pub specifications: Collection<Specification>,
    /// `SPEC-RELATION-GROUPS`
    pub relation_groups: Collection<RelationGroup>,
}

fn placeholder_identity(identifier: &str, kind: &str) -> Identity {
    trace!("{kind} '{identifier}' not found, registering a placeholder");
    let mut identity = Identity::with_identifier(identifier);
    identity.set_description(Some(placeholder_description(kind)));
    identity
}

impl ReqIfContent {
    /// Whether every collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datatypes.is_empty()
            && self.spec_types.is_empty()
            && self.spec_objects.is_empty()
            && self.spec_relations.is_empty()
            && self.specifications.is_empty()
            && self.relation_groups.is_empty()
    }

    /// Resolve a reference to a datatype of the given kind, registering a
    /// placeholder if none exists.
    pub fn resolve_datatype(&mut self, identifier: &str, kind: DataKind) -> Ref<DatatypeDefinition> {
        if self
            .datatypes
            .find(identifier, |datatype| datatype.data_kind() == kind)
            .is_none()
        {
            let identity =
                placeholder_identity(identifier, &format!("DatatypeDefinition{}", kind.name()));
            self.datatypes
                .push(DatatypeDefinition::new(identity, DatatypeKind::empty(kind)));
        }
        Ref::new(identifier)
    }

    /// Resolve a reference to a spec type of the given kind, registering a
    /// placeholder if none exists.
    pub fn resolve_spec_type(&mut self, identifier: &str, kind: SpecTypeKind) -> Ref<SpecType> {
        if self
            .spec_types
            .find(identifier, |spec_type| spec_type.kind() == kind)
            .is_none()
        {
            let identity = placeholder_identity(identifier, kind.name());
            self.spec_types.push(SpecType::new(identity, kind));
        }
        Ref::new(identifier)
    }

    /// Resolve a reference to a spec object, registering a placeholder if
    /// none exists.
    pub fn resolve_spec_object(&mut self, identifier: &str) -> Ref<SpecObject> {
        if !self.spec_objects.contains(identifier) {
            let identity = placeholder_identity(identifier, SpecObject::KIND);
            self.spec_objects.push(SpecObject::new(identity, None));
        }
        Ref::new(identifier)
    }

    /// Resolve a reference to a spec relation, registering a placeholder if
    /// none exists.
    pub fn resolve_spec_relation(&mut self, identifier: &str) -> Ref<SpecRelation> {
        if !self.spec_relations.contains(identifier) {
            let identity = placeholder_identity(identifier, SpecRelation::KIND);
            self.spec_relations
                .push(SpecRelation::new(identity, None, None, None));
        }
        Ref::new(identifier)
    }

    /// Resolve a reference to a specification, registering a placeholder if
    /// none exists.
    pub fn resolve_specification(&mut self, identifier: &str) -> Ref<Specification> {
        if !self.specifications.contains(identifier) {
            let identity = placeholder_identity(identifier, Specification::KIND);
            self.specifications
                .push(Specification::new(identity, None));
        }
        Ref::new(identifier)
    }

    /// Resolve a reference to an attribute definition of the given kind.
    ///
    /// Every spec type is searched. If the definition is unknown, a
    /// placeholder is added to `owner`, the spec type of the element the value
    /// belongs to. Returns `None` if there is no such spec type to hold it.
    pub fn resolve_attribute_definition(
        &mut self,
        identifier: &str,
        kind: DataKind,
        owner: Option<&Ref<SpecType>>,
    ) -> Option<Ref<AttributeDefinition>> {
        if self.typed_attribute_definition(identifier, kind).is_some() {
            return Some(Ref::new(identifier));
        }
        let owner = self.spec_types.get_mut(owner?.identifier())?;
        let identity =
            placeholder_identity(identifier, &format!("AttributeDefinition{}", kind.name()));
        owner.attributes.push(AttributeDefinition::new(
            identity,
            AttributeDefinitionKind::from_data_kind(kind),
        ));
        Some(Ref::new(identifier))
    }

    /// Resolve a reference to an existing attribute definition of any kind.
    ///
    /// No placeholder is created.
    #[must_use]
    pub fn lookup_attribute_definition(&self, identifier: &str) -> Option<Ref<AttributeDefinition>> {
        self.attribute_definition(identifier)
            .map(|_| Ref::new(identifier))
    }

    /// Resolve a reference to an enumeration literal.
    ///
    /// The literals of `datatype` are searched first, then those of every
    /// other enumeration. No placeholder is created since a literal only
    /// exists inside its datatype.
    #[must_use]
    pub fn lookup_enum_value(
        &self,
        identifier: &str,
        datatype: Option<&Ref<DatatypeDefinition>>,
    ) -> Option<Ref<EnumValue>> {
        let in_datatype = datatype
            .and_then(|datatype| self.datatype(datatype.identifier()))
            .and_then(|datatype| datatype.enum_value(identifier));
        in_datatype
            .or_else(|| self.enum_value(identifier))
            .map(|_| Ref::new(identifier))
    }

    /// The first datatype with the given identifier.
    #[must_use]
    pub fn datatype(&self, identifier: &str) -> Option<&DatatypeDefinition> {
        self.datatypes.get(identifier)
    }

    /// The first spec type with the given identifier.
    #[must_use]
    pub fn spec_type(&self, identifier: &str) -> Option<&SpecType> {
        self.spec_types.get(identifier)
    }

    /// The first spec object with the given identifier.
    #[must_use]
    pub fn spec_object(&self, identifier: &str) -> Option<&SpecObject> {
        self.spec_objects.get(identifier)
    }

    /// The first spec relation with the given identifier.
    #[must_use]
    pub fn spec_relation(&self, identifier: &str) -> Option<&SpecRelation> {
        self.spec_relations.get(identifier)
    }

    /// The first specification with the given identifier.
    #[must_use]
    pub fn specification(&self, identifier: &str) -> Option<&Specification> {
        self.specifications.get(identifier)
    }

    /// The first relation group with the given identifier.
    #[must_use]
    pub fn relation_group(&self, identifier: &str) -> Option<&RelationGroup> {
        self.relation_groups.get(identifier)
    }

    /// The spec type an element references, if it resolves.
    pub fn spec_type_of<E: SpecElementWithAttributes>(&self, element: &E) -> Option<&SpecType> {
        let reference = element.spec_type()?;
        self.spec_types
            .find(reference.identifier(), |spec_type| spec_type.kind() == E::TYPE_KIND)
    }

    /// The first attribute definition with the given identifier, searching
    /// every spec type in order.
    #[must_use]
    pub fn attribute_definition(&self, identifier: &str) -> Option<&AttributeDefinition> {
        self.spec_types
            .iter()
            .find_map(|spec_type| spec_type.attribute(identifier))
    }

    /// The first attribute definition with the given identifier and kind,
    /// searching every spec type in order.
    #[must_use]
    pub fn typed_attribute_definition(
        &self,
        identifier: &str,
        kind: DataKind,
    ) -> Option<&AttributeDefinition> {
        self.spec_types.iter().find_map(|spec_type| {
            spec_type
                .attributes
                .iter()
                .find(|definition| {
                    definition.identifier() == identifier && definition.data_kind() == kind
                })
        })
    }

    /// The definition an attribute value is bound to.
    #[must_use]
    pub fn definition_of(&self, value: &AttributeValue) -> Option<&AttributeDefinition> {
        self.typed_attribute_definition(value.definition().identifier(), value.data_kind())
    }

    /// The datatype an attribute definition is bound to.
    #[must_use]
    pub fn datatype_of(&self, definition: &AttributeDefinition) -> Option<&DatatypeDefinition> {
        let reference = definition.datatype()?;
        self.datatypes.find(reference.identifier(), |datatype| {
            datatype.data_kind() == definition.data_kind()
        })
    }

    /// The first enumeration literal with the given identifier, searching
    /// every enumeration datatype in order.
    #[must_use]
    pub fn enum_value(&self, identifier: &str) -> Option<&EnumValue> {
        self.datatypes
            .iter()
            .find_map(|datatype| datatype.enum_value(identifier))
    }

    /// Relations that start or end at the given spec object.
    pub fn relations_of<'a>(
        &'a self,
        object: &'a str,
    ) -> impl Iterator<Item = &'a SpecRelation> + 'a {
        self.spec_relations.iter().filter(move |relation| {
            relation
                .source
                .as_ref()
                .is_some_and(|source| source.identifier() == object)
                || relation
                    .target
                    .as_ref()
                    .is_some_and(|target| target.identifier() == object)
        })
    }

    /// Whether any datatype is an XHTML datatype.
    #[must_use]
    pub fn has_xhtml(&self) -> bool {
        self.datatypes
            .iter()
            .any(|datatype| datatype.data_kind() == DataKind::Xhtml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribute_value::Value;

    #[test]
    fn first_registered_wins() {
        let mut content = ReqIfContent::default();
        let mut first = SpecObject::new(Identity::with_identifier("obj"), None);
        first
            .identity_mut()
            .set_long_name(Some("first".to_string()));
        let mut second = SpecObject::new(Identity::with_identifier("obj"), None);
        second
            .identity_mut()
            .set_long_name(Some("second".to_string()));
        content.spec_objects.push(first);
        content.spec_objects.push(second);

        assert_eq!(content.spec_objects.len(), 2);
        assert_eq!(
            content.spec_object("obj").unwrap().long_name(),
            Some("first")
        );
    }

    #[test]
    fn dangling_reference_registers_placeholder() {
        let mut content = ReqIfContent::default();

        let target = content.resolve_spec_object("unknown-specobject");
        let again = content.resolve_spec_object("unknown-specobject");

        assert_eq!(target, again);
        assert_eq!(content.spec_objects.len(), 1);
        let placeholder = content.spec_object("unknown-specobject").unwrap();
        assert_eq!(
            placeholder.identity().description(),
            Some("This SpecObject was not found in the source file.")
        );
        assert!(placeholder.spec_type().is_none());
    }

    #[test]
    fn datatype_resolution_respects_kind() {
        let mut content = ReqIfContent::default();
        content.datatypes.push(DatatypeDefinition::new(
            Identity::with_identifier("dt"),
            DatatypeKind::empty(DataKind::String),
        ));

        content.resolve_datatype("dt", DataKind::String);
        assert_eq!(content.datatypes.len(), 1);

        content.resolve_datatype("dt", DataKind::Integer);
        assert_eq!(content.datatypes.len(), 2);
        assert_eq!(
            content.datatypes.as_slice()[1].identity().description(),
            Some("This DatatypeDefinitionInteger was not found in the source file.")
        );
    }

    #[test]
    fn attribute_definition_placeholder_lands_on_owner() {
        let mut content = ReqIfContent::default();
        let owner = content.resolve_spec_type("type", SpecTypeKind::SpecObjectType);

        let definition = content
            .resolve_attribute_definition("missing", DataKind::String, Some(&owner))
            .unwrap();

        let spec_type = content.spec_type("type").unwrap();
        assert_eq!(spec_type.attributes.len(), 1);
        assert!(definition.refers_to(&spec_type.attributes[0]));
        assert!(
            content
                .resolve_attribute_definition("other", DataKind::String, None)
                .is_none()
        );
    }

    #[test]
    fn relations_of_matches_either_end() {
        let mut content = ReqIfContent::default();
        let a = content.resolve_spec_object("a");
        let b = content.resolve_spec_object("b");
        let c = content.resolve_spec_object("c");
        content.spec_relations.push(SpecRelation::new(
            Identity::with_identifier("a-b"),
            None,
            Some(a),
            Some(b.clone()),
        ));
        content.spec_relations.push(SpecRelation::new(
            Identity::with_identifier("b-c"),
            None,
            Some(b),
            Some(c),
        ));

        let ids: Vec<&str> = content
            .relations_of("b")
            .map(Identifiable::identifier)
            .collect();
        assert_eq!(ids, vec!["a-b", "b-c"]);
        assert_eq!(content.relations_of("a").count(), 1);
    }

    #[test]
    fn definition_of_value() {
        let mut content = ReqIfContent::default();
        let owner = content.resolve_spec_type("type", SpecTypeKind::SpecObjectType);
        let definition = content
            .resolve_attribute_definition("text", DataKind::String, Some(&owner))
            .unwrap();
        let value = AttributeValue::new(definition, Value::String("hello".into()));

        assert_eq!(content.definition_of(&value).unwrap().identifier(), "text");
    }

    #[test]
    fn stale_index_falls_back_to_scan() {
        let mut collection: Collection<SpecObject> = Collection::new();
        collection.push(SpecObject::new(Identity::with_identifier("old"), None));
        for object in collection.iter_mut() {
            object.identity_mut().set_identifier("new");
        }

        assert!(collection.get("old").is_none());
        assert!(collection.get("new").is_some());
        collection.reindex();
        assert!(collection.get("new").is_some());
    }
}
