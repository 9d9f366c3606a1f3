//! Elements that carry attribute values: spec objects, relations,
//! specifications and relation groups, plus the specification hierarchy.

use super::{
    attribute_value::AttributeValue,
    identifiable::{Identifiable, Identity, Ref},
    spec_type::{AttributeDefinition, SpecType, SpecTypeKind},
};

/// Behaviour shared by the four element kinds that carry attribute values.
pub trait SpecElementWithAttributes: Identifiable {
    /// The spec type kind an element of this kind must reference.
    const TYPE_KIND: SpecTypeKind;

    /// The attribute values, in document order.
    fn values(&self) -> &[AttributeValue];

    /// Mutable access to the attribute values.
    fn values_mut(&mut self) -> &mut Vec<AttributeValue>;

    /// The spec type of this element.
    fn spec_type(&self) -> Option<&Ref<SpecType>>;

    /// Set the spec type of this element.
    fn set_spec_type(&mut self, spec_type: Option<Ref<SpecType>>);

    /// Whether tools may edit this element.
    fn is_editable(&self) -> Option<bool>;

    /// The value bound to the given attribute definition, if present.
    fn value_of(&self, definition: &str) -> Option<&AttributeValue> {
        self.values()
            .iter()
            .find(|value| value.definition().identifier() == definition)
    }
}

/// Closed set of element kinds that carry attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecElementKind {
    /// [`SpecObject`]
    SpecObject,
    /// [`SpecRelation`]
    SpecRelation,
    /// [`Specification`]
    Specification,
    /// [`RelationGroup`]
    RelationGroup,
}

impl SpecElementKind {
    /// The spec type kind elements of this kind reference.
    #[must_use]
    pub const fn type_kind(self) -> SpecTypeKind {
        match self {
            Self::SpecObject => SpecTypeKind::SpecObjectType,
            Self::SpecRelation => SpecTypeKind::SpecRelationType,
            Self::Specification => SpecTypeKind::SpecificationType,
            Self::RelationGroup => SpecTypeKind::RelationGroupType,
        }
    }
}

macro_rules! spec_element {
    ($type:ident, $kind:literal, $type_kind:expr) => {
        impl Identifiable for $type {
            const KIND: &'static str = $kind;

            fn identity(&self) -> &Identity {
                &self.identity
            }

            fn identity_mut(&mut self) -> &mut Identity {
                &mut self.identity
            }
        }

        impl SpecElementWithAttributes for $type {
            const TYPE_KIND: SpecTypeKind = $type_kind;

            fn values(&self) -> &[AttributeValue] {
                &self.values
            }

            fn values_mut(&mut self) -> &mut Vec<AttributeValue> {
                &mut self.values
            }

            fn spec_type(&self) -> Option<&Ref<SpecType>> {
                self.spec_type.as_ref()
            }

            fn set_spec_type(&mut self, spec_type: Option<Ref<SpecType>>) {
                self.spec_type = spec_type;
            }

            fn is_editable(&self) -> Option<bool> {
                self.is_editable
            }
        }
    };
}

/// A requirement: an identifiable carrier of typed attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecObject {
    identity: Identity,
    /// Whether tools may edit this object.
    pub is_editable: Option<bool>,
    /// Attribute values, in document order.
    pub values: Vec<AttributeValue>,
    spec_type: Option<Ref<SpecType>>,
}

impl SpecObject {
    /// Create a spec object of the given type.
    #[must_use]
    pub const fn new(identity: Identity, spec_type: Option<Ref<SpecType>>) -> Self {
        Self {
            identity,
            is_editable: None,
            values: Vec::new(),
            spec_type,
        }
    }
}

spec_element!(SpecObject, "SpecObject", SpecTypeKind::SpecObjectType);

/// A typed, directed link between two spec objects.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRelation {
    identity: Identity,
    /// Whether tools may edit this relation.
    pub is_editable: Option<bool>,
    /// Attribute values, in document order.
    pub values: Vec<AttributeValue>,
    spec_type: Option<Ref<SpecType>>,
    /// The object the relation starts from.
    pub source: Option<Ref<SpecObject>>,
    /// The object the relation points to.
    pub target: Option<Ref<SpecObject>>,
}

impl SpecRelation {
    /// Create a relation of the given type between two objects.
    #[must_use]
    pub const fn new(
        identity: Identity,
        spec_type: Option<Ref<SpecType>>,
        source: Option<Ref<SpecObject>>,
        target: Option<Ref<SpecObject>>,
    ) -> Self {
        Self {
            identity,
            is_editable: None,
            values: Vec::new(),
            spec_type,
            source,
            target,
        }
    }
}

spec_element!(SpecRelation, "SpecRelation", SpecTypeKind::SpecRelationType);

/// The root of a hierarchical view over spec objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    identity: Identity,
    /// Whether tools may edit this specification.
    pub is_editable: Option<bool>,
    /// Attribute values, in document order.
    pub values: Vec<AttributeValue>,
    spec_type: Option<Ref<SpecType>>,
    /// Top level hierarchy nodes, in document order.
    pub children: Vec<SpecHierarchy>,
}

impl Specification {
    /// Create an empty specification of the given type.
    #[must_use]
    pub const fn new(identity: Identity, spec_type: Option<Ref<SpecType>>) -> Self {
        Self {
            identity,
            is_editable: None,
            values: Vec::new(),
            spec_type,
            children: Vec::new(),
        }
    }

    /// Depth-first, pre-order walk over every hierarchy node.
    ///
    /// Top level nodes have depth 0.
    pub fn walk(&self) -> impl Iterator<Item = (usize, &SpecHierarchy)> {
        let mut stack: Vec<(usize, &SpecHierarchy)> =
            self.children.iter().rev().map(|node| (0, node)).collect();
        std::iter::from_fn(move || {
            let (depth, node) = stack.pop()?;
            stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
            Some((depth, node))
        })
    }

    /// Find a hierarchy node anywhere in the tree.
    #[must_use]
    pub fn find_hierarchy(&self, identifier: &str) -> Option<&SpecHierarchy> {
        self.walk()
            .map(|(_, node)| node)
            .find(|node| node.identifier() == identifier)
    }

    /// The identifiers of the nodes from the root down to `identifier`
    /// (inclusive), or `None` if the node is not in this specification.
    #[must_use]
    pub fn path_to(&self, identifier: &str) -> Option<Vec<&str>> {
        fn search<'a>(
            nodes: &'a [SpecHierarchy],
            identifier: &str,
            path: &mut Vec<&'a str>,
        ) -> bool {
            for node in nodes {
                path.push(node.identifier());
                if node.identifier() == identifier || search(&node.children, identifier, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        search(&self.children, identifier, &mut path).then_some(path)
    }
}

spec_element!(
    Specification,
    "Specification",
    SpecTypeKind::SpecificationType
);

/// A named set of relations between a source and a target specification.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationGroup {
    identity: Identity,
    /// Whether tools may edit this group.
    pub is_editable: Option<bool>,
    /// Attribute values, in document order.
    pub values: Vec<AttributeValue>,
    spec_type: Option<Ref<SpecType>>,
    /// The specification the grouped relations start from.
    pub source_specification: Option<Ref<Specification>>,
    /// The specification the grouped relations point to.
    pub target_specification: Option<Ref<Specification>>,
    /// The grouped relations, in document order.
    pub relations: Vec<Ref<SpecRelation>>,
}

impl RelationGroup {
    /// Create an empty group between two specifications.
    #[must_use]
    pub const fn new(
        identity: Identity,
        spec_type: Option<Ref<SpecType>>,
        source_specification: Option<Ref<Specification>>,
        target_specification: Option<Ref<Specification>>,
    ) -> Self {
        Self {
            identity,
            is_editable: None,
            values: Vec::new(),
            spec_type,
            source_specification,
            target_specification,
            relations: Vec::new(),
        }
    }
}

spec_element!(
    RelationGroup,
    "RelationGroup",
    SpecTypeKind::RelationGroupType
);

/// A node of a specification's tree, pointing at one spec object.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecHierarchy {
    identity: Identity,
    /// Whether tools may edit this node.
    pub is_editable: Option<bool>,
    /// Whether the node is an internal part of a table.
    pub is_table_internal: Option<bool>,
    /// The spec object shown at this position.
    pub object: Option<Ref<SpecObject>>,
    /// Attributes that may be edited at this position.
    pub editable_attributes: Vec<Ref<AttributeDefinition>>,
    /// Child nodes, in document order.
    pub children: Vec<SpecHierarchy>,
}

impl SpecHierarchy {
    /// Create a leaf node showing `object`.
    #[must_use]
    pub const fn new(identity: Identity, object: Option<Ref<SpecObject>>) -> Self {
        Self {
            identity,
            is_editable: None,
            is_table_internal: None,
            object,
            editable_attributes: Vec::new(),
            children: Vec::new(),
        }
    }
}

impl Identifiable for SpecHierarchy {
    const KIND: &'static str = "SpecHierarchy";

    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}
