//! The serializer: writes a [`ReqIf`] graph as schema-shaped XML.

use std::{borrow::Cow, fmt::Display, io};

use chrono::{DateTime, FixedOffset, SecondsFormat};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event, attributes::Attribute},
    name::QName,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{escape_attribute, kind::ElementName};
use crate::{
    domain::{
        AttributeDefinition, AttributeValue, Config, DataKind, DatatypeDefinition, DatatypeKind,
        EnumValue, Identifiable, Identity, REQIF_NAMESPACE, RelationGroup, ReqIf, ReqIfContent,
        ReqIfHeader, SpecElementWithAttributes, SpecHierarchy, SpecObject, SpecRelation, SpecType,
        Specification, Value, XHTML_NAMESPACE,
    },
    error::{Error, Result, SerializationError},
};

fn write_error(error: impl Display) -> Error {
    Error::Io(io::Error::other(error.to_string()))
}

fn attribute<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escape_attribute(value).into_owned().into_bytes()),
    }
}

fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

fn format_real(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        format!("{value:?}")
    }
}

const fn format_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Write `document` to `out`.
///
/// Returns the writer once the document is complete.
pub(crate) fn write_document<W: io::Write>(
    document: &ReqIf,
    out: W,
    config: &Config,
    cancellation: &CancellationToken,
) -> Result<W> {
    let writer = if config.indent() == 0 {
        Writer::new(out)
    } else {
        Writer::new_with_indent(out, b' ', config.indent())
    };
    let mut writer = DocumentWriter {
        writer,
        content: &document.content,
        cancellation,
    };
    writer.document(document, config.write_declaration)?;
    Ok(writer.writer.into_inner())
}

struct DocumentWriter<'a, W: io::Write> {
    writer: Writer<W>,
    content: &'a ReqIfContent,
    cancellation: &'a CancellationToken,
}

impl<W: io::Write> DocumentWriter<'_, W> {
    fn checkpoint(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(write_error)
    }

    fn start(&mut self, tag: BytesStart<'_>) -> Result<()> {
        self.event(Event::Start(tag))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn open(&mut self, name: &str) -> Result<()> {
        self.start(BytesStart::new(name))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.open(name)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// `<wrapper><name>identifier</name></wrapper>`
    fn reference(&mut self, wrapper: &str, name: &str, identifier: &str) -> Result<()> {
        self.open(wrapper)?;
        self.text_element(name, identifier)?;
        self.end(wrapper)
    }

    fn document(&mut self, document: &ReqIf, declaration: bool) -> Result<()> {
        self.checkpoint()?;
        if declaration {
            self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        let mut root = BytesStart::new("REQ-IF");
        if document.attribute("xmlns").is_none() {
            root.push_attribute(attribute("xmlns", REQIF_NAMESPACE));
        }
        let declares_xhtml = document
            .attributes
            .iter()
            .any(|(key, value)| key.starts_with("xmlns:") && value == XHTML_NAMESPACE);
        if self.content.has_xhtml() && !declares_xhtml {
            root.push_attribute(attribute("xmlns:xhtml", XHTML_NAMESPACE));
        }
        for (key, value) in &document.attributes {
            root.push_attribute(attribute(key.as_str(), value.as_str()));
        }
        self.start(root)?;

        self.header(&document.header)?;
        self.core_content()?;
        if !document.tool_extensions.is_empty() {
            self.open("TOOL-EXTENSIONS")?;
            for extension in &document.tool_extensions {
                self.open("REQ-IF-TOOL-EXTENSION")?;
                self.event(Event::Text(BytesText::from_escaped(extension.markup.as_str())))?;
                self.end("REQ-IF-TOOL-EXTENSION")?;
            }
            self.end("TOOL-EXTENSIONS")?;
        }
        self.end("REQ-IF")
    }

    fn header(&mut self, header: &ReqIfHeader) -> Result<()> {
        if header.identifier.is_empty() {
            return Err(SerializationError {
                kind: "ReqIfHeader",
                identifier: String::new(),
                long_name: header.title.clone(),
                problem: "has an empty identifier".to_string(),
            }
            .into());
        }
        self.open("THE-HEADER")?;
        let mut tag = BytesStart::new("REQ-IF-HEADER");
        tag.push_attribute(attribute("IDENTIFIER", header.identifier.as_str()));
        self.start(tag)?;

        let creation_time = header.creation_time.as_ref().map(format_date);
        let fields = [
            ("COMMENT", header.comment.as_deref()),
            ("CREATION-TIME", creation_time.as_deref()),
            ("REPOSITORY-ID", header.repository_id.as_deref()),
            ("REQ-IF-TOOL-ID", header.req_if_tool_id.as_deref()),
            ("REQ-IF-VERSION", header.req_if_version.as_deref()),
            ("SOURCE-TOOL-ID", header.source_tool_id.as_deref()),
            ("TITLE", header.title.as_deref()),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                self.text_element(name, value)?;
            }
        }

        self.end("REQ-IF-HEADER")?;
        self.end("THE-HEADER")
    }

    fn core_content(&mut self) -> Result<()> {
        let content = self.content;
        debug!(
            datatypes = content.datatypes.len(),
            spec_types = content.spec_types.len(),
            spec_objects = content.spec_objects.len(),
            spec_relations = content.spec_relations.len(),
            specifications = content.specifications.len(),
            relation_groups = content.relation_groups.len(),
            "writing content"
        );
        self.open("CORE-CONTENT")?;
        self.open("REQ-IF-CONTENT")?;
        self.section("DATATYPES", content.datatypes.as_slice(), Self::datatype)?;
        self.section("SPEC-TYPES", content.spec_types.as_slice(), Self::spec_type)?;
        self.section("SPEC-OBJECTS", content.spec_objects.as_slice(), Self::spec_object)?;
        self.section(
            "SPEC-RELATIONS",
            content.spec_relations.as_slice(),
            Self::spec_relation,
        )?;
        self.section(
            "SPECIFICATIONS",
            content.specifications.as_slice(),
            Self::specification,
        )?;
        self.section(
            "SPEC-RELATION-GROUPS",
            content.relation_groups.as_slice(),
            Self::relation_group,
        )?;
        self.end("REQ-IF-CONTENT")?;
        self.end("CORE-CONTENT")
    }

    fn section<T>(
        &mut self,
        name: &str,
        items: &[T],
        write: fn(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        self.open(name)?;
        for item in items {
            self.checkpoint()?;
            write(self, item)?;
        }
        self.end(name)
    }

    /// A start tag carrying the identity attributes of `entity`.
    fn identity_tag<'t, T: Identifiable>(name: &'t str, entity: &T) -> Result<BytesStart<'t>> {
        let identity = entity.identity();
        if identity.identifier().is_empty() {
            return Err(SerializationError::missing_identifier(T::KIND, identity).into());
        }
        let mut tag = BytesStart::new(name);
        if let Some(description) = identity.description() {
            tag.push_attribute(attribute("DESC", description));
        }
        tag.push_attribute(attribute("IDENTIFIER", identity.identifier()));
        tag.push_attribute(attribute(
            "LAST-CHANGE",
            format_date(&identity.last_change()).as_str(),
        ));
        if let Some(long_name) = identity.long_name() {
            tag.push_attribute(attribute("LONG-NAME", long_name));
        }
        Ok(tag)
    }

    fn alternative_id(&mut self, identity: &Identity) -> Result<()> {
        let Some(alternative) = identity.alternative_id() else {
            return Ok(());
        };
        self.open("ALTERNATIVE-ID")?;
        let mut tag = BytesStart::new("ALTERNATIVE-ID");
        if let Some(identifier) = alternative.identifier() {
            tag.push_attribute(attribute("IDENTIFIER", identifier));
        }
        self.event(Event::Empty(tag))?;
        self.end("ALTERNATIVE-ID")
    }

    fn datatype(&mut self, datatype: &DatatypeDefinition) -> Result<()> {
        let name = datatype.element_name();
        let mut tag = Self::identity_tag(name, datatype)?;
        match &datatype.kind {
            DatatypeKind::Integer { min, max } => {
                tag.push_attribute(attribute("MAX", max.to_string().as_str()));
                tag.push_attribute(attribute("MIN", min.to_string().as_str()));
            }
            DatatypeKind::Real { accuracy, min, max } => {
                tag.push_attribute(attribute("ACCURACY", accuracy.to_string().as_str()));
                tag.push_attribute(attribute("MAX", format_real(*max).as_str()));
                tag.push_attribute(attribute("MIN", format_real(*min).as_str()));
            }
            DatatypeKind::String { max_length } => {
                tag.push_attribute(attribute("MAX-LENGTH", max_length.to_string().as_str()));
            }
            DatatypeKind::Boolean
            | DatatypeKind::Date
            | DatatypeKind::Xhtml
            | DatatypeKind::Enumeration { .. } => {}
        }
        self.start(tag)?;
        self.alternative_id(datatype.identity())?;
        if let DatatypeKind::Enumeration { values } = &datatype.kind {
            if !values.is_empty() {
                self.open("SPECIFIED-VALUES")?;
                for value in values {
                    self.enum_value(value)?;
                }
                self.end("SPECIFIED-VALUES")?;
            }
        }
        self.end(name)
    }

    fn enum_value(&mut self, value: &EnumValue) -> Result<()> {
        self.start(Self::identity_tag("ENUM-VALUE", value)?)?;
        self.alternative_id(value.identity())?;
        if let Some(properties) = value.properties() {
            self.open("PROPERTIES")?;
            let mut tag = BytesStart::new("EMBEDDED-VALUE");
            tag.push_attribute(attribute("KEY", properties.key.to_string().as_str()));
            tag.push_attribute(attribute("OTHER-CONTENT", properties.other_content.as_str()));
            self.event(Event::Empty(tag))?;
            self.end("PROPERTIES")?;
        }
        self.end("ENUM-VALUE")
    }

    fn spec_type(&mut self, spec_type: &SpecType) -> Result<()> {
        let name = spec_type.element_name();
        self.start(Self::identity_tag(name, spec_type)?)?;
        self.alternative_id(spec_type.identity())?;
        if !spec_type.attributes.is_empty() {
            self.open("SPEC-ATTRIBUTES")?;
            for definition in &spec_type.attributes {
                self.attribute_definition(definition)?;
            }
            self.end("SPEC-ATTRIBUTES")?;
        }
        self.end(name)
    }

    fn attribute_definition(&mut self, definition: &AttributeDefinition) -> Result<()> {
        let name = definition.element_name();
        let mut tag = Self::identity_tag(name, definition)?;
        if let Some(editable) = definition.is_editable {
            tag.push_attribute(attribute("IS-EDITABLE", format_bool(editable)));
        }
        if definition.data_kind() == DataKind::Enumeration {
            tag.push_attribute(attribute(
                "MULTI-VALUED",
                format_bool(definition.is_multi_valued()),
            ));
        }
        self.start(tag)?;
        self.alternative_id(definition.identity())?;
        if let Some(default) = definition.default_value() {
            self.open("DEFAULT-VALUE")?;
            self.attribute_value(default, AttributeDefinition::KIND, definition.identity())?;
            self.end("DEFAULT-VALUE")?;
        }
        match definition.datatype() {
            Some(datatype) => self.reference(
                "TYPE",
                definition.data_kind().datatype_ref_element(),
                datatype.identifier(),
            )?,
            None => warn!(
                "attribute definition '{}' has no datatype",
                definition.identifier()
            ),
        }
        self.end(name)
    }

    fn values(&mut self, values: &[AttributeValue], kind: &'static str, owner: &Identity) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        self.open("VALUES")?;
        for value in values {
            self.attribute_value(value, kind, owner)?;
        }
        self.end("VALUES")
    }

    fn attribute_value(
        &mut self,
        value: &AttributeValue,
        owner_kind: &'static str,
        owner: &Identity,
    ) -> Result<()> {
        let definition = value.definition().identifier();
        if definition.is_empty() {
            return Err(SerializationError::missing_reference(owner_kind, owner, "DEFINITION").into());
        }
        let name = value.element_name();
        let mut tag = BytesStart::new(name);
        let the_value = match &value.value {
            Value::Boolean(value) => Some(format_bool(*value).to_string()),
            Value::Date(value) => Some(format_date(value)),
            Value::Integer(value) => Some(value.to_string()),
            Value::Real(value) => Some(format_real(*value)),
            Value::String(value) => Some(value.clone()),
            Value::Enumeration(_) => None,
            Value::Xhtml(content) => {
                if content.is_simplified {
                    tag.push_attribute(attribute("IS-SIMPLIFIED", "true"));
                }
                None
            }
        };
        if let Some(the_value) = &the_value {
            tag.push_attribute(attribute("THE-VALUE", the_value.as_str()));
        }
        self.start(tag)?;
        self.reference(
            "DEFINITION",
            value.data_kind().attribute_definition_ref_element(),
            definition,
        )?;
        match &value.value {
            Value::Enumeration(selected) if !selected.is_empty() => {
                self.open("VALUES")?;
                for literal in selected {
                    self.text_element("ENUM-VALUE-REF", literal.identifier())?;
                }
                self.end("VALUES")?;
            }
            Value::Xhtml(content) => {
                if let Some(original) = &content.original_markup {
                    self.open("THE-ORIGINAL-VALUE")?;
                    self.event(Event::Text(BytesText::from_escaped(original.as_str())))?;
                    self.end("THE-ORIGINAL-VALUE")?;
                }
                self.open("THE-VALUE")?;
                self.event(Event::Text(BytesText::from_escaped(content.markup.as_str())))?;
                self.end("THE-VALUE")?;
            }
            _ => {}
        }
        self.end(name)
    }

    /// The mandatory `TYPE` of a spec element.
    fn element_type<E: SpecElementWithAttributes>(&mut self, element: &E) -> Result<()> {
        let spec_type = element.spec_type().ok_or_else(|| {
            SerializationError::missing_reference(E::KIND, element.identity(), "TYPE")
        })?;
        self.reference("TYPE", E::TYPE_KIND.ref_element(), spec_type.identifier())
    }

    fn element_tag<'t, E: SpecElementWithAttributes>(
        name: &'t str,
        element: &E,
    ) -> Result<BytesStart<'t>> {
        let mut tag = Self::identity_tag(name, element)?;
        if let Some(editable) = element.is_editable() {
            tag.push_attribute(attribute("IS-EDITABLE", format_bool(editable)));
        }
        Ok(tag)
    }

    fn spec_object(&mut self, object: &SpecObject) -> Result<()> {
        if object.spec_type().is_none() {
            return Err(
                SerializationError::missing_reference(SpecObject::KIND, object.identity(), "TYPE")
                    .into(),
            );
        }
        self.start(Self::element_tag("SPEC-OBJECT", object)?)?;
        self.alternative_id(object.identity())?;
        self.values(&object.values, SpecObject::KIND, object.identity())?;
        self.element_type(object)?;
        self.end("SPEC-OBJECT")
    }

    fn spec_relation(&mut self, relation: &SpecRelation) -> Result<()> {
        let missing = |field| {
            Error::from(SerializationError::missing_reference(
                SpecRelation::KIND,
                relation.identity(),
                field,
            ))
        };
        relation.spec_type().ok_or_else(|| missing("TYPE"))?;
        let source = relation.source.as_ref().ok_or_else(|| missing("SOURCE"))?;
        let target = relation.target.as_ref().ok_or_else(|| missing("TARGET"))?;

        self.start(Self::element_tag("SPEC-RELATION", relation)?)?;
        self.alternative_id(relation.identity())?;
        self.values(&relation.values, SpecRelation::KIND, relation.identity())?;
        self.reference("SOURCE", "SPEC-OBJECT-REF", source.identifier())?;
        self.reference("TARGET", "SPEC-OBJECT-REF", target.identifier())?;
        self.element_type(relation)?;
        self.end("SPEC-RELATION")
    }

    fn specification(&mut self, specification: &Specification) -> Result<()> {
        if specification.spec_type().is_none() {
            return Err(SerializationError::missing_reference(
                Specification::KIND,
                specification.identity(),
                "TYPE",
            )
            .into());
        }
        self.start(Self::element_tag("SPECIFICATION", specification)?)?;
        self.alternative_id(specification.identity())?;
        self.values(
            &specification.values,
            Specification::KIND,
            specification.identity(),
        )?;
        self.hierarchy_children(&specification.children)?;
        self.element_type(specification)?;
        self.end("SPECIFICATION")
    }

    fn hierarchy_children(&mut self, children: &[SpecHierarchy]) -> Result<()> {
        if children.is_empty() {
            return Ok(());
        }
        self.open("CHILDREN")?;
        for child in children {
            self.hierarchy(child)?;
        }
        self.end("CHILDREN")
    }

    fn hierarchy(&mut self, node: &SpecHierarchy) -> Result<()> {
        self.checkpoint()?;
        let object = node.object.as_ref().ok_or_else(|| {
            SerializationError::missing_reference(SpecHierarchy::KIND, node.identity(), "OBJECT")
        })?;
        let mut tag = Self::identity_tag("SPEC-HIERARCHY", node)?;
        if let Some(editable) = node.is_editable {
            tag.push_attribute(attribute("IS-EDITABLE", format_bool(editable)));
        }
        if let Some(internal) = node.is_table_internal {
            tag.push_attribute(attribute("IS-TABLE-INTERNAL", format_bool(internal)));
        }
        self.start(tag)?;
        self.alternative_id(node.identity())?;
        self.hierarchy_children(&node.children)?;

        let editable: Vec<(&str, DataKind)> = node
            .editable_attributes
            .iter()
            .filter_map(|reference| {
                let kind = self
                    .content
                    .attribute_definition(reference.identifier())
                    .map(AttributeDefinition::data_kind);
                if kind.is_none() {
                    warn!(
                        "skipping unknown editable attribute '{reference}' of '{}'",
                        node.identifier()
                    );
                }
                kind.map(|kind| (reference.identifier(), kind))
            })
            .collect();
        if !editable.is_empty() {
            self.open("EDITABLE-ATTS")?;
            for (identifier, kind) in editable {
                self.text_element(kind.attribute_definition_ref_element(), identifier)?;
            }
            self.end("EDITABLE-ATTS")?;
        }

        self.reference("OBJECT", "SPEC-OBJECT-REF", object.identifier())?;
        self.end("SPEC-HIERARCHY")
    }

    fn relation_group(&mut self, group: &RelationGroup) -> Result<()> {
        let missing = |field| {
            Error::from(SerializationError::missing_reference(
                RelationGroup::KIND,
                group.identity(),
                field,
            ))
        };
        group.spec_type().ok_or_else(|| missing("TYPE"))?;
        let source = group
            .source_specification
            .as_ref()
            .ok_or_else(|| missing("SOURCE-SPECIFICATION"))?;
        let target = group
            .target_specification
            .as_ref()
            .ok_or_else(|| missing("TARGET-SPECIFICATION"))?;

        if !group.values.is_empty() {
            warn!(
                values = group.values.len(),
                "relation group '{}' cannot carry attribute values; dropping them",
                group.identifier()
            );
        }
        self.start(Self::element_tag("RELATION-GROUP", group)?)?;
        self.alternative_id(group.identity())?;
        self.reference("SOURCE-SPECIFICATION", "SPECIFICATION-REF", source.identifier())?;
        if !group.relations.is_empty() {
            self.open("SPEC-RELATIONS")?;
            for relation in &group.relations {
                self.text_element("SPEC-RELATION-REF", relation.identifier())?;
            }
            self.end("SPEC-RELATIONS")?;
        }
        self.reference("TARGET-SPECIFICATION", "SPECIFICATION-REF", target.identifier())?;
        self.element_type(group)?;
        self.end("RELATION-GROUP")
    }
}
