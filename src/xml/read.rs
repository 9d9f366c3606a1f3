//! Entity readers: turn captured element subtrees into graph entities,
//! resolving references against the content aggregate as they go.

use std::{fmt::Display, num::IntErrorKind};

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use tracing::warn;

use super::{kind, tree::Element};
use crate::{
    domain::{
        AttributeDefinition, AttributeDefinitionKind, AttributeValue, DataKind,
        DatatypeDefinition, DatatypeKind, EnumValue, Identifiable, Identity, Ref, RelationGroup, ReqIfContent,
        ReqIfHeader, SpecHierarchy, SpecObject, SpecRelation, SpecType, SpecTypeKind,
        Specification, Value, XhtmlContent,
    },
    error::{Error, FormatError, Result},
};

const THE_VALUE: &str = "THE-VALUE";

fn format_error(element: &Element, attribute: &str, value: &str, reason: impl Display) -> Error {
    FormatError {
        element: element.name.clone(),
        attribute: attribute.to_string(),
        value: value.to_string(),
        position: element.location.offset,
        reason: reason.to_string(),
    }
    .into()
}

/// Warn about children this reader does not understand.
fn check_children(element: &Element, known: &[&str]) {
    for child in element.elements() {
        if !known.contains(&child.local_name()) {
            warn!(
                element = %child.name,
                line = child.location.line,
                column = child.location.column,
                "skipping unknown element inside <{}>",
                element.name
            );
        }
    }
}

fn parse_bool(element: &Element, name: &str) -> Result<Option<bool>> {
    element
        .attribute(name)
        .map(|raw| match raw.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(format_error(element, name, raw, "expected a boolean")),
        })
        .transpose()
}

/// Parse an `xsd:dateTime`. Values without an offset are taken as UTC.
pub(crate) fn parse_date(element: &Element, name: &str, raw: &str) -> Result<DateTime<FixedOffset>> {
    let text = raw.trim();
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc().fixed_offset())
        })
        .map_err(|e| format_error(element, name, raw, e))
}

/// Parse a bounded integer attribute, clamping out-of-range values.
fn parse_clamped(element: &Element, name: &str, min: i64, max: i64) -> Result<Option<i64>> {
    let Some(raw) = element.attribute(name) else {
        return Ok(None);
    };
    let clamp = |value: i64| -> Result<Option<i64>> {
        warn!(
            element = %element.name,
            line = element.location.line,
            column = element.location.column,
            "{name}=\"{raw}\" is out of range, clamped to {value}"
        );
        Ok(Some(value))
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value < min => clamp(min),
        Ok(value) if value > max => clamp(max),
        Ok(value) => Ok(Some(value)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => clamp(max),
            IntErrorKind::NegOverflow => clamp(min),
            _ => Err(format_error(element, name, raw, e)),
        },
    }
}

fn parse_clamped_i32(element: &Element, name: &str) -> Result<Option<i32>> {
    Ok(
        parse_clamped(element, name, i32::MIN.into(), i32::MAX.into())?.map(|value| {
            i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
        }),
    )
}

/// Parse a real bound, clamping infinities to the largest finite values.
fn parse_clamped_real(element: &Element, name: &str) -> Result<Option<f64>> {
    let Some(raw) = element.attribute(name) else {
        return Ok(None);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format_error(element, name, raw, e))?;
    if value.is_infinite() {
        let clamped = if value > 0.0 { f64::MAX } else { f64::MIN };
        warn!(
            element = %element.name,
            line = element.location.line,
            column = element.location.column,
            "{name}=\"{raw}\" is out of range, clamped to {clamped}"
        );
        return Ok(Some(clamped));
    }
    Ok(Some(value))
}

/// The identifier inside `<wrapper><SOMETHING-REF>id</SOMETHING-REF></wrapper>`.
fn reference(element: &Element, wrapper: &str) -> Option<String> {
    let text = element.child(wrapper)?.elements().next()?.text();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Every identifier inside `<wrapper><X-REF>a</X-REF><X-REF>b</X-REF></wrapper>`.
fn references(element: &Element, wrapper: &str) -> Vec<String> {
    element
        .child(wrapper)
        .map(|wrapper| {
            wrapper
                .elements()
                .map(|reference| reference.text().trim().to_string())
                .filter(|identifier| !identifier.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn read_identity(element: &Element) -> Result<Identity> {
    let identifier = element.attribute("IDENTIFIER").unwrap_or_default();
    let mut identity = Identity::with_identifier(identifier);
    identity.set_long_name(element.attribute("LONG-NAME").map(ToString::to_string));
    identity.set_description(element.attribute("DESC").map(ToString::to_string));

    let last_change = if let Some(raw) = element.attribute("LAST-CHANGE") {
        parse_date(element, "LAST-CHANGE", raw)?
    } else {
        warn!(
            element = %element.name,
            line = element.location.line,
            column = element.location.column,
            "'{identifier}' has no LAST-CHANGE"
        );
        DateTime::<Utc>::UNIX_EPOCH.fixed_offset()
    };
    identity.set_last_change(last_change);

    if let Some(alternative) = element.child("ALTERNATIVE-ID") {
        let external = alternative
            .child("ALTERNATIVE-ID")
            .and_then(|inner| inner.attribute("IDENTIFIER"))
            .map(ToString::to_string);
        identity.set_alternative_id(external);
    }
    Ok(identity)
}

/// Read `REQ-IF-HEADER`.
pub(crate) fn read_header(element: &Element) -> Result<ReqIfHeader> {
    check_children(
        element,
        &[
            "COMMENT",
            "CREATION-TIME",
            "REPOSITORY-ID",
            "REQ-IF-TOOL-ID",
            "REQ-IF-VERSION",
            "SOURCE-TOOL-ID",
            "TITLE",
        ],
    );
    let text = |name: &str| element.child(name).map(Element::text);
    let creation_time = element
        .child("CREATION-TIME")
        .map(|child| parse_date(child, "CREATION-TIME", &child.text()))
        .transpose()?;

    Ok(ReqIfHeader {
        identifier: element.attribute("IDENTIFIER").unwrap_or_default().to_string(),
        comment: text("COMMENT"),
        creation_time,
        repository_id: text("REPOSITORY-ID"),
        req_if_tool_id: text("REQ-IF-TOOL-ID"),
        req_if_version: text("REQ-IF-VERSION"),
        source_tool_id: text("SOURCE-TOOL-ID"),
        title: text("TITLE"),
    })
}

/// Read a `DATATYPE-DEFINITION-*` element into `content`.
pub(crate) fn read_datatype(element: &Element, content: &mut ReqIfContent) -> Result<()> {
    let mut datatype = kind::create_datatype(element.local_name(), read_identity(element)?)?;
    match &mut datatype.kind {
        DatatypeKind::Integer { min, max } => {
            if let Some(value) = parse_clamped(element, "MIN", i64::MIN, i64::MAX)? {
                *min = value;
            }
            if let Some(value) = parse_clamped(element, "MAX", i64::MIN, i64::MAX)? {
                *max = value;
            }
        }
        DatatypeKind::Real { accuracy, min, max } => {
            if let Some(value) = parse_clamped_i32(element, "ACCURACY")? {
                *accuracy = value;
            }
            if let Some(value) = parse_clamped_real(element, "MIN")? {
                *min = value;
            }
            if let Some(value) = parse_clamped_real(element, "MAX")? {
                *max = value;
            }
        }
        DatatypeKind::String { max_length } => {
            if let Some(value) = parse_clamped_i32(element, "MAX-LENGTH")? {
                *max_length = value;
            }
        }
        DatatypeKind::Enumeration { values } => {
            if let Some(specified) = element.child("SPECIFIED-VALUES") {
                check_children(specified, &["ENUM-VALUE"]);
                for literal in specified
                    .elements()
                    .filter(|child| child.local_name() == "ENUM-VALUE")
                {
                    values.push(read_enum_value(literal)?);
                }
            }
        }
        DatatypeKind::Boolean | DatatypeKind::Date | DatatypeKind::Xhtml => {}
    }
    check_children(element, &["ALTERNATIVE-ID", "SPECIFIED-VALUES"]);
    content.datatypes.push(datatype);
    Ok(())
}

fn read_enum_value(element: &Element) -> Result<EnumValue> {
    check_children(element, &["ALTERNATIVE-ID", "PROPERTIES"]);
    let mut value = EnumValue::new(read_identity(element)?);
    if let Some(embedded) = element
        .child("PROPERTIES")
        .and_then(|properties| properties.child("EMBEDDED-VALUE"))
    {
        let key = parse_clamped_i32(embedded, "KEY")?.unwrap_or_default();
        let other_content = embedded.attribute("OTHER-CONTENT").unwrap_or_default();
        value.set_properties(key, other_content);
    }
    Ok(value)
}

/// Read a `*-TYPE` element into `content`.
pub(crate) fn read_spec_type(element: &Element, content: &mut ReqIfContent) -> Result<()> {
    check_children(element, &["ALTERNATIVE-ID", "SPEC-ATTRIBUTES"]);
    let mut spec_type = kind::create_spec_type(element.local_name(), read_identity(element)?)?;
    if let Some(attributes) = element.child("SPEC-ATTRIBUTES") {
        for child in attributes.elements() {
            let Some(kind) = kind::scan_attribute_definition(child.local_name()) else {
                continue;
            };
            let definition = read_attribute_definition(child, kind, content)?;
            spec_type.attributes.push(definition);
        }
    }
    content.spec_types.push(spec_type);
    Ok(())
}

fn read_attribute_definition(
    element: &Element,
    kind: DataKind,
    content: &mut ReqIfContent,
) -> Result<AttributeDefinition> {
    check_children(element, &["ALTERNATIVE-ID", "TYPE", "DEFAULT-VALUE"]);
    let mut definition = AttributeDefinition::new(
        read_identity(element)?,
        AttributeDefinitionKind::from_data_kind(kind),
    );
    definition.is_editable = parse_bool(element, "IS-EDITABLE")?;
    if let Some(multi_valued) = parse_bool(element, "MULTI-VALUED")? {
        definition.set_multi_valued(multi_valued);
    }
    if let Some(datatype) = reference(element, "TYPE") {
        definition.set_datatype(Some(content.resolve_datatype(&datatype, kind)));
    }

    // The definition under construction is the scope for its default value.
    let default = element
        .child("DEFAULT-VALUE")
        .and_then(|wrapper| wrapper.elements().next());
    if let Some(default) = default {
        let value_kind = kind::attribute_value_kind(default.local_name())?;
        if value_kind != kind {
            return Err(format_error(
                element,
                "DEFAULT-VALUE",
                default.local_name(),
                format!("expected {}", kind.attribute_value_element()),
            ));
        }
        let owner = Ref::to(&definition);
        if let Some(named) = reference(default, "DEFINITION") {
            if named != owner.identifier() {
                warn!(
                    line = default.location.line,
                    column = default.location.column,
                    "default value of '{owner}' names definition '{named}', binding it to '{owner}'"
                );
            }
        }
        let value = read_value(default, kind, definition.datatype(), content)?;
        definition
            .set_default_value(Some(AttributeValue::new(owner, value)))
            .map_err(|e| format_error(element, "DEFAULT-VALUE", default.local_name(), e))?;
    }
    Ok(definition)
}

fn read_value(
    element: &Element,
    kind: DataKind,
    datatype: Option<&Ref<DatatypeDefinition>>,
    content: &ReqIfContent,
) -> Result<Value> {
    let raw = element.attribute(THE_VALUE);
    let value = match kind {
        DataKind::Boolean => Value::Boolean(parse_bool(element, THE_VALUE)?.unwrap_or_default()),
        DataKind::Date => match raw {
            Some(raw) => Value::Date(parse_date(element, THE_VALUE, raw)?),
            None => Value::empty(kind),
        },
        DataKind::Integer => match raw {
            Some(raw) => Value::Integer(
                raw.trim()
                    .parse()
                    .map_err(|e| format_error(element, THE_VALUE, raw, e))?,
            ),
            None => Value::empty(kind),
        },
        DataKind::Real => match raw {
            Some(raw) => Value::Real(
                raw.trim()
                    .parse()
                    .map_err(|e| format_error(element, THE_VALUE, raw, e))?,
            ),
            None => Value::empty(kind),
        },
        DataKind::String => Value::String(raw.unwrap_or_default().to_string()),
        DataKind::Enumeration => {
            let mut selected = Vec::new();
            for identifier in references(element, "VALUES") {
                match content.lookup_enum_value(&identifier, datatype) {
                    Some(value) => selected.push(value),
                    None => warn!(
                        line = element.location.line,
                        column = element.location.column,
                        "dropping reference to unknown enum value '{identifier}'"
                    ),
                }
            }
            Value::Enumeration(selected)
        }
        DataKind::Xhtml => Value::Xhtml(XhtmlContent {
            markup: element
                .child(THE_VALUE)
                .map(Element::inner_xml)
                .unwrap_or_default(),
            original_markup: element.child("THE-ORIGINAL-VALUE").map(Element::inner_xml),
            is_simplified: parse_bool(element, "IS-SIMPLIFIED")?.unwrap_or_default(),
        }),
    };
    Ok(value)
}

/// Read the `VALUES` of a spec element whose type is `spec_type`.
fn read_values(
    element: &Element,
    spec_type: Option<&Ref<SpecType>>,
    content: &mut ReqIfContent,
) -> Result<Vec<AttributeValue>> {
    let Some(values) = element.child("VALUES") else {
        return Ok(Vec::new());
    };
    let owner = element.attribute("IDENTIFIER").unwrap_or_default();
    let mut result = Vec::new();
    for value in values.elements() {
        let name = value.local_name();
        if !name.starts_with("ATTRIBUTE-VALUE-") {
            warn!(
                element = %value.name,
                line = value.location.line,
                column = value.location.column,
                "skipping unknown element inside <VALUES>"
            );
            continue;
        }
        let kind = kind::attribute_value_kind(name)?;
        let Some(identifier) = reference(value, "DEFINITION") else {
            warn!(
                line = value.location.line,
                column = value.location.column,
                "dropping <{name}> of '{owner}' without a DEFINITION"
            );
            continue;
        };
        let Some(definition) = content.resolve_attribute_definition(&identifier, kind, spec_type)
        else {
            warn!(
                line = value.location.line,
                column = value.location.column,
                "dropping <{name}> of '{owner}': definition '{identifier}' is unknown and '{owner}' has no type"
            );
            continue;
        };
        let datatype = content
            .typed_attribute_definition(&identifier, kind)
            .and_then(|definition| definition.datatype().cloned());
        let payload = read_value(value, kind, datatype.as_ref(), content)?;
        result.push(AttributeValue::new(definition, payload));
    }
    Ok(result)
}

fn read_spec_type_ref(
    element: &Element,
    kind: SpecTypeKind,
    content: &mut ReqIfContent,
) -> Option<Ref<SpecType>> {
    reference(element, "TYPE").map(|identifier| content.resolve_spec_type(&identifier, kind))
}

/// Read a `SPEC-OBJECT` element into `content`.
pub(crate) fn read_spec_object(element: &Element, content: &mut ReqIfContent) -> Result<()> {
    check_children(element, &["ALTERNATIVE-ID", "VALUES", "TYPE"]);
    let identity = read_identity(element)?;
    let spec_type = read_spec_type_ref(element, SpecTypeKind::SpecObjectType, content);
    let values = read_values(element, spec_type.as_ref(), content)?;

    let mut object = SpecObject::new(identity, spec_type);
    object.is_editable = parse_bool(element, "IS-EDITABLE")?;
    object.values = values;
    content.spec_objects.push(object);
    Ok(())
}

/// Read a `SPEC-RELATION` element into `content`.
pub(crate) fn read_spec_relation(element: &Element, content: &mut ReqIfContent) -> Result<()> {
    check_children(element, &["ALTERNATIVE-ID", "VALUES", "SOURCE", "TARGET", "TYPE"]);
    let identity = read_identity(element)?;
    let spec_type = read_spec_type_ref(element, SpecTypeKind::SpecRelationType, content);
    let source = reference(element, "SOURCE").map(|id| content.resolve_spec_object(&id));
    let target = reference(element, "TARGET").map(|id| content.resolve_spec_object(&id));
    let values = read_values(element, spec_type.as_ref(), content)?;

    let mut relation = SpecRelation::new(identity, spec_type, source, target);
    relation.is_editable = parse_bool(element, "IS-EDITABLE")?;
    relation.values = values;
    content.spec_relations.push(relation);
    Ok(())
}

/// Read a `SPECIFICATION` element into `content`.
pub(crate) fn read_specification(element: &Element, content: &mut ReqIfContent) -> Result<()> {
    check_children(element, &["ALTERNATIVE-ID", "VALUES", "CHILDREN", "TYPE"]);
    let identity = read_identity(element)?;
    let spec_type = read_spec_type_ref(element, SpecTypeKind::SpecificationType, content);
    let values = read_values(element, spec_type.as_ref(), content)?;
    let children = read_children(element, content)?;

    let mut specification = Specification::new(identity, spec_type);
    specification.is_editable = parse_bool(element, "IS-EDITABLE")?;
    specification.values = values;
    specification.children = children;
    content.specifications.push(specification);
    Ok(())
}

fn read_children(element: &Element, content: &mut ReqIfContent) -> Result<Vec<SpecHierarchy>> {
    let mut nodes = Vec::new();
    if let Some(children) = element.child("CHILDREN") {
        check_children(children, &["SPEC-HIERARCHY"]);
        for child in children
            .elements()
            .filter(|child| child.local_name() == "SPEC-HIERARCHY")
        {
            nodes.push(read_hierarchy(child, content)?);
        }
    }
    Ok(nodes)
}

fn read_hierarchy(element: &Element, content: &mut ReqIfContent) -> Result<SpecHierarchy> {
    check_children(
        element,
        &["ALTERNATIVE-ID", "CHILDREN", "EDITABLE-ATTS", "OBJECT"],
    );
    let identity = read_identity(element)?;
    let object = reference(element, "OBJECT").map(|id| content.resolve_spec_object(&id));

    let mut node = SpecHierarchy::new(identity, object);
    node.is_editable = parse_bool(element, "IS-EDITABLE")?;
    node.is_table_internal = parse_bool(element, "IS-TABLE-INTERNAL")?;
    for identifier in references(element, "EDITABLE-ATTS") {
        match content.lookup_attribute_definition(&identifier) {
            Some(definition) => node.editable_attributes.push(definition),
            None => warn!(
                line = element.location.line,
                column = element.location.column,
                "dropping unknown editable attribute '{identifier}' of '{}'",
                node.identity().identifier()
            ),
        }
    }
    node.children = read_children(element, content)?;
    Ok(node)
}

/// Read a `RELATION-GROUP` element into `content`.
pub(crate) fn read_relation_group(element: &Element, content: &mut ReqIfContent) -> Result<()> {
    check_children(
        element,
        &[
            "ALTERNATIVE-ID",
            "VALUES",
            "SOURCE-SPECIFICATION",
            "SPEC-RELATIONS",
            "TARGET-SPECIFICATION",
            "TYPE",
        ],
    );
    let identity = read_identity(element)?;
    let spec_type = read_spec_type_ref(element, SpecTypeKind::RelationGroupType, content);
    let source = reference(element, "SOURCE-SPECIFICATION")
        .map(|id| content.resolve_specification(&id));
    let target = reference(element, "TARGET-SPECIFICATION")
        .map(|id| content.resolve_specification(&id));
    let relations: Vec<_> = references(element, "SPEC-RELATIONS")
        .iter()
        .map(|id| content.resolve_spec_relation(id))
        .collect();
    let values = read_values(element, spec_type.as_ref(), content)?;

    let mut group = RelationGroup::new(identity, spec_type, source, target);
    group.is_editable = parse_bool(element, "IS-EDITABLE")?;
    group.relations = relations;
    group.values = values;
    content.relation_groups.push(group);
    Ok(())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::{
        domain::SpecElementWithAttributes,
        xml::{
            Location,
            tree::{Node, StartTag, Token, TreeBuilder},
        },
    };

    fn element(xml: &str) -> Element {
        let mut reader = quick_xml::Reader::from_str(xml);
        let mut builder: Option<TreeBuilder> = None;
        loop {
            let event = reader.read_event().unwrap();
            let Some(token) = Token::from_event(&event, Location::START).unwrap() else {
                continue;
            };
            match (builder.as_mut(), token) {
                (Some(builder), token) => {
                    if let Some(element) = builder.feed(token) {
                        return element;
                    }
                }
                (None, Token::Start(tag)) => builder = Some(TreeBuilder::new(tag)),
                (None, Token::Empty(tag)) => return tag.into(),
                (None, _) => {}
            }
        }
    }

    fn bare(name: &str, attributes: &[(&str, &str)]) -> Element {
        StartTag {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            location: Location {
                offset: 3,
                line: 1,
                column: 4,
            },
        }
        .into()
    }

    #[test_case("2017-03-13T10:15:09.616+02:00", 2 ; "with offset")]
    #[test_case("2017-03-13T10:15:09Z", 0 ; "utc")]
    #[test_case("2017-03-13T10:15:09", 0 ; "without offset")]
    fn dates_parse(raw: &str, offset_hours: i32) {
        let element = bare("X", &[]);
        let date = parse_date(&element, "LAST-CHANGE", raw).unwrap();
        assert_eq!(date.offset().local_minus_utc(), offset_hours * 3600);
    }

    #[test]
    fn bad_date_is_format_error() {
        let element = bare("SPEC-OBJECT", &[]);
        let error = parse_date(&element, "LAST-CHANGE", "yesterday").unwrap_err();
        let Error::Format(error) = error else {
            panic!("expected a format error");
        };
        assert_eq!(error.attribute, "LAST-CHANGE");
        assert_eq!(error.position, 3);
    }

    #[test]
    fn integer_overflow_is_clamped() {
        let element = bare(
            "DATATYPE-DEFINITION-INTEGER",
            &[("MIN", "-99999999999999999999"), ("MAX", "99999999999999999999")],
        );
        assert_eq!(
            parse_clamped(&element, "MIN", i64::MIN, i64::MAX).unwrap(),
            Some(i64::MIN)
        );
        assert_eq!(
            parse_clamped(&element, "MAX", i64::MIN, i64::MAX).unwrap(),
            Some(i64::MAX)
        );
    }

    #[test]
    fn i32_fields_are_clamped() {
        let element = bare("DATATYPE-DEFINITION-STRING", &[("MAX-LENGTH", "4294967296")]);
        assert_eq!(
            parse_clamped_i32(&element, "MAX-LENGTH").unwrap(),
            Some(i32::MAX)
        );
    }

    #[test]
    fn non_numeric_bound_is_fatal() {
        let element = bare("DATATYPE-DEFINITION-INTEGER", &[("MAX", "ten")]);
        assert!(matches!(
            parse_clamped(&element, "MAX", i64::MIN, i64::MAX),
            Err(Error::Format(_))
        ));
        let element = bare("DATATYPE-DEFINITION-REAL", &[("MIN", "low")]);
        assert!(parse_clamped_real(&element, "MIN").is_err());
    }

    #[test]
    fn real_infinity_is_clamped() {
        let element = bare("DATATYPE-DEFINITION-REAL", &[("MAX", "1e400")]);
        assert_eq!(parse_clamped_real(&element, "MAX").unwrap(), Some(f64::MAX));
    }

    #[test]
    fn identity_with_alternative_id() {
        let element = element(
            r#"<SPEC-OBJECT IDENTIFIER="so-1" LONG-NAME="Brake" DESC="d" LAST-CHANGE="2020-01-01T00:00:00Z"><ALTERNATIVE-ID><ALTERNATIVE-ID IDENTIFIER="DOORS-7"/></ALTERNATIVE-ID></SPEC-OBJECT>"#,
        );
        let identity = read_identity(&element).unwrap();

        assert_eq!(identity.identifier(), "so-1");
        assert_eq!(identity.long_name(), Some("Brake"));
        assert_eq!(identity.description(), Some("d"));
        let alternative = identity.alternative_id().unwrap();
        assert_eq!(alternative.identifier(), Some("DOORS-7"));
        assert_eq!(alternative.owner(), "so-1");
    }

    #[test]
    fn enum_default_binds_to_owner() {
        let mut content = ReqIfContent::default();
        let datatype = element(
            r#"<DATATYPE-DEFINITION-ENUMERATION IDENTIFIER="colours" LAST-CHANGE="2020-01-01T00:00:00Z">
                <SPECIFIED-VALUES>
                    <ENUM-VALUE IDENTIFIER="red" LAST-CHANGE="2020-01-01T00:00:00Z"><PROPERTIES><EMBEDDED-VALUE KEY="0" OTHER-CONTENT="FF0000"/></PROPERTIES></ENUM-VALUE>
                    <ENUM-VALUE IDENTIFIER="green" LAST-CHANGE="2020-01-01T00:00:00Z"><PROPERTIES><EMBEDDED-VALUE KEY="1" OTHER-CONTENT="00FF00"/></PROPERTIES></ENUM-VALUE>
                </SPECIFIED-VALUES>
            </DATATYPE-DEFINITION-ENUMERATION>"#,
        );
        read_datatype(&datatype, &mut content).unwrap();

        let spec_type = element(
            r#"<SPEC-OBJECT-TYPE IDENTIFIER="req" LAST-CHANGE="2020-01-01T00:00:00Z">
                <SPEC-ATTRIBUTES>
                    <ATTRIBUTE-DEFINITION-ENUMERATION IDENTIFIER="colour" MULTI-VALUED="false" LAST-CHANGE="2020-01-01T00:00:00Z">
                        <DEFAULT-VALUE>
                            <ATTRIBUTE-VALUE-ENUMERATION>
                                <DEFINITION><ATTRIBUTE-DEFINITION-ENUMERATION-REF>colour</ATTRIBUTE-DEFINITION-ENUMERATION-REF></DEFINITION>
                                <VALUES><ENUM-VALUE-REF>green</ENUM-VALUE-REF></VALUES>
                            </ATTRIBUTE-VALUE-ENUMERATION>
                        </DEFAULT-VALUE>
                        <TYPE><DATATYPE-DEFINITION-ENUMERATION-REF>colours</DATATYPE-DEFINITION-ENUMERATION-REF></TYPE>
                    </ATTRIBUTE-DEFINITION-ENUMERATION>
                    <ATTRIBUTE-DEFINITION-COMPLEX IDENTIFIER="ignored"/>
                </SPEC-ATTRIBUTES>
            </SPEC-OBJECT-TYPE>"#,
        );
        read_spec_type(&spec_type, &mut content).unwrap();

        let spec_type = content.spec_type("req").unwrap();
        assert_eq!(spec_type.attributes.len(), 1);
        let definition = &spec_type.attributes[0];
        let default = definition.default_value().unwrap();
        assert!(default.definition().refers_to(definition));
        let selected = default.value.as_enum_values().unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].identifier(), "green");
        assert_eq!(content.datatypes.len(), 1);
    }

    #[test]
    fn values_resolve_against_type() {
        let mut content = ReqIfContent::default();
        let object = element(
            r#"<SPEC-OBJECT IDENTIFIER="so" LAST-CHANGE="2020-01-01T00:00:00Z">
                <VALUES>
                    <ATTRIBUTE-VALUE-STRING THE-VALUE="hello"><DEFINITION><ATTRIBUTE-DEFINITION-STRING-REF>text</ATTRIBUTE-DEFINITION-STRING-REF></DEFINITION></ATTRIBUTE-VALUE-STRING>
                    <ATTRIBUTE-VALUE-XHTML><DEFINITION><ATTRIBUTE-DEFINITION-XHTML-REF>body</ATTRIBUTE-DEFINITION-XHTML-REF></DEFINITION><THE-VALUE><xhtml:p>Hi</xhtml:p></THE-VALUE></ATTRIBUTE-VALUE-XHTML>
                </VALUES>
                <TYPE><SPEC-OBJECT-TYPE-REF>req</SPEC-OBJECT-TYPE-REF></TYPE>
            </SPEC-OBJECT>"#,
        );
        read_spec_object(&object, &mut content).unwrap();

        let object = content.spec_object("so").unwrap();
        assert_eq!(object.values.len(), 2);
        assert_eq!(object.values[0].value.as_str(), Some("hello"));
        assert_eq!(
            object.values[1].value.as_xhtml().unwrap().markup,
            "<xhtml:p>Hi</xhtml:p>"
        );
        // Type and both definitions were fabricated as placeholders.
        let spec_type = content.spec_type_of(object).unwrap();
        assert_eq!(spec_type.attributes.len(), 2);
    }

    #[test]
    fn untyped_value_is_dropped() {
        let mut content = ReqIfContent::default();
        let object = element(
            r#"<SPEC-OBJECT IDENTIFIER="so" LAST-CHANGE="2020-01-01T00:00:00Z"><VALUES><ATTRIBUTE-VALUE-INTEGER THE-VALUE="3"><DEFINITION><ATTRIBUTE-DEFINITION-INTEGER-REF>n</ATTRIBUTE-DEFINITION-INTEGER-REF></DEFINITION></ATTRIBUTE-VALUE-INTEGER></VALUES></SPEC-OBJECT>"#,
        );
        read_spec_object(&object, &mut content).unwrap();

        let object = content.spec_object("so").unwrap();
        assert!(object.values.is_empty());
        assert!(object.spec_type().is_none());
    }

    #[test]
    fn unknown_attribute_value_kind_is_fatal() {
        let mut content = ReqIfContent::default();
        let object = element(
            r#"<SPEC-OBJECT IDENTIFIER="so" LAST-CHANGE="2020-01-01T00:00:00Z"><VALUES><ATTRIBUTE-VALUE-COMPLEX/></VALUES></SPEC-OBJECT>"#,
        );
        assert!(matches!(
            read_spec_object(&object, &mut content),
            Err(Error::UnsupportedKind { .. })
        ));
    }

    #[test]
    fn hierarchy_is_read_recursively() {
        let mut content = ReqIfContent::default();
        let specification = element(
            r#"<SPECIFICATION IDENTIFIER="spec" LAST-CHANGE="2020-01-01T00:00:00Z">
                <CHILDREN>
                    <SPEC-HIERARCHY IDENTIFIER="h1" LAST-CHANGE="2020-01-01T00:00:00Z" IS-TABLE-INTERNAL="false">
                        <CHILDREN>
                            <SPEC-HIERARCHY IDENTIFIER="h1.1" LAST-CHANGE="2020-01-01T00:00:00Z">
                                <EDITABLE-ATTS><ATTRIBUTE-DEFINITION-STRING-REF>nowhere</ATTRIBUTE-DEFINITION-STRING-REF></EDITABLE-ATTS>
                                <OBJECT><SPEC-OBJECT-REF>o2</SPEC-OBJECT-REF></OBJECT>
                            </SPEC-HIERARCHY>
                        </CHILDREN>
                        <OBJECT><SPEC-OBJECT-REF>o1</SPEC-OBJECT-REF></OBJECT>
                    </SPEC-HIERARCHY>
                </CHILDREN>
                <TYPE><SPECIFICATION-TYPE-REF>spec-type</SPECIFICATION-TYPE-REF></TYPE>
            </SPECIFICATION>"#,
        );
        read_specification(&specification, &mut content).unwrap();

        let specification = content.specification("spec").unwrap();
        let nested = specification.find_hierarchy("h1.1").unwrap();
        assert_eq!(nested.object.as_ref().unwrap().identifier(), "o2");
        assert!(nested.editable_attributes.is_empty());
        assert_eq!(specification.children[0].is_table_internal, Some(false));
        assert_eq!(content.spec_objects.len(), 2);
    }

    #[test]
    fn header_fields() {
        let header = element(
            r#"<REQ-IF-HEADER IDENTIFIER="hdr"><COMMENT>c</COMMENT><CREATION-TIME>2020-05-01T12:00:00+01:00</CREATION-TIME><TITLE>T</TITLE></REQ-IF-HEADER>"#,
        );
        let header = read_header(&header).unwrap();
        assert_eq!(header.identifier, "hdr");
        assert_eq!(header.comment.as_deref(), Some("c"));
        assert_eq!(header.title.as_deref(), Some("T"));
        assert!(header.creation_time.is_some());
        assert!(header.repository_id.is_none());
    }

    #[test]
    fn whitespace_text_nodes_are_not_elements() {
        let element = element("<VALUES>\n  <A/>\n</VALUES>");
        assert_eq!(element.elements().count(), 1);
        assert!(matches!(element.children[0], Node::Text(_)));
    }
}
