//! Reading and writing documents through the public API.

use std::{collections::HashSet, path::Path};

use reqif::{
    Config, DeserializeOptions, Error, Identifiable, ReqIf, ReqIfDeserializer, ReqIfSerializer,
    SerializeOptions, SpecElementWithAttributes, SupportedFileExtension, Value,
};

const SAMPLE: &str = include_str!("data/sample.reqif");

fn read(xml: &str) -> ReqIf {
    let mut documents = ReqIfDeserializer::new()
        .deserialize_reader(
            xml.as_bytes(),
            SupportedFileExtension::Reqif,
            &DeserializeOptions::default(),
        )
        .unwrap();
    assert_eq!(documents.len(), 1);
    documents.remove(0)
}

fn write(document: &ReqIf, config: Config) -> Result<String, Error> {
    let mut out = Vec::new();
    ReqIfSerializer::new(config).serialize_writer(
        std::slice::from_ref(document),
        &mut out,
        SupportedFileExtension::Reqif,
        &SerializeOptions::default(),
    )?;
    Ok(String::from_utf8(out).unwrap())
}

fn identifiers<'a, T: Identifiable + 'a>(items: impl IntoIterator<Item = &'a T>) -> Vec<&'a str> {
    items.into_iter().map(Identifiable::identifier).collect()
}

#[test]
fn sample_is_fully_linked() {
    let document = read(SAMPLE);
    let content = &document.content;

    assert_eq!(document.header.title.as_deref(), Some("Brakes & Pedals"));
    assert_eq!(document.lang(), Some("en"));
    assert_eq!(content.datatypes.len(), 7);
    assert_eq!(content.spec_types.len(), 4);
    assert_eq!(
        identifiers(&content.spec_objects),
        ["req-1", "req-2", "req-3"]
    );
    assert_eq!(content.spec_relations.len(), 2);
    assert_eq!(content.relation_groups.len(), 1);
    assert_eq!(document.tool_extensions.len(), 1);

    let pedal = content.spec_object("req-1").unwrap();
    assert_eq!(
        content.spec_type_of(pedal).unwrap().identifier(),
        "requirement-type"
    );
    assert_eq!(pedal.value_of("ad-priority").unwrap().value, Value::Integer(1));
    assert_eq!(pedal.value_of("ad-weight").unwrap().value, Value::Real(12.75));
    assert_eq!(pedal.value_of("ad-safety").unwrap().value, Value::Boolean(true));

    let status = pedal.value_of("ad-status").unwrap();
    let selected = status.value.as_enum_values().unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(
        content.enum_value(selected[0].identifier()).unwrap().long_name(),
        Some("Approved")
    );

    let relations: Vec<_> = content.relations_of("req-1").collect();
    assert_eq!(relations.len(), 2);
}

#[test]
fn xhtml_values_keep_markup_and_objects() {
    let document = read(SAMPLE);
    let pedal = document.content.spec_object("req-1").unwrap();
    let text = pedal.value_of("ad-text").unwrap().value.as_xhtml().unwrap();

    assert!(text.markup.contains("<xhtml:b>500&#160;N</xhtml:b>"));
    assert!(text.plain_text().starts_with("The pedal force shall not exceed 500"));

    let objects = text.external_objects();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].uri, "files/pedal.png");
    assert_eq!(objects[0].mime_type.as_deref(), Some("image/png"));
    assert_eq!(objects[0].width, Some(320));
    assert_eq!(objects[0].height, Some(200));
}

#[test]
fn hierarchy_is_walked_in_document_order() {
    let document = read(SAMPLE);
    let specification = document.content.specification("spec-1").unwrap();

    let walk: Vec<_> = specification
        .walk()
        .map(|(depth, node)| (depth, node.identifier()))
        .collect();
    assert_eq!(walk, [(0, "h-1"), (1, "h-1-1"), (0, "h-2")]);

    let nested = specification.find_hierarchy("h-1-1").unwrap();
    assert_eq!(nested.object.as_ref().unwrap().identifier(), "req-2");
    assert_eq!(
        identifiers(
            nested
                .editable_attributes
                .iter()
                .filter_map(|reference| document.content.attribute_definition(reference.identifier()))
        ),
        ["ad-text"]
    );
}

#[test]
fn round_trip_is_lossless() {
    let original = read(SAMPLE);

    let written = write(&original, Config::default()).unwrap();
    let reread = read(&written);
    assert_eq!(reread, original);

    let rewritten = write(&reread, Config::default()).unwrap();
    assert_eq!(rewritten, written);
}

#[test]
fn compact_output_reads_back_identically() {
    let original = read(SAMPLE);
    let mut config = Config::default();
    config.set_indent(0);
    config.write_declaration = false;

    let written = write(&original, config).unwrap();
    assert!(!written.contains('\n'));
    assert_eq!(read(&written), original);
}

#[test]
fn whitespace_in_attribute_values_survives_a_round_trip() {
    let mut document = read(SAMPLE);
    let pedal = document.content.spec_objects.get_mut("req-1").unwrap();
    let id = pedal
        .values
        .iter_mut()
        .find(|value| value.definition().identifier() == "ad-id")
        .unwrap();
    id.value = Value::String("first\r\nsecond\tthird".to_string());

    let written = write(&document, Config::default()).unwrap();
    assert!(written.contains(r#"THE-VALUE="first&#xD;&#xA;second&#x9;third""#));

    let reread = read(&written);
    let pedal = reread.content.spec_object("req-1").unwrap();
    assert_eq!(
        pedal.value_of("ad-id").unwrap().value,
        Value::String("first\r\nsecond\tthird".to_string())
    );
}

#[test]
fn identifiers_are_unique_per_collection() {
    let document = read(SAMPLE);
    let content = &document.content;

    fn assert_unique(identifiers: Vec<&str>) {
        let unique: HashSet<_> = identifiers.iter().collect();
        assert_eq!(unique.len(), identifiers.len(), "{identifiers:?}");
    }

    assert_unique(identifiers(&content.datatypes));
    assert_unique(identifiers(&content.spec_types));
    assert_unique(identifiers(&content.spec_objects));
    assert_unique(identifiers(&content.spec_relations));
    assert_unique(identifiers(&content.specifications));
    assert_unique(identifiers(&content.relation_groups));
}

const DANGLING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<REQ-IF xmlns="http://www.omg.org/spec/ReqIF/20110401/reqif.xsd">
  <THE-HEADER><REQ-IF-HEADER IDENTIFIER="h"/></THE-HEADER>
  <CORE-CONTENT>
    <REQ-IF-CONTENT>
      <SPEC-TYPES>
        <SPEC-OBJECT-TYPE IDENTIFIER="object-type" LAST-CHANGE="2020-01-01T00:00:00Z"/>
        <SPEC-RELATION-TYPE IDENTIFIER="relation-type" LAST-CHANGE="2020-01-01T00:00:00Z"/>
      </SPEC-TYPES>
      <SPEC-OBJECTS>
        <SPEC-OBJECT IDENTIFIER="known" LAST-CHANGE="2020-01-01T00:00:00Z">
          <TYPE><SPEC-OBJECT-TYPE-REF>object-type</SPEC-OBJECT-TYPE-REF></TYPE>
        </SPEC-OBJECT>
      </SPEC-OBJECTS>
      <SPEC-RELATIONS>
        <SPEC-RELATION IDENTIFIER="dangling" LAST-CHANGE="2020-01-01T00:00:00Z">
          <SOURCE><SPEC-OBJECT-REF>known</SPEC-OBJECT-REF></SOURCE>
          <TARGET><SPEC-OBJECT-REF>unknown-specobject</SPEC-OBJECT-REF></TARGET>
          <TYPE><SPEC-RELATION-TYPE-REF>relation-type</SPEC-RELATION-TYPE-REF></TYPE>
        </SPEC-RELATION>
      </SPEC-RELATIONS>
    </REQ-IF-CONTENT>
  </CORE-CONTENT>
</REQ-IF>"#;

#[test]
fn dangling_reference_gets_a_placeholder() {
    let document = read(DANGLING);
    let content = &document.content;

    let relation = content.spec_relation("dangling").unwrap();
    let target = relation.target.as_ref().unwrap();
    assert_eq!(target.identifier(), "unknown-specobject");

    let placeholder = content.spec_object("unknown-specobject").unwrap();
    assert_eq!(
        placeholder.identity().description(),
        Some("This SpecObject was not found in the source file.")
    );
    assert_eq!(content.spec_objects.len(), 2);
}

#[test]
fn enumeration_default_is_bound_to_its_definition() {
    let document = read(SAMPLE);
    let definition = document.content.attribute_definition("ad-status").unwrap();
    let default = definition.default_value().unwrap();

    assert_eq!(default.definition().identifier(), definition.identifier());
    let literals = default.value.as_enum_values().unwrap();
    assert_eq!(literals.len(), 1);
    assert_eq!(literals[0].identifier(), "enum-draft");
}

#[test]
fn spec_object_without_type_is_not_written() {
    let mut document = read(SAMPLE);
    document
        .content
        .spec_objects
        .get_mut("req-2")
        .unwrap()
        .set_spec_type(None);

    let Err(Error::Serialization(error)) = write(&document, Config::default()) else {
        panic!("expected a serialization error");
    };
    assert_eq!(error.identifier, "req-2");
    assert!(error.to_string().contains("Pedal travel"));
}

#[test]
fn reads_the_fixture_from_disk() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/sample.reqif");
    let documents = ReqIfDeserializer::new()
        .deserialize(&path, &DeserializeOptions::default().validated())
        .unwrap();
    assert_eq!(documents, [read(SAMPLE)]);
}
