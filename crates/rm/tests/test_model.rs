use helios_rm::support::{FieldError, FieldRef, FieldType, FieldValue, RmObject, RmType};
use helios_rm::*;

fn vitals() -> Composition {
    let pulse = Element::new("at0004", "Rate").with_value(DvQuantity::new(72.0, "/min"));
    let tree = ItemTree {
        name: "Tree".into(),
        archetype_node_id: "at0003".into(),
        items: vec![Item::Element(pulse)],
        ..Default::default()
    };
    let observation = Observation {
        name: "Pulse".into(),
        archetype_node_id: "openEHR-EHR-OBSERVATION.pulse.v1".into(),
        language: CodePhrase::new("ISO_639-1", "en"),
        encoding: CodePhrase::new("IANA_character-sets", "UTF-8"),
        subject: PartyProxy::PartySelf(PartySelf {}),
        data: History {
            name: "history".into(),
            archetype_node_id: "at0002".into(),
            origin: DvDateTime::new("2024-03-01T10:15:00Z"),
            events: vec![Event::Point(PointEvent {
                name: "any event".into(),
                archetype_node_id: "at0003".into(),
                time: DvDateTime::new("2024-03-01T10:15:00Z"),
                data: ItemStructure::Tree(tree),
                ..Default::default()
            })],
            ..Default::default()
        },
        ..Default::default()
    };
    Composition {
        name: "Vital Signs".into(),
        archetype_node_id: "openEHR-EHR-COMPOSITION.encounter.v1".into(),
        language: CodePhrase::new("ISO_639-1", "en"),
        territory: CodePhrase::new("ISO_3166-1", "GB"),
        category: DvCodedText::new("event", CodePhrase::new("openehr", "433")),
        composer: PartyProxy::Identified(PartyIdentified {
            name: Some("Dr. Who".into()),
        }),
        content: vec![ContentItem::Observation(observation)],
        ..Default::default()
    }
}

#[test]
fn test_field_access_by_name() {
    let composition = vitals();
    let object: &dyn RmObject = &composition;

    assert_eq!(object.rm_type_name(), "COMPOSITION");
    match object.field("archetype_node_id") {
        Some(FieldRef::Text(id)) => assert_eq!(id, "openEHR-EHR-COMPOSITION.encounter.v1"),
        other => panic!("unexpected {other:?}"),
    }
    match object.field("category") {
        Some(FieldRef::Object(category)) => assert_eq!(category.rm_type_name(), "DV_CODED_TEXT"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(object.field("parent").is_none());
    assert!(object.field("context").unwrap().is_absent());
}

#[test]
fn test_parent_link_is_not_a_field() {
    let names: Vec<_> = Element::TYPE_DEF.fields.iter().map(|f| f.name).collect();
    assert!(!names.contains(&"parent"));

    let mut element = Element::new("at0001", "Systolic");
    let err = element
        .set_field("parent", FieldValue::Text("/content".into()))
        .unwrap_err();
    assert_eq!(
        err,
        FieldError::UnknownField {
            owner: "ELEMENT",
            field: "parent".into()
        }
    );
}

#[test]
fn test_parent_ref_resolves_by_path() {
    let composition = vitals();
    let parent = ParentRef::new(
        "/content[openEHR-EHR-OBSERVATION.pulse.v1]/data/events[at0003]/data",
    );
    let tree = parent.resolve(&composition).expect("path resolves");
    assert_eq!(tree.rm_type_name(), "ITEM_TREE");

    let mut element = Element::new("at0004", "Rate");
    element.set_parent(Some(parent.clone()));
    assert_eq!(element.parent(), Some(&parent));

    assert!(ParentRef::new("/content[at9999]").resolve(&composition).is_none());
    assert_eq!(
        ParentRef::new("/").resolve(&composition).map(|o| o.rm_type_name()),
        Some("COMPOSITION")
    );
}

#[test]
fn test_family_assignment_downcasts() {
    let mut element = Element::new("at0001", "Flag");
    element
        .set_field(
            "value",
            FieldValue::Object(Box::new(DvBoolean { value: true })),
        )
        .unwrap();
    assert_eq!(element.value, Some(DataValue::Boolean(DvBoolean { value: true })));

    let err = element
        .set_field("value", FieldValue::Object(Box::new(CodePhrase::new("a", "b"))))
        .unwrap_err();
    assert_eq!(
        err,
        FieldError::TypeMismatch {
            expected: "DATA_VALUE".into(),
            found: "object CODE_PHRASE".into()
        }
    );
}

#[test]
fn test_dynamic_clone_and_equality() {
    let original: Box<dyn RmObject> = Box::new(vitals());
    let copy = original.clone();
    assert!(*original == *copy);
    assert!(copy.is::<Composition>());

    let other: Box<dyn RmObject> = Box::new(DvText::new("x"));
    assert!(*original != *other);

    let text = TextValue::from_field(FieldValue::Object(Box::new(DvCodedText::new(
        "Vital Signs",
        CodePhrase::new("local", "at0000"),
    ))))
    .unwrap();
    assert_eq!(text.value(), "Vital Signs");
    assert!(matches!(text, TextValue::Coded(_)));
}
