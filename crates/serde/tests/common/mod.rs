//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use helios_rm::*;
use helios_rm_serde::{RmContext, TypeRegistry};

/// Installs a test-writer subscriber once; `RUST_LOG` selects the level.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A fresh registry holding every model type, paired with the model schema.
pub fn context() -> RmContext {
    init_tracing();
    let registry = TypeRegistry::from_exports(exports()).expect("model exports register");
    RmContext::new(registry, Arc::new(schema().clone()))
}

pub fn code(terminology: &str, code: &str) -> CodePhrase {
    CodePhrase::new(terminology, code)
}

pub fn element(node_id: &str, name: &str, value: impl Into<DataValue>) -> Item {
    Item::Element(Element::new(node_id, name).with_value(value))
}

/// A vital signs encounter exercising polymorphic fields, lists, nested
/// families and optional values.
pub fn vitals() -> Composition {
    let mut systolic = DvQuantity::new(120.5, "mm[Hg]");
    systolic.precision = Some(1);

    let tree = ItemTree {
        name: "Tree".into(),
        archetype_node_id: "at0003".into(),
        items: vec![
            element("at0004", "Systolic", systolic),
            element("at0005", "Pulse count", DvCount { magnitude: 72, magnitude_status: None }),
            Item::Cluster(Cluster {
                name: "Device".into(),
                archetype_node_id: "at0010".into(),
                items: vec![
                    element("at0011", "Serial", DvText::new("SN-4711")),
                    element("at0012", "Calibrated", DvBoolean { value: true }),
                ],
                ..Default::default()
            }),
            Item::Element(Element {
                null_flavour: Some(DvCodedText::new("unknown", code("openehr", "253"))),
                ..Element::new("at0013", "Comment")
            }),
        ],
        ..Default::default()
    };

    let observation = Observation {
        name: TextValue::Coded(DvCodedText::new(
            "Blood pressure",
            code("SNOMED-CT(2003)", "75367002"),
        )),
        archetype_node_id: "openEHR-EHR-OBSERVATION.blood_pressure.v1".into(),
        language: code("ISO_639-1", "en"),
        encoding: code("IANA_character-sets", "UTF-8"),
        subject: PartyProxy::PartySelf(PartySelf {}),
        data: History {
            name: "history".into(),
            archetype_node_id: "at0001".into(),
            origin: DvDateTime::new("2024-03-01T10:15:00Z"),
            events: vec![Event::Point(PointEvent {
                name: "any event".into(),
                archetype_node_id: "at0002".into(),
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
        uid: Some(UidBasedId::ObjectVersionId(ObjectVersionId {
            value: "8849182c-82ad-4088-a07f-48ead4180515::example.domain::1".into(),
        })),
        archetype_details: Some(Archetyped {
            archetype_id: ArchetypeId::new("openEHR-EHR-COMPOSITION.encounter.v1"),
            rm_version: "1.0.4".into(),
        }),
        language: code("ISO_639-1", "en"),
        territory: code("ISO_3166-1", "GB"),
        category: DvCodedText::new("event", code("openehr", "433")),
        composer: PartyProxy::Identified(PartyIdentified {
            name: Some("Dr. Yamamoto".into()),
        }),
        context: Some(EventContext {
            start_time: DvDateTime::new("2024-03-01T10:00:00Z"),
            setting: DvCodedText::new("other care", code("openehr", "238")),
            ..Default::default()
        }),
        content: vec![ContentItem::Observation(observation)],
        ..Default::default()
    }
}
