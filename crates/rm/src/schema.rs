//! Schema view and registration list of the model.

use std::sync::OnceLock;

use crate::support::{Export, RmType, StaticSchema, TypeAllocator, TypeDef};
use crate::*;

const ABSTRACT_TYPES: &[TypeDef] = &[
    TypeDef::abstract_type("OBJECT_ID", &[]),
    TypeDef::abstract_type("UID_BASED_ID", &["OBJECT_ID"]),
    TypeDef::abstract_type("DATA_VALUE", &[]),
    TypeDef::abstract_type("DV_ORDERED", &["DATA_VALUE"]),
    TypeDef::abstract_type("DV_QUANTIFIED", &["DV_ORDERED"]),
    TypeDef::abstract_type("DV_AMOUNT", &["DV_QUANTIFIED"]),
    TypeDef::abstract_type("DV_ABSOLUTE_QUANTITY", &["DV_QUANTIFIED"]),
    TypeDef::abstract_type("DV_TEMPORAL", &["DV_ABSOLUTE_QUANTITY"]),
    TypeDef::abstract_type("PATHABLE", &[]),
    TypeDef::abstract_type("LOCATABLE", &["PATHABLE"]),
    TypeDef::abstract_type("ITEM", &["LOCATABLE"]),
    TypeDef::abstract_type("DATA_STRUCTURE", &["LOCATABLE"]),
    TypeDef::abstract_type("ITEM_STRUCTURE", &["DATA_STRUCTURE"]),
    TypeDef::abstract_type("EVENT", &["LOCATABLE"]),
    TypeDef::abstract_type("CONTENT_ITEM", &["LOCATABLE"]),
    TypeDef::abstract_type("ENTRY", &["CONTENT_ITEM"]),
    TypeDef::abstract_type("CARE_ENTRY", &["ENTRY"]),
    TypeDef::abstract_type("PARTY_PROXY", &[]),
];

macro_rules! concrete_types {
    ($($ty:ty),* $(,)?) => {
        fn concrete_defs() -> Vec<TypeDef> {
            vec![$(<$ty as RmType>::TYPE_DEF),*]
        }

        /// Every constructible type, keyed by its declared name.
        pub fn exports() -> Vec<(&'static str, Export)> {
            vec![$(
                (<$ty as RmType>::TYPE_DEF.name, Export::Type(TypeAllocator::of::<$ty>()))
            ),*]
        }
    };
}

concrete_types!(
    TerminologyId,
    ArchetypeId,
    HierObjectId,
    ObjectVersionId,
    GenericId,
    Archetyped,
    CodePhrase,
    DvBoolean,
    DvText,
    DvCodedText,
    DvUri,
    DvEhrUri,
    DvQuantity,
    DvCount,
    DvOrdinal,
    DvDateTime,
    DvDate,
    DvTime,
    DvDuration,
    Element,
    Cluster,
    ItemTree,
    ItemList,
    ItemSingle,
    History,
    PointEvent,
    IntervalEvent,
    PartySelf,
    PartyIdentified,
    PartyRelated,
    EventContext,
    Section,
    Observation,
    Evaluation,
    Composition,
);

/// The schema of every abstract and concrete type in the model.
pub fn schema() -> &'static StaticSchema {
    static SCHEMA: OnceLock<StaticSchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        StaticSchema::new(ABSTRACT_TYPES.iter().copied().chain(concrete_defs()))
    })
}
