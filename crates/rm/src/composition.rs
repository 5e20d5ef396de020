//! Compositions, their context and the entries they contain.

use crate::base::{Archetyped, ParentRef, UidBasedId};
use crate::data_types::{CodePhrase, DvCodedText, DvDateTime, TextValue};
use crate::structures::{History, ItemStructure, impl_locatable};

rm_type! {
    /// The subject of the record.
    pub struct PartySelf as "PARTY_SELF" extends ["PARTY_PROXY"] {}
}

rm_type! {
    pub struct PartyIdentified as "PARTY_IDENTIFIED" extends ["PARTY_PROXY"] {
        name: Option<String> => "String" [optional],
    }
}

rm_type! {
    pub struct PartyRelated as "PARTY_RELATED" extends ["PARTY_IDENTIFIED"] {
        name: Option<String> => "String" [optional],
        relationship: DvCodedText => "DV_CODED_TEXT" [mandatory],
    }
}

rm_family! {
    pub enum PartyProxy as "PARTY_PROXY" {
        PartySelf(PartySelf),
        Identified(PartyIdentified),
        Related(PartyRelated),
    }
}

rm_type! {
    pub struct EventContext as "EVENT_CONTEXT" extends ["PATHABLE"] {
        start_time: DvDateTime => "DV_DATE_TIME" [mandatory],
        end_time: Option<DvDateTime> => "DV_DATE_TIME" [optional],
        location: Option<String> => "String" [optional],
        setting: DvCodedText => "DV_CODED_TEXT" [mandatory],
        other_context: Option<ItemStructure> => "ITEM_STRUCTURE" [optional],
    }
}

rm_type! {
    pub struct Section as "SECTION" extends ["CONTENT_ITEM"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        items: Vec<ContentItem> => "CONTENT_ITEM" [optional],
    }
    links {
        parent: Option<ParentRef>,
    }
}

rm_type! {
    /// An observation recorded as a history of events.
    pub struct Observation as "OBSERVATION" extends ["CARE_ENTRY"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        language: CodePhrase => "CODE_PHRASE" [mandatory],
        encoding: CodePhrase => "CODE_PHRASE" [mandatory],
        subject: PartyProxy => "PARTY_PROXY" [mandatory],
        provider: Option<PartyProxy> => "PARTY_PROXY" [optional],
        protocol: Option<ItemStructure> => "ITEM_STRUCTURE" [optional],
        data: History => "HISTORY" [mandatory],
        state: Option<History> => "HISTORY" [optional],
    }
    links {
        parent: Option<ParentRef>,
    }
}

rm_type! {
    pub struct Evaluation as "EVALUATION" extends ["CARE_ENTRY"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        language: CodePhrase => "CODE_PHRASE" [mandatory],
        encoding: CodePhrase => "CODE_PHRASE" [mandatory],
        subject: PartyProxy => "PARTY_PROXY" [mandatory],
        provider: Option<PartyProxy> => "PARTY_PROXY" [optional],
        protocol: Option<ItemStructure> => "ITEM_STRUCTURE" [optional],
        data: ItemStructure => "ITEM_STRUCTURE" [mandatory],
    }
    links {
        parent: Option<ParentRef>,
    }
}

rm_family! {
    pub enum ContentItem as "CONTENT_ITEM" {
        Section(Section),
        Observation(Observation),
        Evaluation(Evaluation),
    }
}

rm_type! {
    /// The unit of committal to an EHR.
    pub struct Composition as "COMPOSITION" extends ["LOCATABLE"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        language: CodePhrase => "CODE_PHRASE" [mandatory],
        territory: CodePhrase => "CODE_PHRASE" [mandatory],
        category: DvCodedText => "DV_CODED_TEXT" [mandatory],
        composer: PartyProxy => "PARTY_PROXY" [mandatory],
        context: Option<EventContext> => "EVENT_CONTEXT" [optional],
        content: Vec<ContentItem> => "CONTENT_ITEM" [optional],
    }
    links {
        parent: Option<ParentRef>,
    }
}

impl_locatable!(Section, Observation, Evaluation, Composition);
