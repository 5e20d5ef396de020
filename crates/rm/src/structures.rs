//! Items, item structures and event histories.

use crate::base::{Archetyped, ParentRef, UidBasedId};
use crate::data_types::{DataValue, DvCodedText, DvDateTime, DvDuration, TextValue};

/// Archetype-addressable nodes.
pub trait Locatable {
    fn name(&self) -> &TextValue;

    fn archetype_node_id(&self) -> &str;

    fn parent(&self) -> Option<&ParentRef>;

    fn set_parent(&mut self, parent: Option<ParentRef>);

    /// Archetype nodes carry an `openEHR-...` id; other nodes carry an `at` code.
    fn is_archetype_root(&self) -> bool {
        self.archetype_node_id().starts_with("openEHR-")
    }
}

macro_rules! impl_locatable {
    ($($name:ty),* $(,)?) => {
        $(
            impl $crate::structures::Locatable for $name {
                fn name(&self) -> &$crate::data_types::TextValue {
                    &self.name
                }

                fn archetype_node_id(&self) -> &str {
                    &self.archetype_node_id
                }

                fn parent(&self) -> Option<&$crate::base::ParentRef> {
                    self.parent.as_ref()
                }

                fn set_parent(&mut self, parent: Option<$crate::base::ParentRef>) {
                    self.parent = parent;
                }
            }
        )*
    };
}

pub(crate) use impl_locatable;

rm_type! {
    /// A leaf node holding one data value.
    pub struct Element as "ELEMENT" extends ["ITEM"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        value: Option<DataValue> => "DATA_VALUE" [optional],
        null_flavour: Option<DvCodedText> => "DV_CODED_TEXT" [optional],
    }
    links {
        parent: Option<ParentRef>,
    }
}

impl Element {
    pub fn new(node_id: impl Into<String>, name: impl Into<TextValue>) -> Self {
        Self {
            archetype_node_id: node_id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<DataValue>) -> Self {
        self.value = Some(value.into());
        self
    }
}

rm_type! {
    pub struct Cluster as "CLUSTER" extends ["ITEM"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        items: Vec<Item> => "ITEM" [mandatory],
    }
    links {
        parent: Option<ParentRef>,
    }
}

rm_family! {
    pub enum Item as "ITEM" {
        Element(Element),
        Cluster(Cluster),
    }
}

rm_type! {
    pub struct ItemTree as "ITEM_TREE" extends ["ITEM_STRUCTURE"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        items: Vec<Item> => "ITEM" [optional],
    }
    links {
        parent: Option<ParentRef>,
    }
}

rm_type! {
    pub struct ItemList as "ITEM_LIST" extends ["ITEM_STRUCTURE"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        items: Vec<Element> => "ELEMENT" [optional],
    }
    links {
        parent: Option<ParentRef>,
    }
}

rm_type! {
    pub struct ItemSingle as "ITEM_SINGLE" extends ["ITEM_STRUCTURE"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        item: Element => "ELEMENT" [mandatory],
    }
    links {
        parent: Option<ParentRef>,
    }
}

rm_family! {
    pub enum ItemStructure as "ITEM_STRUCTURE" {
        Tree(ItemTree),
        List(ItemList),
        Single(ItemSingle),
    }
}

rm_type! {
    /// Point and interval events recorded from `origin` on.
    pub struct History as "HISTORY" extends ["DATA_STRUCTURE"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        origin: DvDateTime => "DV_DATE_TIME" [mandatory],
        period: Option<DvDuration> => "DV_DURATION" [optional],
        duration: Option<DvDuration> => "DV_DURATION" [optional],
        events: Vec<Event> => "EVENT" [optional],
    }
    links {
        parent: Option<ParentRef>,
    }
}

rm_type! {
    pub struct PointEvent as "POINT_EVENT" extends ["EVENT"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        time: DvDateTime => "DV_DATE_TIME" [mandatory],
        data: ItemStructure => "ITEM_STRUCTURE" [mandatory],
        state: Option<ItemStructure> => "ITEM_STRUCTURE" [optional],
    }
    links {
        parent: Option<ParentRef>,
    }
}

rm_type! {
    pub struct IntervalEvent as "INTERVAL_EVENT" extends ["EVENT"] {
        name: TextValue => "DV_TEXT" [mandatory],
        archetype_node_id: String => "String" [mandatory],
        uid: Option<UidBasedId> => "UID_BASED_ID" [optional],
        archetype_details: Option<Archetyped> => "ARCHETYPED" [optional],
        time: DvDateTime => "DV_DATE_TIME" [mandatory],
        data: ItemStructure => "ITEM_STRUCTURE" [mandatory],
        state: Option<ItemStructure> => "ITEM_STRUCTURE" [optional],
        width: DvDuration => "DV_DURATION" [mandatory],
        math_function: DvCodedText => "DV_CODED_TEXT" [mandatory],
        sample_count: Option<i64> => "Integer" [optional],
    }
    links {
        parent: Option<ParentRef>,
    }
}

rm_family! {
    pub enum Event as "EVENT" {
        Point(PointEvent),
        Interval(IntervalEvent),
    }
}

impl_locatable!(
    Element,
    Cluster,
    ItemTree,
    ItemList,
    ItemSingle,
    History,
    PointEvent,
    IntervalEvent,
);
