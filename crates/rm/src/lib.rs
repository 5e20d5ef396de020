//! # Helios RM
//!
//! A typed subset of the openEHR Reference Model: identifiers, data values,
//! data structures and the composition/entry hierarchy.
//!
//! Concrete types are plain structs declared through [`rm_type!`]; every
//! abstract type whose subtypes may fill a field is a family enum declared
//! through [`rm_family!`] (for example [`DataValue`] for `DATA_VALUE`).
//! Behaviour shared along the openEHR inheritance chains is expressed by the
//! capability traits [`Quantified`], [`Temporal`] and [`Locatable`].
//!
//! [`schema()`] returns the schema view of the whole model and [`exports()`]
//! the closed list of constructible types for bulk registration.

pub use helios_rm_support as support;

#[macro_use]
mod macros;

pub mod base;
pub mod composition;
pub mod data_types;
pub mod schema;
pub mod structures;

pub use base::{
    ArchetypeId, Archetyped, GenericId, HierObjectId, ObjectVersionId, ParentRef, TerminologyId,
    UidBasedId,
};
pub use composition::{
    Composition, ContentItem, Evaluation, EventContext, Observation, PartyIdentified, PartyProxy,
    PartyRelated, PartySelf, Section,
};
pub use data_types::{
    CodePhrase, DataValue, DvBoolean, DvCodedText, DvCount, DvDate, DvDateTime, DvDuration,
    DvEhrUri, DvOrdinal, DvQuantity, DvText, DvTime, DvUri, Quantified, Temporal, TextValue,
    UriValue,
};
pub use schema::{exports, schema};
pub use structures::{
    Cluster, Element, Event, History, IntervalEvent, Item, ItemList, ItemSingle, ItemStructure,
    ItemTree, Locatable, PointEvent,
};
