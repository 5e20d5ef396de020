//! Data values.
//!
//! The openEHR chain `DATA_VALUE → DV_ORDERED → DV_QUANTIFIED → DV_AMOUNT →
//! DV_QUANTITY` (and its temporal sibling) is flattened into the
//! [`DataValue`] family; the behaviour shared along those chains lives in the
//! [`Quantified`] and [`Temporal`] traits.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

use crate::base::TerminologyId;

rm_type! {
    /// A code from a terminology.
    pub struct CodePhrase as "CODE_PHRASE" extends [] {
        terminology_id: TerminologyId => "TERMINOLOGY_ID" [mandatory],
        code_string: String => "String" [mandatory],
        preferred_term: Option<String> => "String" [optional],
    }
}

impl CodePhrase {
    pub fn new(terminology: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            terminology_id: TerminologyId::new(terminology),
            code_string: code.into(),
            preferred_term: None,
        }
    }
}

rm_type! {
    pub struct DvBoolean as "DV_BOOLEAN" extends ["DATA_VALUE"] {
        value: bool => "Boolean" [mandatory],
    }
}

rm_type! {
    pub struct DvUri as "DV_URI" extends ["DATA_VALUE"] {
        value: String => "String" [mandatory],
    }
}

rm_type! {
    pub struct DvEhrUri as "DV_EHR_URI" extends ["DV_URI"] {
        value: String => "String" [mandatory],
    }
}

rm_family! {
    /// A `DV_URI` field, which may also hold a `DV_EHR_URI`.
    pub enum UriValue as "DV_URI" {
        Uri(DvUri),
        EhrUri(DvEhrUri),
    }
}

rm_type! {
    /// Plain text, optionally with a hyperlink and language.
    pub struct DvText as "DV_TEXT" extends ["DATA_VALUE"] {
        value: String => "String" [mandatory],
        hyperlink: Option<UriValue> => "DV_URI" [optional],
        formatting: Option<String> => "String" [optional],
        language: Option<CodePhrase> => "CODE_PHRASE" [optional],
        encoding: Option<CodePhrase> => "CODE_PHRASE" [optional],
    }
}

impl DvText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }
}

rm_type! {
    /// Text whose meaning is fixed by a terminology code.
    pub struct DvCodedText as "DV_CODED_TEXT" extends ["DV_TEXT"] {
        value: String => "String" [mandatory],
        hyperlink: Option<UriValue> => "DV_URI" [optional],
        formatting: Option<String> => "String" [optional],
        language: Option<CodePhrase> => "CODE_PHRASE" [optional],
        encoding: Option<CodePhrase> => "CODE_PHRASE" [optional],
        defining_code: CodePhrase => "CODE_PHRASE" [mandatory],
    }
}

impl DvCodedText {
    pub fn new(value: impl Into<String>, defining_code: CodePhrase) -> Self {
        Self {
            value: value.into(),
            defining_code,
            ..Default::default()
        }
    }
}

rm_family! {
    /// A `DV_TEXT` field, which may also hold a `DV_CODED_TEXT`.
    pub enum TextValue as "DV_TEXT" {
        Plain(DvText),
        Coded(DvCodedText),
    }
}

impl From<&str> for TextValue {
    fn from(value: &str) -> Self {
        TextValue::Plain(DvText::new(value))
    }
}

impl TextValue {
    pub fn value(&self) -> &str {
        match self {
            TextValue::Plain(text) => &text.value,
            TextValue::Coded(text) => &text.value,
        }
    }
}

rm_type! {
    pub struct DvQuantity as "DV_QUANTITY" extends ["DV_AMOUNT"] {
        magnitude: f64 => "Real" [mandatory],
        units: String => "String" [mandatory],
        precision: Option<i64> => "Integer" [optional],
        magnitude_status: Option<String> => "String" [optional],
    }
}

impl DvQuantity {
    pub fn new(magnitude: f64, units: impl Into<String>) -> Self {
        Self {
            magnitude,
            units: units.into(),
            ..Default::default()
        }
    }
}

rm_type! {
    pub struct DvCount as "DV_COUNT" extends ["DV_AMOUNT"] {
        magnitude: i64 => "Integer" [mandatory],
        magnitude_status: Option<String> => "String" [optional],
    }
}

rm_type! {
    /// A ranked symbol, e.g. a score on an ordinal scale.
    pub struct DvOrdinal as "DV_ORDINAL" extends ["DV_ORDERED"] {
        value: i64 => "Integer" [mandatory],
        symbol: DvCodedText => "DV_CODED_TEXT" [mandatory],
    }
}

rm_type! {
    pub struct DvDateTime as "DV_DATE_TIME" extends ["DV_TEMPORAL"] {
        value: String => "String" [mandatory],
    }
}

rm_type! {
    pub struct DvDate as "DV_DATE" extends ["DV_TEMPORAL"] {
        value: String => "String" [mandatory],
    }
}

rm_type! {
    pub struct DvTime as "DV_TIME" extends ["DV_TEMPORAL"] {
        value: String => "String" [mandatory],
    }
}

rm_type! {
    /// An ISO 8601 duration such as `PT30M`.
    pub struct DvDuration as "DV_DURATION" extends ["DV_AMOUNT"] {
        value: String => "String" [mandatory],
    }
}

impl DvDateTime {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn as_date_time(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.value).ok()
    }
}

impl DvDate {
    pub fn as_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.value, "%Y-%m-%d").ok()
    }
}

impl DvTime {
    pub fn as_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.value, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(&self.value, "%H:%M"))
            .ok()
    }
}

impl DvDuration {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

/// Values with a numeric magnitude.
pub trait Quantified {
    fn magnitude(&self) -> f64;

    fn magnitude_status(&self) -> Option<&str>;

    /// `true` unless the magnitude is qualified (`<`, `>`, `~` ...).
    fn is_exact(&self) -> bool {
        matches!(self.magnitude_status(), None | Some("="))
    }
}

impl Quantified for DvQuantity {
    fn magnitude(&self) -> f64 {
        self.magnitude
    }

    fn magnitude_status(&self) -> Option<&str> {
        self.magnitude_status.as_deref()
    }
}

impl Quantified for DvCount {
    fn magnitude(&self) -> f64 {
        self.magnitude as f64
    }

    fn magnitude_status(&self) -> Option<&str> {
        self.magnitude_status.as_deref()
    }
}

/// Date and time values held as ISO 8601 text.
pub trait Temporal {
    fn iso_value(&self) -> &str;

    /// Whether the text parses as the type's ISO 8601 form.
    fn is_well_formed(&self) -> bool;
}

impl Temporal for DvDateTime {
    fn iso_value(&self) -> &str {
        &self.value
    }

    fn is_well_formed(&self) -> bool {
        self.as_date_time().is_some()
    }
}

impl Temporal for DvDate {
    fn iso_value(&self) -> &str {
        &self.value
    }

    fn is_well_formed(&self) -> bool {
        self.as_date().is_some()
    }
}

impl Temporal for DvTime {
    fn iso_value(&self) -> &str {
        &self.value
    }

    fn is_well_formed(&self) -> bool {
        self.as_time().is_some()
    }
}

rm_family! {
    /// Any concrete `DATA_VALUE`.
    pub enum DataValue as "DATA_VALUE" {
        Text(DvText),
        CodedText(DvCodedText),
        Boolean(DvBoolean),
        Uri(DvUri),
        EhrUri(DvEhrUri),
        Quantity(DvQuantity),
        Count(DvCount),
        Ordinal(DvOrdinal),
        DateTime(DvDateTime),
        Date(DvDate),
        Time(DvTime),
        Duration(DvDuration),
    }
}

impl DataValue {
    pub fn as_quantified(&self) -> Option<&dyn Quantified> {
        match self {
            DataValue::Quantity(q) => Some(q),
            DataValue::Count(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_temporal(&self) -> Option<&dyn Temporal> {
        match self {
            DataValue::DateTime(v) => Some(v),
            DataValue::Date(v) => Some(v),
            DataValue::Time(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        let value = DataValue::from(DvQuantity::new(72.5, "kg"));
        let quantified = value.as_quantified().unwrap();
        assert_eq!(quantified.magnitude(), 72.5);
        assert!(quantified.is_exact());
        assert!(value.as_temporal().is_none());

        let count = DvCount {
            magnitude: 3,
            magnitude_status: Some("<".into()),
        };
        assert!(!count.is_exact());

        let when = DataValue::from(DvDateTime::new("2024-03-01T10:15:00+01:00"));
        assert!(when.as_temporal().unwrap().is_well_formed());
        assert!(!DvDate { value: "2024-13-40".into() }.is_well_formed());
        assert!(DvTime { value: "10:15".into() }.is_well_formed());
    }

    #[test]
    fn test_family_reports_concrete_name() {
        let value = DataValue::from(DvCodedText::new("event", CodePhrase::new("openehr", "433")));
        assert_eq!(value.rm_type_name(), "DV_CODED_TEXT");
        assert_eq!(DataValue::TYPE_NAME, "DATA_VALUE");
    }
}
