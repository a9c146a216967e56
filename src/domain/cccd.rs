//! Vietnamese citizen identity card (CCCD) record extraction.
//!
//! This module defines the structured record read off the front of a card and
//! the classifier that assigns normalized text lines to its fields.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// First run of twelve digits, the card number.
static ID_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{12}").expect("Invalid id number regex"));

/// A line consisting of the card number alone.
static BARE_ID_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{12}$").expect("Invalid bare id number regex"));

/// `D[D]/M[M]/YYYY` with `/` or `-` separators.
static DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{4}").expect("Invalid date regex"));

static NAME_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i).*?(?:Họ và tên|Tên)[\s:]+").expect("Invalid name label regex")
});

static NATIONALITY_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i).*?Quốc tịch[\s:]+").expect("Invalid nationality label regex")
});

static ORIGIN_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i).*?Quê quán[\s:]+").expect("Invalid place of origin label regex")
});

static RESIDENCE_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i).*?(?:Nơi thường trú|Thường trú)[\s:]+")
        .expect("Invalid place of residence label regex")
});

/// The named fields printed on the front of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CccdField {
    /// Card title ("CĂN CƯỚC CÔNG DÂN").
    Title,
    /// National motto line.
    Subtitle,
    /// Twelve-digit card number.
    IdNumber,
    /// Holder's full name.
    Name,
    /// Date of birth, `DD/MM/YYYY`.
    DateOfBirth,
    /// `Nam` or `Nữ`.
    Gender,
    /// Nationality.
    Nationality,
    /// Place of origin.
    PlaceOfOrigin,
    /// Place of permanent residence.
    PlaceOfResidence,
    /// Expiry date, `DD/MM/YYYY`.
    ExpiryDate,
}

impl CccdField {
    /// All fields, in the order they appear on the card.
    pub const ALL: [CccdField; 10] = [
        CccdField::Title,
        CccdField::Subtitle,
        CccdField::IdNumber,
        CccdField::Name,
        CccdField::DateOfBirth,
        CccdField::Gender,
        CccdField::Nationality,
        CccdField::PlaceOfOrigin,
        CccdField::PlaceOfResidence,
        CccdField::ExpiryDate,
    ];

    /// The field's key in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            CccdField::Title => "title",
            CccdField::Subtitle => "subtitle",
            CccdField::IdNumber => "id_number",
            CccdField::Name => "name",
            CccdField::DateOfBirth => "date_of_birth",
            CccdField::Gender => "gender",
            CccdField::Nationality => "nationality",
            CccdField::PlaceOfOrigin => "place_of_origin",
            CccdField::PlaceOfResidence => "place_of_residence",
            CccdField::ExpiryDate => "expiry_date",
        }
    }
}

impl std::fmt::Display for CccdField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured content of a card. Fields that were not found are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CccdRecord {
    pub title: String,
    pub subtitle: String,
    pub id_number: String,
    pub name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub nationality: String,
    pub place_of_origin: String,
    pub place_of_residence: String,
    pub expiry_date: String,
    /// Every classified line's normalized text, in input order.
    pub raw_lines: Vec<String>,
}

impl CccdRecord {
    /// Returns the value of a field.
    pub fn get(&self, field: CccdField) -> &str {
        match field {
            CccdField::Title => &self.title,
            CccdField::Subtitle => &self.subtitle,
            CccdField::IdNumber => &self.id_number,
            CccdField::Name => &self.name,
            CccdField::DateOfBirth => &self.date_of_birth,
            CccdField::Gender => &self.gender,
            CccdField::Nationality => &self.nationality,
            CccdField::PlaceOfOrigin => &self.place_of_origin,
            CccdField::PlaceOfResidence => &self.place_of_residence,
            CccdField::ExpiryDate => &self.expiry_date,
        }
    }

    /// Overwrites the value of a field.
    pub fn set(&mut self, field: CccdField, value: String) {
        let slot = match field {
            CccdField::Title => &mut self.title,
            CccdField::Subtitle => &mut self.subtitle,
            CccdField::IdNumber => &mut self.id_number,
            CccdField::Name => &mut self.name,
            CccdField::DateOfBirth => &mut self.date_of_birth,
            CccdField::Gender => &mut self.gender,
            CccdField::Nationality => &mut self.nationality,
            CccdField::PlaceOfOrigin => &mut self.place_of_origin,
            CccdField::PlaceOfResidence => &mut self.place_of_residence,
            CccdField::ExpiryDate => &mut self.expiry_date,
        };
        *slot = value;
    }

    /// Fields holding a non-empty value.
    pub fn filled_fields(&self) -> impl Iterator<Item = CccdField> + '_ {
        CccdField::ALL
            .into_iter()
            .filter(|&field| !self.get(field).is_empty())
    }
}

/// One classification rule: a predicate over the line and how to read the
/// field value from it.
///
/// `matches` receives the upper-cased text and the text itself. `extract`
/// returns `None` when the line belongs to the field but carries no usable
/// value; the line is still consumed.
struct FieldRule {
    field: CccdField,
    matches: fn(&str, &str) -> bool,
    extract: fn(&str) -> Option<String>,
}

/// Rules in precedence order. The first matching rule claims the line.
static FIELD_RULES: [FieldRule; 10] = [
    FieldRule {
        field: CccdField::Title,
        matches: is_title,
        extract: whole_line,
    },
    FieldRule {
        field: CccdField::Subtitle,
        matches: is_subtitle,
        extract: whole_line,
    },
    FieldRule {
        field: CccdField::IdNumber,
        matches: is_id_number,
        extract: first_id_number,
    },
    FieldRule {
        field: CccdField::Name,
        matches: is_name,
        extract: name_value,
    },
    FieldRule {
        field: CccdField::DateOfBirth,
        matches: is_date_of_birth,
        extract: first_date,
    },
    FieldRule {
        field: CccdField::Gender,
        matches: is_gender,
        extract: gender_value,
    },
    FieldRule {
        field: CccdField::Nationality,
        matches: is_nationality,
        extract: nationality_value,
    },
    FieldRule {
        field: CccdField::PlaceOfOrigin,
        matches: is_place_of_origin,
        extract: place_of_origin_value,
    },
    FieldRule {
        field: CccdField::PlaceOfResidence,
        matches: is_place_of_residence,
        extract: place_of_residence_value,
    },
    FieldRule {
        field: CccdField::ExpiryDate,
        matches: is_expiry_date,
        extract: first_date,
    },
];

fn is_title(upper: &str, _text: &str) -> bool {
    upper.contains("CĂN CƯỚC CÔNG DÂN") || upper.contains("CCCD")
}

fn is_subtitle(upper: &str, _text: &str) -> bool {
    upper.contains("ĐỘC LẬP") && upper.contains("TỰ DO")
}

fn is_id_number(upper: &str, text: &str) -> bool {
    upper.contains("SỐ:") || BARE_ID_NUMBER_REGEX.is_match(text)
}

fn is_name(upper: &str, _text: &str) -> bool {
    upper.contains("HỌ VÀ TÊN") || upper.contains("TÊN:")
}

fn is_date_of_birth(upper: &str, _text: &str) -> bool {
    upper.contains("NGÀY SINH") || upper.contains("SINH:")
}

fn is_gender(upper: &str, _text: &str) -> bool {
    upper.contains("GIỚI TÍNH") || upper == "NAM" || upper == "NỮ"
}

fn is_nationality(upper: &str, _text: &str) -> bool {
    upper.contains("QUỐC TỊCH") || upper.contains("VIỆT NAM")
}

fn is_place_of_origin(upper: &str, _text: &str) -> bool {
    upper.contains("QUÊ QUÁN")
}

fn is_place_of_residence(upper: &str, _text: &str) -> bool {
    upper.contains("THƯỜNG TRÚ")
}

fn is_expiry_date(upper: &str, _text: &str) -> bool {
    upper.contains("GIÁ TRỊ ĐẾN") || upper.contains("HẾT HẠN")
}

fn whole_line(text: &str) -> Option<String> {
    Some(text.to_string())
}

fn first_id_number(text: &str) -> Option<String> {
    ID_NUMBER_REGEX.find(text).map(|m| m.as_str().to_string())
}

fn first_date(text: &str) -> Option<String> {
    DATE_REGEX.find(text).map(|m| m.as_str().replace('-', "/"))
}

fn strip_label(label: &Regex, text: &str) -> String {
    label.replacen(text, 1, "").trim().to_string()
}

fn name_value(text: &str) -> Option<String> {
    Some(strip_label(&NAME_LABEL_REGEX, text))
}

fn gender_value(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    if upper.contains("NAM") {
        Some("Nam".to_string())
    } else if upper.contains("NỮ") {
        Some("Nữ".to_string())
    } else {
        None
    }
}

// Only Vietnamese nationality is recognized.
fn nationality_value(text: &str) -> Option<String> {
    let remainder = strip_label(&NATIONALITY_LABEL_REGEX, text);
    remainder
        .to_uppercase()
        .contains("VIỆT")
        .then(|| "Việt Nam".to_string())
}

fn place_of_origin_value(text: &str) -> Option<String> {
    Some(strip_label(&ORIGIN_LABEL_REGEX, text))
}

fn place_of_residence_value(text: &str) -> Option<String> {
    Some(strip_label(&RESIDENCE_LABEL_REGEX, text))
}

/// Assigns normalized card lines to [`CccdRecord`] fields.
///
/// Lines are visited in order and each is claimed by at most one field, the
/// first in this precedence:
///
/// 1. title: contains `CĂN CƯỚC CÔNG DÂN` or `CCCD`
/// 2. subtitle: contains both `ĐỘC LẬP` and `TỰ DO`
/// 3. id_number: contains `SỐ:` or is exactly twelve digits
/// 4. name: contains `HỌ VÀ TÊN` or `TÊN:`
/// 5. date_of_birth: contains `NGÀY SINH` or `SINH:`
/// 6. gender: contains `GIỚI TÍNH` or is exactly `NAM` / `NỮ`
/// 7. nationality: contains `QUỐC TỊCH` or `VIỆT NAM`
/// 8. place_of_origin: contains `QUÊ QUÁN`
/// 9. place_of_residence: contains `THƯỜNG TRÚ`
/// 10. expiry_date: contains `GIÁ TRỊ ĐẾN` or `HẾT HẠN`
///
/// Matching is on the upper-cased line. A later line claiming the same field
/// overwrites the earlier value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor;

impl FieldExtractor {
    /// Creates the extractor.
    pub fn new() -> Self {
        Self
    }

    /// Returns the field a line would be assigned to, if any.
    pub fn classify(&self, text: &str) -> Option<CccdField> {
        let upper = text.to_uppercase();
        FIELD_RULES
            .iter()
            .find(|rule| (rule.matches)(&upper, text))
            .map(|rule| rule.field)
    }

    /// Builds a record from normalized lines.
    ///
    /// Every line is appended to `raw_lines`, whether or not it matched.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> CccdRecord {
        let mut record = CccdRecord::default();
        for line in lines {
            let text = line.as_ref();
            record.raw_lines.push(text.to_string());

            let upper = text.to_uppercase();
            let Some(rule) = FIELD_RULES.iter().find(|rule| (rule.matches)(&upper, text)) else {
                continue;
            };
            if let Some(value) = (rule.extract)(text) {
                record.set(rule.field, value);
            }
        }

        tracing::debug!(
            "Extracted {} fields from {} lines",
            record.filled_fields().count(),
            lines.len()
        );
        record
    }
}
