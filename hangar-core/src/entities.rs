//! Catalogue entity records.
//!
//! Foreign keys are plain codes. The matching `*_details` fields hold the
//! resolved referenced record and are only ever filled at read time; they
//! are cleared by [`Record::detached`] before anything is persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::{Record, TagEntry, TagSet};

/// Prefix of airline codes derived from an IATA designator.
pub const IATA_PREFIX: &str = "iata:";
/// Prefix of airline codes derived from an ICAO designator.
pub const ICAO_PREFIX: &str = "icao:";
/// Separator used when deriving model codes.
pub const MODEL_CODE_SEPARATOR: &str = "#";

// ============================================================================
// COUNTRY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Country {
    pub code: String,
    pub continent: String,
    pub name: String,
}

impl Record for Country {
    const ENTITY_NAME: &'static str = "country";

    fn code(&self) -> &str {
        &self.code
    }

    fn describe(&self) -> String {
        format!("country {} ({}, {})", self.code, self.name, self.continent)
    }

    fn tags(&self) -> Vec<TagEntry> {
        let mut tags = TagSet::new();
        tags.push(&self.code, &self.code, &self.name)
            .push(&self.name, &self.code, &self.name);
        tags.into_entries()
    }
}

// ============================================================================
// MODEL MAKE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelMake {
    pub code: String,
    pub name: String,
}

impl Record for ModelMake {
    const ENTITY_NAME: &'static str = "modelmake";

    fn code(&self) -> &str {
        &self.code
    }

    fn describe(&self) -> String {
        format!("modelmake {} ({})", self.code, self.name)
    }

    fn tags(&self) -> Vec<TagEntry> {
        let mut tags = TagSet::new();
        tags.push(&self.code, &self.code, &self.name)
            .push(&self.name, &self.code, &self.name);
        tags.into_entries()
    }
}

// ============================================================================
// AIRPLANE MAKE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AirplaneMake {
    pub code: String,
    pub name: String,
    pub abbreviation: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_details: Option<Country>,
}

impl Record for AirplaneMake {
    const ENTITY_NAME: &'static str = "airplanemake";

    fn code(&self) -> &str {
        &self.code
    }

    fn detached(&self) -> Self {
        Self {
            country_details: None,
            ..self.clone()
        }
    }

    fn describe(&self) -> String {
        format!(
            "airplanemake {} ({}) abbreviation={} country={}",
            self.code, self.name, self.abbreviation, self.country
        )
    }

    fn tags(&self) -> Vec<TagEntry> {
        let mut tags = TagSet::new();
        tags.push(&self.abbreviation, &self.code, &self.name)
            .push(&self.name, &self.code, &self.name);
        tags.into_entries()
    }
}

// ============================================================================
// AIRPLANE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Airplane {
    pub code: String,
    pub name: String,
    pub iata: String,
    pub icao: String,
    pub make: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make_details: Option<AirplaneMake>,
}

impl Record for Airplane {
    const ENTITY_NAME: &'static str = "airplane";

    fn code(&self) -> &str {
        &self.code
    }

    fn detached(&self) -> Self {
        Self {
            make_details: None,
            ..self.clone()
        }
    }

    fn describe(&self) -> String {
        format!(
            "airplane {} ({}) iata={} icao={} make={}",
            self.code, self.name, self.iata, self.icao, self.make
        )
    }

    fn tags(&self) -> Vec<TagEntry> {
        let mut tags = TagSet::new();
        tags.push(&self.iata, &self.code, &self.name)
            .push(&self.icao, &self.code, &self.name)
            .push(&self.name, &self.code, &self.name);
        tags.into_entries()
    }
}

// ============================================================================
// AIRLINE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Airline {
    pub code: String,
    pub name: String,
    pub iata: String,
    pub icao: String,
    pub callsign: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_details: Option<Country>,
}

impl Airline {
    /// Code derived from the designators: IATA first, then ICAO.
    pub fn derive_code(&self) -> Option<String> {
        if !self.iata.is_empty() {
            Some(format!("{}{}", IATA_PREFIX, self.iata.to_lowercase()))
        } else if !self.icao.is_empty() {
            Some(format!("{}{}", ICAO_PREFIX, self.icao.to_lowercase()))
        } else {
            None
        }
    }

    /// Candidate codes tried, in order, when looking an airline up.
    pub fn lookup_candidates(code: &str) -> Vec<String> {
        if code.starts_with(IATA_PREFIX) || code.starts_with(ICAO_PREFIX) {
            return vec![code.to_string()];
        }
        vec![
            code.to_string(),
            format!("{}{}", IATA_PREFIX, code),
            format!("{}{}", ICAO_PREFIX, code),
        ]
    }
}

impl Record for Airline {
    const ENTITY_NAME: &'static str = "airline";

    fn code(&self) -> &str {
        &self.code
    }

    fn detached(&self) -> Self {
        Self {
            country_details: None,
            ..self.clone()
        }
    }

    fn describe(&self) -> String {
        format!(
            "airline {} ({}) iata={} icao={} callsign={} country={}",
            self.code, self.name, self.iata, self.icao, self.callsign, self.country
        )
    }

    fn prepare_for_write(&mut self) -> Result<(), ValidationError> {
        if self.code.is_empty() {
            self.code = self.derive_code().ok_or_else(|| ValidationError::InvalidValue {
                field: "code".to_string(),
                reason: "airline needs a code or an IATA/ICAO designator".to_string(),
            })?;
        }
        Ok(())
    }

    fn tags(&self) -> Vec<TagEntry> {
        let mut tags = TagSet::new();
        tags.push(&self.iata, &self.code, &self.name)
            .push(&self.icao, &self.code, &self.name)
            .push(&self.name, &self.code, &self.name);
        tags.into_entries()
    }
}

// ============================================================================
// MODEL
// ============================================================================

/// Die-cast scale of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelScale {
    #[serde(rename = "1/200")]
    OneTo200,
    #[serde(rename = "1/400")]
    OneTo400,
}

impl ModelScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelScale::OneTo200 => "1/200",
            ModelScale::OneTo400 => "1/400",
        }
    }
}

impl fmt::Display for ModelScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical model in the collection.
///
/// Stored in a sort-keyed table: the canonical row has `picture == code`
/// (read back as an empty `picture`), and every attached picture adds one
/// association row `{code, picture}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Model {
    pub code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub picture: String,

    pub model_make: String,
    pub airline: String,
    pub airplane: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ModelScale>,
    pub reg: String,
    pub notes: String,
    pub is_cargo: bool,
    pub is_old_livery: bool,
    pub is_special_livery: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub picture_list: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_make_details: Option<ModelMake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airline_details: Option<Airline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airplane_details: Option<Airplane>,
}

impl Model {
    /// Association row linking `code` to a stored picture.
    pub fn picture_link(code: &str, picture: &str) -> Self {
        Self {
            code: code.to_string(),
            picture: picture.to_string(),
            ..Self::default()
        }
    }

    /// `lower(modelMake#scale#reg)`, or `None` when the scale is unset.
    pub fn derive_code(&self) -> Option<String> {
        let scale = self.scale?;
        Some(
            [self.model_make.as_str(), scale.as_str(), self.reg.as_str()]
                .join(MODEL_CODE_SEPARATOR)
                .to_lowercase(),
        )
    }
}

impl Record for Model {
    const ENTITY_NAME: &'static str = "model";

    fn code(&self) -> &str {
        &self.code
    }

    fn sort_value(&self) -> &str {
        &self.picture
    }

    fn detached(&self) -> Self {
        Self {
            picture_list: Vec::new(),
            model_make_details: None,
            airline_details: None,
            airplane_details: None,
            ..self.clone()
        }
    }

    fn describe(&self) -> String {
        format!(
            "model {} make={} airline={} airplane={} scale={} reg={} cargo={} old_livery={} special_livery={}",
            self.code,
            self.model_make,
            self.airline,
            self.airplane,
            self.scale.map(|s| s.as_str()).unwrap_or("-"),
            self.reg,
            self.is_cargo,
            self.is_old_livery,
            self.is_special_livery
        )
    }

    fn prepare_for_write(&mut self) -> Result<(), ValidationError> {
        self.reg = self.reg.to_uppercase();
        if self.code.is_empty() {
            self.code = self
                .derive_code()
                .ok_or_else(|| ValidationError::RequiredFieldMissing {
                    field: "scale".to_string(),
                })?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
