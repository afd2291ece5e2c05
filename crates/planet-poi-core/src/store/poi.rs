// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

use super::record::{FolderRecord, PoiRecord};
use crate::geodesy::{full_body_name, split_system_and_body};
use crate::PoiError;
use serde::{Deserialize, Serialize};

/// A surface coordinate in degrees. Latitude and longitude only exist together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Builds coordinates from two optional halves, rejecting a lone half.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Result<Option<Self>, PoiError> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok(Some(Self { lat, lon })),
            (None, None) => Ok(None),
            _ => Err(PoiError::PartialCoordinates),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    pub system: String,
    pub body: String,
    pub coords: Option<Coordinates>,
    pub description: String,
    pub notes: String,
    pub active: bool,
}

impl Poi {
    pub fn new(system: impl Into<String>, body: impl Into<String>, coords: Option<Coordinates>) -> Self {
        Self {
            system: system.into(),
            body: body.into(),
            coords,
            description: String::new(),
            notes: String::new(),
            active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builds a POI from form text: a full body name plus coordinate fields.
    ///
    /// Both coordinates may be blank (system-only POI). Decimal commas are
    /// accepted.
    pub fn from_input(
        full_name: &str,
        lat_text: &str,
        lon_text: &str,
        description: &str,
    ) -> Result<Self, PoiError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(PoiError::EmptyField("System"));
        }

        let lat = parse_coordinate("latitude", lat_text)?;
        let lon = parse_coordinate("longitude", lon_text)?;
        let coords = Coordinates::from_parts(lat, lon)?;

        let (system, body) = split_system_and_body(full_name);
        Ok(Self::new(system, body, coords).with_description(description.trim()))
    }

    /// Derived, never stored.
    pub fn full_body_name(&self) -> String {
        full_body_name(&self.system, &self.body)
    }

    /// Description, or the coordinates when the description is empty.
    pub fn label(&self) -> String {
        if !self.description.is_empty() {
            return self.description.clone();
        }
        match self.coords {
            Some(c) => format!("{:.4}, {:.4}", c.lat, c.lon),
            None => "(No description)".to_string(),
        }
    }

    pub(crate) fn from_record(record: PoiRecord) -> Self {
        let coords = match Coordinates::from_parts(record.lat, record.lon) {
            Ok(coords) => coords,
            Err(_) => {
                log::warn!(
                    "POI '{}' on {} has only one coordinate; keeping it as system-only",
                    record.description,
                    full_body_name(&record.system, &record.body)
                );
                None
            }
        };
        Self {
            system: record.system,
            body: record.body,
            coords,
            description: record.description,
            notes: record.notes,
            active: record.active,
        }
    }

    pub(crate) fn to_record(&self) -> PoiRecord {
        PoiRecord {
            system: self.system.clone(),
            body: self.body.clone(),
            lat: self.coords.map(|c| c.lat),
            lon: self.coords.map(|c| c.lon),
            description: self.description.clone(),
            notes: self.notes.clone(),
            active: self.active,
        }
    }
}

/// Parses one coordinate field. Blank text is `None`.
pub fn parse_coordinate(field: &'static str, text: &str) -> Result<Option<f64>, PoiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| PoiError::InvalidNumber {
            field,
            value: trimmed.to_string(),
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub name: String,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub(crate) fn to_record(&self) -> FolderRecord {
        FolderRecord {
            name: self.name.clone(),
            children: Vec::new(),
        }
    }
}

/// A tree member. Folder children live in the arena, not in the value.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Poi(Poi),
    Folder(Folder),
}

impl Item {
    pub fn as_poi(&self) -> Option<&Poi> {
        match self {
            Item::Poi(p) => Some(p),
            Item::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Item::Folder(f) => Some(f),
            Item::Poi(_) => None,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Item::Folder(_))
    }
}

/// Field changes for an existing POI; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoiEdit {
    pub system: Option<String>,
    pub body: Option<String>,
    pub coords: Option<Option<Coordinates>>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl PoiEdit {
    pub(crate) fn apply(self, poi: &mut Poi) {
        if let Some(system) = self.system {
            poi.system = system;
        }
        if let Some(body) = self.body {
            poi.body = body;
        }
        if let Some(coords) = self.coords {
            poi.coords = coords;
        }
        if let Some(description) = self.description {
            poi.description = description;
        }
        if let Some(notes) = self.notes {
            poi.notes = notes;
        }
    }
}
