// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

//! Share links: a POI as base64url JSON in the fragment of a fixed URL.

use crate::geodesy::split_system_and_body;
use crate::store::{Coordinates, Poi};
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub const SHARE_BASE_URL: &str = "https://bbbkada.github.io/EDMC-PlanetPOI/share/";
pub const SHARE_VERSION: i64 = 1;

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Link has no '#' fragment")]
    MissingFragment,
    #[error("Invalid base64 in link: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid POI data in link: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported share link version: {0:?}")]
    UnsupportedVersion(Option<i64>),
    #[error("Share link is missing '{0}'")]
    MissingField(&'static str),
}

#[derive(Serialize)]
struct OutgoingPayload<'a> {
    v: i64,
    system: &'a str,
    body: &'a str,
    #[serde(with = "crate::store::coordinate")]
    lat: Option<f64>,
    #[serde(with = "crate::store::coordinate")]
    lon: Option<f64>,
    description: &'a str,
    active: bool,
}

#[derive(Deserialize)]
struct IncomingPayload {
    #[serde(default)]
    v: Option<i64>,
    #[serde(default)]
    system: Option<String>,
    #[serde(default)]
    body: Option<String>,
    /// Outer `None` when the key is absent, inner `None` for `""` or `null`.
    #[serde(default, deserialize_with = "present_coordinate")]
    lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present_coordinate")]
    lon: Option<Option<f64>>,
    #[serde(default)]
    description: String,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

fn present_coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<f64>>, D::Error> {
    crate::store::coordinate::deserialize(deserializer).map(Some)
}

/// POI fields carried by a share link.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedPoi {
    pub system: String,
    pub body: String,
    pub coords: Option<Coordinates>,
    pub description: String,
    pub active: bool,
}

impl SharedPoi {
    pub fn into_poi(self) -> Poi {
        let mut poi = Poi::new(self.system, self.body, self.coords).with_description(self.description);
        poi.active = self.active;
        poi
    }
}

/// Builds the share URL for a POI. A POI without coordinates carries
/// `""` for both, as the plugin has always written them.
pub fn encode(poi: &Poi) -> String {
    let payload = OutgoingPayload {
        v: SHARE_VERSION,
        system: &poi.system,
        body: &poi.body,
        lat: poi.coords.map(|c| c.lat),
        lon: poi.coords.map(|c| c.lon),
        description: &poi.description,
        active: poi.active,
    };
    // Serializing plain strings and finite floats cannot fail; NaN becomes null.
    let json = serde_json::to_vec(&payload).unwrap_or_default();
    format!("{}#{}", SHARE_BASE_URL, URL_SAFE_NO_PAD.encode(json))
}

/// Parses a share URL. Both base64 alphabets are accepted, padding optional.
pub fn decode(url: &str) -> Result<SharedPoi, ShareError> {
    let (_, fragment) = url.split_once('#').ok_or(ShareError::MissingFragment)?;
    let mut token: String = fragment
        .trim()
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    if token.is_empty() {
        return Err(ShareError::MissingFragment);
    }
    let stripped = token.trim_end_matches('=').len();
    token.truncate(stripped);
    while token.len() % 4 != 0 {
        token.push('=');
    }

    let bytes = URL_SAFE.decode(token.as_bytes())?;
    let payload: IncomingPayload = serde_json::from_slice(&bytes)?;

    if payload.v != Some(SHARE_VERSION) {
        return Err(ShareError::UnsupportedVersion(payload.v));
    }

    let (system, body, coords) = match (payload.system, payload.body) {
        (Some(system), body) => {
            let lat = payload.lat.ok_or(ShareError::MissingField("lat"))?;
            let lon = payload.lon.ok_or(ShareError::MissingField("lon"))?;
            let coords = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
            (system, body.unwrap_or_default(), coords)
        }
        (None, Some(full)) => {
            let (system, body) = split_system_and_body(&full);
            let coords = payload
                .lat
                .flatten()
                .zip(payload.lon.flatten())
                .map(|(lat, lon)| Coordinates::new(lat, lon));
            (system, body, coords)
        }
        (None, None) => return Err(ShareError::MissingField("system")),
    };

    Ok(SharedPoi {
        system,
        body,
        coords,
        description: payload.description,
        active: payload.active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_for(json: &str) -> String {
        format!("{}#{}", SHARE_BASE_URL, URL_SAFE_NO_PAD.encode(json))
    }

    #[test]
    fn test_encode_shape() {
        let poi = Poi::new("Sol", "3", Some(Coordinates::new(1.5, -2.25))).with_description("Home");
        let url = encode(&poi);
        assert!(url.starts_with("https://bbbkada.github.io/EDMC-PlanetPOI/share/#"));
        let token = url.split_once('#').unwrap().1;
        assert!(!token.contains('='));

        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(token).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"v": 1, "system": "Sol", "body": "3", "lat": 1.5, "lon": -2.25,
                               "description": "Home", "active": true})
        );
    }

    #[test]
    fn test_round_trip() {
        let mut poi = Poi::new("HIP 36601", "C 3 b", Some(Coordinates::new(-67.1234, 127.5))).with_description("Shards ✓");
        poi.active = false;
        let shared = decode(&encode(&poi)).unwrap();
        assert_eq!(shared.clone().into_poi(), poi);
    }

    #[test]
    fn test_legacy_body_schema_is_split() {
        let shared = decode(&link_for(r#"{"v":1,"body":"HIP 36601 C 3 b","lat":1,"lon":2}"#)).unwrap();
        assert_eq!(shared.system, "HIP 36601");
        assert_eq!(shared.body, "C 3 b");
        assert_eq!(shared.coords, Some(Coordinates::new(1.0, 2.0)));
        assert!(shared.active);
    }

    #[test]
    fn test_standard_alphabet_and_padding_accepted() {
        let json = r#"{"v":1,"system":"Sol","body":"","lat":0.5,"lon":0.5,"description":"??>"}"#;
        let url = format!("x#{}", base64::engine::general_purpose::STANDARD.encode(json));
        assert_eq!(decode(&url).unwrap().description, "??>");
    }

    #[test]
    fn test_system_only_encodes_empty_coordinates() {
        let url = encode(&Poi::new("Sol", "", None));
        let token = url.split_once('#').unwrap().1;
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(token).unwrap()).unwrap();
        assert_eq!(json["lat"], "");
        assert_eq!(json["lon"], "");
    }

    #[test]
    fn test_empty_and_null_coordinates_decode_to_none() {
        let shared = decode(&link_for(
            r#"{"v":1,"system":"Sol","body":"","lat":"","lon":"","description":"Home","active":true}"#,
        ))
        .unwrap();
        assert_eq!(shared.system, "Sol");
        assert_eq!(shared.coords, None);
        assert_eq!(shared.description, "Home");

        let shared = decode(&link_for(r#"{"v":1,"system":"Sol","lat":null,"lon":null}"#)).unwrap();
        assert_eq!(shared.coords, None);

        let shared = decode(&link_for(r#"{"v":1,"system":"Sol","lat":"1,5","lon":"-2"}"#)).unwrap();
        assert_eq!(shared.coords, Some(Coordinates::new(1.5, -2.0)));
    }

    #[test]
    fn test_invalid_links() {
        assert!(matches!(decode("https://example.com/"), Err(ShareError::MissingFragment)));
        assert!(matches!(decode("x#"), Err(ShareError::MissingFragment)));
        assert!(matches!(decode("x#!!!!"), Err(ShareError::Base64(_))));
        assert!(matches!(decode(&link_for("not json")), Err(ShareError::Json(_))));
        assert!(matches!(
            decode(&link_for(r#"{"v":2,"system":"Sol","lat":1,"lon":1}"#)),
            Err(ShareError::UnsupportedVersion(Some(2)))
        ));
        assert!(matches!(
            decode(&link_for(r#"{"v":1,"system":"Sol","lat":1}"#)),
            Err(ShareError::MissingField("lon"))
        ));
        assert!(matches!(
            decode(&link_for(r#"{"v":1,"description":"x"}"#)),
            Err(ShareError::MissingField("system"))
        ));
    }
}
