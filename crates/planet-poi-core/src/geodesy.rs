// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

//! Great-circle navigation on a spherical body and Elite Dangerous body-name helpers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Radius used when the dashboard does not report one.
pub const DEFAULT_PLANET_RADIUS_M: f64 = 1_000_000.0;

/// Returns `(distance_m, bearing_deg)` from point 1 to point 2.
///
/// Distance is the haversine surface distance, optionally combined with the
/// altitude difference. Bearing is the initial true bearing in `[0, 360)`.
/// Inputs are taken as-is; callers own range validation.
#[allow(clippy::too_many_arguments)]
pub fn bearing_and_distance(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    radius_m: f64,
    alt1: f64,
    alt2: f64,
    with_altitude: bool,
) -> (f64, f64) {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    // Rounding can push `a` a hair past 1 for antipodal points.
    let a = ((d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let surface_distance = radius_m * c;

    let distance = if with_altitude {
        let delta_alt = alt2 - alt1;
        (surface_distance.powi(2) + delta_alt.powi(2)).sqrt()
    } else {
        surface_distance
    };

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    let bearing = (y.atan2(x).to_degrees() + 360.0) % 360.0;

    (distance, bearing)
}

/// Surface-only shorthand for [`bearing_and_distance`].
pub fn surface_bearing_and_distance(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    radius_m: f64,
) -> (f64, f64) {
    bearing_and_distance(lat1, lon1, lat2, lon2, radius_m, 0.0, 0.0, false)
}

/// Wraps an angle into `(-180, 180]`.
pub fn normalize_deg(mut angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    while angle > 180.0 {
        angle -= 360.0;
    }
    while angle <= -180.0 {
        angle += 360.0;
    }
    angle
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Megameters,
}

impl DistanceUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Megameters => "Mm",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Scales a distance in metres to m, km or Mm. Each step is a strict `>` check.
pub fn format_distance(distance_m: f64) -> (f64, DistanceUnit) {
    let mut value = distance_m;
    let mut unit = DistanceUnit::Meters;

    if value > 1_000.0 {
        value /= 1_000.0;
        unit = DistanceUnit::Kilometers;
    }
    if value > 1_000.0 {
        value /= 1_000.0;
        unit = DistanceUnit::Megameters;
    }

    (value, unit)
}

/// Human text for a distance: whole metres, otherwise one decimal.
pub fn distance_text(distance_m: f64) -> String {
    let (value, unit) = format_distance(distance_m);
    match unit {
        DistanceUnit::Meters => format!("{}{}", value.round(), unit),
        _ => format!("{:.1}{}", value, unit),
    }
}

/// Normalizes a typed body designation, e.g. `"c11b"` to `"C 11 b"`.
///
/// Whitespace is dropped, then every pair of neighbouring characters is
/// separated by one space unless both are ASCII digits. Other Unicode
/// digits are spaced like letters.
pub fn format_body_designation(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = String::with_capacity(chars.len() * 2);

    for (i, &ch) in chars.iter().enumerate() {
        if i == 0 {
            out.extend(ch.to_uppercase());
            continue;
        }
        let prev = chars[i - 1];
        if !(prev.is_ascii_digit() && ch.is_ascii_digit()) {
            out.push(' ');
        }
        if ch.is_alphabetic() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }

    out
}

/// `system + " " + body`, or the system alone when the body is empty.
pub fn full_body_name(system: &str, body: &str) -> String {
    if body.is_empty() {
        system.to_string()
    } else {
        format!("{} {}", system, body)
    }
}

fn is_star_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_uppercase())
}

fn is_moon_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_lowercase())
}

fn starts_with_digit(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Splits `"HIP 36601 C 3 b"` into `("HIP 36601", "C 3 b")`.
///
/// Scans from the right: trailing single lowercase moon letters, then a
/// planet index starting with a digit, then an optional single uppercase
/// star letter. Without a planet index the whole name is the system.
///
/// Names of fewer than three tokens are always system-only, so `"Sol 3"`
/// gives `("Sol 3", "")` even though `3` reads as a planet index. Old
/// POI files and body-only share links have always been split this way.
/// This is a heuristic; survey names ending in digit tokens can be mis-split.
pub fn split_system_and_body(full_name: &str) -> (String, String) {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    if tokens.len() < 3 {
        return (tokens.join(" "), String::new());
    }

    let mut start = tokens.len();
    while start > 1 && is_moon_token(tokens[start - 1]) {
        start -= 1;
    }

    if start > 1 && starts_with_digit(tokens[start - 1]) {
        start -= 1;
        if start > 1 && is_star_token(tokens[start - 1]) {
            start -= 1;
        }
    } else {
        return (tokens.join(" "), String::new());
    }

    (tokens[..start].join(" "), tokens[start..].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADIUS: f64 = 2_000_000.0;

    #[test]
    fn test_same_point_is_zero() {
        let (d, b) = bearing_and_distance(12.5, -40.0, 12.5, -40.0, RADIUS, 0.0, 0.0, false);
        assert_eq!(d, 0.0);
        assert_eq!(b, 0.0);
        assert!(!d.is_nan() && !b.is_nan());
    }

    #[test]
    fn test_cardinal_bearings() {
        let (_, north) = surface_bearing_and_distance(0.0, 0.0, 1.0, 0.0, RADIUS);
        let (_, east) = surface_bearing_and_distance(0.0, 0.0, 0.0, 1.0, RADIUS);
        let (_, south) = surface_bearing_and_distance(0.0, 0.0, -1.0, 0.0, RADIUS);
        let (_, west) = surface_bearing_and_distance(0.0, 0.0, 0.0, -1.0, RADIUS);
        assert!(north.abs() < 1e-9);
        assert!((east - 90.0).abs() < 1e-9);
        assert!((south - 180.0).abs() < 1e-9);
        assert!((west - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_quarter_circumference() {
        let (d, _) = surface_bearing_and_distance(0.0, 0.0, 0.0, 90.0, RADIUS);
        let expected = RADIUS * std::f64::consts::FRAC_PI_2;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_altitude_is_pythagorean() {
        let (surface, _) = surface_bearing_and_distance(0.0, 0.0, 0.0, 0.01, RADIUS);
        let (d, _) = bearing_and_distance(0.0, 0.0, 0.0, 0.01, RADIUS, 300.0, 0.0, true);
        assert!((d - (surface.powi(2) + 300.0f64.powi(2)).sqrt()).abs() < 1e-9);

        let (ignored, _) = bearing_and_distance(0.0, 0.0, 0.0, 0.01, RADIUS, 300.0, 0.0, false);
        assert_eq!(ignored, surface);
    }

    #[test]
    fn test_antipodal_does_not_nan() {
        let (d, b) = surface_bearing_and_distance(10.0, 20.0, -10.0, -160.0, RADIUS);
        assert!(d.is_finite());
        assert!((0.0..360.0).contains(&b));
    }

    #[test]
    fn test_normalize_deg() {
        assert_eq!(normalize_deg(190.0), -170.0);
        assert_eq!(normalize_deg(-190.0), 170.0);
        assert_eq!(normalize_deg(180.0), 180.0);
        assert_eq!(normalize_deg(-180.0), 180.0);
        assert_eq!(normalize_deg(720.0 + 45.0), 45.0);
        assert_eq!(normalize_deg(0.0), 0.0);
    }

    #[test]
    fn test_format_distance_units() {
        assert_eq!(format_distance(999.0), (999.0, DistanceUnit::Meters));
        assert_eq!(format_distance(1000.0), (1000.0, DistanceUnit::Meters));
        assert_eq!(format_distance(1500.0), (1.5, DistanceUnit::Kilometers));
        assert_eq!(format_distance(1_000_000.0), (1000.0, DistanceUnit::Kilometers));
        assert_eq!(format_distance(1_500_000.0), (1.5, DistanceUnit::Megameters));
    }

    #[test]
    fn test_distance_text() {
        assert_eq!(distance_text(512.4), "512m");
        assert_eq!(distance_text(2_345.0), "2.3km");
        assert_eq!(distance_text(4_200_000.0), "4.2Mm");
    }

    #[test]
    fn test_format_body_designation() {
        assert_eq!(format_body_designation("c1ab"), "C 1 a b");
        assert_eq!(format_body_designation("c11b"), "C 11 b");
        assert_eq!(format_body_designation("2a"), "2 a");
        assert_eq!(format_body_designation("B3CD"), "B 3 c d");
        assert_eq!(format_body_designation(" a 1 2 "), "A 12");
        assert_eq!(format_body_designation(""), "");
        assert_eq!(format_body_designation("   "), "");
    }

    #[test]
    fn test_full_body_name() {
        assert_eq!(full_body_name("HIP 36601", "C 3 b"), "HIP 36601 C 3 b");
        assert_eq!(full_body_name("Sol", ""), "Sol");
    }

    #[test]
    fn test_split_secondary_star_planet() {
        assert_eq!(
            split_system_and_body("HIP 36601 C 3 b"),
            ("HIP 36601".to_string(), "C 3 b".to_string())
        );
        assert_eq!(
            split_system_and_body("Pleione B 5 c"),
            ("Pleione".to_string(), "B 5 c".to_string())
        );
        assert_eq!(
            split_system_and_body("LHS 3447 A 2"),
            ("LHS 3447".to_string(), "A 2".to_string())
        );
    }

    #[test]
    fn test_split_primary_planet_and_moon() {
        assert_eq!(
            split_system_and_body("Synuefe XR-H d11-102 1 a"),
            ("Synuefe XR-H d11-102".to_string(), "1 a".to_string())
        );
        assert_eq!(
            split_system_and_body("Col 285 Sector 4"),
            ("Col 285 Sector".to_string(), "4".to_string())
        );
        assert_eq!(
            split_system_and_body("HIP 36601 C 1 a b"),
            ("HIP 36601".to_string(), "C 1 a b".to_string())
        );
    }

    #[test]
    fn test_split_system_only() {
        assert_eq!(
            split_system_and_body("Shinrarta Dezhra"),
            ("Shinrarta Dezhra".to_string(), String::new())
        );
        assert_eq!(
            split_system_and_body("HIP 36601"),
            ("HIP 36601".to_string(), String::new())
        );
        assert_eq!(
            split_system_and_body("Eol Prou RS-T d3-94"),
            ("Eol Prou RS-T d3-94".to_string(), String::new())
        );
        assert_eq!(split_system_and_body(""), (String::new(), String::new()));
    }
}
