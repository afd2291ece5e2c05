// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

//! Bearing/distance rows for the POIs on the current body, plus steering
//! guidance towards the first of them.
//!
//! Everything except the stop-zone bit is recomputed from scratch on each
//! position update.

use crate::geodesy::{bearing_and_distance, format_distance, normalize_deg, DistanceUnit};
use crate::settings::Settings;
use crate::store::{NodeId, Poi};
use serde::Serialize;

/// Deviation at which the arrow intensity saturates.
pub const MAX_DEVIATION_DEG: f64 = 90.0;
pub const MAX_ARROWS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuidanceConfig {
    pub on_course_deg: f64,
    pub stop_distance_m: f64,
    pub with_altitude: bool,
    /// Graphical heading guidance in the overlay.
    pub heading_enabled: bool,
    /// Guidance text in the host side panel.
    pub panel_enabled: bool,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl GuidanceConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            on_course_deg: settings.guidance_threshold as f64,
            stop_distance_m: settings.guidance_distance as f64,
            with_altitude: settings.calc_with_altitude,
            heading_enabled: settings.heading_guidance,
            panel_enabled: settings.show_gui_info,
        }
    }
}

/// Where the player is, as reported by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub altitude: f64,
    pub radius_m: f64,
    pub heading: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Zone {
    /// At or beyond the stop distance; directional guidance is shown.
    Approaching,
    /// This sample entered the stop zone. Fires once per entry.
    Arrived,
    /// Still inside the stop zone after arriving.
    WithinStop,
}

/// One bit of memory: were we inside the stop distance last time?
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneTracker {
    within: bool,
}

impl ZoneTracker {
    pub fn update(&mut self, distance_m: f64, stop_distance_m: f64) -> Zone {
        if distance_m < stop_distance_m {
            if self.within {
                Zone::WithinStop
            } else {
                self.within = true;
                Zone::Arrived
            }
        } else {
            self.within = false;
            Zone::Approaching
        }
    }

    pub fn reset(&mut self) {
        self.within = false;
    }

    pub fn is_within(&self) -> bool {
        self.within
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Turn {
    Left,
    Right,
    None,
}

/// Course correction towards a bearing, independent of distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Steering {
    /// Positive means turn right.
    pub deviation_deg: f64,
    pub on_course: bool,
    pub arrow_count: u8,
}

impl Steering {
    pub fn new(bearing_deg: f64, heading_deg: f64, on_course_deg: f64) -> Self {
        let deviation_deg = normalize_deg(bearing_deg - heading_deg);
        let abs_dev = deviation_deg.abs();
        let on_course = abs_dev <= on_course_deg;

        let arrow_count = if on_course {
            0
        } else {
            let span = MAX_DEVIATION_DEG - on_course_deg;
            let fraction = if span > 0.0 {
                ((abs_dev - on_course_deg) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            ((fraction * MAX_ARROWS as f64).floor() as u8 + 1).clamp(1, MAX_ARROWS)
        };

        Self {
            deviation_deg,
            on_course,
            arrow_count,
        }
    }

    pub fn turn(&self) -> Turn {
        if self.on_course {
            Turn::None
        } else if self.deviation_deg < 0.0 {
            Turn::Left
        } else {
            Turn::Right
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuidanceState {
    pub distance_m: f64,
    pub bearing_deg: f64,
    pub deviation_deg: f64,
    pub on_course: bool,
    pub arrow_count: u8,
    pub zone: Zone,
}

impl GuidanceState {
    pub fn steering(&self) -> Steering {
        Steering {
            deviation_deg: self.deviation_deg,
            on_course: self.on_course,
            arrow_count: self.arrow_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiRow {
    pub node: NodeId,
    pub text: String,
    pub is_target: bool,
    /// `None` for POIs without surface coordinates.
    pub distance_m: Option<f64>,
    pub bearing_deg: Option<f64>,
}

/// Text guidance for the host side panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelGuidance {
    pub left: String,
    pub center: String,
    pub right: String,
    pub on_course: bool,
    /// `"{label} - {bearing}°/ {distance}"` for the target POI.
    pub target_label: String,
}

/// Everything derived from one position sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GuidanceFrame {
    pub rows: Vec<PoiRow>,
    /// Present when heading guidance is enabled and a heading is known.
    pub guidance: Option<GuidanceState>,
    /// Present while outside the stop distance with the panel enabled.
    pub panel: Option<PanelGuidance>,
}

impl GuidanceFrame {
    pub fn target(&self) -> Option<&PoiRow> {
        self.rows.first().filter(|r| r.is_target)
    }
}

/// `"{bearing}°/ {distance}{unit}"`.
pub fn bearing_distance_text(bearing_deg: f64, distance_m: f64) -> String {
    let (value, unit) = format_distance(distance_m);
    match unit {
        DistanceUnit::Meters => format!("{}°/ {}{}", bearing_deg.round(), value.round(), unit),
        _ => format!("{}°/ {:.1}{}", bearing_deg.round(), value, unit),
    }
}

#[derive(Debug, Clone, Default)]
pub struct GuidanceEngine {
    config: GuidanceConfig,
    zone: ZoneTracker,
}

impl GuidanceEngine {
    pub fn new(config: GuidanceConfig) -> Self {
        Self {
            config,
            zone: ZoneTracker::default(),
        }
    }

    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GuidanceConfig) {
        self.config = config;
    }

    /// Forgets the stop-zone state, e.g. after leaving the body.
    pub fn reset(&mut self) {
        self.zone.reset();
    }

    pub fn within_stop_zone(&self) -> bool {
        self.zone.is_within()
    }

    /// Builds rows for `pois` (the active POIs on the current body, in
    /// store order) and guidance towards the first one.
    pub fn evaluate<'a, I>(&mut self, position: &Position, pois: I) -> GuidanceFrame
    where
        I: IntoIterator<Item = (NodeId, &'a Poi)>,
    {
        let cfg = self.config;
        let mut frame = GuidanceFrame::default();
        let mut target_fix = None;

        for (idx, (node, poi)) in pois.into_iter().enumerate() {
            let label = poi.label();
            let Some(coords) = poi.coords else {
                frame.rows.push(PoiRow {
                    node,
                    text: label,
                    is_target: false,
                    distance_m: None,
                    bearing_deg: None,
                });
                continue;
            };

            let (distance, bearing) = bearing_and_distance(
                position.lat,
                position.lon,
                coords.lat,
                coords.lon,
                position.radius_m,
                position.altitude,
                0.0,
                cfg.with_altitude,
            );
            let text = format!("{} {}", bearing_distance_text(bearing, distance), label);
            if idx == 0 {
                target_fix = Some((distance, bearing, label));
            }
            frame.rows.push(PoiRow {
                node,
                text,
                is_target: idx == 0 && cfg.heading_enabled,
                distance_m: Some(distance),
                bearing_deg: Some(bearing),
            });
        }

        let (Some((distance, bearing, label)), Some(heading)) = (target_fix, position.heading) else {
            return frame;
        };
        let steering = Steering::new(bearing, heading, cfg.on_course_deg);

        if cfg.heading_enabled {
            let zone = self.zone.update(distance, cfg.stop_distance_m);
            if zone == Zone::Arrived {
                log::info!("Arrived at '{}' ({:.0} m)", label, distance);
            }
            frame.guidance = Some(GuidanceState {
                distance_m: distance,
                bearing_deg: bearing,
                deviation_deg: steering.deviation_deg,
                on_course: steering.on_course,
                arrow_count: steering.arrow_count,
                zone,
            });
        }

        if cfg.panel_enabled && distance >= cfg.stop_distance_m {
            let arrows = |side: Turn, glyph: &str| {
                if steering.turn() == side {
                    glyph.repeat(steering.arrow_count as usize)
                } else {
                    String::new()
                }
            };
            let center = bearing_distance_text(bearing, distance);
            frame.panel = Some(PanelGuidance {
                left: arrows(Turn::Left, "<"),
                right: arrows(Turn::Right, ">"),
                target_label: format!("{} - {}", label, center),
                center,
                on_course: steering.on_course,
            });
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Coordinates;

    fn here(heading: Option<f64>) -> Position {
        Position {
            lat: 0.0,
            lon: 0.0,
            altitude: 0.0,
            radius_m: 1_000_000.0,
            heading,
        }
    }

    fn poi_at(lat: f64, lon: f64, desc: &str) -> Poi {
        Poi::new("Sol", "3", Some(Coordinates::new(lat, lon))).with_description(desc)
    }

    #[test]
    fn test_steering_arrow_levels() {
        let on = Steering::new(92.0, 90.0, 4.0);
        assert!(on.on_course);
        assert_eq!(on.arrow_count, 0);
        assert_eq!(on.turn(), Turn::None);

        let slight = Steering::new(100.0, 90.0, 4.0);
        assert_eq!(slight.arrow_count, 1);
        assert_eq!(slight.turn(), Turn::Right);

        // (60 - 4) / 86 = 0.65 -> floor(2.6) + 1
        let mid = Steering::new(30.0, 90.0, 4.0);
        assert_eq!(mid.arrow_count, 3);
        assert_eq!(mid.turn(), Turn::Left);

        let behind = Steering::new(270.0, 90.0, 4.0);
        assert_eq!(behind.deviation_deg, 180.0);
        assert_eq!(behind.arrow_count, 4);
    }

    #[test]
    fn test_steering_wraps_through_north() {
        let s = Steering::new(5.0, 355.0, 4.0);
        assert!((s.deviation_deg - 10.0).abs() < 1e-9);
        assert_eq!(s.turn(), Turn::Right);
    }

    #[test]
    fn test_zone_tracker_edge_trigger() {
        let mut z = ZoneTracker::default();
        assert_eq!(z.update(2500.0, 2000.0), Zone::Approaching);
        assert_eq!(z.update(1800.0, 2000.0), Zone::Arrived);
        assert_eq!(z.update(1500.0, 2000.0), Zone::WithinStop);
        assert_eq!(z.update(2000.0, 2000.0), Zone::Approaching);
        assert_eq!(z.update(1999.0, 2000.0), Zone::Arrived);
        z.reset();
        assert!(!z.is_within());
    }

    #[test]
    fn test_rows_and_target() {
        let a = poi_at(0.0, 1.0, "East");
        let b = poi_at(1.0, 0.0, "");
        let c = Poi::new("Sol", "3", None).with_description("Somewhere");
        let pois = vec![(NodeId(0), &a), (NodeId(1), &b), (NodeId(2), &c)];

        let mut engine = GuidanceEngine::default();
        let frame = engine.evaluate(&here(Some(90.0)), pois);

        assert_eq!(frame.rows.len(), 3);
        assert!(frame.rows[0].is_target);
        assert!(!frame.rows[1].is_target);
        // 1 degree on a 1000 km radius is 17.45 km.
        assert_eq!(frame.rows[0].text, "90°/ 17.5km East");
        assert_eq!(frame.rows[1].text, "0°/ 17.5km 1.0000, 0.0000");
        assert_eq!(frame.rows[2].text, "Somewhere");
        assert_eq!(frame.rows[2].distance_m, None);

        let g = frame.guidance.unwrap();
        assert!(g.on_course);
        assert_eq!(g.zone, Zone::Approaching);

        let panel = frame.panel.unwrap();
        assert_eq!(panel.center, "90°/ 17.5km");
        assert!(panel.left.is_empty() && panel.right.is_empty());
        assert_eq!(panel.target_label, "East - 90°/ 17.5km");
    }

    #[test]
    fn test_no_heading_means_rows_only() {
        let a = poi_at(0.0, 1.0, "East");
        let mut engine = GuidanceEngine::default();
        let frame = engine.evaluate(&here(None), vec![(NodeId(0), &a)]);
        assert_eq!(frame.rows.len(), 1);
        assert!(frame.guidance.is_none());
        assert!(frame.panel.is_none());
        assert!(!engine.within_stop_zone());
    }

    #[test]
    fn test_coordinate_less_first_poi_gets_no_guidance() {
        let a = Poi::new("Sol", "3", None);
        let b = poi_at(0.0, 1.0, "East");
        let mut engine = GuidanceEngine::default();
        let frame = engine.evaluate(&here(Some(0.0)), vec![(NodeId(0), &a), (NodeId(1), &b)]);
        assert!(frame.target().is_none());
        assert!(frame.guidance.is_none());
    }

    #[test]
    fn test_panel_arrows_and_stop_distance() {
        let a = poi_at(0.0, 1.0, "East");
        let mut engine = GuidanceEngine::default();

        // Heading north, target due east: 90 degrees off -> 4 right arrows.
        let frame = engine.evaluate(&here(Some(0.0)), vec![(NodeId(0), &a)]);
        let panel = frame.panel.unwrap();
        assert_eq!(panel.right, ">>>>");
        assert!(panel.left.is_empty());
        assert!(!panel.on_course);

        let frame = engine.evaluate(&here(Some(150.0)), vec![(NodeId(0), &a)]);
        assert_eq!(frame.panel.unwrap().left, "<<<");

        let close = poi_at(0.0, 0.01, "Close");
        let frame = engine.evaluate(&here(Some(90.0)), vec![(NodeId(0), &close)]);
        assert!(frame.panel.is_none());
        assert_eq!(frame.guidance.unwrap().zone, Zone::Arrived);
    }

    #[test]
    fn test_heading_guidance_disabled() {
        let a = poi_at(0.0, 1.0, "East");
        let mut engine = GuidanceEngine::new(GuidanceConfig {
            heading_enabled: false,
            ..GuidanceConfig::default()
        });
        let frame = engine.evaluate(&here(Some(90.0)), vec![(NodeId(0), &a)]);
        assert!(!frame.rows[0].is_target);
        assert!(frame.guidance.is_none());
        assert!(frame.panel.is_some());
    }
}
