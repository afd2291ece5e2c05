// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

//! Plugin state between host callbacks: the POI store, settings, the last
//! known position and the guidance engine.

use crate::geodesy::{split_system_and_body, DEFAULT_PLANET_RADIUS_M};
use crate::guidance::{GuidanceConfig, GuidanceEngine, GuidanceFrame, Position};
use crate::overlay::{self, OverlayLayout, OverlayTransport};
use crate::settings::{ConfigStore, Settings};
use crate::store::{NodeId, Poi, PoiStore};
use crate::PoiError;
use anyhow::Result;
use serde::Deserialize;

/// One dashboard (Status.json) sample. Fields vanish when not on a surface.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DashboardEntry {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub body_name: Option<String>,
    #[serde(default)]
    pub planet_radius: Option<f64>,
}

/// The journal fields we look at. Everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JournalEntry {
    pub event: String,
    #[serde(rename = "StarSystem", default)]
    pub star_system: Option<String>,
}

impl JournalEntry {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            star_system: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.star_system = Some(system.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SurfaceFix {
    lat: f64,
    lon: f64,
    altitude: f64,
    radius_m: f64,
}

#[derive(Debug)]
pub struct Session {
    store: PoiStore,
    settings: Settings,
    engine: GuidanceEngine,
    layout: OverlayLayout,
    current_system: Option<String>,
    body: Option<String>,
    fix: Option<SurfaceFix>,
    heading: Option<f64>,
    panel_visible: bool,
    last_frame: GuidanceFrame,
}

impl Session {
    pub fn new(store: PoiStore, settings: Settings) -> Self {
        Self {
            store,
            engine: GuidanceEngine::new(GuidanceConfig::from_settings(&settings)),
            layout: OverlayLayout::from_settings(&settings),
            settings,
            current_system: None,
            body: None,
            fix: None,
            heading: None,
            panel_visible: false,
            last_frame: GuidanceFrame::default(),
        }
    }

    pub fn store(&self) -> &PoiStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PoiStore {
        &mut self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_system(&self) -> Option<&str> {
        self.current_system.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    pub fn within_stop_zone(&self) -> bool {
        self.engine.within_stop_zone()
    }

    /// Current surface position, if the player is on a body with coordinates.
    pub fn position(&self) -> Option<Position> {
        self.fix.map(|fix| Position {
            lat: fix.lat,
            lon: fix.lon,
            altitude: fix.altitude,
            radius_m: fix.radius_m,
            heading: self.heading,
        })
    }

    /// The rows and guidance computed by the last refresh.
    pub fn last_frame(&self) -> &GuidanceFrame {
        &self.last_frame
    }

    /// POIs in the current system, for the side panel listing.
    pub fn system_pois(&self) -> Vec<(NodeId, &Poi)> {
        match self.current_system.as_deref() {
            Some(system) => self.store.pois_in_system(system).collect(),
            None => Vec::new(),
        }
    }

    /// Handles a dashboard sample. Returns true when the host panel needs
    /// a rebuild: body changed, first coordinates, or panel guidance
    /// appeared/disappeared.
    pub fn on_dashboard(&mut self, entry: &DashboardEntry, out: &mut dyn OverlayTransport) -> bool {
        if let Some(heading) = entry.heading {
            self.heading = Some(heading);
        }

        let Some(body) = entry.body_name.as_deref().filter(|b| !b.is_empty()) else {
            if self.body.is_none() {
                return false;
            }
            log::debug!("Left body {:?}; clearing guidance", self.body);
            self.body = None;
            self.fix = None;
            self.heading = None;
            self.panel_visible = false;
            self.engine.reset();
            self.last_frame = GuidanceFrame::default();
            overlay::clear_all(out, &self.layout);
            return true;
        };

        let body_changed = self.body.as_deref() != Some(body);
        if body_changed {
            log::debug!("Body changed — body={}", body);
            self.body = Some(body.to_string());
            // A fix on another body means nothing here.
            self.fix = None;
            self.engine.reset();
        }

        let mut first_coords = false;
        let has_coords = entry.latitude.is_some() && entry.longitude.is_some();
        if let (Some(lat), Some(lon)) = (entry.latitude, entry.longitude) {
            first_coords = self.fix.is_none();
            self.fix = Some(SurfaceFix {
                lat,
                lon,
                altitude: entry.altitude.unwrap_or(0.0),
                radius_m: entry
                    .planet_radius
                    .filter(|r| *r > 0.0)
                    .unwrap_or(DEFAULT_PLANET_RADIUS_M),
            });
        }

        let mut redraw = body_changed || first_coords;
        if redraw {
            self.panel_visible = false;
        }

        if has_coords {
            let panel_visible = self.refresh(out).panel.is_some();
            if panel_visible != self.panel_visible {
                self.panel_visible = panel_visible;
                redraw = true;
            }
        }
        redraw
    }

    /// Handles a journal event. Returns true when the host panel needs a rebuild.
    pub fn on_journal(&mut self, entry: &JournalEntry, out: &mut dyn OverlayTransport) -> bool {
        let mut redraw = false;

        if matches!(entry.event.as_str(), "FSDJump" | "SupercruiseEntry") {
            self.body = None;
            self.engine.reset();
            self.last_frame = GuidanceFrame::default();
            overlay::clear_all(out, &self.layout);
        }

        if let Some(system) = entry.star_system.as_deref().filter(|s| !s.is_empty()) {
            let arriving = matches!(entry.event.as_str(), "FSDJump" | "StartUp" | "Location");
            if arriving || self.current_system.is_none() {
                if self.current_system.as_deref() != Some(system) {
                    log::info!("Arriving at {}", system);
                }
                self.current_system = Some(system.to_string());
                redraw = true;
            }
        }

        redraw
    }

    /// Recomputes rows and guidance from the stored position and sends
    /// them to the overlay. Call after POIs change as well.
    pub fn refresh(&mut self, out: &mut dyn OverlayTransport) -> &GuidanceFrame {
        let position = self.position();
        let (Some(position), Some(body)) = (position, self.body.as_deref()) else {
            overlay::clear_all(out, &self.layout);
            self.last_frame = GuidanceFrame::default();
            return &self.last_frame;
        };

        let frame = self
            .engine
            .evaluate(&position, self.store.active_pois_on_body(body));
        overlay::render_frame(out, &self.layout, &frame, self.engine.config().on_course_deg);
        self.last_frame = frame;
        &self.last_frame
    }

    /// Stores a POI at the current surface position, at the root.
    pub fn save_current_location(&mut self, description: &str) -> Result<NodeId, PoiError> {
        let (Some(body), Some(fix)) = (self.body.as_deref(), self.fix) else {
            return Err(PoiError::NoSurfacePosition);
        };
        let (system, body) = split_system_and_body(body);
        let poi = Poi::new(system, body, Some(crate::store::Coordinates::new(fix.lat, fix.lon)))
            .with_description(description.trim());
        self.store.add_poi(None, poi)
    }

    /// Applies settings from the preferences panel and persists them.
    pub fn on_preferences_save(&mut self, settings: Settings, config: &mut dyn ConfigStore) -> Result<()> {
        settings.store(config);
        self.engine.set_config(GuidanceConfig::from_settings(&settings));
        self.layout = OverlayLayout::from_settings(&settings);
        self.settings = settings;
        config.flush()?;
        log::info!("Preferences saved");
        Ok(())
    }
}
