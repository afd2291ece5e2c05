// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

//! Decides what the in-game overlay shows. Delivery is up to an
//! [`OverlayTransport`]; a TTL of 0 removes a previously sent id.

use crate::guidance::{GuidanceFrame, PoiRow, Steering, Zone};
use crate::settings::Settings;
use serde::Serialize;
use std::io::Write;

pub const ROW_Y_START: i32 = 2;
pub const ROW_Y_STEP: i32 = 24;
pub const ROW_TTL: u32 = 30;
pub const BLANK_ROW_TTL: u32 = 8;
pub const INDICATOR_TTL: u32 = 15;

pub const TARGET_COLOR: &str = "#ff7100";
pub const PASSIVE_COLOR: &str = "#888888";
const BLANK_COLOR: &str = "#000000";
const ARROW_COLOR: &str = "#ff8800";
const ON_COURSE_COLOR: &str = "#00ff00";
const REFERENCE_COLOR: &str = "#ffffff";

const ARROW_BASE_LENGTH: f64 = 30.0;
const ARROW_MAX_LENGTH: f64 = 150.0;
const ARROW_HEAD_SIZE: i32 = 25;
const SHAFT_HEIGHT: i32 = 4;

const BAR_WIDTH: i32 = 50;
const BAR_HEIGHT: i32 = 32;
const BAR_MAX_OFFSET: i32 = 50;
const BAR_OFFSET_Y: i32 = 16;
const T_LINE: i32 = 3;
const T_WIDTH: i32 = 50;
const T_HEIGHT: i32 = 20;

const CHECK_SIZE: i32 = 20;
const CHECK_LEFT_STEPS: i32 = 20;
const CHECK_RIGHT_STEPS: i32 = 30;
const CHECK_THICKNESS: std::ops::RangeInclusive<i32> = -2..=2;

const SHAFT_ID: &str = "heading-arrow-shaft";
const HEAD_ID: &str = "heading-arrow-head";
const BAR_ID: &str = "heading-center-rect";
const T_HORIZONTAL_ID: &str = "heading-t-horizontal";
const T_VERTICAL_ID: &str = "heading-t-vertical";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// One overlay message, in the JSON shape the overlay server reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OverlayCommand {
    Text {
        id: String,
        text: String,
        color: String,
        x: i32,
        y: i32,
        ttl: u32,
        size: String,
    },
    Rect {
        id: String,
        shape: String,
        color: String,
        fill: String,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        ttl: u32,
    },
    Vector {
        id: String,
        shape: String,
        color: String,
        ttl: u32,
        vector: Vec<Point>,
    },
}

impl OverlayCommand {
    pub fn text(id: impl Into<String>, text: impl Into<String>, color: &str, x: i32, y: i32, ttl: u32) -> Self {
        OverlayCommand::Text {
            id: id.into(),
            text: text.into(),
            color: color.to_string(),
            x,
            y,
            ttl,
            size: "large".to_string(),
        }
    }

    pub fn rect(id: impl Into<String>, color: &str, x: i32, y: i32, w: i32, h: i32, ttl: u32) -> Self {
        OverlayCommand::Rect {
            id: id.into(),
            shape: "rect".to_string(),
            color: color.to_string(),
            fill: color.to_string(),
            x,
            y,
            w,
            h,
            ttl,
        }
    }

    pub fn vector(id: impl Into<String>, color: &str, ttl: u32, vector: Vec<Point>) -> Self {
        OverlayCommand::Vector {
            id: id.into(),
            shape: "vect".to_string(),
            color: color.to_string(),
            ttl,
            vector,
        }
    }

    /// Removes whatever was last sent under `id`.
    pub fn clear(id: impl Into<String>) -> Self {
        OverlayCommand::Text {
            id: id.into(),
            text: String::new(),
            color: String::new(),
            x: 0,
            y: 0,
            ttl: 0,
            size: "normal".to_string(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            OverlayCommand::Text { id, .. }
            | OverlayCommand::Rect { id, .. }
            | OverlayCommand::Vector { id, .. } => id,
        }
    }

    pub fn ttl(&self) -> u32 {
        match self {
            OverlayCommand::Text { ttl, .. }
            | OverlayCommand::Rect { ttl, .. }
            | OverlayCommand::Vector { ttl, .. } => *ttl,
        }
    }
}

pub trait OverlayTransport {
    fn send(&mut self, command: &OverlayCommand);
}

/// Collects commands, for tests and dry runs.
impl OverlayTransport for Vec<OverlayCommand> {
    fn send(&mut self, command: &OverlayCommand) {
        self.push(command.clone());
    }
}

/// Drops everything. Used when no overlay is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl OverlayTransport for NullTransport {
    fn send(&mut self, _command: &OverlayCommand) {}
}

/// Writes each command as one JSON line.
pub struct JsonLinesTransport<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesTransport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OverlayTransport for JsonLinesTransport<W> {
    fn send(&mut self, command: &OverlayCommand) {
        let written = serde_json::to_string(command)
            .map_err(std::io::Error::from)
            .and_then(|line| writeln!(self.out, "{}", line));
        if let Err(e) = written {
            log::warn!("Failed to write overlay command {}: {}", command.id(), e);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub left_margin: i32,
    pub max_rows: usize,
}

impl Default for OverlayLayout {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl OverlayLayout {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            left_margin: settings.overlay_left_margin,
            max_rows: settings.max_overlay_rows,
        }
    }

    pub fn row_y(&self, index: usize) -> i32 {
        ROW_Y_START + index as i32 * ROW_Y_STEP
    }

    /// Centre of the heading indicator, just below `row_count` rows.
    pub fn indicator_center(&self, row_count: usize) -> Point {
        Point {
            x: self.left_margin + 150,
            y: ROW_Y_START + row_count as i32 * ROW_Y_STEP + 30,
        }
    }
}

/// Sends up to `max_rows` rows and blanks the remaining slots.
pub fn show_rows(transport: &mut dyn OverlayTransport, layout: &OverlayLayout, rows: &[PoiRow]) {
    let shown = rows.len().min(layout.max_rows);
    for (idx, row) in rows.iter().take(shown).enumerate() {
        let color = if row.is_target { TARGET_COLOR } else { PASSIVE_COLOR };
        transport.send(&OverlayCommand::text(
            format!("poi_{}", idx),
            row.text.as_str(),
            color,
            layout.left_margin,
            layout.row_y(idx),
            ROW_TTL,
        ));
    }
    blank_rows(transport, layout, shown);
}

pub fn clear_rows(transport: &mut dyn OverlayTransport, layout: &OverlayLayout) {
    blank_rows(transport, layout, 0);
}

fn blank_rows(transport: &mut dyn OverlayTransport, layout: &OverlayLayout, from: usize) {
    for idx in from..layout.max_rows {
        transport.send(&OverlayCommand::text(
            format!("poi_{}", idx),
            "",
            BLANK_COLOR,
            layout.left_margin,
            layout.row_y(idx),
            BLANK_ROW_TTL,
        ));
    }
}

fn checkmark_ids() -> impl Iterator<Item = String> {
    CHECK_THICKNESS.flat_map(|offset| {
        let left = (0..CHECK_LEFT_STEPS).map(move |step| format!("checkmark-left-{}-{}", step, offset));
        let right = (0..CHECK_RIGHT_STEPS).map(move |step| format!("checkmark-right-{}-{}", step, offset));
        left.chain(right)
    })
}

/// Removes every heading-indicator shape.
pub fn clear_indicator(transport: &mut dyn OverlayTransport) {
    for id in [SHAFT_ID, HEAD_ID, BAR_ID, T_HORIZONTAL_ID, T_VERTICAL_ID] {
        transport.send(&OverlayCommand::clear(id));
    }
    for id in checkmark_ids() {
        transport.send(&OverlayCommand::clear(id));
    }
}

/// Arrow length in pixels, growing with the deviation up to 90 degrees.
pub fn arrow_length(deviation_deg: f64) -> i32 {
    let normalized = (deviation_deg.abs() / 90.0).min(1.0);
    (ARROW_BASE_LENGTH + (ARROW_MAX_LENGTH - ARROW_BASE_LENGTH) * normalized) as i32
}

/// On course: a green bar that slides with the residual deviation over a
/// fixed white T. Otherwise an orange arrow towards the side to turn.
pub fn draw_steering(
    transport: &mut dyn OverlayTransport,
    center: Point,
    steering: &Steering,
    on_course_deg: f64,
) {
    clear_indicator(transport);

    if steering.on_course {
        let offset = if steering.deviation_deg != 0.0 && on_course_deg > 0.0 {
            ((steering.deviation_deg / on_course_deg) * BAR_MAX_OFFSET as f64) as i32
        } else {
            0
        }
        .clamp(-BAR_MAX_OFFSET, BAR_MAX_OFFSET);

        transport.send(&OverlayCommand::rect(
            BAR_ID,
            ON_COURSE_COLOR,
            center.x - BAR_WIDTH / 2 + offset,
            center.y + BAR_OFFSET_Y - BAR_HEIGHT / 2,
            BAR_WIDTH,
            BAR_HEIGHT,
            INDICATOR_TTL,
        ));

        let bar_bottom = center.y + BAR_OFFSET_Y + BAR_HEIGHT / 2;
        transport.send(&OverlayCommand::rect(
            T_HORIZONTAL_ID,
            REFERENCE_COLOR,
            center.x - T_WIDTH / 2,
            bar_bottom,
            T_WIDTH,
            T_LINE,
            INDICATOR_TTL,
        ));
        transport.send(&OverlayCommand::rect(
            T_VERTICAL_ID,
            REFERENCE_COLOR,
            center.x - T_LINE / 2,
            bar_bottom,
            T_LINE,
            T_HEIGHT,
            INDICATOR_TTL,
        ));
        return;
    }

    let length = arrow_length(steering.deviation_deg);
    let shaft_length = length - ARROW_HEAD_SIZE;
    let half_head = ARROW_HEAD_SIZE / 2;
    // +1 points right, -1 points left.
    let dir = if steering.deviation_deg > 0.0 { 1 } else { -1 };
    let tip_x = center.x + dir * length;
    let base_x = tip_x - dir * ARROW_HEAD_SIZE;
    let shaft_x = if dir > 0 { center.x } else { base_x };

    transport.send(&OverlayCommand::rect(
        SHAFT_ID,
        ARROW_COLOR,
        shaft_x,
        center.y - SHAFT_HEIGHT / 2,
        shaft_length,
        SHAFT_HEIGHT,
        INDICATOR_TTL,
    ));
    transport.send(&OverlayCommand::vector(
        HEAD_ID,
        ARROW_COLOR,
        INDICATOR_TTL,
        vec![
            Point { x: tip_x, y: center.y },
            Point { x: base_x, y: center.y - half_head },
            Point { x: base_x, y: center.y + half_head },
            Point { x: tip_x, y: center.y },
        ],
    ));
}

/// A green tick built from small squares, shown once on arrival.
pub fn draw_checkmark(transport: &mut dyn OverlayTransport, center: Point) {
    clear_indicator(transport);

    let left_start = Point { x: center.x - CHECK_SIZE, y: center.y };
    let joint = Point { x: center.x - 5, y: center.y + CHECK_SIZE };
    let right_end = Point { x: center.x + CHECK_SIZE, y: center.y - CHECK_SIZE };

    let mut stroke = |name: &str, from: Point, to: Point, steps: i32| {
        for offset in CHECK_THICKNESS {
            for step in 0..steps {
                let t = step as f64 / steps as f64;
                let x = (from.x as f64 + (to.x - from.x) as f64 * t) as i32;
                let y = (from.y as f64 + (to.y - from.y) as f64 * t) as i32 + offset;
                transport.send(&OverlayCommand::rect(
                    format!("checkmark-{}-{}-{}", name, step, offset),
                    ON_COURSE_COLOR,
                    x,
                    y,
                    2,
                    2,
                    INDICATOR_TTL,
                ));
            }
        }
    };
    stroke("left", left_start, joint, CHECK_LEFT_STEPS);
    stroke("right", joint, right_end, CHECK_RIGHT_STEPS);
}

/// Sends everything for one guidance frame.
pub fn render_frame(
    transport: &mut dyn OverlayTransport,
    layout: &OverlayLayout,
    frame: &GuidanceFrame,
    on_course_deg: f64,
) {
    if frame.rows.is_empty() {
        clear_rows(transport, layout);
        clear_indicator(transport);
        return;
    }

    show_rows(transport, layout, &frame.rows);

    let Some(guidance) = frame.guidance else {
        clear_indicator(transport);
        return;
    };
    let center = layout.indicator_center(frame.rows.len());
    match guidance.zone {
        Zone::Arrived => draw_checkmark(transport, center),
        Zone::WithinStop => clear_indicator(transport),
        Zone::Approaching => draw_steering(transport, center, &guidance.steering(), on_course_deg),
    }
}

/// Clears rows and indicator, e.g. when leaving a body.
pub fn clear_all(transport: &mut dyn OverlayTransport, layout: &OverlayLayout) {
    clear_rows(transport, layout);
    clear_indicator(transport);
}
