//! Overlay label planner.
//!
//! A pure consumer of the latest scan output: turns entity records into
//! draw commands (outlines and distance labels) for whatever renderer the
//! host provides. Nothing here touches the world.

use std::fmt;
use std::str::FromStr;

use scenecast_types::{EntityCategory, EntityKind, EntityRecord, ScreenPoint, WorldPosition};
use serde::{Deserialize, Serialize};

use crate::config::OverlayConfig;
use crate::scanner::ScanOutput;

/// Outline stroke width for trees and mining objects.
pub const ENTITY_STROKE: u32 = 2;

/// Outline stroke width for banks.
pub const BANK_STROKE: u32 = 3;

/// Offset of the label shadow from the label anchor.
const SHADOW_OFFSET: i32 = 1;

/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure black, used for label shadows.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Pure green.
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// Pure yellow.
    pub const YELLOW: Self = Self::new(255, 255, 0);
    /// Cyan.
    pub const CYAN: Self = Self::new(0, 255, 255);

    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Error returned for a color string that is not `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected #RRGGBB")]
pub struct ParseColorError(pub String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseColorError(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|part| u8::from_str_radix(part, 16).ok())
                .ok_or_else(invalid)
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// One primitive for the overlay renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    /// Outline the tile of an entity.
    Outline {
        /// Tile to outline.
        position: WorldPosition,
        /// Stroke color.
        color: Rgb,
        /// Stroke width in pixels.
        stroke: u32,
    },
    /// Draw a text label with a shadow.
    Label {
        /// Label text.
        text: String,
        /// Canvas anchor of the text.
        anchor: ScreenPoint,
        /// Text color.
        color: Rgb,
        /// Canvas anchor of the shadow, drawn first in black.
        shadow: ScreenPoint,
    },
}

fn color_for(category: EntityCategory, config: &OverlayConfig) -> Rgb {
    match category {
        EntityCategory::Tree => config.tree_color,
        EntityCategory::Bank => config.bank_color,
        EntityCategory::OreVein
        | EntityCategory::Hopper
        | EntityCategory::Sack
        | EntityCategory::BrokenStrut => config.mining_color,
    }
}

const fn stroke_for(category: EntityCategory) -> u32 {
    match category {
        EntityCategory::Bank => BANK_STROKE,
        _ => ENTITY_STROKE,
    }
}

/// Distance label text for one record.
pub fn label_text(record: &EntityRecord) -> String {
    match record.kind {
        EntityKind::Bank(kind) => format!("{} tiles ({})", record.distance, kind.as_str()),
        _ => format!("{} tiles", record.distance),
    }
}

/// Plan the draw commands for one render pass.
///
/// Every record gets an outline. A label follows when distance labels are
/// enabled and the record is on screen.
pub fn plan_overlay(scan: &ScanOutput, config: &OverlayConfig) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(scan.len().saturating_mul(2));
    for record in scan.iter() {
        let category = record.category();
        let color = color_for(category, config);
        commands.push(DrawCommand::Outline {
            position: record.position,
            color,
            stroke: stroke_for(category),
        });
        if !config.show_distance {
            continue;
        }
        if let Some(anchor) = record.screen {
            commands.push(DrawCommand::Label {
                text: label_text(record),
                anchor,
                color,
                shadow: anchor.offset(SHADOW_OFFSET, SHADOW_OFFSET),
            });
        }
    }
    commands
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use crate::scene::SceneModel;
    use crate::world::GridSize;

    fn scanned() -> ScanOutput {
        let mut scene = SceneModel::new(GridSize::square(8), 3000, 3000, 0);
        scene.spawn_player(4, 4);
        scene.place_object(4, 6, 10829);
        scene.place_object(1, 4, 10355);
        scan(&scene).unwrap()
    }

    #[test]
    fn parses_and_prints_hex_colors() {
        assert_eq!("#00FF00".parse::<Rgb>(), Ok(Rgb::GREEN));
        assert_eq!("#ffff00".parse::<Rgb>(), Ok(Rgb::YELLOW));
        assert_eq!(Rgb::CYAN.to_string(), "#00FFFF");
    }

    #[test]
    fn rejects_malformed_colors() {
        for bad in ["00FF00", "#00FF0", "#00FF000", "#GG0000", "", "#"] {
            assert!(bad.parse::<Rgb>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn outlines_every_record_with_category_color_and_stroke() {
        let commands = plan_overlay(&scanned(), &OverlayConfig::default());
        let outlines: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Outline { color, stroke, .. } => Some((*color, *stroke)),
                DrawCommand::Label { .. } => None,
            })
            .collect();
        assert_eq!(outlines, vec![(Rgb::GREEN, 2), (Rgb::YELLOW, 3)]);
    }

    #[test]
    fn labels_carry_distance_and_shadow() {
        let commands = plan_overlay(&scanned(), &OverlayConfig::default());
        let labels: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Label {
                    text, anchor, shadow, ..
                } => Some((text.clone(), *anchor, *shadow)),
                DrawCommand::Outline { .. } => None,
            })
            .collect();
        assert_eq!(labels.len(), 2);
        let texts: Vec<_> = labels.iter().map(|(t, _, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["2 tiles", "3 tiles (booth)"]);
        for (_, anchor, shadow) in &labels {
            assert_eq!(shadow.x, anchor.x + 1);
            assert_eq!(shadow.y, anchor.y + 1);
        }
    }

    #[test]
    fn no_labels_when_distance_display_is_off() {
        let config = OverlayConfig {
            show_distance: false,
            ..OverlayConfig::default()
        };
        let commands = plan_overlay(&scanned(), &config);
        assert!(commands
            .iter()
            .all(|c| matches!(c, DrawCommand::Outline { .. })));
    }

    #[test]
    fn off_screen_records_get_no_label() {
        let mut scene = SceneModel::new(GridSize::square(64), 3000, 3000, 0);
        scene.spawn_player(2, 2);
        scene.place_object(60, 60, 10829);
        let out = scan(&scene).unwrap();
        let commands = plan_overlay(&out, &OverlayConfig::default());
        assert_eq!(commands.len(), 1);
    }
}
