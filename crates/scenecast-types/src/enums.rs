//! Enumeration types for scan records and player status.
//!
//! Entity kinds form a closed set: every object the scanner reports is one
//! of the [`EntityKind`] variants, each carrying the visual sub-state that
//! matters for its category.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Entity categories
// ---------------------------------------------------------------------------

/// Broad category of a reported scene object.
///
/// The category is the grouping key for snapshot sequences and, together
/// with the world position, the deduplication key of the grid scanner.
/// Booths and chests share [`EntityCategory::Bank`], so a booth and a chest
/// on one tile collapse to a single bank record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EntityCategory {
    /// A choppable tree.
    Tree,
    /// A bank booth or bank chest.
    Bank,
    /// A mineable ore vein.
    OreVein,
    /// A mine hopper accepting pay-dirt.
    Hopper,
    /// A collection sack.
    Sack,
    /// A broken water-wheel strut.
    BrokenStrut,
}

impl EntityCategory {
    /// All categories in snapshot order.
    pub const ALL: [Self; 6] = [
        Self::Tree,
        Self::Bank,
        Self::OreVein,
        Self::Hopper,
        Self::Sack,
        Self::BrokenStrut,
    ];

    /// Stable lowercase label, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Bank => "bank",
            Self::OreVein => "ore_vein",
            Self::Hopper => "hopper",
            Self::Sack => "sack",
            Self::BrokenStrut => "broken_strut",
        }
    }

    /// Name of the snapshot field holding this category's records.
    pub const fn snapshot_field(self) -> &'static str {
        match self {
            Self::Tree => "trees",
            Self::Bank => "banks",
            Self::OreVein => "ore_veins",
            Self::Hopper => "hoppers",
            Self::Sack => "sacks",
            Self::BrokenStrut => "broken_struts",
        }
    }
}

impl core::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for EntityCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_owned()))
    }
}

/// Error returned when a string names no [`EntityCategory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(pub String);

impl core::fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown entity category: {}", self.0)
    }
}

impl std::error::Error for ParseCategoryError {}

/// Visual state of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TreeState {
    /// Fully grown, can be chopped.
    Full,
    /// Partially chopped.
    Chopped,
    /// Felled; only the stump remains.
    Stump,
    /// The tree id is known but has no state mapping.
    Unknown,
}

/// Visual state of an ore vein.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum VeinState {
    /// Ore is available.
    Active,
    /// Mined out, waiting to respawn.
    Depleted,
    /// The vein id is known but has no state mapping.
    Unknown,
}

/// Which kind of bank object was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BankKind {
    /// A counter booth.
    Booth,
    /// A free-standing chest.
    Chest,
}

impl BankKind {
    /// Lowercase label used in overlay text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booth => "booth",
            Self::Chest => "chest",
        }
    }
}

/// A classified scene object: category tag plus category-specific state.
///
/// Serialized adjacently tagged, e.g. `{"category":"tree","state":"full"}`
/// or `{"category":"hopper"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "category", content = "state", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EntityKind {
    /// A tree and how chopped it is.
    Tree(TreeState),
    /// A bank booth or chest.
    Bank(BankKind),
    /// An ore vein and whether it is mined out.
    OreVein(VeinState),
    /// A pay-dirt hopper.
    Hopper,
    /// A collection sack.
    Sack,
    /// A broken strut.
    BrokenStrut,
}

impl EntityKind {
    /// The broad category this kind belongs to.
    pub const fn category(self) -> EntityCategory {
        match self {
            Self::Tree(_) => EntityCategory::Tree,
            Self::Bank(_) => EntityCategory::Bank,
            Self::OreVein(_) => EntityCategory::OreVein,
            Self::Hopper => EntityCategory::Hopper,
            Self::Sack => EntityCategory::Sack,
            Self::BrokenStrut => EntityCategory::BrokenStrut,
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Skills whose levels are reported in the player status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Skill {
    /// Hitpoints (current value is health).
    Hitpoints,
    /// Prayer points.
    Prayer,
    /// Woodcutting.
    Woodcutting,
    /// Mining.
    Mining,
}

/// What the player is doing, derived from the current animation id.
///
/// Serialized as a plain string: `"idle"`, `"woodcutting"`, and
/// `"unknown_<id>"` for animations outside the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Activity {
    /// No animation is playing.
    Idle,
    /// Chopping a tree.
    Woodcutting,
    /// Fishing with any method.
    Fishing,
    /// Mining rock or ore.
    Mining,
    /// Melee, ranged or magic attack.
    Combat,
    /// Cooking on a range or fire.
    Cooking,
    /// Crafting.
    Crafting,
    /// Smelting or smithing.
    Smithing,
    /// An animation id with no mapping.
    Unknown(i32),
}

impl core::fmt::Display for Activity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Woodcutting => f.write_str("woodcutting"),
            Self::Fishing => f.write_str("fishing"),
            Self::Mining => f.write_str("mining"),
            Self::Combat => f.write_str("combat"),
            Self::Cooking => f.write_str("cooking"),
            Self::Crafting => f.write_str("crafting"),
            Self::Smithing => f.write_str("smithing"),
            Self::Unknown(id) => write!(f, "unknown_{id}"),
        }
    }
}

impl From<Activity> for String {
    fn from(activity: Activity) -> Self {
        activity.to_string()
    }
}

/// Error returned when a string is not a valid [`Activity`] label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActivityError(pub String);

impl core::fmt::Display for ParseActivityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid activity label: {}", self.0)
    }
}

impl std::error::Error for ParseActivityError {}

impl core::str::FromStr for Activity {
    type Err = ParseActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "woodcutting" => Ok(Self::Woodcutting),
            "fishing" => Ok(Self::Fishing),
            "mining" => Ok(Self::Mining),
            "combat" => Ok(Self::Combat),
            "cooking" => Ok(Self::Cooking),
            "crafting" => Ok(Self::Crafting),
            "smithing" => Ok(Self::Smithing),
            other => other
                .strip_prefix("unknown_")
                .and_then(|id| id.parse::<i32>().ok())
                .map(Self::Unknown)
                .ok_or_else(|| ParseActivityError(other.to_owned())),
        }
    }
}

impl TryFrom<String> for Activity {
    type Error = ParseActivityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_adjacently_tagged() {
        let tree = serde_json::to_value(EntityKind::Tree(TreeState::Full)).unwrap_or_default();
        assert_eq!(tree["category"], "tree");
        assert_eq!(tree["state"], "full");

        let hopper = serde_json::to_value(EntityKind::Hopper).unwrap_or_default();
        assert_eq!(hopper["category"], "hopper");
        assert!(hopper.get("state").is_none());
    }

    #[test]
    fn kind_category_matches_variant() {
        assert_eq!(EntityKind::Bank(BankKind::Chest).category(), EntityCategory::Bank);
        assert_eq!(
            EntityKind::OreVein(VeinState::Depleted).category(),
            EntityCategory::OreVein
        );
        assert_eq!(EntityKind::BrokenStrut.category(), EntityCategory::BrokenStrut);
    }

    #[test]
    fn category_parses_from_its_label() {
        for category in EntityCategory::ALL {
            assert_eq!(category.as_str().parse::<EntityCategory>(), Ok(category));
        }
        assert!("trees".parse::<EntityCategory>().is_err());
        assert_eq!(EntityCategory::OreVein.snapshot_field(), "ore_veins");
    }

    #[test]
    fn activity_labels() {
        assert_eq!(Activity::Idle.to_string(), "idle");
        assert_eq!(Activity::Woodcutting.to_string(), "woodcutting");
        assert_eq!(Activity::Unknown(99999).to_string(), "unknown_99999");
        assert_eq!(Activity::Unknown(-7).to_string(), "unknown_-7");
    }

    #[test]
    fn activity_parses_its_own_labels() {
        for activity in [Activity::Mining, Activity::Combat, Activity::Unknown(4)] {
            assert_eq!(activity.to_string().parse::<Activity>(), Ok(activity));
        }
        assert!("dancing".parse::<Activity>().is_err());
        assert!("unknown_x".parse::<Activity>().is_err());
    }

    #[test]
    fn activity_serializes_as_string() {
        let json = serde_json::to_string(&Activity::Unknown(12)).unwrap_or_default();
        assert_eq!(json, "\"unknown_12\"");
    }

    #[test]
    fn category_label_matches_serde() {
        for category in EntityCategory::ALL {
            let json = serde_json::to_value(category).unwrap_or_default();
            assert_eq!(json, category.as_str());
        }
    }
}
