//! Scripted woodcutting session used when no live host is attached.
//!
//! [`DemoScene`] owns a [`SceneModel`] with a willow grove, a bank and a
//! couple of ore veins. Each tick the player chops the first full willow,
//! one log every other tick. A willow falls after a few logs and cycles
//! full, chopped, stump, full. With a full inventory the player walks to
//! the bank, deposits everything and walks back.

use scenecast_core::runner::{ChatLine, TickDriver};
use scenecast_core::scene::SceneModel;
use scenecast_core::world::{GridSize, IDLE_ANIMATION, ItemStack, WorldView};
use scenecast_types::{INVENTORY_CAPACITY, InterfaceState, Skill};

/// Willow logs item id.
pub const WILLOW_LOGS: i32 = 1519;

const WILLOW_FULL: i32 = 10829;
const WILLOW_CHOPPED: i32 = 10831;
const WILLOW_STUMP: i32 = 10833;
const BANK_BOOTH: i32 = 10355;
const IRON_VEIN: i32 = 26661;
const DEPLETED_VEIN: i32 = 26665;

const WOODCUTTING_ANIMATION: i32 = 867;
const WALK_POSE: i32 = 819;

const GRID_SIDE: u32 = 24;
const BASE_X: i32 = 3076;
const BASE_Y: i32 = 3226;

const WILLOW_CELLS: [(u32, u32); 3] = [(6, 14), (8, 16), (10, 14)];
const BOOTH_CELLS: [(u32, u32); 2] = [(19, 12), (19, 13)];
const TREE_STAND: (u32, u32) = (8, 13);
const BANK_STAND: (u32, u32) = (18, 12);

/// Ticks between two logs.
const LOG_EVERY: u64 = 2;
const LOGS_PER_WILLOW: u32 = 4;
const STUMP_AFTER: u64 = 2;
const REGROW_AFTER: u64 = 8;
/// Tiles covered per walking tick.
const STRIDE: u32 = 2;
const WALK_ENERGY_COST: u32 = 250;
const REST_ENERGY_GAIN: u32 = 60;
const MAX_ENERGY: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Full,
    Chopped,
    Stump,
}

impl Stage {
    const fn object_id(self) -> i32 {
        match self {
            Self::Full => WILLOW_FULL,
            Self::Chopped => WILLOW_CHOPPED,
            Self::Stump => WILLOW_STUMP,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Willow {
    cell: (u32, u32),
    stage: Stage,
    changed_at: u64,
    logs_left: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    Bank,
    Trees,
}

impl Destination {
    const fn cell(self) -> (u32, u32) {
        match self {
            Self::Bank => BANK_STAND,
            Self::Trees => TREE_STAND,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Chopping,
    Walking(Destination),
    Banking,
}

/// A [`TickDriver`] replaying an endless chop-and-bank loop.
#[derive(Debug, Clone)]
pub struct DemoScene {
    scene: SceneModel,
    willows: Vec<Willow>,
    phase: Phase,
    at: (u32, u32),
}

impl DemoScene {
    /// Build the grove with the player standing by the willows.
    pub fn new() -> Self {
        let mut scene = SceneModel::new(GridSize::square(GRID_SIDE), BASE_X, BASE_Y, 0);
        scene.set_level(Skill::Woodcutting, 45, 45);
        scene.set_level(Skill::Mining, 30, 30);
        scene.set_level(Skill::Hitpoints, 27, 27);
        scene.set_level(Skill::Prayer, 12, 12);
        scene.define_item(WILLOW_LOGS, "Willow logs");

        for (x, y) in WILLOW_CELLS {
            scene.place_object(x, y, WILLOW_FULL);
        }
        for (x, y) in BOOTH_CELLS {
            scene.place_object(x, y, BANK_BOOTH);
        }
        scene.place_object(2, 3, IRON_VEIN);
        scene.place_object(3, 3, DEPLETED_VEIN);
        scene.spawn_player(TREE_STAND.0, TREE_STAND.1);

        let willows = WILLOW_CELLS
            .iter()
            .map(|&cell| Willow {
                cell,
                stage: Stage::Full,
                changed_at: 0,
                logs_left: LOGS_PER_WILLOW,
            })
            .collect();

        Self {
            scene,
            willows,
            phase: Phase::Chopping,
            at: TREE_STAND,
        }
    }

    fn grow_willows(&mut self, tick: u64) {
        for willow in &mut self.willows {
            let age = tick.saturating_sub(willow.changed_at);
            let next = match willow.stage {
                Stage::Chopped if age >= STUMP_AFTER => Stage::Stump,
                Stage::Stump if age >= REGROW_AFTER => Stage::Full,
                _ => continue,
            };
            willow.stage = next;
            willow.changed_at = tick;
            if next == Stage::Full {
                willow.logs_left = LOGS_PER_WILLOW;
            }
            self.scene
                .replace_objects(willow.cell.0, willow.cell.1, next.object_id());
        }
    }

    fn chop(&mut self, tick: u64, chat: &mut Vec<ChatLine>) {
        let Some(index) = self.willows.iter().position(|w| w.stage == Stage::Full) else {
            self.set_action(IDLE_ANIMATION, None);
            return;
        };
        self.set_action(WOODCUTTING_ANIMATION, Some("Willow tree"));
        self.adjust_energy(|e| e.saturating_add(REST_ENERGY_GAIN).min(MAX_ENERGY));

        if tick.checked_rem(LOG_EVERY) != Some(0) {
            return;
        }

        let slot = self.scene.occupied_slots();
        self.scene.set_slot(
            slot,
            ItemStack {
                id: WILLOW_LOGS,
                quantity: 1,
            },
        );
        chat.push(ChatLine::system("You get some willow logs."));

        if let Some(willow) = self.willows.get_mut(index) {
            willow.logs_left = willow.logs_left.saturating_sub(1);
            if willow.logs_left == 0 {
                willow.stage = Stage::Chopped;
                willow.changed_at = tick;
                self.scene
                    .replace_objects(willow.cell.0, willow.cell.1, WILLOW_CHOPPED);
            }
        }

        if self.scene.occupied_slots() >= INVENTORY_CAPACITY {
            chat.push(ChatLine::system(
                "Your inventory is too full to hold any more logs.",
            ));
            self.set_action(IDLE_ANIMATION, None);
            self.phase = Phase::Walking(Destination::Bank);
        }
    }

    fn walk(&mut self, destination: Destination) {
        self.scene.set_interface(InterfaceState::default());
        let target = destination.cell();
        if self.at == target {
            self.set_action(IDLE_ANIMATION, None);
            self.phase = match destination {
                Destination::Bank => Phase::Banking,
                Destination::Trees => Phase::Chopping,
            };
            return;
        }

        self.at = (step(self.at.0, target.0), step(self.at.1, target.1));
        self.scene.spawn_player(self.at.0, self.at.1);
        if let Some(player) = self.scene.player_mut() {
            player.pose_animation = WALK_POSE;
        }
        self.adjust_energy(|e| e.saturating_sub(WALK_ENERGY_COST));
    }

    fn bank(&mut self) {
        self.scene.set_interface(InterfaceState {
            in_bank: true,
            ..InterfaceState::default()
        });
        self.scene.clear_inventory();
        self.set_action(IDLE_ANIMATION, Some("Bank booth"));
        self.phase = Phase::Walking(Destination::Trees);
    }

    fn set_action(&mut self, animation: i32, target: Option<&str>) {
        if let Some(player) = self.scene.player_mut() {
            player.animation = animation;
            player.pose_animation = player.idle_pose_animation;
            player.interacting_with = target.map(str::to_owned);
        }
    }

    fn adjust_energy(&mut self, f: impl FnOnce(u32) -> u32) {
        let energy = f(self.scene.energy());
        self.scene.set_energy(energy);
    }
}

impl Default for DemoScene {
    fn default() -> Self {
        Self::new()
    }
}

impl TickDriver for DemoScene {
    fn advance(&mut self, tick: u64) -> Vec<ChatLine> {
        let mut chat = Vec::new();
        self.grow_willows(tick);
        match self.phase {
            Phase::Chopping => self.chop(tick, &mut chat),
            Phase::Walking(destination) => self.walk(destination),
            Phase::Banking => self.bank(),
        }
        chat
    }

    fn world(&self) -> &dyn WorldView {
        &self.scene
    }
}

const fn step(from: u32, to: u32) -> u32 {
    if from < to {
        let next = from.saturating_add(STRIDE);
        if next > to { to } else { next }
    } else {
        let next = from.saturating_sub(STRIDE);
        if next < to { to } else { next }
    }
}
