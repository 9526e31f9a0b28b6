//! Player activity derived from the current animation id.

use scenecast_types::Activity;

use crate::world::IDLE_ANIMATION;

/// Known animation ids and the activity each one indicates.
const ANIMATION_ACTIVITIES: &[(i32, Activity)] = &[
    // Woodcutting: bronze-rune, dragon, 3rd age, crystal, infernal axes
    (867, Activity::Woodcutting),
    (2846, Activity::Woodcutting),
    (870, Activity::Woodcutting),
    (875, Activity::Woodcutting),
    (10251, Activity::Woodcutting),
    // Fishing: net, bait/fly, cage, harpoon
    (621, Activity::Fishing),
    (622, Activity::Fishing),
    (623, Activity::Fishing),
    (618, Activity::Fishing),
    // Mining: generic, dragon pickaxe, Motherlode veins
    (624, Activity::Mining),
    (628, Activity::Mining),
    (896, Activity::Mining),
    (6752, Activity::Mining),
    (7282, Activity::Mining),
    // Combat: slash, stab, crush, magic, ranged
    (422, Activity::Combat),
    (423, Activity::Combat),
    (401, Activity::Combat),
    (711, Activity::Combat),
    (426, Activity::Combat),
    (832, Activity::Cooking),
    (713, Activity::Crafting),
    (8980, Activity::Smithing),
];

/// Map an animation id to an activity.
///
/// [`IDLE_ANIMATION`] is idle; ids missing from the table become
/// [`Activity::Unknown`] carrying the raw id.
pub fn activity_for_animation(animation_id: i32) -> Activity {
    if animation_id == IDLE_ANIMATION {
        return Activity::Idle;
    }
    ANIMATION_ACTIVITIES
        .iter()
        .find(|(id, _)| *id == animation_id)
        .map_or(Activity::Unknown(animation_id), |&(_, activity)| activity)
}
