//! Translates world queries into the scene handed to the rendering backend.

use monster_kong_core::{PlayerInput, SpriteKey};
use monster_kong_rendering::{FrameInput, Scene, SceneSprite};
use monster_kong_world::{query, World};

/// Rebuilds `scene` from the current world state.
///
/// Draw order is platforms, fires, goal, hazards and finally the player.
pub(crate) fn populate(scene: &mut Scene, world: &World) {
    scene.clear();

    let (Some(level), Some(world_size)) = (query::level(world), query::world_size(world)) else {
        return;
    };

    for platform in level.platforms() {
        scene.sprites.push(
            SceneSprite::new(platform.key().sprite(), platform.position())
                .with_tiles(platform.tile_count()),
        );
    }
    scene.colliders.extend_from_slice(query::platforms(world));

    for fire in query::fires(world) {
        scene
            .sprites
            .push(SceneSprite::new(SpriteKey::Fire, fire.bounds.min()).with_frame(fire.frame));
        scene.colliders.push(fire.bounds);
    }

    if let Some(goal) = query::goal_position(world) {
        let sprite = SceneSprite::centered(SpriteKey::Goal, goal);
        scene.colliders.push(sprite.bounds());
        scene.sprites.push(sprite);
    }

    for hazard in query::hazards(world) {
        if !hazard.visible {
            continue;
        }
        let sprite = SceneSprite::centered(SpriteKey::Barrel, hazard.position);
        if hazard.body_enabled {
            scene.colliders.push(sprite.bounds());
        }
        scene.sprites.push(sprite);
    }

    if let Some(player) = query::player(world) {
        let sprite = SceneSprite::centered(SpriteKey::Player, player.position)
            .with_frame(player.frame)
            .with_flip_x(player.facing.flip_x());
        scene.colliders.push(sprite.bounds());
        scene.sprites.push(sprite);
        scene.camera.follow(player.position, world_size);
    }

    scene.fade_alpha = query::fade_progress(world);
}

/// Keys the player controller cares about.
pub(crate) fn player_input(input: FrameInput) -> PlayerInput {
    PlayerInput {
        left: input.left,
        right: input.right,
        up: input.up,
        space: input.space,
    }
}
