//! Collision layers.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    Player,
    Enemy,
    PlayerShot,
    HostileShot,
    PowerUp,
}

#[inline]
pub fn player_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Player,
        [Layer::Enemy, Layer::HostileShot, Layer::PowerUp],
    )
}

/// Shared by regular enemies and bosses.
#[inline]
pub fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::Player, Layer::PlayerShot])
}

#[inline]
pub fn shot_layers(from_player: bool) -> CollisionLayers {
    if from_player {
        CollisionLayers::new(Layer::PlayerShot, [Layer::Enemy])
    } else {
        CollisionLayers::new(Layer::HostileShot, [Layer::Player])
    }
}

#[inline]
pub fn power_up_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PowerUp, [Layer::Player])
}

/// Keep membership but clear filters: the entity stops interacting without a structural change.
#[inline]
pub fn non_interacting(membership: Layer) -> CollisionLayers {
    CollisionLayers::new(membership, [] as [Layer; 0])
}
