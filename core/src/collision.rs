//! Declarative collision policy shared by the world and its adapters.

/// Collision class every entity belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityClass {
    /// The player character.
    Player,
    /// The goal sprite.
    Goal,
    /// Rolling hazards from the spawner.
    Hazard,
    /// Static platforms.
    Platform,
    /// Fire emitters.
    Fire,
}

/// Static relations deciding how two entity classes interact.
///
/// Blocking pairs are separated as solid bodies. Triggering pairs only raise
/// an overlap event and never alter motion.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollisionPolicy;

impl CollisionPolicy {
    /// Pairs resolved as solid collisions.
    pub const BLOCKING: [(EntityClass, EntityClass); 3] = [
        (EntityClass::Player, EntityClass::Platform),
        (EntityClass::Goal, EntityClass::Platform),
        (EntityClass::Hazard, EntityClass::Platform),
    ];

    /// Pairs resolved as overlap triggers.
    pub const TRIGGERING: [(EntityClass, EntityClass); 3] = [
        (EntityClass::Player, EntityClass::Fire),
        (EntityClass::Player, EntityClass::Goal),
        (EntityClass::Player, EntityClass::Hazard),
    ];

    /// Reports whether the classes block each other.
    #[must_use]
    pub fn blocks(a: EntityClass, b: EntityClass) -> bool {
        contains(&Self::BLOCKING, a, b)
    }

    /// Reports whether contact between the classes raises an overlap event.
    #[must_use]
    pub fn triggers(a: EntityClass, b: EntityClass) -> bool {
        contains(&Self::TRIGGERING, a, b)
    }
}

fn contains(pairs: &[(EntityClass, EntityClass)], a: EntityClass, b: EntityClass) -> bool {
    pairs
        .iter()
        .any(|&(left, right)| (left == a && right == b) || (left == b && right == a))
}
