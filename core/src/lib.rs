#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rootbound engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the nourishment sink. Adapters submit [`Command`]
//! values describing player actions, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that rendering and
//! audio layers observe. Nothing in here owns simulation state.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod config;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Rootbound.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Grows the root network from the player's square into the neighbour in
    /// the provided direction, then advances the simulation by one step.
    Spread {
        /// Direction of the square the player digs into.
        direction: Direction,
    },
    /// Moves the player back along its trail without cost, then advances the
    /// simulation by one step.
    Retreat,
    /// Advances the simulation by one step without any player action.
    Idle,
    /// Requests placement of an entity anchored at the provided origin.
    SpawnEntity {
        /// Type of entity to create.
        kind: EntityKind,
        /// Anchor square of the entity footprint.
        origin: Coord,
    },
}

/// Events broadcast by the world after processing commands.
///
/// Rendering, animation and audio layers treat these as the only notification
/// surface; the world never blocks on them.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that a simulation step completed.
    TimeAdvanced {
        /// Number of simulation steps executed since the world was created.
        tick: u64,
    },
    /// Announces that a batch of rows was generated.
    ChunkGenerated {
        /// Row index (`-y`) of the first generated row.
        first_row: u32,
        /// Number of rows appended to the grid.
        rows: u32,
    },
    /// Confirms that the tile in a square was replaced.
    TileReplaced {
        /// Square whose tile changed.
        coord: Coord,
        /// Kind of the tile that was destroyed.
        from: TileKind,
        /// Kind of the tile that took its place.
        to: TileKind,
    },
    /// Reports that a root tile transitioned to a new status.
    RootStatusChanged {
        /// Square holding the root tile.
        coord: Coord,
        /// Status the root tile adopted.
        status: RootStatus,
    },
    /// Confirms that two neighbouring root tiles were linked.
    RootsLinked {
        /// Square the link was requested from.
        from: Coord,
        /// Neighbouring square that was linked.
        to: Coord,
    },
    /// Confirms that an entity entered the world.
    EntitySpawned {
        /// Identifier assigned to the entity.
        entity: EntityId,
        /// Type of the entity.
        kind: EntityKind,
        /// Anchor square of the entity.
        origin: Coord,
    },
    /// Confirms that an entity moved by a single square.
    EntityMoved {
        /// Identifier of the entity that moved.
        entity: EntityId,
        /// Anchor square before the move.
        from: Coord,
        /// Anchor square after the move.
        to: Coord,
        /// Whether the move should be presented with its own animation.
        animate: bool,
    },
    /// Reports that an entity free-fell within a single step.
    EntityFell {
        /// Identifier of the entity that fell.
        entity: EntityId,
        /// Number of rows the entity descended.
        rows: u32,
    },
    /// Reports that an enemy died and turned into a corpse.
    EnemyDied {
        /// Identifier of the enemy.
        entity: EntityId,
        /// Reason the enemy died.
        cause: DeathCause,
    },
    /// Confirms that an entity left the world.
    EntityRemoved {
        /// Identifier of the removed entity.
        entity: EntityId,
    },
    /// Confirms that the player head moved.
    PlayerMoved {
        /// Square the player left.
        from: Coord,
        /// Square the player now occupies.
        to: Coord,
    },
    /// Requests playback of a symbolic audio cue.
    Audio {
        /// Cue to play.
        cue: AudioCue,
    },
    /// Reports a change of the flower's nourishment.
    NourishmentChanged {
        /// Signed amount applied.
        delta: f32,
        /// Nourishment after the change.
        total: f32,
        /// Reason for the change.
        source: NourishmentSource,
    },
    /// Reports water that had nowhere to go and evaporated.
    FluidLost {
        /// Square the water was displaced from.
        coord: Coord,
        /// Amount of water removed from the world.
        amount: f32,
    },
    /// Reports that a spread request was refused.
    SpreadRejected {
        /// Direction of the refused spread.
        direction: Direction,
        /// Specific reason the spread failed.
        reason: SpreadError,
    },
    /// Reports that a retreat request was refused because no trail remains.
    RetreatRejected,
    /// Reports that an entity placement request was refused.
    PlacementRejected {
        /// Type of entity requested.
        kind: EntityKind,
        /// Origin provided in the request.
        origin: Coord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that the flower completed every growth condition.
    Victory,
    /// Announces that nourishment dropped below the survival floor.
    GameOver,
}

/// Cardinal directions on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Towards increasing x.
    Right,
    /// Towards increasing y (the surface).
    Up,
    /// Towards decreasing x.
    Left,
    /// Towards decreasing y (deeper underground).
    Down,
}

impl Direction {
    /// All directions in mask order.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Left => Self::Right,
            Self::Down => Self::Up,
        }
    }

    /// Direction rotated a quarter turn clockwise.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Right => Self::Down,
            Self::Up => Self::Right,
            Self::Left => Self::Up,
            Self::Down => Self::Left,
        }
    }

    /// Direction rotated a quarter turn counter-clockwise.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        match self {
            Self::Right => Self::Up,
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
        }
    }

    /// Horizontal component of the unit vector.
    #[must_use]
    pub const fn dx(self) -> i32 {
        match self {
            Self::Right => 1,
            Self::Left => -1,
            Self::Up | Self::Down => 0,
        }
    }

    /// Vertical component of the unit vector.
    #[must_use]
    pub const fn dy(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
            Self::Right | Self::Left => 0,
        }
    }

    /// Bit position used by root connection masks.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Right => 0,
            Self::Up => 1,
            Self::Left => 2,
            Self::Down => 3,
        }
    }
}

/// Location of a single grid square.
///
/// The surface row is `y == 0`; every deeper row has a more negative `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    x: i32,
    y: i32,
}

impl Coord {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the square.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Height of the square; zero at the surface, negative below.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Coordinate of the neighbour in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        Self {
            x: self.x + direction.dx(),
            y: self.y + direction.dy(),
        }
    }

    /// Coordinate shifted by an arbitrary offset.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Number of rows between the surface and this square.
    ///
    /// Squares above the surface report zero.
    #[must_use]
    pub fn depth(&self) -> u32 {
        u32::try_from(-i64::from(self.y)).unwrap_or(0)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Terrain variants a grid square can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKind {
    /// Open space; entities and water move through it.
    Air,
    /// Ordinary diggable soil.
    Ground,
    /// Bedrock that can never be dug.
    SuperGround,
    /// Hard soil whose cost grows with depth.
    EvilGround,
    /// Soil that feeds the flower when dug.
    NutritionGround,
    /// Surface turf.
    Grass,
    /// Surface square the flower grows from.
    FlowerGrass,
    /// Part of a root network.
    Root,
}

/// Lifecycle state of a root tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootStatus {
    /// The permanent anchor the network grows from.
    Initial,
    /// Generated with the world; inert until the player reaches it.
    Spawned,
    /// Reachable from the initial root.
    Connected,
    /// Severed from the initial root; decays every step.
    Disconnected,
}

impl RootStatus {
    /// Reports whether the status counts as part of the living network.
    #[must_use]
    pub const fn is_rooted(self) -> bool {
        matches!(self, Self::Initial | Self::Connected)
    }
}

/// Types of entities that can occupy the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Single-square rock.
    SmallRock,
    /// Two-by-two rock.
    SquareRock,
    /// Rock with a randomly generated, connected footprint.
    RandomRock,
    /// Crawler that stops to eat roots.
    Slug,
    /// Crawler that eats roots while it keeps moving.
    Snail,
    /// Horizontal patroller that displaces other enemies.
    Bee,
    /// Amber block holding a bee queen.
    AmberBee,
}

impl EntityKind {
    /// Reports whether the kind is a rock.
    #[must_use]
    pub const fn is_rock(self) -> bool {
        matches!(self, Self::SmallRock | Self::SquareRock | Self::RandomRock)
    }
}

/// Reason an enemy died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// A falling rock landed on it.
    Crushed,
    /// It ran out of breath under water.
    Drowned,
    /// A bee flew into it and it could not get out of the way.
    Stung,
}

/// Symbolic audio cues the world requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Soil was dug.
    Dirt,
    /// The player moved along an existing root.
    Root,
    /// An enemy died.
    Death,
    /// A corpse was consumed.
    Corpse,
    /// A rock was pushed.
    Hit,
    /// An amber block was broken.
    Amber,
}

impl AudioCue {
    /// Name of the clip the audio layer should play.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dirt => "Dirt",
            Self::Root => "Root",
            Self::Death => "Death",
            Self::Corpse => "Corpse",
            Self::Hit => "hit",
            Self::Amber => "Amber",
        }
    }
}

/// Origin of a nourishment change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NourishmentSource {
    /// Cost of digging a tile.
    Digging,
    /// Cost of pushing a heavy entity.
    Pushing,
    /// Reward for consuming a corpse.
    Corpse,
    /// Reward for digging nutrition-rich soil.
    Nutrition,
    /// Water absorbed by connected roots.
    Absorption,
    /// Cost of breaking an amber block.
    Amber,
    /// Refund granted by freed bee queens after a costly step.
    QueenBonus,
}

/// Progress reported by the nourishment sink after each mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowerProgress {
    /// The flower is alive and still growing.
    Growing,
    /// Every growth condition has been met.
    Victory,
    /// Nourishment fell below the survival floor.
    Withered,
}

/// External owner of the nourishment pool.
///
/// The world calls into the sink whenever digging, absorption or corpses change
/// nourishment and uses [`NourishmentSink::nourishment`] to gate whether a dig
/// is affordable. Victory and game-over rules belong to the implementor; the
/// world only reacts to the returned [`FlowerProgress`].
pub trait NourishmentSink: fmt::Debug {
    /// Current nourishment.
    fn nourishment(&self) -> f32;

    /// Applies a signed nourishment change.
    fn add_nourishment(&mut self, delta: f32, source: NourishmentSource) -> FlowerProgress;

    /// Reports whether breaking an amber block is currently allowed.
    fn can_break_amber(&self) -> bool;

    /// Breaks an amber block, paying its cost and freeing the queen inside.
    fn break_amber(&mut self) -> FlowerProgress;

    /// Called once after every simulation step.
    ///
    /// Returns the nourishment granted by the sink itself, if any, together
    /// with the progress after that grant.
    fn settle_step(&mut self) -> Option<(f32, FlowerProgress)> {
        None
    }
}

/// Reasons a spread request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum SpreadError {
    /// The game has ended; no further growth is possible.
    #[error("the flower has withered")]
    GameOver,
    /// The target square lies outside the playable world.
    #[error("target square is outside the world")]
    OutOfWorld,
    /// The player is not standing on a root tile.
    #[error("the player is not on a root")]
    NotRooted,
    /// The target tile cannot be dug.
    #[error("target tile cannot be dug")]
    Undiggable,
    /// An entity in the target square refuses to yield.
    #[error("an entity blocks the target square")]
    Blocked,
    /// The flower cannot afford the dig.
    #[error("digging costs {cost} but only {available} nourishment is available")]
    TooExpensive {
        /// Nourishment the dig would consume.
        cost: f32,
        /// Nourishment currently available.
        available: f32,
    },
}

/// Reasons an entity placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum PlacementError {
    /// Part of the footprint lies outside the world bounds.
    #[error("footprint leaves the world")]
    OutOfBounds,
    /// Part of the footprint lies in rows that were not generated yet.
    #[error("footprint reaches ungenerated rows")]
    NotGenerated,
    /// The footprint is too close to the surface.
    #[error("footprint is too close to the surface")]
    TooShallow,
    /// The footprint overlaps another entity.
    #[error("footprint overlaps another entity")]
    Occupied,
    /// The footprint overlaps terrain that cannot host an entity.
    #[error("footprint overlaps solid terrain")]
    Blocked,
}

#[cfg(test)]
mod tests {
    use super::{AudioCue, Coord, Direction, EntityKind, SpreadError};

    #[test]
    fn rotations_cycle_through_all_directions() {
        for direction in Direction::ALL {
            assert_eq!(direction.clockwise().counter_clockwise(), direction);
            assert_eq!(
                direction.clockwise().clockwise(),
                direction.opposite(),
                "two quarter turns must reverse {direction:?}"
            );
        }
    }

    #[test]
    fn unit_vectors_match_orientation() {
        let origin = Coord::new(3, -4);
        assert_eq!(origin.step(Direction::Up), Coord::new(3, -3));
        assert_eq!(origin.step(Direction::Down), Coord::new(3, -5));
        assert_eq!(origin.step(Direction::Left), Coord::new(2, -4));
        assert_eq!(origin.step(Direction::Right), Coord::new(4, -4));
    }

    #[test]
    fn mask_indices_are_distinct() {
        let mut seen = [false; 4];
        for direction in Direction::ALL {
            assert!(!seen[direction.index()]);
            seen[direction.index()] = true;
        }
    }

    #[test]
    fn depth_counts_rows_below_surface() {
        assert_eq!(Coord::new(0, 0).depth(), 0);
        assert_eq!(Coord::new(5, -12).depth(), 12);
        assert_eq!(Coord::new(5, 3).depth(), 0);
    }

    #[test]
    fn only_rock_kinds_are_rocks() {
        assert!(EntityKind::RandomRock.is_rock());
        assert!(EntityKind::SquareRock.is_rock());
        assert!(!EntityKind::Slug.is_rock());
        assert!(!EntityKind::AmberBee.is_rock());
    }

    #[test]
    fn hit_cue_keeps_lowercase_clip_name() {
        assert_eq!(AudioCue::Hit.name(), "hit");
        assert_eq!(AudioCue::Dirt.name(), "Dirt");
    }

    #[test]
    fn spread_error_messages_mention_costs() {
        let message = SpreadError::TooExpensive {
            cost: 5.0,
            available: 3.0,
        }
        .to_string();
        assert!(message.contains('5'));
        assert!(message.contains('3'));
    }
}
