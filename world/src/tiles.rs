//! Terrain variants stored in grid squares.

use rootbound_core::{config::TileTuning, Direction, RootStatus, TileKind};

/// Terrain occupying a single square.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Tile {
    Air,
    Ground,
    SuperGround,
    /// Hardness is fixed at generation time from the row depth.
    EvilGround {
        hardness: f32,
    },
    NutritionGround,
    Grass,
    FlowerGrass,
    Root(RootTile),
}

impl Tile {
    /// Materialises a tile of the provided kind at the given depth.
    ///
    /// Roots start out as inert, fully healthy spawned roots.
    pub(crate) fn from_kind(kind: TileKind, depth: u32, tuning: &TileTuning) -> Self {
        match kind {
            TileKind::Air => Self::Air,
            TileKind::Ground => Self::Ground,
            TileKind::SuperGround => Self::SuperGround,
            TileKind::EvilGround => Self::EvilGround {
                hardness: tuning.evil_base_hardness + tuning.evil_hardness_per_row * depth as f32,
            },
            TileKind::NutritionGround => Self::NutritionGround,
            TileKind::Grass => Self::Grass,
            TileKind::FlowerGrass => Self::FlowerGrass,
            TileKind::Root => Self::Root(RootTile::new(RootStatus::Spawned)),
        }
    }

    pub(crate) const fn kind(&self) -> TileKind {
        match self {
            Self::Air => TileKind::Air,
            Self::Ground => TileKind::Ground,
            Self::SuperGround => TileKind::SuperGround,
            Self::EvilGround { .. } => TileKind::EvilGround,
            Self::NutritionGround => TileKind::NutritionGround,
            Self::Grass => TileKind::Grass,
            Self::FlowerGrass => TileKind::FlowerGrass,
            Self::Root(_) => TileKind::Root,
        }
    }

    /// Nourishment paid to dig the tile; negative means undiggable.
    pub(crate) fn hardness(&self, tuning: &TileTuning) -> f32 {
        match self {
            Self::Air => tuning.air_hardness,
            Self::Ground => tuning.ground_hardness,
            Self::EvilGround { hardness } => *hardness,
            Self::NutritionGround => tuning.nutrition_hardness,
            Self::Root(_) => tuning.root_hardness,
            Self::SuperGround | Self::Grass | Self::FlowerGrass => -1.0,
        }
    }

    pub(crate) fn is_diggable(&self, tuning: &TileTuning) -> bool {
        self.hardness(tuning) >= 0.0
    }

    /// Whether entities may enter the square.
    pub(crate) const fn is_passable(&self) -> bool {
        matches!(self, Self::Air)
    }

    /// Whether water may enter the square.
    ///
    /// Spawned roots stay dry until the network reaches them.
    pub(crate) const fn accepts_fluid(&self) -> bool {
        match self {
            Self::Air => true,
            Self::Root(root) => !matches!(root.status, RootStatus::Spawned),
            _ => false,
        }
    }

    /// Whether water sitting in the square must be displaced.
    pub(crate) const fn pushes_out_fluid(&self) -> bool {
        !matches!(self, Self::Air | Self::Root(_))
    }

    pub(crate) const fn as_root(&self) -> Option<&RootTile> {
        match self {
            Self::Root(root) => Some(root),
            _ => None,
        }
    }

    pub(crate) fn as_root_mut(&mut self) -> Option<&mut RootTile> {
        match self {
            Self::Root(root) => Some(root),
            _ => None,
        }
    }
}

/// Node of the root network.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RootTile {
    health: f32,
    status: RootStatus,
    connections: u8,
}

impl RootTile {
    pub(crate) const fn new(status: RootStatus) -> Self {
        Self {
            health: 1.0,
            status,
            connections: 0,
        }
    }

    pub(crate) const fn health(&self) -> f32 {
        self.health
    }

    pub(crate) const fn status(&self) -> RootStatus {
        self.status
    }

    /// Bit mask of linked neighbours, indexed by [`Direction::index`].
    pub(crate) const fn connections(&self) -> u8 {
        self.connections
    }

    pub(crate) const fn is_connected(&self, direction: Direction) -> bool {
        self.connections & (1 << direction.index()) != 0
    }

    pub(crate) fn connect(&mut self, direction: Direction) {
        self.connections |= 1 << direction.index();
    }

    pub(crate) fn disconnect(&mut self, direction: Direction) {
        self.connections &= !(1 << direction.index());
    }

    /// Changes the status, returning whether anything changed.
    ///
    /// The initial status is permanent: it can be neither assigned nor left.
    pub(crate) fn set_status(&mut self, status: RootStatus) -> bool {
        if self.status == RootStatus::Initial || status == RootStatus::Initial {
            return false;
        }
        let changed = self.status != status;
        self.status = status;
        changed
    }

    /// Removes health, returning `true` once the root has withered away.
    pub(crate) fn damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.health <= 0.0
    }

    pub(crate) fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(1.0);
    }
}
