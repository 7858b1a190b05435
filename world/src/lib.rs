#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Rootbound.
//!
//! The world owns the grid, the entity registry, the player head, the random
//! source and the nourishment sink. Every mutation arrives either through
//! [`apply`] or through the direct edit methods on [`World`]; every observable
//! consequence leaves as an [`Event`]. Read access goes through [`query`].

use std::{collections::BTreeSet, mem, ops::Range};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rootbound_core::{
    config::{ConfigError, WorldConfig},
    Command, Coord, EntityId, EntityKind, Event, FlowerProgress, NourishmentSink,
    NourishmentSource, PlacementError, RootStatus, TileKind, WELCOME_BANNER,
};
use tracing::info;

mod enemies;
mod entities;
mod fluid;
mod generation;
mod grid;
mod motion;
mod player;
mod roots;
mod tiles;

use entities::{EntityRegistry, Prototype};
use grid::{Grid, GridSquare};
use player::Player;
use tiles::{RootTile, Tile};

/// Represents the authoritative Rootbound world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: WorldConfig,
    grid: Grid,
    entities: EntityRegistry,
    player: Player,
    sink: Box<dyn NourishmentSink>,
    rng: ChaCha8Rng,
    tick: u64,
    game_over: bool,
    victory: bool,
    /// Events raised before the first command, delivered by the next [`apply`].
    pending: Vec<Event>,
}

impl World {
    /// Creates a world whose random source is seeded from `config.seed`.
    pub fn new(config: WorldConfig, sink: Box<dyn NourishmentSink>) -> Result<Self, ConfigError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, sink, rng)
    }

    /// Creates a world drawing from the provided random source.
    ///
    /// The rows covering the initial simulated window are generated eagerly;
    /// their events are handed out by the first [`apply`] call.
    pub fn with_rng(
        config: WorldConfig,
        sink: Box<dyn NourishmentSink>,
        rng: ChaCha8Rng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let start = Coord::new(config.center_column() as i32, 0);
        let mut world = Self {
            banner: WELCOME_BANNER,
            grid: Grid::new(config.map_width),
            entities: EntityRegistry::new(),
            player: Player::new(start),
            sink,
            rng,
            tick: 0,
            game_over: false,
            victory: false,
            pending: Vec::new(),
            config,
        };
        let mut startup = Vec::new();
        let rows = world.simulated_rows().end + 1;
        world.ensure_rows(rows, &mut startup);
        world.pending = startup;
        Ok(world)
    }

    /// Rows stepped by the simulation around the player's depth.
    fn simulated_rows(&self) -> Range<u32> {
        let depth = self.player.position().depth();
        let reach = self.config.view_half_height + self.config.extra_simulated_rows;
        depth.saturating_sub(reach)..depth + reach + 1
    }

    /// Advances roots, entities and water by one step.
    pub fn simulation_step(&mut self, out_events: &mut Vec<Event>) {
        self.tick += 1;
        let rows = self.simulated_rows();
        self.ensure_rows(rows.end + 1, out_events);

        self.step_roots(rows.clone(), out_events);
        self.step_entities(rows.clone(), out_events);
        self.step_fluid(rows, out_events);

        if let Some((bonus, progress)) = self.sink.settle_step() {
            out_events.push(Event::NourishmentChanged {
                delta: bonus,
                total: self.sink.nourishment(),
                source: NourishmentSource::QueenBonus,
            });
            self.handle_progress(progress, out_events);
        }
        out_events.push(Event::TimeAdvanced { tick: self.tick });
    }

    /// Steps every entity in the rows once, deepest first.
    fn step_entities(&mut self, rows: Range<u32>, out_events: &mut Vec<Event>) {
        let mut seen = BTreeSet::new();
        let mut order = Vec::new();
        for coord in self.grid.coords_in_rows(rows) {
            if let Some(square) = self.grid.square(coord) {
                for &id in &square.entities {
                    if seen.insert(id) {
                        order.push(id);
                    }
                }
            }
        }
        for id in order.into_iter().rev() {
            if self.entities.contains(id) {
                self.step_entity(id, out_events);
            }
        }
    }

    /// Applies a signed nourishment change through the sink.
    pub(crate) fn nourish(
        &mut self,
        delta: f32,
        source: NourishmentSource,
        out_events: &mut Vec<Event>,
    ) {
        if delta == 0.0 {
            return;
        }
        let progress = self.sink.add_nourishment(delta, source);
        out_events.push(Event::NourishmentChanged {
            delta,
            total: self.sink.nourishment(),
            source,
        });
        self.handle_progress(progress, out_events);
    }

    pub(crate) fn handle_progress(&mut self, progress: FlowerProgress, out_events: &mut Vec<Event>) {
        match progress {
            FlowerProgress::Growing => {}
            FlowerProgress::Victory => {
                if !self.victory {
                    self.victory = true;
                    info!(tick = self.tick, "flower reached full bloom");
                    out_events.push(Event::Victory);
                }
            }
            FlowerProgress::Withered => {
                if !self.game_over {
                    self.game_over = true;
                    info!(tick = self.tick, "flower withered");
                    out_events.push(Event::GameOver);
                }
            }
        }
    }

    /// Replaces the tile at `coord` with a fresh tile of the provided kind.
    ///
    /// Roots created this way are spawned and unlinked; use
    /// [`World::place_root`] for a linked root. Returns `false` when the
    /// square does not exist.
    pub fn replace_tile(
        &mut self,
        coord: Coord,
        kind: TileKind,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let tile = Tile::from_kind(kind, coord.depth(), &self.config.tiles);
        self.replace_tile_with(coord, tile, out_events)
    }

    pub(crate) fn replace_tile_with(
        &mut self,
        coord: Coord,
        tile: Tile,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(square) = self.grid.square_mut(coord) else {
            return false;
        };
        let to = tile.kind();
        let old = mem::replace(&mut square.tile, tile);
        out_events.push(Event::TileReplaced {
            coord,
            from: old.kind(),
            to,
        });
        if let Tile::Root(removed) = old {
            self.on_root_removed(coord, &removed, out_events);
        }
        true
    }

    /// Places a root with the provided status and links it to every
    /// neighbouring root.
    pub fn place_root(
        &mut self,
        coord: Coord,
        status: RootStatus,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if !self.replace_tile_with(coord, Tile::Root(RootTile::new(status)), out_events) {
            return false;
        }
        for direction in rootbound_core::Direction::ALL {
            let _ = self.connect_with_neigh(coord, direction, out_events);
        }
        true
    }

    /// Overwrites the water in a square, clamped to `[0, 1]`.
    pub fn set_water(&mut self, coord: Coord, amount: f32) -> bool {
        match self.grid.square_mut(coord) {
            Some(square) => {
                square.water.set(amount);
                true
            }
            None => false,
        }
    }

    /// Moves the player head to an existing square and forgets its trail.
    pub fn place_player(&mut self, coord: Coord) -> bool {
        if self.grid.square(coord).is_none() {
            return false;
        }
        self.player.teleport(coord);
        true
    }

    /// Places a new entity anchored at `origin`.
    ///
    /// Footprint squares that are not air are dug out first.
    pub fn spawn_entity(
        &mut self,
        kind: EntityKind,
        origin: Coord,
        out_events: &mut Vec<Event>,
    ) -> Result<EntityId, PlacementError> {
        let prototype =
            Prototype::roll(kind, &self.config.entities, &self.config.enemies, &mut self.rng);
        self.place_prototype(prototype, origin, out_events)
    }

    /// Removes an entity from the world.
    pub fn remove_entity(&mut self, entity: EntityId, out_events: &mut Vec<Event>) -> bool {
        self.take_entity(entity, out_events).is_some()
    }

    /// Generates rows until `coord` exists; `false` when it is outside the world.
    pub fn generate_through(&mut self, coord: Coord, out_events: &mut Vec<Event>) -> bool {
        self.square_generating(coord, out_events).is_some()
    }

    /// Looks up a square, generating the rows above it first.
    pub(crate) fn square_generating(
        &mut self,
        coord: Coord,
        out_events: &mut Vec<Event>,
    ) -> Option<&GridSquare> {
        if !self.grid.in_bounds(coord) {
            return None;
        }
        self.ensure_rows(coord.depth().saturating_add(1), out_events);
        self.grid.square(coord)
    }

    fn ensure_rows(&mut self, rows: u32, out_events: &mut Vec<Event>) {
        while self.grid.row_count() < rows {
            self.generate_more_map(out_events);
        }
    }

    /// First reason the footprint cannot host an entity, if any.
    pub(crate) fn placement_error(&self, locations: &[Coord]) -> Option<PlacementError> {
        for &location in locations {
            if !self.grid.in_bounds(location) {
                return Some(PlacementError::OutOfBounds);
            }
            let Some(square) = self.grid.square(location) else {
                return Some(PlacementError::NotGenerated);
            };
            if location.depth() < self.config.generation.min_entity_depth {
                return Some(PlacementError::TooShallow);
            }
            if !square.entities.is_empty() {
                return Some(PlacementError::Occupied);
            }
            if matches!(
                square.tile,
                Tile::SuperGround | Tile::Root(_) | Tile::Grass | Tile::FlowerGrass
            ) {
                return Some(PlacementError::Blocked);
            }
        }
        None
    }

    pub(crate) fn place_prototype(
        &mut self,
        prototype: Prototype,
        origin: Coord,
        out_events: &mut Vec<Event>,
    ) -> Result<EntityId, PlacementError> {
        let locations = prototype.locations(origin);
        if let Some(reason) = self.placement_error(&locations) {
            return Err(reason);
        }
        for &location in &locations {
            if self.grid.tile(location).is_some_and(|tile| *tile != Tile::Air) {
                let _ = self.replace_tile_with(location, Tile::Air, out_events);
            }
        }
        Ok(self.insert_entity(prototype, origin, out_events))
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    out_events.append(&mut world.pending);

    match command {
        Command::Spread { direction } => match world.spread(direction, out_events) {
            Ok(()) => {
                if !world.game_over {
                    world.simulation_step(out_events);
                }
            }
            Err(reason) => out_events.push(Event::SpreadRejected { direction, reason }),
        },
        Command::Retreat => {
            if world.game_over {
                return;
            }
            if world.retreat(out_events) {
                world.simulation_step(out_events);
            } else {
                out_events.push(Event::RetreatRejected);
            }
        }
        Command::Idle => {
            if !world.game_over {
                world.simulation_step(out_events);
            }
        }
        Command::SpawnEntity { kind, origin } => {
            if world.game_over {
                return;
            }
            if let Err(reason) = world.spawn_entity(kind, origin, out_events) {
                out_events.push(Event::PlacementRejected {
                    kind,
                    origin,
                    reason,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::{collections::BTreeSet, ops::Range};

    use rootbound_core::{
        config::WorldConfig, Coord, Direction, EntityId, EntityKind, RootStatus, TileKind,
    };

    use super::{
        entities::{Entity, Gait},
        World,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Number of simulation steps executed so far.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick
    }

    /// Number of columns in the grid.
    #[must_use]
    pub fn map_width(world: &World) -> u32 {
        world.grid.width()
    }

    /// Number of rows generated so far.
    #[must_use]
    pub fn generated_rows(world: &World) -> u32 {
        world.grid.row_count()
    }

    /// Rows the next simulation step will cover.
    #[must_use]
    pub fn simulated_rows(world: &World) -> Range<u32> {
        world.simulated_rows()
    }

    /// Kind of the tile at `coord`.
    #[must_use]
    pub fn tile(world: &World, coord: Coord) -> Option<TileKind> {
        world.grid.tile(coord).map(super::Tile::kind)
    }

    /// Tile kinds of a whole row, left to right.
    #[must_use]
    pub fn row_tiles(world: &World, row: u32) -> Option<Vec<TileKind>> {
        let y = -i32::try_from(row).ok()?;
        (0..world.grid.width())
            .map(|x| tile(world, Coord::new(x as i32, y)))
            .collect()
    }

    /// State of the root at `coord`, if the square holds one.
    #[must_use]
    pub fn root(world: &World, coord: Coord) -> Option<RootSnapshot> {
        world.grid.root(coord).map(|root| RootSnapshot {
            status: root.status(),
            health: root.health(),
            connections: root.connections(),
        })
    }

    /// Water held by the square at `coord`.
    #[must_use]
    pub fn water(world: &World, coord: Coord) -> Option<WaterSnapshot> {
        world.grid.square(coord).map(|square| WaterSnapshot {
            amount: square.water.amount(),
            peak: square.water.peak(),
        })
    }

    /// Sum of the water in every generated square.
    #[must_use]
    pub fn total_water(world: &World) -> f32 {
        world
            .grid
            .coords_in_rows(0..world.grid.row_count())
            .into_iter()
            .filter_map(|coord| world.grid.square(coord))
            .map(|square| square.water.amount())
            .sum()
    }

    /// Entities registered on the square at `coord`.
    #[must_use]
    pub fn occupants(world: &World, coord: Coord) -> Vec<EntityId> {
        world
            .grid
            .square(coord)
            .map(|square| square.entities.clone())
            .unwrap_or_default()
    }

    /// Snapshot of a single entity.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<EntitySnapshot> {
        world.entities.get(id).map(EntitySnapshot::capture)
    }

    /// Snapshots of every entity ordered by identifier.
    #[must_use]
    pub fn entity_view(world: &World) -> Vec<EntitySnapshot> {
        world.entities.iter().map(EntitySnapshot::capture).collect()
    }

    /// Position and trail of the player head.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position(),
            trail: world.player.trail().to_vec(),
        }
    }

    /// Nourishment currently held by the sink.
    #[must_use]
    pub fn nourishment(world: &World) -> f32 {
        world.sink.nourishment()
    }

    /// Reports whether the flower withered.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Reports whether the flower reached its final stage.
    #[must_use]
    pub fn has_won(world: &World) -> bool {
        world.victory
    }

    /// Roots reachable from `start` over linked roots whose status passes `filter`.
    ///
    /// The start root is included regardless of its status.
    #[must_use]
    pub fn reachable_roots<F>(world: &World, start: Coord, filter: F) -> BTreeSet<Coord>
    where
        F: Fn(RootStatus) -> bool,
    {
        world.reachable_roots(start, filter)
    }

    /// Immutable view of a root tile.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct RootSnapshot {
        /// Lifecycle state of the root.
        pub status: RootStatus,
        /// Remaining health in `[0, 1]`.
        pub health: f32,
        /// Link bit mask indexed by `Direction::index`.
        pub connections: u8,
    }

    /// Immutable view of a square's water.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct WaterSnapshot {
        /// Current amount in `[0, 1]`.
        pub amount: f32,
        /// Highest amount seen during the last step.
        pub peak: f32,
    }

    /// Immutable representation of a single entity used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EntitySnapshot {
        /// Unique identifier assigned to the entity.
        pub id: EntityId,
        /// Type of the entity.
        pub kind: EntityKind,
        /// Anchor square.
        pub anchor: Coord,
        /// Every occupied square.
        pub locations: Vec<Coord>,
        /// Whether an enemy is alive; `None` for rocks and amber.
        pub alive: Option<bool>,
        /// Remaining breath of an enemy.
        pub breath: Option<f32>,
        /// Direction an enemy travels next: a crawler's forward or a bee's heading.
        pub facing: Option<Direction>,
    }

    impl EntitySnapshot {
        fn capture(entity: &Entity) -> Self {
            let enemy = entity.enemy();
            Self {
                id: entity.id,
                kind: entity.kind,
                anchor: entity.anchor,
                locations: entity.locations.clone(),
                alive: enemy.map(|enemy| enemy.alive),
                breath: enemy.map(|enemy| enemy.breath),
                facing: enemy.map(|enemy| match enemy.gait {
                    Gait::Crawler { forward, .. } => forward,
                    Gait::Patrol { heading } => heading,
                }),
            }
        }
    }

    /// Position of the player head and the squares it can retreat through.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Square the player head occupies.
        pub position: Coord,
        /// Earlier positions, oldest first.
        pub trail: Vec<Coord>,
    }
}
