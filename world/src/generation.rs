//! Chunk generation: weighted tile picks, cellular smoothing, water and entities.

use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};
use rootbound_core::{
    config::{EntityWeights, GenerationTuning, Terrain},
    Coord, Direction, EntityKind, Event, RootStatus, TileKind,
};
use tracing::{debug, trace};

use crate::{
    entities::Prototype,
    grid::GridSquare,
    tiles::{RootTile, Tile},
    World,
};

impl World {
    /// Appends one chunk of rows below the deepest generated row.
    pub fn generate_more_map(&mut self, out_events: &mut Vec<Event>) {
        let first_row = self.grid.row_count();
        let rows = self.config.chunk_size;

        match self.config.terrain {
            Terrain::Uniform(kind) => self.generate_uniform(kind, first_row, rows),
            Terrain::Procedural => self.generate_procedural(first_row, rows, out_events),
        }

        for coord in self.grid.coords_in_rows(first_row..first_row + rows) {
            if self.grid.root(coord).is_some() {
                for direction in Direction::ALL {
                    let _ = self.link_roots(coord, direction);
                }
            }
        }

        debug!(first_row, rows, "generated chunk");
        out_events.push(Event::ChunkGenerated { first_row, rows });
    }

    fn generate_uniform(&mut self, kind: TileKind, first_row: u32, rows: u32) {
        for depth in first_row..first_row + rows {
            let row = (0..self.grid.width())
                .map(|_| GridSquare::new(Tile::from_kind(kind, depth, &self.config.tiles)))
                .collect();
            self.grid.push_row(row);
        }
    }

    fn generate_procedural(&mut self, first_row: u32, rows: u32, out_events: &mut Vec<Event>) {
        let width = self.grid.width();
        let center = self.config.center_column();
        let tuning = self.config.generation.clone();

        let mut kinds: Vec<Vec<TileKind>> = (first_row..first_row + rows)
            .map(|depth| {
                (0..width)
                    .map(|x| {
                        if depth == 0 {
                            surface_kind(x, center)
                        } else {
                            pick_tile_kind(&tuning, depth, &mut self.rng)
                        }
                    })
                    .collect()
            })
            .collect();

        for (kind, threshold) in [
            (TileKind::EvilGround, tuning.evil_threshold),
            (TileKind::Root, tuning.root_threshold),
            (TileKind::Air, tuning.air_threshold),
        ] {
            self.smooth_pass(&mut kinds, first_row, kind, threshold, tuning.smoothing_radius);
        }

        for (depth, row) in (first_row..).zip(&kinds) {
            let squares = row
                .iter()
                .map(|&kind| {
                    let tile = if depth == 0 && kind == TileKind::Root {
                        Tile::Root(RootTile::new(RootStatus::Initial))
                    } else {
                        Tile::from_kind(kind, depth, &self.config.tiles)
                    };
                    GridSquare::new(tile)
                })
                .collect();
            self.grid.push_row(squares);
        }

        self.seed_water(first_row..first_row + rows, &tuning);
        self.place_chunk_entities(first_row, rows, &tuning, out_events);
    }

    /// One cellular-automaton pass for a single tile kind.
    ///
    /// All counts are taken before any cell changes. Rows above the chunk are
    /// read from the grid; the surface row never changes.
    fn smooth_pass(
        &self,
        kinds: &mut [Vec<TileKind>],
        first_row: u32,
        kind: TileKind,
        threshold: u32,
        radius: u32,
    ) {
        let radius = i64::from(radius);
        let width = i64::from(self.grid.width());
        let chunk_end = i64::from(first_row) + kinds.len() as i64;

        let kind_at = |kinds: &[Vec<TileKind>], row: i64, x: i64| -> Option<TileKind> {
            if row < 0 || x < 0 || x >= width || row >= chunk_end {
                return None;
            }
            if row >= i64::from(first_row) {
                let local = usize::try_from(row - i64::from(first_row)).ok()?;
                let column = usize::try_from(x).ok()?;
                return kinds.get(local)?.get(column).copied();
            }
            let coord = Coord::new(i32::try_from(x).ok()?, -i32::try_from(row).ok()?);
            self.grid.tile(coord).map(Tile::kind)
        };

        let mut counts = Vec::with_capacity(kinds.len());
        for (local, row) in kinds.iter().enumerate() {
            let depth = i64::from(first_row) + local as i64;
            let row_counts: Vec<u32> = (0..row.len() as i64)
                .map(|x| {
                    let mut count = 0;
                    for dy in -radius..=radius {
                        for dx in -radius..=radius {
                            if (dx, dy) != (0, 0) && kind_at(kinds, depth + dy, x + dx) == Some(kind)
                            {
                                count += 1;
                            }
                        }
                    }
                    count
                })
                .collect();
            counts.push(row_counts);
        }

        for (local, (row, row_counts)) in kinds.iter_mut().zip(counts).enumerate() {
            if u64::from(first_row) + local as u64 == 0 {
                continue;
            }
            for (cell, count) in row.iter_mut().zip(row_counts) {
                if count > threshold {
                    *cell = kind;
                } else if *cell == kind {
                    *cell = TileKind::Ground;
                }
            }
        }
    }

    fn seed_water(&mut self, rows: std::ops::Range<u32>, tuning: &GenerationTuning) {
        for coord in self.grid.coords_in_rows(rows) {
            if coord.depth() < tuning.water_min_depth {
                continue;
            }
            let Some(square) = self.grid.square_mut(coord) else {
                continue;
            };
            if square.tile.accepts_fluid() && self.rng.gen::<f32>() < tuning.water_chance {
                square.water.set(self.rng.gen_range(0.5..=1.0));
            }
        }
    }

    fn place_chunk_entities(
        &mut self,
        first_row: u32,
        rows: u32,
        tuning: &GenerationTuning,
        out_events: &mut Vec<Event>,
    ) {
        let width = self.grid.width();
        for _ in 0..tuning.entities_per_chunk {
            let Some(kind) = pick_entity_kind(&tuning.entity_weights, &mut self.rng) else {
                return;
            };
            let prototype =
                Prototype::roll(kind, &self.config.entities, &self.config.enemies, &mut self.rng);

            let mut placed = false;
            for attempt in 0..tuning.placement_retries {
                let x = self.rng.gen_range(0..width);
                let row = self.rng.gen_range(first_row..first_row + rows);
                let origin = Coord::new(x as i32, -(row as i32));
                match self.placement_error(&prototype.locations(origin)) {
                    None => {
                        let _ = self.place_prototype(prototype.clone(), origin, out_events);
                        placed = true;
                        break;
                    }
                    Some(reason) => {
                        trace!(?kind, %origin, attempt, %reason, "entity placement retry");
                    }
                }
            }
            if !placed {
                trace!(?kind, first_row, "entity skipped in chunk");
            }
        }
    }
}

fn surface_kind(x: u32, center: u32) -> TileKind {
    if x == center {
        TileKind::Root
    } else if x + 1 == center {
        TileKind::FlowerGrass
    } else {
        TileKind::Grass
    }
}

/// Weighted pick of a below-surface tile; whatever probability is left over
/// becomes plain ground.
fn pick_tile_kind<R: Rng>(tuning: &GenerationTuning, depth: u32, rng: &mut R) -> TileKind {
    let depth_f = depth as f32;
    let air = (tuning.air_base - tuning.air_falloff * depth_f).max(tuning.air_min);
    let evil = if depth >= tuning.evil_min_depth {
        (tuning.evil_base + tuning.evil_growth * depth_f).min(tuning.evil_max)
    } else {
        0.0
    };
    let table = [
        (TileKind::Root, tuning.root_chance),
        (TileKind::Air, air),
        (TileKind::EvilGround, evil),
        (TileKind::NutritionGround, tuning.nutrition_chance),
        (TileKind::SuperGround, tuning.super_chance),
    ];

    let mut roll = rng.gen::<f32>();
    for (kind, chance) in table {
        if roll < chance {
            return kind;
        }
        roll -= chance;
    }
    TileKind::Ground
}

fn pick_entity_kind<R: Rng>(weights: &EntityWeights, rng: &mut R) -> Option<EntityKind> {
    let table = [
        (EntityKind::SmallRock, weights.small_rock),
        (EntityKind::SquareRock, weights.square_rock),
        (EntityKind::RandomRock, weights.random_rock),
        (EntityKind::Slug, weights.slug),
        (EntityKind::Snail, weights.snail),
        (EntityKind::Bee, weights.bee),
        (EntityKind::AmberBee, weights.amber_bee),
    ];
    let distribution = WeightedIndex::new(table.iter().map(|&(_, weight)| weight)).ok()?;
    Some(table[distribution.sample(rng)].0)
}
