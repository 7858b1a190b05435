//! Tuning knobs for world generation and simulation.
//!
//! Every balancing constant of the engine lives here. All structs deserialize
//! from partial documents: omitted fields fall back to [`Default`].

use serde::{Deserialize, Serialize};

use crate::TileKind;

/// Errors reported when a configuration cannot drive a world.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The map is too narrow to hold the flower and its root.
    #[error("map width {width} is below the minimum of {minimum}")]
    MapTooNarrow {
        /// Configured width.
        width: u32,
        /// Smallest accepted width.
        minimum: u32,
    },
    /// Chunks must contain at least one row.
    #[error("chunk size must be positive")]
    EmptyChunk,
    /// The fluid solver needs at least one substep per simulation step.
    #[error("fluid substeps must be positive")]
    NoSubsteps,
    /// A probability or rate fell outside its accepted range.
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Configured value.
        value: f32,
        /// Lower accepted bound.
        min: f32,
        /// Upper accepted bound.
        max: f32,
    },
}

/// Narrowest map that still has room for the flower and the initial root.
pub const MIN_MAP_WIDTH: u32 = 3;

/// Top-level configuration consumed by the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for the world's random source.
    pub seed: u64,
    /// Number of columns in the grid.
    pub map_width: u32,
    /// Rows appended by each generation pass.
    pub chunk_size: u32,
    /// Rows visible above and below the player.
    pub view_half_height: u32,
    /// Rows simulated beyond the visible range on each side.
    pub extra_simulated_rows: u32,
    /// Terrain source used for new rows.
    pub terrain: Terrain,
    /// Procedural generation weights.
    pub generation: GenerationTuning,
    /// Tile costs.
    pub tiles: TileTuning,
    /// Root health tuning.
    pub roots: RootTuning,
    /// Fluid solver tuning.
    pub fluid: FluidTuning,
    /// Enemy breath and appetite tuning.
    pub enemies: EnemyTuning,
    /// Rock and amber tuning.
    pub entities: EntityTuning,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_0f_f10e,
            map_width: 21,
            chunk_size: 10,
            view_half_height: 6,
            extra_simulated_rows: 10,
            terrain: Terrain::Procedural,
            generation: GenerationTuning::default(),
            tiles: TileTuning::default(),
            roots: RootTuning::default(),
            fluid: FluidTuning::default(),
            enemies: EnemyTuning::default(),
            entities: EntityTuning::default(),
        }
    }
}

impl WorldConfig {
    /// Creates the default configuration with the provided seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Column holding the initial root; the flower sits directly left of it.
    #[must_use]
    pub const fn center_column(&self) -> u32 {
        self.map_width / 2
    }

    /// Checks that the configuration describes a playable world.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_width < MIN_MAP_WIDTH {
            return Err(ConfigError::MapTooNarrow {
                width: self.map_width,
                minimum: MIN_MAP_WIDTH,
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::EmptyChunk);
        }
        if self.fluid.substeps == 0 {
            return Err(ConfigError::NoSubsteps);
        }

        let generation = &self.generation;
        unit("generation.root_chance", generation.root_chance)?;
        unit("generation.air_base", generation.air_base)?;
        unit("generation.air_min", generation.air_min)?;
        unit("generation.evil_base", generation.evil_base)?;
        unit("generation.evil_max", generation.evil_max)?;
        unit("generation.nutrition_chance", generation.nutrition_chance)?;
        unit("generation.super_chance", generation.super_chance)?;
        unit("generation.water_chance", generation.water_chance)?;
        unit("fluid.flow_rate", self.fluid.flow_rate)?;
        unit("fluid.absorption_rate", self.fluid.absorption_rate)?;
        unit("roots.decay_per_step", self.roots.decay_per_step)?;
        unit("roots.heal_per_absorb", self.roots.heal_per_absorb)?;
        unit("enemies.drown_threshold", self.enemies.drown_threshold)?;
        unit("entities.random_rock_chance", self.entities.random_rock_chance)?;
        if self.enemies.max_breath <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "enemies.max_breath",
                value: self.enemies.max_breath,
                min: f32::EPSILON,
                max: f32::MAX,
            });
        }
        Ok(())
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

/// Source of the tiles in freshly generated rows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Weighted random tiles, smoothing, surface features, water and entities.
    Procedural,
    /// Every square holds the same tile; no surface, water or entities.
    Uniform(TileKind),
}

/// Weights and thresholds of procedural chunk generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationTuning {
    /// Chance that a cell starts as a root.
    pub root_chance: f32,
    /// Air chance at the surface.
    pub air_base: f32,
    /// Air chance lost per row of depth.
    pub air_falloff: f32,
    /// Air chance never drops below this floor.
    pub air_min: f32,
    /// Depth (rows) from which evil ground may appear.
    pub evil_min_depth: u32,
    /// Evil ground chance at `evil_min_depth`.
    pub evil_base: f32,
    /// Evil ground chance gained per row of depth.
    pub evil_growth: f32,
    /// Evil ground chance never exceeds this ceiling.
    pub evil_max: f32,
    /// Chance that a cell is nutrition-rich soil.
    pub nutrition_chance: f32,
    /// Chance that a cell is bedrock.
    pub super_chance: f32,
    /// Neighbourhood radius counted by the smoothing passes.
    pub smoothing_radius: u32,
    /// Neighbour count an evil ground cell must exceed to persist or spread.
    pub evil_threshold: u32,
    /// Neighbour count a root cell must exceed to persist or spread.
    pub root_threshold: u32,
    /// Neighbour count an air cell must exceed to persist or spread.
    pub air_threshold: u32,
    /// Rows below the surface before water may be seeded.
    pub water_min_depth: u32,
    /// Chance that an open cell starts with water.
    pub water_chance: f32,
    /// Entity placement attempts per chunk.
    pub entities_per_chunk: u32,
    /// Random origins tried for each placement attempt.
    pub placement_retries: u32,
    /// Rows an entity footprint must stay below the surface.
    pub min_entity_depth: u32,
    /// Relative frequency of each entity kind.
    pub entity_weights: EntityWeights,
}

impl Default for GenerationTuning {
    fn default() -> Self {
        Self {
            root_chance: 0.18,
            air_base: 0.4,
            air_falloff: 0.004,
            air_min: 0.15,
            evil_min_depth: 15,
            evil_base: 0.05,
            evil_growth: 0.004,
            evil_max: 0.4,
            nutrition_chance: 0.03,
            super_chance: 0.02,
            smoothing_radius: 1,
            evil_threshold: 3,
            root_threshold: 2,
            air_threshold: 3,
            water_min_depth: 4,
            water_chance: 0.08,
            entities_per_chunk: 4,
            placement_retries: 10,
            min_entity_depth: 3,
            entity_weights: EntityWeights::default(),
        }
    }
}

/// Relative spawn frequencies used by chunk generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityWeights {
    /// Weight of single-square rocks.
    pub small_rock: f32,
    /// Weight of two-by-two rocks.
    pub square_rock: f32,
    /// Weight of randomly shaped rocks.
    pub random_rock: f32,
    /// Weight of slugs.
    pub slug: f32,
    /// Weight of snails.
    pub snail: f32,
    /// Weight of bees.
    pub bee: f32,
    /// Weight of amber blocks.
    pub amber_bee: f32,
}

impl Default for EntityWeights {
    fn default() -> Self {
        Self {
            small_rock: 3.0,
            square_rock: 1.5,
            random_rock: 1.5,
            slug: 2.0,
            snail: 1.0,
            bee: 0.5,
            amber_bee: 0.5,
        }
    }
}

/// Dig costs of the terrain variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileTuning {
    /// Cost of spreading into open air.
    pub air_hardness: f32,
    /// Cost of digging ordinary soil.
    pub ground_hardness: f32,
    /// Cost of moving along an existing root.
    pub root_hardness: f32,
    /// Cost of digging nutrition-rich soil.
    pub nutrition_hardness: f32,
    /// Nourishment granted when nutrition-rich soil is dug.
    pub nutrition_bonus: f32,
    /// Evil ground cost at the surface.
    pub evil_base_hardness: f32,
    /// Evil ground cost gained per row of depth.
    pub evil_hardness_per_row: f32,
}

impl Default for TileTuning {
    fn default() -> Self {
        Self {
            air_hardness: 1.0,
            ground_hardness: 5.0,
            root_hardness: 0.0,
            nutrition_hardness: 5.0,
            nutrition_bonus: 30.0,
            evil_base_hardness: 10.0,
            evil_hardness_per_row: 0.5,
        }
    }
}

/// Root health tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootTuning {
    /// Health lost per step by a disconnected root.
    pub decay_per_step: f32,
    /// Health regained by a root each time it absorbs water.
    pub heal_per_absorb: f32,
}

impl Default for RootTuning {
    fn default() -> Self {
        Self {
            decay_per_step: 0.02,
            heal_per_absorb: 0.05,
        }
    }
}

/// Cellular fluid solver tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidTuning {
    /// Base amount moved per flow substep.
    pub flow_rate: f32,
    /// Flow substeps per simulation step.
    pub substeps: u32,
    /// Multiplier applied to the flow rate for straight downward flow.
    pub below_factor: f32,
    /// Multiplier applied to the flow rate for diagonal downward flow.
    pub diagonal_factor: f32,
    /// Multiplier applied to the flow rate for sideways equalisation.
    pub lateral_factor: f32,
    /// Squares searched upward for displaced water without lateral outlets.
    pub displacement_search_limit: u32,
    /// Water absorbed per adjacent living root each step.
    pub absorption_rate: f32,
    /// Nourishment produced per unit of absorbed water.
    pub nourishment_per_water: f32,
}

impl Default for FluidTuning {
    fn default() -> Self {
        Self {
            flow_rate: 0.05,
            substeps: 4,
            below_factor: 10.0,
            diagonal_factor: 3.0,
            lateral_factor: 1.0,
            displacement_search_limit: 15,
            absorption_rate: 0.02,
            nourishment_per_water: 10.0,
        }
    }
}

/// Enemy breath, appetite and corpse tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Breath a healthy enemy holds.
    pub max_breath: f32,
    /// Breath regained per dry step; twice this is lost per submerged step.
    pub breath_rate: f32,
    /// Water level at which an enemy counts as submerged.
    pub drown_threshold: f32,
    /// Root health a slug eats per bite.
    pub slug_bite: f32,
    /// Root health a snail eats per bite.
    pub snail_bite: f32,
    /// Nourishment granted by a slug corpse.
    pub slug_corpse: f32,
    /// Nourishment granted by a snail corpse.
    pub snail_corpse: f32,
    /// Nourishment granted by a bee corpse.
    pub bee_corpse: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            max_breath: 1.0,
            breath_rate: 0.125,
            drown_threshold: 0.5,
            slug_bite: 0.25,
            snail_bite: 0.1,
            slug_corpse: 40.0,
            snail_corpse: 60.0,
            bee_corpse: 40.0,
        }
    }
}

/// Rock and amber tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTuning {
    /// Nourishment paid to push a rock.
    pub rock_heaviness: f32,
    /// Nourishment an amber block demands before it yields.
    pub amber_heaviness: f32,
    /// Width of the random rock bounding box.
    pub random_rock_width: u32,
    /// Height of the random rock bounding box.
    pub random_rock_height: u32,
    /// Fill chance of each cell in the random rock bounding box.
    pub random_rock_chance: f32,
}

impl Default for EntityTuning {
    fn default() -> Self {
        Self {
            rock_heaviness: 10.0,
            amber_heaviness: 750.0,
            random_rock_width: 3,
            random_rock_height: 3,
            random_rock_chance: 0.35,
        }
    }
}
