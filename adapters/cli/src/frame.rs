//! ASCII frame of the rows surrounding the player.

use rootbound_core::{Coord, EntityKind, RootStatus, TileKind};
use rootbound_world::{
    query::{self, EntitySnapshot},
    World,
};

/// Water above this amount renders as a full square.
const DEEP_WATER: f32 = 0.5;

/// Renders `half_height` rows above and below the player, one line per row.
pub(crate) fn render(world: &World, half_height: u32) -> String {
    let player = query::player(world).position;
    let width = query::map_width(world) as i32;
    let last_generated = query::generated_rows(world).saturating_sub(1);
    let depth = player.depth();
    let first = depth.saturating_sub(half_height);
    let last = depth.saturating_add(half_height).min(last_generated);
    let entities = query::entity_view(world);

    let mut frame = String::new();
    for row in first..=last {
        for x in 0..width {
            let coord = Coord::new(x, -(row as i32));
            frame.push(glyph(world, coord, player, &entities));
        }
        frame.push('\n');
    }
    frame
}

fn glyph(world: &World, coord: Coord, player: Coord, entities: &[EntitySnapshot]) -> char {
    if coord == player {
        return '@';
    }
    if let Some(entity) = entities
        .iter()
        .find(|entity| entity.locations.contains(&coord))
    {
        return entity_glyph(entity);
    }
    match query::tile(world, coord) {
        Some(TileKind::Air) => {
            let water = query::water(world, coord).map_or(0.0, |water| water.amount);
            if water > DEEP_WATER {
                '~'
            } else if water > 0.0 {
                '-'
            } else {
                ' '
            }
        }
        Some(TileKind::Ground) => '.',
        Some(TileKind::SuperGround) => '#',
        Some(TileKind::EvilGround) => 'x',
        Some(TileKind::NutritionGround) => ':',
        Some(TileKind::Grass) => '"',
        Some(TileKind::FlowerGrass) => '*',
        Some(TileKind::Root) => match query::root(world, coord).map(|root| root.status) {
            Some(RootStatus::Initial) => 'I',
            Some(RootStatus::Connected) => 'R',
            Some(RootStatus::Disconnected) => 'r',
            Some(RootStatus::Spawned) | None => 'o',
        },
        None => '?',
    }
}

fn entity_glyph(entity: &EntitySnapshot) -> char {
    if entity.alive == Some(false) {
        return '%';
    }
    match entity.kind {
        EntityKind::SmallRock | EntityKind::SquareRock | EntityKind::RandomRock => 'O',
        EntityKind::Slug => 's',
        EntityKind::Snail => 'n',
        EntityKind::Bee => 'b',
        EntityKind::AmberBee => 'A',
    }
}
