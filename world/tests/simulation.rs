use rootbound_core::{
    config::{FluidTuning, Terrain, WorldConfig},
    AudioCue, Command, Coord, DeathCause, Direction, EntityId, EntityKind, Event,
    NourishmentSource, RootStatus, TileKind,
};
use rootbound_system_flower::Flower;
use rootbound_world::{self as world, query, World};

fn uniform_world(kind: TileKind, fluid: FluidTuning) -> World {
    let config = WorldConfig {
        terrain: Terrain::Uniform(kind),
        fluid,
        ..WorldConfig::default()
    };
    World::new(config, Box::new(Flower::default())).expect("valid config")
}

fn bedrock_world() -> World {
    uniform_world(TileKind::SuperGround, FluidTuning::default())
}

fn carve(world: &mut World, coords: &[Coord]) {
    let mut events = Vec::new();
    for &coord in coords {
        assert!(world.replace_tile(coord, TileKind::Air, &mut events));
    }
}

fn idle(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Idle, &mut events);
    events
}

fn water_at(world: &World, coord: Coord) -> f32 {
    query::water(world, coord).map_or(0.0, |water| water.amount)
}

#[test]
fn water_spreads_sideways_at_the_lateral_rate() {
    let mut world = uniform_world(
        TileKind::SuperGround,
        FluidTuning {
            substeps: 1,
            ..FluidTuning::default()
        },
    );
    let left = Coord::new(4, -5);
    let middle = Coord::new(5, -5);
    let right = Coord::new(6, -5);
    carve(&mut world, &[left, middle, right]);
    assert!(world.set_water(left, 1.0));

    let _ = idle(&mut world);

    assert!((water_at(&world, left) - 0.95).abs() < 1e-5);
    assert!((water_at(&world, middle) - 0.05).abs() < 1e-5);
    assert_eq!(water_at(&world, right), 0.0);
}

#[test]
fn water_in_a_closed_corridor_is_conserved() {
    let mut world = bedrock_world();
    let corridor: Vec<Coord> = (2..9).map(|x| Coord::new(x, -6)).collect();
    carve(&mut world, &corridor);
    let basin = Coord::new(5, -7);
    carve(&mut world, &[basin]);
    assert!(world.set_water(Coord::new(2, -6), 1.0));
    assert!(world.set_water(Coord::new(8, -6), 0.7));

    let before = query::total_water(&world);
    for _ in 0..30 {
        let _ = idle(&mut world);
    }
    assert!((query::total_water(&world) - before).abs() < 1e-4);
    assert!(water_at(&world, basin) > 0.5);
}

#[test]
fn water_sealed_in_rock_evaporates_and_is_reported() {
    let mut world = bedrock_world();
    let sealed = Coord::new(3, -6);
    assert!(world.set_water(sealed, 1.0));

    let events = idle(&mut world);

    assert!(events.contains(&Event::FluidLost {
        coord: sealed,
        amount: 1.0,
    }));
    assert_eq!(water_at(&world, sealed), 0.0);
}

#[test]
fn displacement_shares_evenly_and_reports_overflow() {
    let mut world = bedrock_world();
    let source = Coord::new(5, -6);
    let dry = Coord::new(4, -6);
    let wet = Coord::new(6, -6);
    carve(&mut world, &[dry, wet]);
    assert!(world.set_water(source, 0.8));
    assert!(world.set_water(wet, 0.9));

    let events = idle(&mut world);

    assert!((water_at(&world, dry) - 0.4).abs() < 1e-5);
    assert!((water_at(&world, wet) - 1.0).abs() < 1e-5);
    assert_eq!(water_at(&world, source), 0.0);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::FluidLost { coord, amount } if *coord == source && (*amount - 0.3).abs() < 1e-5
    )));
}

#[test]
fn a_submerged_slug_drowns_on_the_fourth_step() {
    let mut world = bedrock_world();
    let pocket = Coord::new(5, -5);
    carve(&mut world, &[pocket]);
    let mut events = Vec::new();
    let slug = world
        .spawn_entity(EntityKind::Slug, pocket, &mut events)
        .expect("slug placed");
    assert!(world.set_water(pocket, 1.0));

    for _ in 0..3 {
        let _ = idle(&mut world);
        assert_eq!(query::entity(&world, slug).and_then(|e| e.alive), Some(true));
    }
    let events = idle(&mut world);
    assert!(events.contains(&Event::EnemyDied {
        entity: slug,
        cause: DeathCause::Drowned,
    }));
    assert!(events.contains(&Event::Audio {
        cue: AudioCue::Death
    }));
    assert_eq!(query::entity(&world, slug).and_then(|e| e.alive), Some(false));
}

#[test]
fn slugs_recover_breath_above_water() {
    let mut world = bedrock_world();
    let pocket = Coord::new(5, -5);
    carve(&mut world, &[pocket]);
    let mut events = Vec::new();
    let slug = world
        .spawn_entity(EntityKind::Slug, pocket, &mut events)
        .expect("slug placed");
    assert!(world.set_water(pocket, 1.0));
    let _ = idle(&mut world);
    assert!(world.set_water(pocket, 0.0));
    let _ = idle(&mut world);

    let breath = query::entity(&world, slug).and_then(|e| e.breath);
    assert_eq!(breath, Some(0.875));
}

#[test]
fn rocks_fall_the_whole_shaft_in_one_step() {
    let mut world = bedrock_world();
    let shaft: Vec<Coord> = (4..=9).map(|depth| Coord::new(7, -depth)).collect();
    carve(&mut world, &shaft);
    let mut events = Vec::new();
    let rock = world
        .spawn_entity(EntityKind::SmallRock, Coord::new(7, -4), &mut events)
        .expect("rock placed");

    let events = idle(&mut world);

    assert!(events.contains(&Event::EntityFell {
        entity: rock,
        rows: 5
    }));
    assert_eq!(
        query::entity(&world, rock).map(|e| e.anchor),
        Some(Coord::new(7, -9))
    );
    assert_eq!(query::occupants(&world, Coord::new(7, -9)), vec![rock]);
    assert!(query::occupants(&world, Coord::new(7, -4)).is_empty());
}

#[test]
fn falling_rocks_crush_enemies_that_cannot_dodge() {
    let mut world = bedrock_world();
    let shaft: Vec<Coord> = (4..=6).map(|depth| Coord::new(7, -depth)).collect();
    carve(&mut world, &shaft);
    let mut events = Vec::new();
    let slug = world
        .spawn_entity(EntityKind::Slug, Coord::new(7, -6), &mut events)
        .expect("slug placed");
    let rock = world
        .spawn_entity(EntityKind::SmallRock, Coord::new(7, -4), &mut events)
        .expect("rock placed");

    let events = idle(&mut world);

    assert!(events.contains(&Event::EnemyDied {
        entity: slug,
        cause: DeathCause::Crushed,
    }));
    assert!(events.contains(&Event::EntityFell { entity: rock, rows: 2 }));
    let mut occupants = query::occupants(&world, Coord::new(7, -6));
    occupants.sort();
    assert_eq!(occupants, vec![slug, rock]);
}

#[test]
fn placement_rejects_solid_and_shallow_squares() {
    let mut world = bedrock_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnEntity {
            kind: EntityKind::SmallRock,
            origin: Coord::new(3, -1),
        },
        &mut events,
    );
    assert!(events.iter().any(|event| matches!(
        event,
        Event::PlacementRejected {
            reason: rootbound_core::PlacementError::TooShallow,
            ..
        }
    )));
    assert!(world
        .spawn_entity(EntityKind::SmallRock, Coord::new(3, -5), &mut events)
        .is_err());
    assert!(world
        .spawn_entity(EntityKind::SmallRock, Coord::new(-1, -5), &mut events)
        .is_err());
}

#[test]
fn digging_through_a_branch_disconnects_what_hangs_below() {
    let mut world = uniform_world(TileKind::Ground, FluidTuning::default());
    let mut events = Vec::new();
    let start = Coord::new(10, -3);
    assert!(world.place_root(start, RootStatus::Initial, &mut events));
    assert!(world.place_player(start));
    for _ in 0..3 {
        world::apply(
            &mut world,
            Command::Spread {
                direction: Direction::Down,
            },
            &mut events,
        );
    }
    for depth in 4..=6 {
        assert_eq!(
            query::root(&world, Coord::new(10, -depth)).map(|root| root.status),
            Some(RootStatus::Connected)
        );
    }

    events.clear();
    assert!(world.replace_tile(Coord::new(10, -4), TileKind::Ground, &mut events));

    for depth in 5..=6 {
        let coord = Coord::new(10, -depth);
        assert_eq!(
            query::root(&world, coord).map(|root| root.status),
            Some(RootStatus::Disconnected)
        );
        assert!(events.contains(&Event::RootStatusChanged {
            coord,
            status: RootStatus::Disconnected,
        }));
    }
    let anchor = query::root(&world, start).expect("initial root");
    assert_eq!(anchor.connections, 0);
}

#[test]
fn corpses_feed_the_flower() {
    let mut world = bedrock_world();
    let mut events = Vec::new();
    let start = Coord::new(10, -4);
    let pocket = Coord::new(11, -4);
    assert!(world.place_root(start, RootStatus::Initial, &mut events));
    assert!(world.place_player(start));
    carve(&mut world, &[pocket]);
    let slug = world
        .spawn_entity(EntityKind::Slug, pocket, &mut events)
        .expect("slug placed");
    assert!(world.set_water(pocket, 1.0));
    for _ in 0..4 {
        let _ = idle(&mut world);
    }
    assert_eq!(query::entity(&world, slug).and_then(|e| e.alive), Some(false));

    events.clear();
    world::apply(
        &mut world,
        Command::Spread {
            direction: Direction::Right,
        },
        &mut events,
    );
    assert!(events.iter().any(|event| matches!(
        event,
        Event::NourishmentChanged {
            delta,
            source: NourishmentSource::Corpse,
            ..
        } if (*delta - 40.0).abs() < 1e-6
    )));
    assert!(events.contains(&Event::Audio {
        cue: AudioCue::Corpse
    }));
    assert!(events.contains(&Event::EntityRemoved { entity: slug }));
    assert!(query::entity(&world, slug).is_none());
}

#[test]
fn a_living_enemy_blocks_spreading() {
    let mut world = bedrock_world();
    let mut events = Vec::new();
    let start = Coord::new(10, -4);
    let pocket = Coord::new(11, -4);
    assert!(world.place_root(start, RootStatus::Initial, &mut events));
    assert!(world.place_player(start));
    carve(&mut world, &[pocket]);
    let _ = world
        .spawn_entity(EntityKind::Snail, pocket, &mut events)
        .expect("snail placed");

    events.clear();
    world::apply(
        &mut world,
        Command::Spread {
            direction: Direction::Right,
        },
        &mut events,
    );
    assert!(events.contains(&Event::SpreadRejected {
        direction: Direction::Right,
        reason: rootbound_core::SpreadError::Blocked,
    }));
}

#[test]
fn pushing_a_rock_costs_its_heaviness() {
    let mut world = bedrock_world();
    let mut events = Vec::new();
    let start = Coord::new(10, -4);
    carve(&mut world, &[Coord::new(11, -4), Coord::new(12, -4)]);
    assert!(world.place_root(start, RootStatus::Initial, &mut events));
    assert!(world.place_player(start));
    let rock = world
        .spawn_entity(EntityKind::SmallRock, Coord::new(11, -4), &mut events)
        .expect("rock placed");
    let before = query::nourishment(&world);

    events.clear();
    world::apply(
        &mut world,
        Command::Spread {
            direction: Direction::Right,
        },
        &mut events,
    );

    assert!(events.contains(&Event::Audio { cue: AudioCue::Hit }));
    assert_eq!(
        query::entity(&world, rock).map(|e| e.anchor),
        Some(Coord::new(12, -4))
    );
    assert!((before - query::nourishment(&world) - 11.0).abs() < 1e-3);
}

#[test]
fn water_above_a_spawned_root_stays_put() {
    let mut world = bedrock_world();
    let pool = Coord::new(5, -6);
    let sprout = Coord::new(5, -7);
    carve(&mut world, &[pool]);
    assert!(world.set_water(pool, 1.0));
    let mut events = Vec::new();
    assert!(world.place_root(sprout, RootStatus::Spawned, &mut events));

    let before = query::total_water(&world);
    for _ in 0..3 {
        let events = idle(&mut world);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::FluidLost { .. })));
    }

    assert!((query::total_water(&world) - before).abs() < 1e-5);
    assert!((water_at(&world, pool) - 1.0).abs() < 1e-5);
    assert_eq!(water_at(&world, sprout), 0.0);
}

#[test]
fn water_left_in_a_spawned_root_is_reported_lost() {
    let mut world = bedrock_world();
    let sprout = Coord::new(5, -7);
    let mut events = Vec::new();
    assert!(world.place_root(sprout, RootStatus::Spawned, &mut events));
    assert!(world.set_water(sprout, 0.6));

    let events = idle(&mut world);

    assert!(events.iter().any(|event| matches!(
        event,
        Event::FluidLost { coord, amount } if *coord == sprout && (*amount - 0.6).abs() < 1e-5
    )));
    assert_eq!(water_at(&world, sprout), 0.0);
}

#[test]
fn soil_with_an_open_floor_drains_through_regular_flow() {
    let mut world = uniform_world(
        TileKind::SuperGround,
        FluidTuning {
            substeps: 1,
            ..FluidTuning::default()
        },
    );
    let source = Coord::new(5, -5);
    let left = Coord::new(4, -5);
    let right = Coord::new(6, -5);
    let below = Coord::new(5, -6);
    carve(&mut world, &[left, right, below]);
    assert!(world.set_water(source, 1.0));

    let events = idle(&mut world);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::FluidLost { .. })));
    assert!((water_at(&world, below) - 0.5).abs() < 1e-5);
    assert!((water_at(&world, left) - 0.05).abs() < 1e-5);
    assert!((water_at(&world, right) - 0.05).abs() < 1e-5);
    assert!((water_at(&world, source) - 0.4).abs() < 1e-5);
    assert!((query::total_water(&world) - 1.0).abs() < 1e-5);
}

fn facing(world: &World, entity: EntityId) -> Direction {
    query::entity(world, entity)
        .and_then(|snapshot| snapshot.facing)
        .expect("enemy has a facing")
}

fn anchor(world: &World, entity: EntityId) -> Option<Coord> {
    query::entity(world, entity).map(|snapshot| snapshot.anchor)
}

#[test]
fn crawlers_climb_the_wall_they_hit_and_turn_back() {
    let mut world = bedrock_world();
    let start = Coord::new(5, -5);
    carve(&mut world, &[Coord::new(4, -5), start, Coord::new(6, -5)]);
    let mut events = Vec::new();
    let slug = world
        .spawn_entity(EntityKind::Slug, start, &mut events)
        .expect("slug placed");
    let forward = facing(&world, slug);
    assert!(matches!(forward, Direction::Left | Direction::Right));

    let _ = idle(&mut world);
    assert_eq!(anchor(&world, slug), Some(start.step(forward)));
    assert_eq!(facing(&world, slug), forward);

    let _ = idle(&mut world);
    assert_eq!(anchor(&world, slug), Some(start.step(forward)));
    assert_eq!(facing(&world, slug), Direction::Up);

    let _ = idle(&mut world);
    assert_eq!(facing(&world, slug), forward.opposite());

    let _ = idle(&mut world);
    assert_eq!(anchor(&world, slug), Some(start));
}

fn crawler_over_a_root(kind: EntityKind) -> (World, EntityId) {
    let mut world = bedrock_world();
    let start = Coord::new(5, -5);
    carve(&mut world, &[Coord::new(4, -5), start, Coord::new(6, -5)]);
    let mut events = Vec::new();
    assert!(world.place_root(Coord::new(5, -6), RootStatus::Spawned, &mut events));
    let crawler = world
        .spawn_entity(kind, start, &mut events)
        .expect("crawler placed");
    (world, crawler)
}

#[test]
fn slugs_stop_to_eat_while_snails_keep_crawling() {
    let meal = Coord::new(5, -6);
    let start = Coord::new(5, -5);

    let (mut world, slug) = crawler_over_a_root(EntityKind::Slug);
    let _ = idle(&mut world);
    assert_eq!(anchor(&world, slug), Some(start));
    let health = query::root(&world, meal).map(|root| root.health);
    assert!(health.is_some_and(|health| (health - 0.75).abs() < 1e-5));

    let (mut world, snail) = crawler_over_a_root(EntityKind::Snail);
    let forward = facing(&world, snail);
    let _ = idle(&mut world);
    assert_eq!(anchor(&world, snail), Some(start.step(forward)));
    let health = query::root(&world, meal).map(|root| root.health);
    assert!(health.is_some_and(|health| (health - 0.9).abs() < 1e-5));
}

#[test]
fn bees_turn_around_at_the_end_of_their_row() {
    let mut world = bedrock_world();
    let start = Coord::new(5, -5);
    let end = Coord::new(6, -5);
    carve(&mut world, &[start, end]);
    let mut events = Vec::new();
    let bee = world
        .spawn_entity(EntityKind::Bee, start, &mut events)
        .expect("bee placed");
    assert_eq!(facing(&world, bee), Direction::Right);

    let _ = idle(&mut world);
    assert_eq!(anchor(&world, bee), Some(end));

    let _ = idle(&mut world);
    assert_eq!(anchor(&world, bee), Some(start));
    assert_eq!(facing(&world, bee), Direction::Left);
}

#[test]
fn bees_push_feeding_enemies_that_have_room() {
    let mut world = bedrock_world();
    carve(
        &mut world,
        &[Coord::new(5, -5), Coord::new(6, -5), Coord::new(7, -5)],
    );
    let mut events = Vec::new();
    assert!(world.place_root(Coord::new(6, -6), RootStatus::Spawned, &mut events));
    let slug = world
        .spawn_entity(EntityKind::Slug, Coord::new(6, -5), &mut events)
        .expect("slug placed");
    let bee = world
        .spawn_entity(EntityKind::Bee, Coord::new(5, -5), &mut events)
        .expect("bee placed");

    let events = idle(&mut world);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyDied { .. })));
    assert_eq!(anchor(&world, slug), Some(Coord::new(7, -5)));
    assert_eq!(anchor(&world, bee), Some(Coord::new(6, -5)));
}

#[test]
fn bees_sting_cornered_enemies() {
    let mut world = bedrock_world();
    carve(&mut world, &[Coord::new(5, -5), Coord::new(6, -5)]);
    let mut events = Vec::new();
    assert!(world.place_root(Coord::new(6, -6), RootStatus::Spawned, &mut events));
    let slug = world
        .spawn_entity(EntityKind::Slug, Coord::new(6, -5), &mut events)
        .expect("slug placed");
    let bee = world
        .spawn_entity(EntityKind::Bee, Coord::new(5, -5), &mut events)
        .expect("bee placed");

    let events = idle(&mut world);

    assert!(events.contains(&Event::EnemyDied {
        entity: slug,
        cause: DeathCause::Stung,
    }));
    assert_eq!(query::entity(&world, slug).and_then(|e| e.alive), Some(false));
    assert_eq!(query::entity(&world, bee).and_then(|e| e.alive), Some(true));
}

#[test]
fn a_bee_and_a_slug_sharing_a_dead_end_ends_with_a_sting() {
    let mut world = bedrock_world();
    carve(&mut world, &[Coord::new(5, -5), Coord::new(6, -5)]);
    let mut events = Vec::new();
    let bee = world
        .spawn_entity(EntityKind::Bee, Coord::new(5, -5), &mut events)
        .expect("bee placed");
    let slug = world
        .spawn_entity(EntityKind::Slug, Coord::new(6, -5), &mut events)
        .expect("slug placed");

    let mut events = idle(&mut world);
    events.extend(idle(&mut world));

    assert!(events.contains(&Event::EnemyDied {
        entity: slug,
        cause: DeathCause::Stung,
    }));
    assert_eq!(query::entity(&world, bee).and_then(|e| e.alive), Some(true));
}

/// Bedrock world with a slug at (7, -5) whose rolled handedness sends it `forward`.
fn slug_heading(forward: Direction) -> (World, EntityId) {
    for seed in 0..64 {
        let config = WorldConfig {
            seed,
            terrain: Terrain::Uniform(TileKind::SuperGround),
            ..WorldConfig::default()
        };
        let mut world = World::new(config, Box::new(Flower::default())).expect("valid config");
        carve(
            &mut world,
            &[Coord::new(5, -5), Coord::new(6, -5), Coord::new(7, -5)],
        );
        let mut events = Vec::new();
        let slug = world
            .spawn_entity(EntityKind::Slug, Coord::new(7, -5), &mut events)
            .expect("slug placed");
        if facing(&world, slug) == forward {
            return (world, slug);
        }
    }
    panic!("no seed rolled a slug heading {forward:?}");
}

#[test]
fn a_bee_and_a_slug_meeting_head_on_shove_each_other_without_a_sting() {
    let (mut world, slug) = slug_heading(Direction::Left);
    let mut events = Vec::new();
    let bee = world
        .spawn_entity(EntityKind::Bee, Coord::new(5, -5), &mut events)
        .expect("bee placed");

    for _ in 0..6 {
        let events = idle(&mut world);
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::EnemyDied { .. })));
        assert_eq!(anchor(&world, slug), Some(Coord::new(7, -5)));
        assert_eq!(anchor(&world, bee), Some(Coord::new(6, -5)));
        assert_eq!(facing(&world, slug), Direction::Left);
        assert_eq!(facing(&world, bee), Direction::Right);
    }
}

#[test]
fn a_rock_landing_on_wedged_amber_frees_a_bee() {
    let mut world = bedrock_world();
    let shaft: Vec<Coord> = (4..=6).map(|depth| Coord::new(7, -depth)).collect();
    carve(&mut world, &shaft);
    let bottom = Coord::new(7, -6);
    let mut events = Vec::new();
    let amber = world
        .spawn_entity(EntityKind::AmberBee, bottom, &mut events)
        .expect("amber placed");
    let rock = world
        .spawn_entity(EntityKind::SmallRock, Coord::new(7, -4), &mut events)
        .expect("rock placed");

    let events = idle(&mut world);

    assert!(events.contains(&Event::EntityRemoved { entity: amber }));
    assert!(events.contains(&Event::EntityFell { entity: rock, rows: 2 }));
    let hatched = events.iter().find_map(|event| match event {
        Event::EntitySpawned {
            entity,
            kind: EntityKind::Bee,
            origin,
        } if *origin == bottom => Some(*entity),
        _ => None,
    });
    let hatched = hatched.expect("a bee hatched");
    assert!(query::entity(&world, amber).is_none());
    assert_eq!(query::entity(&world, hatched).and_then(|e| e.alive), Some(true));
    let mut occupants = query::occupants(&world, bottom);
    occupants.sort();
    let mut expected = vec![rock, hatched];
    expected.sort();
    assert_eq!(occupants, expected);
}

#[test]
fn severing_a_looped_branch_reports_each_root_once() {
    let mut world = bedrock_world();
    let mut events = Vec::new();
    let start = Coord::new(10, -3);
    let bridge = Coord::new(10, -4);
    let branch = [Coord::new(11, -4), Coord::new(11, -5), Coord::new(10, -5)];
    assert!(world.place_root(start, RootStatus::Initial, &mut events));
    assert!(world.place_root(bridge, RootStatus::Connected, &mut events));
    for coord in branch {
        assert!(world.place_root(coord, RootStatus::Connected, &mut events));
    }

    events.clear();
    assert!(world.replace_tile(bridge, TileKind::Ground, &mut events));

    let mut severed: Vec<Coord> = events
        .iter()
        .filter_map(|event| match event {
            Event::RootStatusChanged {
                coord,
                status: RootStatus::Disconnected,
            } => Some(*coord),
            _ => None,
        })
        .collect();
    severed.sort();
    let mut expected = branch.to_vec();
    expected.sort();
    assert_eq!(severed, expected);
    assert_eq!(
        query::root(&world, start).map(|root| root.status),
        Some(RootStatus::Initial)
    );
}

#[test]
fn rows_are_generated_on_demand_for_deep_squares() {
    let mut world =
        World::new(WorldConfig::with_seed(9), Box::new(Flower::default())).expect("valid config");
    let generated = query::generated_rows(&world);
    let deep = Coord::new(4, -(generated as i32 + 25));
    assert_eq!(query::tile(&world, deep), None);

    let mut events = Vec::new();
    assert!(world.generate_through(deep, &mut events));
    assert!(query::tile(&world, deep).is_some());
    assert!(query::generated_rows(&world) > deep.depth());
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ChunkGenerated { .. })));

    events.clear();
    assert!(world.generate_through(Coord::new(4, -3), &mut events));
    assert!(events.is_empty());
    assert!(!world.generate_through(Coord::new(-1, -3), &mut events));
    assert!(!world.generate_through(Coord::new(3, 2), &mut events));
    assert!(events.is_empty());
}

#[test]
fn removed_entities_leave_their_squares() {
    let mut world = bedrock_world();
    let pocket = Coord::new(5, -5);
    carve(&mut world, &[pocket]);
    let mut events = Vec::new();
    let rock = world
        .spawn_entity(EntityKind::SmallRock, pocket, &mut events)
        .expect("rock placed");

    events.clear();
    assert!(world.remove_entity(rock, &mut events));
    assert_eq!(events, vec![Event::EntityRemoved { entity: rock }]);
    assert!(query::entity(&world, rock).is_none());
    assert!(query::occupants(&world, pocket).is_empty());
    assert!(!world.remove_entity(rock, &mut events));
}
