//! Entity state and the registry that allocates identifiers.

use std::collections::{BTreeMap, VecDeque};

use rand::Rng;
use rootbound_core::{
    config::{EnemyTuning, EntityTuning},
    Coord, Direction, EntityId, EntityKind,
};

/// Dynamic occupant of one or more grid squares.
#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) anchor: Coord,
    /// Occupied squares; never empty.
    pub(crate) locations: Vec<Coord>,
    pub(crate) body: Body,
}

#[derive(Clone, Debug)]
pub(crate) enum Body {
    Rock,
    /// Amber block holding a bee queen.
    Amber,
    Enemy(Enemy),
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) alive: bool,
    pub(crate) breath: f32,
    pub(crate) max_breath: f32,
    pub(crate) gait: Gait,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Gait {
    /// Slugs and snails hug surfaces; `down` points at the surface they cling to.
    Crawler {
        down: Direction,
        forward: Direction,
        clockwise: bool,
    },
    /// Bees fly back and forth along their row.
    Patrol { heading: Direction },
}

impl Entity {
    pub(crate) const fn enemy(&self) -> Option<&Enemy> {
        match &self.body {
            Body::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub(crate) fn enemy_mut(&mut self) -> Option<&mut Enemy> {
        match &mut self.body {
            Body::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub(crate) const fn is_rock(&self) -> bool {
        self.kind.is_rock()
    }

    pub(crate) fn is_alive_enemy(&self) -> bool {
        self.enemy().is_some_and(|enemy| enemy.alive)
    }

    pub(crate) fn is_bee(&self) -> bool {
        self.kind == EntityKind::Bee
    }

    /// Nourishment the player pays to spread into the entity; negative when it cannot be dug.
    pub(crate) fn heaviness(&self, tuning: &EntityTuning) -> f32 {
        match self.body {
            Body::Rock => tuning.rock_heaviness,
            Body::Amber => tuning.amber_heaviness,
            Body::Enemy(_) => -1.0,
        }
    }

    /// Whether water may share a square with the entity.
    pub(crate) fn lets_fluid_through(&self) -> bool {
        matches!(self.body, Body::Enemy(_))
    }

    pub(crate) fn corpse_nourishment(&self, tuning: &EnemyTuning) -> f32 {
        match self.kind {
            EntityKind::Slug => tuning.slug_corpse,
            EntityKind::Snail => tuning.snail_corpse,
            EntityKind::Bee => tuning.bee_corpse,
            _ => 0.0,
        }
    }

    pub(crate) fn bite(&self, tuning: &EnemyTuning) -> f32 {
        match self.kind {
            EntityKind::Slug => tuning.slug_bite,
            EntityKind::Snail => tuning.snail_bite,
            _ => 0.0,
        }
    }

    /// Surface a living or dead crawler clings to.
    pub(crate) fn crawler_down(&self) -> Option<Direction> {
        match self.body {
            Body::Enemy(Enemy {
                gait: Gait::Crawler { down, .. },
                ..
            }) => Some(down),
            _ => None,
        }
    }

    pub(crate) fn shift(&mut self, direction: Direction) {
        self.anchor = self.anchor.step(direction);
        for location in &mut self.locations {
            *location = location.step(direction);
        }
    }
}

/// Blueprint of an entity that has not been placed yet.
#[derive(Clone, Debug)]
pub(crate) struct Prototype {
    pub(crate) kind: EntityKind,
    /// Footprint offsets relative to the anchor; `y` grows upward.
    pub(crate) offsets: Vec<(i32, i32)>,
    pub(crate) body: Body,
}

impl Prototype {
    /// Rolls a prototype for the kind, drawing shapes and handedness from `rng`.
    pub(crate) fn roll<R: Rng>(
        kind: EntityKind,
        entities: &EntityTuning,
        enemies: &EnemyTuning,
        rng: &mut R,
    ) -> Self {
        let offsets = match kind {
            EntityKind::SquareRock => vec![(0, 0), (0, 1), (1, 0), (1, 1)],
            EntityKind::RandomRock => random_rock_shape(entities, rng),
            _ => vec![(0, 0)],
        };
        let body = match kind {
            EntityKind::SmallRock | EntityKind::SquareRock | EntityKind::RandomRock => Body::Rock,
            EntityKind::AmberBee => Body::Amber,
            EntityKind::Slug | EntityKind::Snail => {
                let clockwise = rng.gen_bool(0.5);
                Body::Enemy(Enemy::new(
                    enemies,
                    Gait::Crawler {
                        down: Direction::Down,
                        forward: if clockwise {
                            Direction::Left
                        } else {
                            Direction::Right
                        },
                        clockwise,
                    },
                ))
            }
            EntityKind::Bee => Body::Enemy(Enemy::new(
                enemies,
                Gait::Patrol {
                    heading: Direction::Right,
                },
            )),
        };
        Self {
            kind,
            offsets,
            body,
        }
    }

    pub(crate) fn locations(&self, origin: Coord) -> Vec<Coord> {
        self.offsets
            .iter()
            .map(|&(dx, dy)| origin.offset(dx, dy))
            .collect()
    }
}

impl Enemy {
    fn new(tuning: &EnemyTuning, gait: Gait) -> Self {
        Self {
            alive: true,
            breath: tuning.max_breath,
            max_breath: tuning.max_breath,
            gait,
        }
    }
}

/// Registry that stores entities and manages identifier allocation.
#[derive(Clone, Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, Entity>,
    next_entity_id: EntityId,
}

impl EntityRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_entity_id: EntityId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, prototype: Prototype, origin: Coord) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = EntityId::new(id.get().wrapping_add(1));
        let locations = prototype.locations(origin);
        let _ = self.entries.insert(
            id,
            Entity {
                id,
                kind: prototype.kind,
                anchor: origin,
                locations,
                body: prototype.body,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entries.remove(&id)
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }
}

/// Draws a connected, roughly convex footprint inside the configured bounding box.
///
/// Every column and row of the box ends up with at least one cell before the
/// shape is filled between its extremes and cut down to the component holding
/// its first cell.
pub(crate) fn random_rock_shape<R: Rng>(tuning: &EntityTuning, rng: &mut R) -> Vec<(i32, i32)> {
    let width = tuning.random_rock_width.max(1) as usize;
    let height = tuning.random_rock_height.max(1) as usize;
    let mut shape = vec![vec![false; height]; width];

    for column in shape.iter_mut() {
        for cell in column.iter_mut() {
            *cell = rng.gen::<f32>() < tuning.random_rock_chance;
        }
    }

    for i in 0..width {
        if !shape[i].iter().any(|&filled| filled) {
            let j = biased_index(height, rng);
            shape[i][j] = true;
        }
    }
    for j in 0..height {
        if !(0..width).any(|i| shape[i][j]) {
            let i = biased_index(width, rng);
            shape[i][j] = true;
        }
    }

    for column in shape.iter_mut() {
        let first = column.iter().position(|&filled| filled);
        let last = column.iter().rposition(|&filled| filled);
        if let (Some(first), Some(last)) = (first, last) {
            column[first..=last].fill(true);
        }
    }
    for j in 0..height {
        let first = (0..width).find(|&i| shape[i][j]);
        let last = (0..width).rev().find(|&i| shape[i][j]);
        if let (Some(first), Some(last)) = (first, last) {
            for column in &mut shape[first..=last] {
                column[j] = true;
            }
        }
    }

    let mut visited = vec![vec![false; height]; width];
    let mut queue = VecDeque::new();
    let start = (0..width)
        .flat_map(|i| (0..height).map(move |j| (i, j)))
        .find(|&(i, j)| shape[i][j]);
    if let Some((i, j)) = start {
        visited[i][j] = true;
        queue.push_back((i, j));
    }
    while let Some((i, j)) = queue.pop_front() {
        for direction in Direction::ALL {
            let Some(ni) = i.checked_add_signed(direction.dx() as isize) else {
                continue;
            };
            let Some(nj) = j.checked_add_signed(direction.dy() as isize) else {
                continue;
            };
            if ni >= width || nj >= height || visited[ni][nj] || !shape[ni][nj] {
                continue;
            }
            visited[ni][nj] = true;
            queue.push_back((ni, nj));
        }
    }

    let mut offsets = Vec::new();
    for (i, column) in visited.iter().enumerate() {
        for (j, &kept) in column.iter().enumerate() {
            if kept {
                offsets.push((i as i32, j as i32));
            }
        }
    }
    offsets
}

/// Index skewed towards zero, the product of two uniform draws.
fn biased_index<R: Rng>(len: usize, rng: &mut R) -> usize {
    let value = rng.gen::<f32>() * rng.gen::<f32>() * len as f32;
    (value as usize).min(len - 1)
}
