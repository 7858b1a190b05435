//! Entity movement: passability, pushing, crushing and free fall.

use rootbound_core::{AudioCue, Coord, DeathCause, Direction, EntityId, EntityKind, Event};
use tracing::debug;

use crate::{
    entities::{Body, Entity, Prototype},
    World,
};

impl World {
    /// Reports whether every square the entity occupies can be shifted in `direction`.
    #[must_use]
    pub fn can_move(&self, entity: EntityId, direction: Direction) -> bool {
        let mut pending = Vec::new();
        self.can_move_guarded(entity, direction, &mut pending)
    }

    /// `pending` holds the entities whose move is being evaluated further up
    /// the stack; asking again for one of them is refused.
    fn can_move_guarded(
        &self,
        entity: EntityId,
        direction: Direction,
        pending: &mut Vec<EntityId>,
    ) -> bool {
        if pending.contains(&entity) {
            return false;
        }
        let Some(mover) = self.entities.get(entity) else {
            return false;
        };
        pending.push(entity);
        let passable = mover.locations.iter().all(|location| {
            self.square_can_pass(entity, location.step(direction), direction, pending)
        });
        let _ = pending.pop();
        passable
    }

    /// Whether `mover` may enter the square at `coord` while travelling in `direction`.
    pub(crate) fn square_can_pass(
        &self,
        mover: EntityId,
        coord: Coord,
        direction: Direction,
        pending: &mut Vec<EntityId>,
    ) -> bool {
        let Some(square) = self.grid.square(coord) else {
            return false;
        };
        if !square.tile.is_passable() {
            return false;
        }
        square
            .entities
            .iter()
            .filter(|&&occupant| occupant != mover)
            .all(|&occupant| self.entity_can_pass(occupant, mover, direction, pending))
    }

    fn entity_can_pass(
        &self,
        occupant: EntityId,
        mover: EntityId,
        direction: Direction,
        pending: &mut Vec<EntityId>,
    ) -> bool {
        let (Some(resident), Some(incoming)) = (self.entities.get(occupant), self.entities.get(mover))
        else {
            return true;
        };
        match &resident.body {
            Body::Rock => self.can_move_guarded(occupant, direction, pending),
            Body::Amber => {
                (incoming.is_rock() && direction == Direction::Down)
                    || self.can_move_guarded(occupant, direction, pending)
            }
            Body::Enemy(enemy) => {
                if !enemy.alive {
                    return true;
                }
                if incoming.is_rock() {
                    return direction == Direction::Down
                        || self.can_move_guarded(occupant, direction, pending);
                }
                (resident.is_bee() && incoming.enemy().is_some()) || incoming.is_bee()
            }
        }
    }

    /// Shifts the entity by one square, pushing or crushing whatever it enters.
    ///
    /// Returns `false` without side effects when the move is blocked.
    pub fn move_entity(
        &mut self,
        entity: EntityId,
        direction: Direction,
        animate: bool,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if !self.can_move(entity, direction) {
            return false;
        }
        let Some(mover) = self.entities.get(entity) else {
            return false;
        };
        let from = mover.anchor;
        let old_locations = mover.locations.clone();

        for location in &old_locations {
            if let Some(square) = self.grid.square_mut(*location) {
                square.entities.retain(|&occupant| occupant != entity);
            }
        }
        let Some(mover) = self.entities.get_mut(entity) else {
            return false;
        };
        mover.shift(direction);
        let to = mover.anchor;
        let new_locations = mover.locations.clone();
        out_events.push(Event::EntityMoved {
            entity,
            from,
            to,
            animate,
        });

        for location in &new_locations {
            let occupants = self
                .grid
                .square(*location)
                .map(|square| square.entities.clone())
                .unwrap_or_default();
            for occupant in occupants {
                if occupant != entity && self.entities.contains(occupant) {
                    self.on_pass(occupant, entity, direction, out_events);
                }
            }
        }

        for location in &new_locations {
            if let Some(square) = self.grid.square_mut(*location) {
                if !square.entities.contains(&entity) {
                    square.entities.push(entity);
                }
            }
        }
        true
    }

    /// Reaction of `occupant` to `mover` entering one of its squares.
    fn on_pass(
        &mut self,
        occupant: EntityId,
        mover: EntityId,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) {
        let (Some(resident), Some(incoming)) = (self.entities.get(occupant), self.entities.get(mover))
        else {
            return;
        };
        let rock_falls = incoming.is_rock() && direction == Direction::Down;
        let bee_enters = incoming.is_bee();

        match &resident.body {
            Body::Rock => {
                let _ = self.move_entity(occupant, direction, true, out_events);
            }
            Body::Amber => {
                if rock_falls && !self.can_move(occupant, Direction::Down) {
                    self.hatch_amber(occupant, out_events);
                } else {
                    let _ = self.move_entity(occupant, direction, true, out_events);
                }
            }
            Body::Enemy(enemy) => {
                let alive = enemy.alive;
                let resident_is_bee = resident.is_bee();
                if alive && rock_falls && !self.can_move(occupant, Direction::Down) {
                    self.kill(occupant, DeathCause::Crushed, out_events);
                } else if alive && bee_enters && !resident_is_bee && !self.can_move(occupant, direction)
                {
                    self.kill(occupant, DeathCause::Stung, out_events);
                } else {
                    let _ = self.move_entity(occupant, direction, true, out_events);
                }
            }
        }
    }

    /// Drops the entity until it rests on something, returning the rows fallen.
    pub fn fall(&mut self, entity: EntityId, out_events: &mut Vec<Event>) -> u32 {
        let mut rows = 0;
        while self.move_entity(entity, Direction::Down, false, out_events) {
            rows += 1;
        }
        if rows > 0 {
            out_events.push(Event::EntityFell { entity, rows });
        }
        rows
    }

    /// Rocks, amber and corpses always fall; crawlers fall while nothing holds
    /// them on the surface they cling to; living bees fly.
    pub(crate) fn affected_by_gravity(&self, entity: &Entity) -> bool {
        match &entity.body {
            Body::Rock | Body::Amber => true,
            Body::Enemy(enemy) if !enemy.alive => true,
            Body::Enemy(_) => match entity.crawler_down() {
                Some(down) => {
                    let mut pending = Vec::new();
                    self.square_can_pass(entity.id, entity.anchor.step(down), down, &mut pending)
                }
                None => false,
            },
        }
    }

    pub(crate) fn kill(&mut self, entity: EntityId, cause: DeathCause, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.entities.get_mut(entity).and_then(Entity::enemy_mut) else {
            return;
        };
        if !enemy.alive {
            return;
        }
        enemy.alive = false;
        debug!(entity = entity.get(), ?cause, "enemy died");
        out_events.push(Event::EnemyDied { entity, cause });
        out_events.push(Event::Audio {
            cue: AudioCue::Death,
        });
    }

    /// Replaces an amber block crushed by a rock with a free bee.
    fn hatch_amber(&mut self, amber: EntityId, out_events: &mut Vec<Event>) {
        let Some(removed) = self.take_entity(amber, out_events) else {
            return;
        };
        let bee = Prototype::roll(
            EntityKind::Bee,
            &self.config.entities,
            &self.config.enemies,
            &mut self.rng,
        );
        let hatched = self.insert_entity(bee, removed.anchor, out_events);
        debug!(amber = amber.get(), bee = hatched.get(), "amber cracked open");
    }

    /// Registers a prototype at `origin` without validating the footprint.
    pub(crate) fn insert_entity(
        &mut self,
        prototype: Prototype,
        origin: Coord,
        out_events: &mut Vec<Event>,
    ) -> EntityId {
        let kind = prototype.kind;
        let id = self.entities.insert(prototype, origin);
        let locations = self
            .entities
            .get(id)
            .map(|entity| entity.locations.clone())
            .unwrap_or_default();
        for location in locations {
            if let Some(square) = self.grid.square_mut(location) {
                square.entities.push(id);
            }
        }
        out_events.push(Event::EntitySpawned {
            entity: id,
            kind,
            origin,
        });
        id
    }

    /// Unregisters the entity from every square it occupies and drops it.
    pub(crate) fn take_entity(
        &mut self,
        entity: EntityId,
        out_events: &mut Vec<Event>,
    ) -> Option<Entity> {
        let removed = self.entities.remove(entity)?;
        for location in &removed.locations {
            if let Some(square) = self.grid.square_mut(*location) {
                square.entities.retain(|&occupant| occupant != entity);
            }
        }
        out_events.push(Event::EntityRemoved { entity });
        Some(removed)
    }
}
