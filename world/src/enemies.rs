//! Per-step behaviour of entities: gravity, breath and enemy AI.

use rootbound_core::{DeathCause, Direction, EntityId, EntityKind, Event, RootStatus};

use crate::{
    entities::{Body, Entity, Gait},
    World,
};

impl World {
    /// Advances a single entity by one simulation step.
    pub(crate) fn step_entity(&mut self, id: EntityId, out_events: &mut Vec<Event>) {
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        if self.affected_by_gravity(entity) {
            let _ = self.fall(id, out_events);
        }
        if !self.entities.get(id).is_some_and(Entity::is_alive_enemy) {
            return;
        }
        self.breathe(id, out_events);
        if self.entities.get(id).is_some_and(Entity::is_alive_enemy) {
            self.ai_step(id, out_events);
        }
    }

    /// Drains breath while the enemy sits in deep water and refills it otherwise.
    fn breathe(&mut self, id: EntityId, out_events: &mut Vec<Event>) {
        let tuning = &self.config.enemies;
        let threshold = tuning.drown_threshold;
        let rate = tuning.breath_rate;
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let anchor = entity.anchor;
        let Some(enemy) = entity.enemy_mut() else {
            return;
        };
        let submerged = self
            .grid
            .square(anchor)
            .is_some_and(|square| square.water.amount() >= threshold);

        if submerged {
            enemy.breath -= 2.0 * rate;
            if enemy.breath <= 0.0 {
                enemy.breath = 0.0;
                self.kill(id, DeathCause::Drowned, out_events);
            }
        } else {
            enemy.breath = (enemy.breath + rate).min(enemy.max_breath);
        }
    }

    fn ai_step(&mut self, id: EntityId, out_events: &mut Vec<Event>) {
        let Some(gait) = self.entities.get(id).and_then(Entity::enemy).map(|enemy| enemy.gait) else {
            return;
        };
        match gait {
            Gait::Crawler { down, forward, .. } => self.crawl(id, down, forward, out_events),
            Gait::Patrol { heading } => self.patrol(id, heading, out_events),
        }
    }

    /// Surface-hugging movement shared by slugs and snails.
    ///
    /// Crawlers bite roots in front of or beneath them; slugs stop while they
    /// eat, snails keep going. Blocked crawlers turn with their handedness and
    /// crawlers running off an edge wrap around it.
    fn crawl(
        &mut self,
        id: EntityId,
        down: Direction,
        forward: Direction,
        out_events: &mut Vec<Event>,
    ) {
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        if self.affected_by_gravity(entity) {
            self.rotate_crawler(id, false);
            return;
        }
        let anchor = entity.anchor;
        let kind = entity.kind;
        let bite = entity.bite(&self.config.enemies);

        let meal = [forward, down]
            .into_iter()
            .map(|direction| anchor.step(direction))
            .find(|&coord| {
                self.grid
                    .root(coord)
                    .is_some_and(|root| root.status() != RootStatus::Initial)
            });
        if let Some(meal) = meal {
            let _ = self.damage_root(meal, bite, out_events);
            if kind == EntityKind::Slug {
                return;
            }
        }

        let ahead = anchor.step(forward);
        let mut pending = Vec::new();
        if !self.square_can_pass(id, ahead, forward, &mut pending) {
            self.rotate_crawler(id, false);
            return;
        }
        let below_ahead = ahead.step(down);
        let ledge = self.square_can_pass(id, below_ahead, down, &mut pending);
        let _ = self.move_entity(id, forward, true, out_events);
        if ledge {
            self.rotate_crawler(id, true);
            if let Some(Gait::Crawler { forward, .. }) = self.gait(id) {
                let _ = self.move_entity(id, forward, true, out_events);
            }
        }
    }

    fn rotate_crawler(&mut self, id: EntityId, reverse: bool) {
        let Some(enemy) = self.entities.get_mut(id).and_then(Entity::enemy_mut) else {
            return;
        };
        if let Gait::Crawler {
            down,
            forward,
            clockwise,
        } = &mut enemy.gait
        {
            let turn = if *clockwise != reverse {
                Direction::clockwise
            } else {
                Direction::counter_clockwise
            };
            *forward = turn(*forward);
            *down = turn(*down);
        }
    }

    /// Bees fly along their heading and turn around when blocked.
    fn patrol(&mut self, id: EntityId, heading: Direction, out_events: &mut Vec<Event>) {
        if self.move_entity(id, heading, true, out_events) {
            return;
        }
        let reversed = heading.opposite();
        if let Some(Body::Enemy(enemy)) = self.entities.get_mut(id).map(|entity| &mut entity.body) {
            enemy.gait = Gait::Patrol { heading: reversed };
        }
        let _ = self.move_entity(id, reversed, true, out_events);
    }

    fn gait(&self, id: EntityId) -> Option<Gait> {
        self.entities
            .get(id)
            .and_then(Entity::enemy)
            .map(|enemy| enemy.gait)
    }
}
