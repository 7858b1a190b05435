//! The player head: spreading roots into neighbouring squares and retreating.

use rootbound_core::{
    AudioCue, Coord, Direction, EntityId, Event, NourishmentSource, RootStatus, SpreadError,
};
use tracing::trace;

use crate::{
    entities::Body,
    tiles::{RootTile, Tile},
    World,
};

/// Position of the player head and the squares it came through.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    position: Coord,
    trail: Vec<Coord>,
}

impl Player {
    pub(crate) const fn new(position: Coord) -> Self {
        Self {
            position,
            trail: Vec::new(),
        }
    }

    pub(crate) const fn position(&self) -> Coord {
        self.position
    }

    pub(crate) fn trail(&self) -> &[Coord] {
        &self.trail
    }

    fn advance(&mut self, to: Coord) {
        self.trail.push(self.position);
        self.position = to;
    }

    /// Moves the head without recording a trail.
    pub(crate) fn teleport(&mut self, to: Coord) {
        self.position = to;
        self.trail.clear();
    }
}

/// How an occupant of the target square reacts to the spread.
#[derive(Clone, Copy, Debug)]
enum Yield {
    PushRock { entity: EntityId, heaviness: f32 },
    PushAmber(EntityId),
    BreakAmber(EntityId),
    EatCorpse(EntityId),
}

impl World {
    /// Grows the root network from the player's square into its neighbour.
    ///
    /// Nothing is mutated when the spread is rejected.
    pub(crate) fn spread(
        &mut self,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SpreadError> {
        if self.game_over {
            return Err(SpreadError::GameOver);
        }
        let from = self.player.position();
        let rooted = match self.grid.root(from) {
            Some(root) => root.status().is_rooted(),
            None => return Err(SpreadError::NotRooted),
        };
        let target = from.step(direction);
        let Some((tile, occupants)) = self
            .square_generating(target, out_events)
            .map(|square| (square.tile.clone(), square.entities.clone()))
        else {
            return Err(SpreadError::OutOfWorld);
        };
        if !tile.is_diggable(&self.config.tiles) {
            return Err(SpreadError::Undiggable);
        }

        let available = self.sink.nourishment();
        let mut cost = tile.hardness(&self.config.tiles);
        let mut yields = Vec::with_capacity(occupants.len());
        for occupant in occupants {
            let Some(entity) = self.entities.get(occupant) else {
                continue;
            };
            let heaviness = entity.heaviness(&self.config.entities);
            let reaction = match &entity.body {
                Body::Rock if self.can_move(occupant, direction) => {
                    cost += heaviness;
                    Yield::PushRock {
                        entity: occupant,
                        heaviness,
                    }
                }
                Body::Amber if heaviness < available && self.sink.can_break_amber() => {
                    Yield::BreakAmber(occupant)
                }
                Body::Amber if self.can_move(occupant, direction) => Yield::PushAmber(occupant),
                Body::Enemy(enemy) if !enemy.alive => Yield::EatCorpse(occupant),
                _ => return Err(SpreadError::Blocked),
            };
            yields.push(reaction);
        }
        if cost >= available {
            return Err(SpreadError::TooExpensive { cost, available });
        }

        for reaction in yields {
            self.clear_occupant(reaction, direction, out_events);
        }

        if tile.as_root().is_some() {
            self.nourish(
                -self.config.tiles.root_hardness,
                NourishmentSource::Digging,
                out_events,
            );
            out_events.push(Event::Audio { cue: AudioCue::Root });
        } else {
            let dig = -tile.hardness(&self.config.tiles);
            let (delta, source) = if tile == Tile::NutritionGround {
                (dig + self.config.tiles.nutrition_bonus, NourishmentSource::Nutrition)
            } else {
                (dig, NourishmentSource::Digging)
            };
            self.nourish(delta, source, out_events);
            let status = if rooted {
                RootStatus::Connected
            } else {
                RootStatus::Disconnected
            };
            let _ = self.replace_tile_with(target, Tile::Root(RootTile::new(status)), out_events);
            out_events.push(Event::Audio { cue: AudioCue::Dirt });
        }

        let _ = self.connect_with_neigh(from, direction, out_events);
        self.join_network(target, out_events);
        self.player.advance(target);
        out_events.push(Event::PlayerMoved { from, to: target });
        Ok(())
    }

    fn clear_occupant(&mut self, reaction: Yield, direction: Direction, out_events: &mut Vec<Event>) {
        match reaction {
            Yield::PushRock { entity, heaviness } => {
                self.nourish(-heaviness, NourishmentSource::Pushing, out_events);
                let _ = self.move_entity(entity, direction, true, out_events);
                out_events.push(Event::Audio { cue: AudioCue::Hit });
            }
            Yield::PushAmber(entity) => {
                let _ = self.move_entity(entity, direction, true, out_events);
            }
            Yield::BreakAmber(entity) => {
                let before = self.sink.nourishment();
                let progress = self.sink.break_amber();
                let total = self.sink.nourishment();
                out_events.push(Event::NourishmentChanged {
                    delta: total - before,
                    total,
                    source: NourishmentSource::Amber,
                });
                let _ = self.take_entity(entity, out_events);
                out_events.push(Event::Audio {
                    cue: AudioCue::Amber,
                });
                trace!(entity = entity.get(), "amber broken");
                self.handle_progress(progress, out_events);
            }
            Yield::EatCorpse(entity) => {
                if let Some(corpse) = self.take_entity(entity, out_events) {
                    let gain = corpse.corpse_nourishment(&self.config.enemies);
                    self.nourish(gain, NourishmentSource::Corpse, out_events);
                    out_events.push(Event::Audio {
                        cue: AudioCue::Corpse,
                    });
                }
            }
        }
    }

    /// Steps the head back to the previous square of its trail.
    ///
    /// Refused when the trail is empty or the previous square lost its root.
    pub(crate) fn retreat(&mut self, out_events: &mut Vec<Event>) -> bool {
        let Some(&previous) = self.player.trail.last() else {
            return false;
        };
        if self.grid.root(previous).is_none() {
            return false;
        }
        let from = self.player.position;
        let _ = self.player.trail.pop();
        self.player.position = previous;
        out_events.push(Event::PlayerMoved { from, to: previous });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Player;
    use rootbound_core::Coord;

    #[test]
    fn advancing_records_the_trail() {
        let mut player = Player::new(Coord::new(10, 0));
        player.advance(Coord::new(10, -1));
        player.advance(Coord::new(11, -1));
        assert_eq!(player.position(), Coord::new(11, -1));
        assert_eq!(player.trail(), &[Coord::new(10, 0), Coord::new(10, -1)]);

        player.teleport(Coord::new(3, -3));
        assert!(player.trail().is_empty());
    }
}
