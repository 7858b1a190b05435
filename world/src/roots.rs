//! Root network connectivity: linking, breadth-first repair and decay.

use std::collections::{BTreeSet, VecDeque};
use std::ops::Range;

use rootbound_core::{Coord, Direction, Event, RootStatus};
use tracing::{debug, error};

use crate::{
    tiles::{RootTile, Tile},
    World,
};

impl World {
    /// Sets the connection bit on both roots without notifying anyone.
    ///
    /// Returns `false` when either square does not hold a root.
    pub(crate) fn link_roots(&mut self, coord: Coord, direction: Direction) -> bool {
        let neighbour = coord.step(direction);
        if self.grid.root(coord).is_none() || self.grid.root(neighbour).is_none() {
            return false;
        }
        if let Some(root) = self.grid.root_mut(coord) {
            root.connect(direction);
        }
        if let Some(root) = self.grid.root_mut(neighbour) {
            root.connect(direction.opposite());
        }
        true
    }

    /// Links the root at `coord` with its neighbour in `direction`.
    ///
    /// Succeeds only when both squares hold roots.
    pub fn connect_with_neigh(
        &mut self,
        coord: Coord,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if !self.link_roots(coord, direction) {
            return false;
        }
        out_events.push(Event::RootsLinked {
            from: coord,
            to: coord.step(direction),
        });
        true
    }

    /// Breadth-first traversal over linked roots starting at `start`.
    ///
    /// A neighbour is enqueued only when its link bit is set and it satisfies
    /// `predicate`; `action` runs exactly once per visited root. The start
    /// square itself is always visited when it holds a root.
    pub(crate) fn bfs_apply<A, P>(
        &mut self,
        start: Coord,
        mut action: A,
        predicate: P,
    ) -> BTreeSet<Coord>
    where
        A: FnMut(Coord, &mut RootTile),
        P: Fn(&RootTile) -> bool,
    {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(coord) = queue.pop_front() {
            if visited.contains(&coord) {
                continue;
            }
            let Some(root) = self.grid.root_mut(coord) else {
                continue;
            };
            let _ = visited.insert(coord);
            action(coord, root);
            let mask = root.connections();

            for direction in Direction::ALL {
                if mask & (1 << direction.index()) == 0 {
                    continue;
                }
                let neighbour = coord.step(direction);
                if self.grid.root(neighbour).is_some_and(&predicate) {
                    queue.push_back(neighbour);
                }
            }
        }

        visited
    }

    /// Read-only counterpart of [`World::bfs_apply`] filtering on status.
    pub(crate) fn reachable_roots<P>(&self, start: Coord, predicate: P) -> BTreeSet<Coord>
    where
        P: Fn(RootStatus) -> bool,
    {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(coord) = queue.pop_front() {
            let Some(root) = self.grid.root(coord) else {
                continue;
            };
            if !visited.insert(coord) {
                continue;
            }
            for direction in Direction::ALL {
                let neighbour = coord.step(direction);
                if root.is_connected(direction)
                    && !visited.contains(&neighbour)
                    && self
                        .grid
                        .root(neighbour)
                        .is_some_and(|next| predicate(next.status()))
                {
                    queue.push_back(neighbour);
                }
            }
        }
        visited
    }

    /// Repairs connectivity after the root that stood at `coord` was replaced.
    ///
    /// # Panics
    ///
    /// Panics when a link bit of a non-initial root points at a square that no
    /// longer holds a root; the link masks are corrupt at that point.
    pub(crate) fn on_root_removed(
        &mut self,
        coord: Coord,
        removed: &RootTile,
        out_events: &mut Vec<Event>,
    ) {
        let mut visited: BTreeSet<Coord> = BTreeSet::new();

        for direction in Direction::ALL {
            if !removed.is_connected(direction) {
                continue;
            }
            let neighbour = coord.step(direction);
            let Some(root) = self.grid.root_mut(neighbour) else {
                if removed.status() == RootStatus::Initial {
                    continue;
                }
                error!(?coord, ?direction, "root link points at a square without a root");
                panic!("root at {coord} is linked {direction:?} to a square without a root");
            };
            root.disconnect(direction.opposite());

            if root.status() != RootStatus::Connected || visited.contains(&neighbour) {
                continue;
            }

            let reached = self.bfs_apply(
                neighbour,
                |_, _| {},
                |root| root.status().is_rooted(),
            );
            let anchored = reached.iter().any(|&reached| {
                self.grid
                    .root(reached)
                    .is_some_and(|root| root.status() == RootStatus::Initial)
            });
            if !anchored {
                debug!(from = %neighbour, size = reached.len(), "root branch severed");
                for &severed in &reached {
                    self.set_root_status(severed, RootStatus::Disconnected, out_events);
                }
            }
            visited.extend(reached);
        }
    }

    /// Marks every root linked to `coord` as connected when either side of
    /// the join already reaches the initial root.
    pub(crate) fn join_network(&mut self, coord: Coord, out_events: &mut Vec<Event>) {
        let Some(root) = self.grid.root(coord) else {
            return;
        };
        let rooted = root.status().is_rooted()
            || Direction::ALL.into_iter().any(|direction| {
                root.is_connected(direction)
                    && self
                        .grid
                        .root(coord.step(direction))
                        .is_some_and(|neighbour| neighbour.status().is_rooted())
            });
        if !rooted {
            return;
        }

        let mut changed = Vec::new();
        let _ = self.bfs_apply(
            coord,
            |coord, root| {
                if root.set_status(RootStatus::Connected) {
                    changed.push(coord);
                }
            },
            |_| true,
        );
        for coord in changed {
            out_events.push(Event::RootStatusChanged {
                coord,
                status: RootStatus::Connected,
            });
        }
    }

    pub(crate) fn set_root_status(
        &mut self,
        coord: Coord,
        status: RootStatus,
        out_events: &mut Vec<Event>,
    ) {
        if let Some(root) = self.grid.root_mut(coord) {
            if root.set_status(status) {
                out_events.push(Event::RootStatusChanged { coord, status });
            }
        }
    }

    /// Removes health from a root, replacing it with air once it withers.
    ///
    /// The initial root is immune. Returns whether the root died.
    pub(crate) fn damage_root(
        &mut self,
        coord: Coord,
        amount: f32,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(root) = self.grid.root_mut(coord) else {
            return false;
        };
        if root.status() == RootStatus::Initial || !root.damage(amount) {
            return false;
        }
        let _ = self.replace_tile_with(coord, Tile::Air, out_events);
        true
    }

    /// Decays every disconnected root in the provided rows.
    pub(crate) fn step_roots(&mut self, rows: Range<u32>, out_events: &mut Vec<Event>) {
        let decay = self.config.roots.decay_per_step;
        for coord in self.grid.coords_in_rows(rows) {
            let disconnected = self
                .grid
                .root(coord)
                .is_some_and(|root| root.status() == RootStatus::Disconnected);
            if disconnected {
                let _ = self.damage_root(coord, decay, out_events);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rootbound_core::{config::WorldConfig, config::Terrain, TileKind};
    use rootbound_system_flower::Flower;

    use super::*;

    fn bedrock_world() -> World {
        let config = WorldConfig {
            terrain: Terrain::Uniform(TileKind::SuperGround),
            ..WorldConfig::default()
        };
        World::new(config, Box::new(Flower::default())).expect("valid config")
    }

    #[test]
    fn linking_requires_roots_on_both_sides() {
        let mut world = bedrock_world();
        let mut events = Vec::new();
        let a = Coord::new(3, -3);
        assert!(world.place_root(a, RootStatus::Connected, &mut events));
        assert!(!world.connect_with_neigh(a, Direction::Right, &mut events));

        assert!(world.place_root(a.step(Direction::Right), RootStatus::Spawned, &mut events));
        let left = world.grid.root(a).expect("root");
        let right = world.grid.root(a.step(Direction::Right)).expect("root");
        assert!(left.is_connected(Direction::Right));
        assert!(right.is_connected(Direction::Left));
    }

    #[test]
    #[should_panic(expected = "to a square without a root")]
    fn removing_a_root_with_a_dangling_link_panics() {
        let mut world = bedrock_world();
        let mut events = Vec::new();
        let a = Coord::new(3, -3);
        assert!(world.place_root(a, RootStatus::Connected, &mut events));
        world
            .grid
            .root_mut(a)
            .expect("root")
            .connect(Direction::Right);

        let _ = world.replace_tile(a, TileKind::Ground, &mut events);
    }

    #[test]
    fn bfs_respects_predicate() {
        let mut world = bedrock_world();
        let mut events = Vec::new();
        let start = Coord::new(2, -4);
        assert!(world.place_root(start, RootStatus::Connected, &mut events));
        assert!(world.place_root(Coord::new(3, -4), RootStatus::Spawned, &mut events));
        assert!(world.place_root(Coord::new(4, -4), RootStatus::Connected, &mut events));

        let mut count = 0;
        let rooted = world.bfs_apply(start, |_, _| count += 1, |root| root.status().is_rooted());
        assert_eq!(rooted, BTreeSet::from([start]));
        assert_eq!(count, 1);

        let all = world.bfs_apply(start, |_, _| {}, |_| true);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn removing_a_bridge_disconnects_the_far_side() {
        let mut world = bedrock_world();
        let mut events = Vec::new();
        let anchor = Coord::new(5, -2);
        assert!(world.place_root(anchor, RootStatus::Initial, &mut events));
        for y in [-3, -4, -5] {
            assert!(world.place_root(Coord::new(5, y), RootStatus::Connected, &mut events));
        }

        events.clear();
        assert!(world.replace_tile(Coord::new(5, -3), TileKind::Air, &mut events));

        for y in [-4, -5] {
            let root = world.grid.root(Coord::new(5, y)).expect("root");
            assert_eq!(root.status(), RootStatus::Disconnected);
        }
        let anchor_root = world.grid.root(anchor).expect("anchor");
        assert!(!anchor_root.is_connected(Direction::Down));
        assert!(events.contains(&Event::RootStatusChanged {
            coord: Coord::new(5, -5),
            status: RootStatus::Disconnected,
        }));
    }

    #[test]
    fn disconnected_roots_decay_into_air() {
        let mut world = bedrock_world();
        let mut events = Vec::new();
        let coord = Coord::new(1, -3);
        assert!(world.place_root(coord, RootStatus::Disconnected, &mut events));

        for _ in 0..49 {
            world.step_roots(0..10, &mut events);
        }
        assert!(world.grid.root(coord).is_some());
        world.step_roots(0..10, &mut events);
        world.step_roots(0..10, &mut events);
        assert_eq!(world.grid.tile(coord), Some(&Tile::Air));
    }

    #[test]
    fn initial_root_shrugs_off_damage() {
        let mut world = bedrock_world();
        let mut events = Vec::new();
        let coord = Coord::new(1, -3);
        assert!(world.place_root(coord, RootStatus::Initial, &mut events));
        assert!(!world.damage_root(coord, 10.0, &mut events));
        assert!(world.grid.root(coord).is_some());
    }

    #[test]
    fn joining_reconnects_a_severed_branch() {
        let mut world = bedrock_world();
        let mut events = Vec::new();
        assert!(world.place_root(Coord::new(5, -2), RootStatus::Initial, &mut events));
        assert!(world.place_root(Coord::new(5, -3), RootStatus::Disconnected, &mut events));
        assert!(world.place_root(Coord::new(6, -3), RootStatus::Disconnected, &mut events));

        world.join_network(Coord::new(5, -3), &mut events);

        for coord in [Coord::new(5, -3), Coord::new(6, -3)] {
            let root = world.grid.root(coord).expect("root");
            assert_eq!(root.status(), RootStatus::Connected);
        }
        assert_eq!(
            world.grid.root(Coord::new(5, -2)).map(RootTile::status),
            Some(RootStatus::Initial)
        );
    }
}
