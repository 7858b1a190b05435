//! Cellular water simulation: absorption, displacement and double-buffered flow.

use std::ops::Range;

use rootbound_core::{Coord, Direction, Event, NourishmentSource, RootStatus};
use tracing::debug;

use crate::World;

/// Water below this amount is treated as gone.
const FLUID_EPSILON: f32 = 1e-6;

/// Per-square water state.
///
/// `next_amount` collects the result of the running flow substep and `inflow`
/// tracks how much of it came from neighbours, so that a target's headroom can
/// be computed before it has retained its own water.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Water {
    amount: f32,
    next_amount: f32,
    inflow: f32,
    peak: f32,
}

impl Water {
    pub(crate) const fn amount(&self) -> f32 {
        self.amount
    }

    /// Highest amount seen since the start of the last simulation step.
    pub(crate) const fn peak(&self) -> f32 {
        self.peak
    }

    pub(crate) fn set(&mut self, amount: f32) {
        self.amount = amount.clamp(0.0, 1.0);
        self.peak = self.peak.max(self.amount);
    }

    fn headroom(&self) -> f32 {
        (1.0 - self.amount - self.inflow).max(0.0)
    }

    fn receive(&mut self, amount: f32) {
        self.next_amount += amount;
        self.inflow += amount;
    }

    fn retain(&mut self, amount: f32) {
        self.next_amount += amount;
    }

    fn swap(&mut self) {
        self.amount = self.next_amount.clamp(0.0, 1.0);
        self.clear_staging();
    }

    /// Folds staged inflow into squares that did not flow themselves.
    fn settle(&mut self) {
        self.amount = (self.amount + self.next_amount).clamp(0.0, 1.0);
        self.clear_staging();
    }

    fn clear_staging(&mut self) {
        self.next_amount = 0.0;
        self.inflow = 0.0;
        self.peak = self.peak.max(self.amount);
    }

    fn reset_peak(&mut self) {
        self.peak = self.amount;
    }
}

impl World {
    /// Whether water may enter the square at `coord`.
    pub(crate) fn accepts_fluid(&self, coord: Coord) -> bool {
        let Some(square) = self.grid.square(coord) else {
            return false;
        };
        square.tile.accepts_fluid()
            && square.entities.iter().all(|&id| {
                self.entities
                    .get(id)
                    .map_or(true, |entity| entity.lets_fluid_through())
            })
    }

    fn pushes_out_fluid(&self, coord: Coord) -> bool {
        let Some(square) = self.grid.square(coord) else {
            return false;
        };
        square.tile.pushes_out_fluid()
            || square.entities.iter().any(|&id| {
                self.entities
                    .get(id)
                    .is_some_and(|entity| !entity.lets_fluid_through())
            })
    }

    fn water_amount(&self, coord: Coord) -> f32 {
        self.grid
            .square(coord)
            .map_or(0.0, |square| square.water.amount())
    }

    fn headroom(&self, coord: Coord) -> f32 {
        self.grid
            .square(coord)
            .map_or(0.0, |square| square.water.headroom())
    }

    /// Runs the fluid part of a simulation step over the provided rows.
    pub(crate) fn step_fluid(&mut self, rows: Range<u32>, out_events: &mut Vec<Event>) {
        for coord in self.grid.coords_in_rows(rows.start..rows.end + 1) {
            if let Some(square) = self.grid.square_mut(coord) {
                square.water.reset_peak();
            }
        }
        self.absorb_water(rows.clone(), out_events);
        self.fix_displacement(rows.clone(), out_events);
        for _ in 0..self.config.fluid.substeps {
            self.flow_substep(rows.clone());
        }
    }

    /// Lets living roots drink from their own and adjacent squares.
    fn absorb_water(&mut self, rows: Range<u32>, out_events: &mut Vec<Event>) {
        let rate = self.config.fluid.absorption_rate;
        let heal = self.config.roots.heal_per_absorb;
        let mut absorbed_total = 0.0;

        for coord in self.grid.coords_in_rows(rows) {
            let amount = self.water_amount(coord);
            if amount <= 0.0 {
                continue;
            }
            let spawned = self
                .grid
                .root(coord)
                .is_some_and(|root| root.status() == RootStatus::Spawned);
            if spawned {
                if let Some(square) = self.grid.square_mut(coord) {
                    square.water.set(0.0);
                }
                debug!(%coord, amount, "water dropped from a spawned root");
                out_events.push(Event::FluidLost { coord, amount });
                continue;
            }

            let absorbers: Vec<Coord> = std::iter::once(coord)
                .chain(Direction::ALL.map(|direction| coord.step(direction)))
                .filter(|&candidate| {
                    self.grid
                        .root(candidate)
                        .is_some_and(|root| root.status().is_rooted())
                })
                .collect();
            if absorbers.is_empty() {
                continue;
            }

            let absorbed = (rate * absorbers.len() as f32).min(amount);
            if let Some(square) = self.grid.square_mut(coord) {
                square.water.set(amount - absorbed);
            }
            absorbed_total += absorbed;
            for absorber in absorbers {
                if let Some(root) = self.grid.root_mut(absorber) {
                    root.heal(heal);
                }
            }
        }

        if absorbed_total > 0.0 {
            let gain = absorbed_total * self.config.fluid.nourishment_per_water;
            self.nourish(gain, NourishmentSource::Absorption, out_events);
        }
    }

    /// Moves water out of squares that cannot hold it.
    ///
    /// Only squares whose water cannot drain downward are handled here; the
    /// others empty through the regular flow.
    ///
    /// Neighbours are filled least-full first, each receiving an even share of
    /// what is left, bounded by its headroom. Without neighbours the nearest
    /// accepting square above is used. Water that finds no room is lost and
    /// reported.
    fn fix_displacement(&mut self, rows: Range<u32>, out_events: &mut Vec<Event>) {
        for coord in self.grid.coords_in_rows(rows) {
            let amount = self.water_amount(coord);
            if amount <= 0.0
                || !self.pushes_out_fluid(coord)
                || self.accepts_fluid(coord.step(Direction::Down))
            {
                continue;
            }

            let mut targets: Vec<Coord> = Direction::ALL
                .into_iter()
                .map(|direction| coord.step(direction))
                .filter(|&target| self.accepts_fluid(target))
                .collect();
            if targets.is_empty() {
                targets.extend(self.fluid_outlet_above(coord));
            }
            targets.sort_by(|a, b| self.water_amount(*a).total_cmp(&self.water_amount(*b)));

            let mut remaining = amount;
            let mut targets_left = targets.len();
            for target in targets {
                let share = remaining / targets_left as f32;
                targets_left -= 1;
                let Some(square) = self.grid.square_mut(target) else {
                    continue;
                };
                let given = share.min(square.water.headroom());
                let level = square.water.amount();
                square.water.set(level + given);
                remaining -= given;
            }

            if let Some(square) = self.grid.square_mut(coord) {
                square.water.set(0.0);
            }
            if remaining > FLUID_EPSILON {
                debug!(%coord, amount = remaining, "displaced water evaporated");
                out_events.push(Event::FluidLost {
                    coord,
                    amount: remaining,
                });
            }
        }
    }

    fn fluid_outlet_above(&self, coord: Coord) -> Option<Coord> {
        let mut current = coord;
        for _ in 0..self.config.fluid.displacement_search_limit {
            current = current.step(Direction::Up);
            let _ = self.grid.square(current)?;
            if self.accepts_fluid(current) {
                return Some(current);
            }
        }
        None
    }

    /// One flow pass over the rows followed by the buffer swap.
    ///
    /// The row just below the range receives water without flowing itself, so
    /// it settles additively.
    fn flow_substep(&mut self, rows: Range<u32>) {
        let coords = self.grid.coords_in_rows(rows.clone());
        for &coord in &coords {
            self.flow_from(coord);
        }
        for &coord in &coords {
            if let Some(square) = self.grid.square_mut(coord) {
                square.water.swap();
            }
        }
        for coord in self.grid.coords_in_rows(rows.end..rows.end + 1) {
            if let Some(square) = self.grid.square_mut(coord) {
                square.water.settle();
            }
        }
    }

    fn flow_from(&mut self, coord: Coord) {
        let amount = self.water_amount(coord);
        if amount <= 0.0 {
            return;
        }
        let tuning = &self.config.fluid;
        let rate = tuning.flow_rate;
        let below_limit = rate * tuning.below_factor;
        let diagonal_limit = rate * tuning.diagonal_factor;
        let lateral_limit = rate * tuning.lateral_factor;
        let mut left = amount;

        let below = coord.step(Direction::Down);
        if self.accepts_fluid(below) {
            let flow = self.headroom(below).min(below_limit).min(left);
            left -= self.transfer(below, flow);
        }

        for side in [Direction::Left, Direction::Right] {
            let lateral = coord.step(side);
            let diagonal = lateral.step(Direction::Down);
            if self.accepts_fluid(lateral) && self.accepts_fluid(diagonal) {
                let flow = self.headroom(diagonal).min(diagonal_limit).min(left);
                left -= self.transfer(diagonal, flow);
            }
        }

        for side in [Direction::Right, Direction::Left] {
            let lateral = coord.step(side);
            if !self.accepts_fluid(lateral) {
                continue;
            }
            let level = self.water_amount(lateral);
            if level < amount {
                let flow = (amount - level)
                    .min(self.headroom(lateral))
                    .min(lateral_limit)
                    .min(left);
                left -= self.transfer(lateral, flow);
            }
        }

        if let Some(square) = self.grid.square_mut(coord) {
            square.water.retain(left);
        }
    }

    fn transfer(&mut self, target: Coord, flow: f32) -> f32 {
        if flow <= 0.0 {
            return 0.0;
        }
        match self.grid.square_mut(target) {
            Some(square) => {
                square.water.receive(flow);
                flow
            }
            None => 0.0,
        }
    }
}
