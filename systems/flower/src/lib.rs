#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! The flower: owner of the nourishment pool, its growth levels and the bee
//! queens freed from amber.
//!
//! The world talks to the flower exclusively through
//! [`rootbound_core::NourishmentSink`]. Victory requires both the last
//! nourishment level and one queen level per growth stage; game over happens
//! as soon as nourishment drops below the survival floor.

use rootbound_core::{FlowerProgress, NourishmentSink, NourishmentSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Balancing parameters of the flower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowerTuning {
    /// Nourishment the flower starts with.
    pub starting_nourishment: f32,
    /// The flower withers once nourishment drops below this value.
    pub game_over_nourishment: f32,
    /// Nourishment required for each growth level, ascending.
    pub levels: Vec<f32>,
    /// Level the flower must hold, before and after paying, to break amber.
    pub required_level_amber_break: usize,
    /// Nourishment paid to break an amber block.
    pub amber_break_cost: f32,
    /// Refund per surplus queen level after a step that cost nourishment.
    pub bee_bonus: f32,
    /// Upper bound of a single refund.
    pub max_bee_bonus: f32,
}

impl Default for FlowerTuning {
    fn default() -> Self {
        Self {
            starting_nourishment: 400.0,
            game_over_nourishment: 5.0,
            levels: vec![0.0, 150.0, 300.0, 500.0, 750.0, 1000.0, 1300.0, 1700.0],
            required_level_amber_break: 6,
            amber_break_cost: 250.0,
            bee_bonus: 0.5,
            max_bee_bonus: 4.0,
        }
    }
}

/// Nourishment sink tracking growth levels and freed bee queens.
#[derive(Clone, Debug)]
pub struct Flower {
    tuning: FlowerTuning,
    nourishment: f32,
    level: usize,
    queen_level: usize,
    has_hatched_queen: bool,
    victory: bool,
    /// Nourishment observed at the end of the previous step.
    previous_nourishment: f32,
}

impl Default for Flower {
    fn default() -> Self {
        Self::new(FlowerTuning::default())
    }
}

impl Flower {
    /// Creates a flower holding the configured starting nourishment.
    #[must_use]
    pub fn new(tuning: FlowerTuning) -> Self {
        let mut flower = Self {
            nourishment: tuning.starting_nourishment,
            previous_nourishment: tuning.starting_nourishment,
            tuning,
            level: 0,
            queen_level: 0,
            has_hatched_queen: false,
            victory: false,
        };
        flower.refresh_level();
        flower
    }

    /// Current growth level.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Number of queen power-ups collected from broken amber.
    #[must_use]
    pub const fn queen_level(&self) -> usize {
        self.queen_level
    }

    /// Whether the first queen has been freed.
    #[must_use]
    pub const fn has_hatched_queen(&self) -> bool {
        self.has_hatched_queen
    }

    /// Whether the victory conditions were met at some point.
    #[must_use]
    pub const fn victory_achieved(&self) -> bool {
        self.victory
    }

    fn top_level(&self) -> usize {
        self.tuning.levels.len().saturating_sub(1)
    }

    /// Highest level whose threshold `nourishment` meets, `None` below the first.
    fn level_for(&self, nourishment: f32) -> Option<usize> {
        self.tuning
            .levels
            .iter()
            .take_while(|&&threshold| threshold <= nourishment)
            .count()
            .checked_sub(1)
    }

    fn has_enough_queens(&self) -> bool {
        self.queen_level >= self.top_level()
    }

    fn has_enough_nourishment(&self) -> bool {
        self.tuning
            .levels
            .last()
            .is_some_and(|&last| self.nourishment >= last)
    }

    /// Queens raise the floor of the level; the top level additionally needs
    /// both victory conditions.
    fn restrict_level(&self, desired: usize) -> usize {
        let level = desired.max(self.queen_level);
        let top = self.top_level();
        if level >= top && !(self.has_enough_queens() && self.has_enough_nourishment()) {
            return top.saturating_sub(1);
        }
        level
    }

    fn refresh_level(&mut self) {
        let desired = self.level_for(self.nourishment).unwrap_or(0);
        let level = self.restrict_level(desired).min(self.top_level());
        if level != self.level {
            debug!(from = self.level, to = level, "flower level changed");
        }
        self.level = level;
    }

    fn power_up_queen(&mut self) {
        if !self.has_hatched_queen {
            self.has_hatched_queen = true;
            info!("first bee queen freed");
        }
        self.queen_level += 1;
        debug!(queen_level = self.queen_level, "bee queen powered up");
    }
}

impl NourishmentSink for Flower {
    fn nourishment(&self) -> f32 {
        self.nourishment
    }

    fn add_nourishment(&mut self, delta: f32, source: NourishmentSource) -> FlowerProgress {
        if delta == 0.0 {
            return FlowerProgress::Growing;
        }
        self.nourishment += delta;
        self.refresh_level();
        if self.nourishment < self.tuning.game_over_nourishment {
            debug!(?source, nourishment = self.nourishment, "flower below survival floor");
            return FlowerProgress::Withered;
        }
        if !self.victory && self.has_enough_queens() && self.has_enough_nourishment() {
            self.victory = true;
            return FlowerProgress::Victory;
        }
        FlowerProgress::Growing
    }

    fn can_break_amber(&self) -> bool {
        let required = self.tuning.required_level_amber_break;
        self.level >= required
            && self
                .level_for(self.nourishment - self.tuning.amber_break_cost)
                .is_some_and(|level| level >= required)
    }

    fn break_amber(&mut self) -> FlowerProgress {
        self.power_up_queen();
        let cost = self.tuning.amber_break_cost;
        self.add_nourishment(-cost, NourishmentSource::Amber)
    }

    fn settle_step(&mut self) -> Option<(f32, FlowerProgress)> {
        let spent = self.previous_nourishment - self.nourishment;
        self.previous_nourishment = self.nourishment;
        if spent <= 0.0 || !self.has_enough_queens() {
            return None;
        }
        let surplus = self.queen_level - self.top_level();
        let bonus = (self.tuning.bee_bonus * surplus as f32)
            .min(spent)
            .min(self.tuning.max_bee_bonus);
        if bonus <= 0.0 {
            return None;
        }
        let progress = self.add_nourishment(bonus, NourishmentSource::QueenBonus);
        Some((bonus, progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flower_with(nourishment: f32) -> Flower {
        Flower::new(FlowerTuning {
            starting_nourishment: nourishment,
            ..FlowerTuning::default()
        })
    }

    #[test]
    fn level_follows_thresholds() {
        assert_eq!(flower_with(400.0).level(), 2);
        assert_eq!(flower_with(149.0).level(), 0);
        assert_eq!(flower_with(1000.0).level(), 5);
    }

    #[test]
    fn top_level_needs_queens() {
        let flower = flower_with(5000.0);
        assert_eq!(flower.level(), 6);
    }

    #[test]
    fn dropping_below_the_floor_withers() {
        let mut flower = flower_with(10.0);
        assert_eq!(
            flower.add_nourishment(-4.0, NourishmentSource::Digging),
            FlowerProgress::Growing
        );
        assert_eq!(
            flower.add_nourishment(-2.0, NourishmentSource::Digging),
            FlowerProgress::Withered
        );
    }

    #[test]
    fn amber_needs_level_before_and_after_paying() {
        assert!(!flower_with(1400.0).can_break_amber());
        assert!(flower_with(1550.0).can_break_amber());
    }

    #[test]
    fn breaking_amber_pays_and_frees_a_queen() {
        let mut flower = flower_with(1600.0);
        assert_eq!(flower.break_amber(), FlowerProgress::Growing);
        assert!((flower.nourishment() - 1350.0).abs() < 1e-3);
        assert!(flower.has_hatched_queen());
        assert_eq!(flower.queen_level(), 1);
    }

    #[test]
    fn victory_is_reported_once() {
        let mut flower = flower_with(1700.0);
        flower.queen_level = 7;
        assert_eq!(
            flower.add_nourishment(1.0, NourishmentSource::Absorption),
            FlowerProgress::Victory
        );
        assert_eq!(flower.level(), 7);
        assert_eq!(
            flower.add_nourishment(1.0, NourishmentSource::Absorption),
            FlowerProgress::Growing
        );
        assert!(flower.victory_achieved());
    }

    #[test]
    fn surplus_queens_refund_spent_nourishment() {
        let mut flower = flower_with(2000.0);
        flower.queen_level = 9;
        assert_eq!(flower.settle_step(), None);

        let _ = flower.add_nourishment(-10.0, NourishmentSource::Digging);
        let (bonus, _) = flower.settle_step().expect("refund");
        assert!((bonus - 1.0).abs() < 1e-6);

        let _ = flower.add_nourishment(-0.5, NourishmentSource::Digging);
        assert_eq!(flower.settle_step(), None);
    }

    #[test]
    fn tuning_parses_partial_toml() {
        let tuning: FlowerTuning = toml::from_str("starting_nourishment = 900.0").expect("toml");
        assert_eq!(tuning.starting_nourishment, 900.0);
        assert_eq!(tuning.levels.len(), 8);
    }
}
