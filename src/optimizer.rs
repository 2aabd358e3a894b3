//! Slaughter-weight profit optimizer.
//!
//! Profit per head as a function of sale weight under a simple feed model:
//! feed conversion gets linearly worse as the animal grows, so cumulative
//! feed cost is quadratic in weight while revenue is linear. The optimum is
//! the sweep point with the highest profit, first one wins on ties.

use serde::Serialize;

use crate::types::Animal;

/// Weight at or above which an animal is ready for market.
pub const READY_WEIGHT_KG: f64 = 90.0;
/// Lower bound of the "approaching" tier.
pub const APPROACHING_WEIGHT_KG: f64 = 75.0;

/// Upper bound on sweep length.
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// Weight sweep in kg, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SweepRange {
    fn default() -> Self {
        Self {
            min: 60.0,
            max: 130.0,
            step: 5.0,
        }
    }
}

impl SweepRange {
    /// Sweep weights in ascending order. A non-positive step yields `min` only.
    /// Non-finite bounds, or more than `MAX_SWEEP_POINTS` points, yield nothing.
    pub fn weights(&self) -> Vec<f64> {
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            log::warn!("Weight sweep has non-finite bounds: {:?}", self);
            return Vec::new();
        }
        if self.max < self.min {
            return Vec::new();
        }
        if self.step <= 0.0 {
            return vec![self.min];
        }
        // Epsilon keeps `max` in the sweep when the step is not exact in binary.
        let steps = ((self.max - self.min) / self.step + 1e-9).floor();
        if steps >= MAX_SWEEP_POINTS as f64 {
            log::warn!("Weight sweep of {} points is too large", steps);
            return Vec::new();
        }
        (0..=steps as usize)
            .map(|i| (self.min + self.step * i as f64).min(self.max))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    /// Fixed per-head cost (piglet, vet, handling).
    pub base_cost: f64,
    /// Feed conversion ratio at `reference_weight`.
    pub base_fcr: f64,
    /// FCR increase per kg above `reference_weight`.
    pub fcr_slope: f64,
    pub reference_weight: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            base_cost: 40.0,
            base_fcr: 2.5,
            fcr_slope: 0.04,
            reference_weight: 60.0,
        }
    }
}

impl CostModel {
    pub fn fcr(&self, weight: f64) -> f64 {
        self.base_fcr + self.fcr_slope * (weight - self.reference_weight)
    }

    pub fn point(&self, weight: f64, price_per_kg: f64, feed_cost_per_kg: f64) -> ProfitPoint {
        let revenue = weight * price_per_kg;
        let fcr = self.fcr(weight);
        let feed_kg = weight * fcr;
        let cost = self.base_cost + feed_kg * feed_cost_per_kg;
        ProfitPoint {
            weight,
            revenue,
            fcr,
            feed_kg,
            cost,
            profit: revenue - cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitPoint {
    pub weight: f64,
    pub revenue: f64,
    pub fcr: f64,
    pub feed_kg: f64,
    pub cost: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Ready,
    Approaching,
}

impl Readiness {
    pub fn classify(weight: f64) -> Option<Self> {
        if weight >= READY_WEIGHT_KG {
            Some(Readiness::Ready)
        } else if weight >= APPROACHING_WEIGHT_KG {
            Some(Readiness::Approaching)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalEstimate {
    pub animal_id: String,
    pub tag: String,
    pub weight: f64,
    pub readiness: Readiness,
    pub estimated_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerReport {
    pub curve: Vec<ProfitPoint>,
    pub optimum: Option<ProfitPoint>,
    pub ready: Vec<AnimalEstimate>,
    pub approaching: Vec<AnimalEstimate>,
    /// Market candidates below the approaching tier.
    pub not_ready_count: usize,
}

/// Profit at every sweep weight. Depends only on its arguments.
pub fn profit_curve(
    model: &CostModel,
    sweep: &SweepRange,
    price_per_kg: f64,
    feed_cost_per_kg: f64,
) -> Vec<ProfitPoint> {
    sweep
        .weights()
        .into_iter()
        .map(|w| model.point(w, price_per_kg, feed_cost_per_kg))
        .collect()
}

/// Highest-profit point; the earliest (lightest) wins ties.
pub fn optimal_point(curve: &[ProfitPoint]) -> Option<ProfitPoint> {
    let mut best: Option<ProfitPoint> = None;
    for point in curve {
        match best {
            Some(b) if point.profit <= b.profit => {}
            _ => best = Some(*point),
        }
    }
    best
}

pub fn optimize(
    animals: &[Animal],
    model: &CostModel,
    sweep: &SweepRange,
    price_per_kg: f64,
    feed_cost_per_kg: f64,
) -> OptimizerReport {
    let curve = profit_curve(model, sweep, price_per_kg, feed_cost_per_kg);
    let optimum = optimal_point(&curve);

    let mut ready = Vec::new();
    let mut approaching = Vec::new();
    let mut not_ready_count = 0usize;

    for animal in animals.iter().filter(|a| a.is_market_candidate()) {
        let Some(readiness) = Readiness::classify(animal.weight) else {
            not_ready_count += 1;
            continue;
        };
        let estimate = AnimalEstimate {
            animal_id: animal.id.clone(),
            tag: animal.tag.clone(),
            weight: animal.weight,
            readiness,
            estimated_profit: model
                .point(animal.weight, price_per_kg, feed_cost_per_kg)
                .profit,
        };
        match readiness {
            Readiness::Ready => ready.push(estimate),
            Readiness::Approaching => approaching.push(estimate),
        }
    }

    log_optimum(optimum.as_ref(), price_per_kg, feed_cost_per_kg);

    OptimizerReport {
        curve,
        optimum,
        ready,
        approaching,
        not_ready_count,
    }
}

fn log_optimum(optimum: Option<&ProfitPoint>, price_per_kg: f64, feed_cost_per_kg: f64) {
    match optimum {
        Some(p) => log::debug!(
            "Optimal sale weight {:.0} kg (profit {:.2}) at price {:.2}/kg, feed {:.2}/kg",
            p.weight,
            p.profit,
            price_per_kg,
            feed_cost_per_kg
        ),
        None => log::debug!("Empty weight sweep, no optimum"),
    }
}
