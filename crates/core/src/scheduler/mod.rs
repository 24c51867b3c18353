mod bot;
mod window;

pub use bot::{Bot, ScheduleSettings, StepOutcome, WallClock};
pub use window::{next_boundary, WindowPlan};

use crate::{adapters::BotAction, adapters::ExecutionResult, error::Error, Result};
use rand::Rng;
use std::sync::Arc;

/// An action the scheduler may pick, with its relative weight.
#[derive(Clone)]
pub struct WeightedAction {
    pub name: String,
    pub weight: u32,
    pub action: Arc<dyn BotAction>,
}

impl WeightedAction {
    pub fn new(name: impl Into<String>, weight: u32, action: Arc<dyn BotAction>) -> Self {
        Self {
            name: name.into(),
            weight,
            action,
        }
    }
}

impl std::fmt::Debug for WeightedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedAction")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

/// Fixed-order roulette wheel over weighted actions.
#[derive(Debug, Clone)]
pub struct WeightedTable {
    entries: Vec<WeightedAction>,
    total_weight: u64,
}

impl WeightedTable {
    /// Entries with zero weight are dropped. At least one positive weight is required.
    pub fn new(entries: Vec<WeightedAction>) -> Result<Self> {
        let entries: Vec<_> = entries.into_iter().filter(|e| e.weight > 0).collect();
        let total_weight = entries.iter().map(|e| e.weight as u64).sum();
        if total_weight == 0 {
            return Err(Error::config("at least one action needs a positive weight"));
        }
        Ok(Self {
            entries,
            total_weight,
        })
    }

    pub fn entries(&self) -> &[WeightedAction] {
        &self.entries
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Draws `r` in `[0, total_weight)` and walks the entries in order, subtracting each weight
    /// until `r` falls below the current one.
    pub fn select_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let mut r = rng.gen_range(0..self.total_weight);
        for (idx, entry) in self.entries.iter().enumerate() {
            let weight = entry.weight as u64;
            if r < weight {
                return idx;
            }
            r -= weight;
        }
        self.entries.len() - 1
    }

    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> &WeightedAction {
        &self.entries[self.select_index(rng)]
    }
}

/// Outcome tallies since the last summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub success: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl RunCounters {
    pub fn record(&mut self, result: &ExecutionResult) {
        match result {
            ExecutionResult::Success { .. } => self.success += 1,
            ExecutionResult::Failed { .. } => self.failed += 1,
            ExecutionResult::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn record_error(&mut self) {
        self.failed += 1;
    }

    pub fn total(&self) -> u64 {
        self.success + self.failed + self.skipped
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Display for RunCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} skipped",
            self.success, self.failed, self.skipped
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    pub struct Noop;

    #[async_trait]
    impl BotAction for Noop {
        async fn execute(&self, _rng: &mut (dyn RngCore + Send)) -> Result<ExecutionResult> {
            Ok(ExecutionResult::skipped("noop"))
        }
    }

    fn table(weights: &[(&str, u32)]) -> WeightedTable {
        WeightedTable::new(
            weights
                .iter()
                .map(|(name, w)| WeightedAction::new(*name, *w, Arc::new(Noop)))
                .collect(),
        )
        .unwrap()
    }

    fn frequencies(table: &WeightedTable, draws: usize, seed: u64) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = vec![0; table.entries().len()];
        for _ in 0..draws {
            counts[table.select_index(&mut rng)] += 1;
        }
        counts
    }

    fn chi_square(table: &WeightedTable, counts: &[usize], draws: usize) -> f64 {
        table
            .entries()
            .iter()
            .zip(counts)
            .map(|(entry, &observed)| {
                let expected = draws as f64 * entry.weight as f64 / table.total_weight() as f64;
                (observed as f64 - expected).powi(2) / expected
            })
            .sum()
    }

    #[test]
    fn rejects_all_zero_weights() {
        let entries = vec![
            WeightedAction::new("a", 0, Arc::new(Noop)),
            WeightedAction::new("b", 0, Arc::new(Noop)),
        ];
        assert!(WeightedTable::new(entries).unwrap_err().is_fatal());
        assert!(WeightedTable::new(vec![]).is_err());
    }

    #[test]
    fn zero_weight_entries_are_never_selected() {
        let table = table(&[("off", 0), ("on", 1)]);
        assert_eq!(table.entries().len(), 1);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            assert_eq!(table.select(&mut rng).name, "on");
        }
    }

    #[test]
    fn transfer_heavy_distribution_matches_weights() {
        let table = table(&[("tea_game", 2), ("voting", 2), ("chat", 2), ("transfer", 5)]);
        let draws = 10_000;
        let counts = frequencies(&table, draws, 42);

        let transfer_share = counts[3] as f64 / draws as f64;
        assert!(
            (transfer_share - 5.0 / 11.0).abs() < 0.02,
            "transfer share {transfer_share}"
        );
        // 3 degrees of freedom, p = 0.001
        assert!(chi_square(&table, &counts, draws) < 16.27);
    }

    #[test]
    fn skewed_distribution_converges() {
        let table = table(&[("a", 1), ("b", 10), ("c", 89)]);
        let draws = 50_000;
        for seed in [1, 2, 3] {
            let counts = frequencies(&table, draws, seed);
            // 2 degrees of freedom, p = 0.001
            assert!(chi_square(&table, &counts, draws) < 13.82);
        }
    }

    #[test]
    fn counters_do_not_count_skips_as_failures() {
        let mut counters = RunCounters::default();
        counters.record(&ExecutionResult::skipped("Already voted"));
        counters.record(&ExecutionResult::failed("reverted"));
        counters.record(&ExecutionResult::skipped("No recipients"));
        assert_eq!(
            counters,
            RunCounters {
                success: 0,
                failed: 1,
                skipped: 2
            }
        );
        assert_eq!(counters.total(), 3);
        counters.reset();
        assert_eq!(counters.total(), 0);
    }
}
