//! Early-stopping controller

use super::ImprovementPolicy;

/// Controller state after the latest epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStopState {
    /// No epoch observed yet
    Running,
    /// Latest epoch improved
    Improved,
    /// Latest epoch did not improve, patience left
    Stagnant,
    /// Patience exhausted
    Stopped,
}

/// Outcome of observing one epoch's validation loss
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochDecision {
    /// New controller state
    pub state: EarlyStopState,
    /// The loss is the best so far and the model should be persisted
    pub is_best: bool,
    /// Consecutive epochs without improvement
    pub stagnant_epochs: usize,
}

impl EpochDecision {
    /// Whether training must stop now
    pub fn should_stop(&self) -> bool {
        self.state == EarlyStopState::Stopped
    }
}

/// Tracks validation losses and decides when training stops
///
/// With [`ImprovementPolicy::StrictDecrease`] and patience 3, losses
/// `[10, 9, 9, 9, 9]` improve at epochs 1 and 2, stagnate at 3, 4 and 5
/// and stop after epoch 5 with epoch 2 as the best.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    policy: ImprovementPolicy,
    previous: f32,
    best: f32,
    best_epoch: Option<usize>,
    stagnant: usize,
    state: EarlyStopState,
}

impl EarlyStopping {
    /// Create a controller
    pub fn new(patience: usize, policy: ImprovementPolicy) -> Self {
        Self {
            patience,
            policy,
            previous: f32::INFINITY,
            best: f32::INFINITY,
            best_epoch: None,
            stagnant: 0,
            state: EarlyStopState::Running,
        }
    }

    fn improved(&self, loss: f32) -> bool {
        match self.policy {
            ImprovementPolicy::StrictDecrease => loss < self.previous,
            ImprovementPolicy::ThresholdTolerant { epsilon } => {
                (loss - self.previous).abs() > epsilon && loss < self.best
            }
        }
    }

    /// Feed the validation loss of `epoch` (1-indexed)
    pub fn observe(&mut self, epoch: usize, loss: f32) -> EpochDecision {
        let mut is_best = false;

        if self.improved(loss) {
            self.stagnant = 0;
            self.state = EarlyStopState::Improved;
            if loss < self.best {
                self.best = loss;
                self.best_epoch = Some(epoch);
                is_best = true;
            }
        } else {
            self.stagnant += 1;
            self.state = if self.stagnant >= self.patience {
                EarlyStopState::Stopped
            } else {
                EarlyStopState::Stagnant
            };
        }
        self.previous = loss;

        EpochDecision { state: self.state, is_best, stagnant_epochs: self.stagnant }
    }

    /// Current state
    pub fn state(&self) -> EarlyStopState {
        self.state
    }

    /// Epoch of the best loss
    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    /// Best loss, `None` before the first epoch
    pub fn best_loss(&self) -> Option<f32> {
        self.best_epoch.map(|_| self.best)
    }

    /// Patience limit
    pub fn patience(&self) -> usize {
        self.patience
    }

    /// Reset internal state
    pub fn reset(&mut self) {
        *self = Self::new(self.patience, self.policy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(es: &mut EarlyStopping, losses: &[f32]) -> Vec<EpochDecision> {
        let mut out = Vec::new();
        for (i, &l) in losses.iter().enumerate() {
            let d = es.observe(i + 1, l);
            out.push(d);
            if d.should_stop() {
                break;
            }
        }
        out
    }

    #[test]
    fn test_strict_literal_sequence() {
        let mut es = EarlyStopping::new(3, ImprovementPolicy::StrictDecrease);
        let decisions = run(&mut es, &[10.0, 9.0, 9.0, 9.0, 9.0]);

        assert_eq!(decisions.len(), 5);
        let states: Vec<_> = decisions.iter().map(|d| d.state).collect();
        assert_eq!(
            states,
            vec![
                EarlyStopState::Improved,
                EarlyStopState::Improved,
                EarlyStopState::Stagnant,
                EarlyStopState::Stagnant,
                EarlyStopState::Stopped,
            ]
        );
        assert_eq!(es.best_epoch(), Some(2));
        assert_eq!(es.best_loss(), Some(9.0));
        assert!(decisions[0].is_best && decisions[1].is_best);
    }

    #[test]
    fn test_initial_state_running() {
        let es = EarlyStopping::new(2, ImprovementPolicy::default());
        assert_eq!(es.state(), EarlyStopState::Running);
        assert_eq!(es.best_loss(), None);
    }

    #[test]
    fn test_strict_rebound_resets_patience_without_new_best() {
        let mut es = EarlyStopping::new(2, ImprovementPolicy::StrictDecrease);
        let d = run(&mut es, &[5.0, 6.0, 5.5, 6.0, 7.0]);
        // 5.5 < 6.0 resets the counter but is not the best
        assert_eq!(d[2].state, EarlyStopState::Improved);
        assert!(!d[2].is_best);
        assert_eq!(d.len(), 5);
        assert!(d[4].should_stop());
        assert_eq!(es.best_epoch(), Some(1));
    }

    #[test]
    fn test_tolerant_flat_counts_as_stagnant() {
        let eps = 0.01;
        let mut es = EarlyStopping::new(2, ImprovementPolicy::ThresholdTolerant { epsilon: eps });
        let d = run(&mut es, &[1.0, 0.995, 0.99]);
        // both later epochs moved by less than epsilon
        assert_eq!(d[1].state, EarlyStopState::Stagnant);
        assert!(d[2].should_stop());
        assert_eq!(es.best_epoch(), Some(1));
    }

    #[test]
    fn test_tolerant_requires_best_so_far() {
        let mut es = EarlyStopping::new(3, ImprovementPolicy::ThresholdTolerant { epsilon: 0.01 });
        let d = run(&mut es, &[1.0, 2.0, 1.5, 0.5]);
        assert_eq!(d[2].state, EarlyStopState::Stagnant);
        assert_eq!(d[2].stagnant_epochs, 2);
        assert_eq!(d[3].state, EarlyStopState::Improved);
        assert!(d[3].is_best);
        assert_eq!(es.best_epoch(), Some(4));
    }

    #[test]
    fn test_reset() {
        let mut es = EarlyStopping::new(1, ImprovementPolicy::StrictDecrease);
        es.observe(1, 1.0);
        es.observe(2, 2.0);
        assert_eq!(es.state(), EarlyStopState::Stopped);
        es.reset();
        assert_eq!(es.state(), EarlyStopState::Running);
        assert_eq!(es.patience(), 1);
    }
}
