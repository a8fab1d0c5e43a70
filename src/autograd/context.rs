//! Train / eval mode of a bundler

/// Whether lookups record a backward graph
///
/// A bundler in training mode returns tensors that carry gradients back to
/// its tables. In eval mode the same lookups are detached, so validation and
/// ranking never touch the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    training: bool,
}

impl Context {
    /// Training mode, the state of a freshly built bundler
    pub fn new() -> Self {
        Self { training: true }
    }

    /// Evaluation mode
    pub fn evaluation() -> Self {
        Self { training: false }
    }

    /// Record gradients again
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Stop recording gradients
    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Lookups record a graph
    pub fn is_training(&self) -> bool {
        self.training
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
