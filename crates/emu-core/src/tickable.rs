//! Trait for components that are stepped by the board clock.

use crate::{Clock, StepContext, Ticks};

/// A component advanced once per clock cycle.
///
/// The driving loop owns the [`Clock`] and steps every chip with the same
/// [`StepContext`]; no chip ever advances on its own.
pub trait Tickable {
    /// Run one clock cycle.
    fn tick(&mut self, step: &StepContext);

    /// Run `count` cycles, drawing contexts from `clock`.
    ///
    /// Components may override for efficiency, but must produce identical
    /// results.
    fn run(&mut self, clock: &mut Clock, count: Ticks) {
        for _ in 0..count.get() {
            let step = clock.step();
            self.tick(&step);
        }
    }
}
