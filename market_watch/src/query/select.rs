//! Memoized derived views over query data.

use super::state::QueryState;
use std::sync::Arc;

/// Applies a pure projection to query data, recomputing only when the
/// underlying value changes identity.
pub struct Selector<T, S> {
    project: Box<dyn Fn(&T) -> S + Send + Sync>,
    last: Option<(Arc<T>, Arc<S>)>,
    computations: usize,
}

impl<T, S> Selector<T, S> {
    pub fn new(project: impl Fn(&T) -> S + Send + Sync + 'static) -> Self {
        Self {
            project: Box::new(project),
            last: None,
            computations: 0,
        }
    }

    /// Project `state`, reusing the previous result for the same raw value
    pub fn select(&mut self, state: &QueryState<T>) -> QueryState<S> {
        let derived = state.data.as_ref().map(|raw| match &self.last {
            Some((prev, derived)) if Arc::ptr_eq(prev, raw) => Arc::clone(derived),
            _ => {
                let derived = Arc::new((self.project)(raw));
                self.computations += 1;
                self.last = Some((Arc::clone(raw), Arc::clone(&derived)));
                derived
            }
        });
        state.map_data(derived)
    }

    /// How many times the projection has run
    pub fn computations(&self) -> usize {
        self.computations
    }
}
