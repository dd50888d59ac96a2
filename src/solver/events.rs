use std::collections::HashMap;

use crate::solver::model::Model;

/// The points at which the solver notifies its observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverEvent {
    /// Solving begins, before the initial propagation.
    Start,
    /// Solving ends, successful or not.
    Finished,
    /// A complete assignment satisfying every constraint was recorded.
    SolutionFound,
    /// Solving ends without any solution.
    Failure,
    /// The initial propagation succeeded and the search begins.
    SearchStart,
    /// A propagation run begins.
    PropagateStart,
    /// A selection round begins.
    Select,
}

/// A callback observing the model at the moment an event fires.
///
/// Callbacks only ever see `&Model`, so re-entering the running solver from
/// an observer is impossible by construction.
pub type EventCallback = Box<dyn FnMut(&Model)>;

/// Registered callbacks per event, invoked synchronously in subscription
/// order.
pub(crate) struct Events {
    subscriptions: HashMap<SolverEvent, Vec<EventCallback>>,
}

impl Events {
    pub(crate) fn new() -> Self {
        Self {
            subscriptions: HashMap::new(),
        }
    }

    pub(crate) fn subscribe(&mut self, event: SolverEvent, callback: EventCallback) {
        self.subscriptions.entry(event).or_default().push(callback);
    }

    pub(crate) fn publish(&mut self, event: SolverEvent, model: &Model) {
        if let Some(callbacks) = self.subscriptions.get_mut(&event) {
            for callback in callbacks {
                callback(model);
            }
        }
    }
}
