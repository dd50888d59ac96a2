use crate::solver::domain::DomainId;
use crate::solver::model::Model;
use crate::solver::mutation::Mutator;
use crate::solver::variable::Variable;

/// A numeric identifier for a single registered constraint.
pub type ConstraintId = usize;

/// A rule restricting the joint assignment of a set of domains.
///
/// The engine does not know a constraint's semantics; it only knows whom to
/// notify. [`Constraint::propagate`] is invoked every time a domain in the
/// scope changes and may submit tightening mutations through the mutator.
///
/// Constraints must be deterministic functions of the domains they read;
/// otherwise the propagation fix-point is not guaranteed.
pub trait Constraint {
    /// The domains influenced by this constraint.
    fn scope(&self) -> Vec<DomainId>;

    /// Reads the current state through `model` and submits further updates
    /// through `mutator`. Submitted mutations are applied by the engine
    /// after the call returns.
    fn propagate(&self, model: &Model, mutator: &mut Mutator);
}

/// Extracts the domain ids from a list of variables, for use in scopes.
pub fn ids_of<T: Clone + PartialEq>(variables: &[&Variable<T>]) -> Vec<DomainId> {
    variables.iter().map(|variable| variable.id()).collect()
}
