use std::rc::Rc;

use crate::error::{Result, SolverError};
use crate::solver::constraint::{Constraint, ConstraintId};
use crate::solver::domain::DomainId;
use crate::solver::index::{Index, IndexFactory, Priority, Probability};
use crate::solver::model::{BoundConstraint, Model};
use crate::solver::variable::Variable;

/// Initialization data for a single domain value.
#[derive(Debug, Clone)]
pub struct DomainValue<T> {
    pub priority: Priority,
    pub probability: Probability,
    pub value: T,
}

/// Wraps plain values in [`DomainValue`]s carrying equal probability 1.0 and
/// priority 0.
pub fn as_domain_values<T>(values: impl IntoIterator<Item = T>) -> Vec<DomainValue<T>> {
    values
        .into_iter()
        .map(|value| DomainValue {
            priority: 0,
            probability: 1.0,
            value,
        })
        .collect()
}

/// A constraint satisfaction problem under construction.
///
/// Add variables and constraints, then freeze the definition with
/// [`Problem::build`]. The returned variables are handles for use in
/// constraint scopes and for reading results after solving.
pub struct Problem {
    factory: IndexFactory,
    names: Vec<String>,
    hidden: Vec<bool>,
    indices: Vec<Vec<Rc<Index>>>,
    constraints: Vec<BoundConstraint>,
    domain_constraints: Vec<Vec<ConstraintId>>,
}

impl Problem {
    pub fn new() -> Self {
        Self {
            factory: IndexFactory::new(),
            names: Vec::new(),
            hidden: Vec::new(),
            indices: Vec::new(),
            constraints: Vec::new(),
            domain_constraints: Vec::new(),
        }
    }

    /// Adds a variable whose values carry explicit probabilities and
    /// priorities.
    pub fn add_variable<T: Clone + PartialEq>(
        &mut self,
        name: &str,
        values: Vec<DomainValue<T>>,
    ) -> Variable<T> {
        self.new_variable(name, values, false)
    }

    /// Adds a hidden variable: it is propagated through but never picked for
    /// assignment, and its residual domain is part of the solution.
    pub fn add_hidden_variable<T: Clone + PartialEq>(
        &mut self,
        name: &str,
        values: Vec<DomainValue<T>>,
    ) -> Variable<T> {
        self.new_variable(name, values, true)
    }

    /// Adds a variable giving all values equal probability and priority.
    pub fn add_variable_from_values<T: Clone + PartialEq>(
        &mut self,
        name: &str,
        values: Vec<T>,
    ) -> Variable<T> {
        self.new_variable(name, as_domain_values(values), false)
    }

    /// Adds a hidden variable giving all values equal probability and
    /// priority.
    pub fn add_hidden_variable_from_values<T: Clone + PartialEq>(
        &mut self,
        name: &str,
        values: Vec<T>,
    ) -> Variable<T> {
        self.new_variable(name, as_domain_values(values), true)
    }

    fn new_variable<T: Clone + PartialEq>(
        &mut self,
        name: &str,
        values: Vec<DomainValue<T>>,
        hidden: bool,
    ) -> Variable<T> {
        let id = DomainId(self.names.len());

        let mut indices = Vec::with_capacity(values.len());
        let mut plain_values = Vec::with_capacity(values.len());
        for DomainValue {
            priority,
            probability,
            value,
        } in values
        {
            indices.push(self.factory.create(probability, priority));
            plain_values.push(value);
        }

        self.names.push(name.to_string());
        self.hidden.push(hidden);
        self.indices.push(indices);
        self.domain_constraints.push(Vec::new());

        Variable::new(id, plain_values)
    }

    /// Registers a constraint over domains of this problem.
    ///
    /// Fails when the constraint's scope names no domains.
    pub fn add_constraint(&mut self, constraint: impl Constraint + 'static) -> Result<()> {
        let scope = constraint.scope();
        if scope.is_empty() {
            return Err(SolverError::EmptyScope.into());
        }

        let id = self.constraints.len();
        let name = std::any::type_name_of_val(&constraint).to_string();
        for &domain in &scope {
            self.domain_constraints[domain.0].push(id);
        }
        self.constraints.push(BoundConstraint {
            constraint: Box::new(constraint),
            scope,
            name,
        });
        Ok(())
    }

    /// Freezes the definition into a [`Model`] ready for solving.
    pub fn build(self) -> Model {
        Model::new(
            self.factory,
            self.names,
            self.hidden,
            self.indices,
            self.constraints,
            self.domain_constraints,
        )
    }
}

impl Default for Problem {
    fn default() -> Self {
        Self::new()
    }
}
