use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::error::{Result, SolverError};
use crate::solver::domain::{Domain, DomainId};
use crate::solver::index::{Priority, Probability};
use crate::solver::model::Model;
use crate::solver::mutation::Mutation;

/// A typed façade over one domain.
///
/// A `Variable<T>` associates the values relevant to the problem with the
/// probability and priority state of the underlying domain, and offers
/// value-oriented variants of every domain operation. Cloning is cheap; all
/// clones observe the same domain.
pub struct Variable<T> {
    id: DomainId,
    values: Rc<[T]>,
    cache: Rc<RefCell<ValueCache<T>>>,
}

impl<T> Clone for Variable<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            values: Rc::clone(&self.values),
            cache: Rc::clone(&self.cache),
        }
    }
}

#[derive(Debug)]
struct ValueCache<T> {
    version: u64,
    values: Vec<T>,
}

impl<T: Clone + PartialEq> Variable<T> {
    pub(crate) fn new(id: DomainId, values: Vec<T>) -> Self {
        let capacity = values.len();
        Self {
            id,
            values: values.into(),
            cache: Rc::new(RefCell::new(ValueCache {
                version: 0,
                values: Vec::with_capacity(capacity),
            })),
        }
    }

    pub fn id(&self) -> DomainId {
        self.id
    }

    /// The read view of the underlying domain.
    pub fn domain<'m>(&self, model: &'m Model) -> Domain<'m> {
        model.domain(self.id)
    }

    pub fn name<'m>(&self, model: &'m Model) -> &'m str {
        self.domain(model).name()
    }

    /// The values still allowed, cached against the domain version.
    pub fn available_values<'v>(&'v self, model: &Model) -> Ref<'v, [T]> {
        let domain = self.domain(model);
        let version = domain.version();
        let stale = self.cache.borrow().version != version;
        if stale {
            let mut cache = self.cache.borrow_mut();
            cache.values.clear();
            cache
                .values
                .extend(domain.available_indices().iter().map(|&i| self.values[i].clone()));
            cache.version = version;
        }
        Ref::map(self.cache.borrow(), |cache| cache.values.as_slice())
    }

    /// The still available indices together with their values.
    pub fn available_indices_and_values<'v, 'm>(
        &'v self,
        model: &'m Model,
    ) -> (&'m [usize], Ref<'v, [T]>) {
        (self.domain(model).available_indices(), self.available_values(model))
    }

    /// Whether the given value is still allowed to be selected.
    pub fn is_value_available(&self, model: &Model, value: &T) -> bool {
        self.exists(model, |candidate| candidate == value)
    }

    /// Whether any available value passes the check.
    pub fn exists(&self, model: &Model, check: impl Fn(&T) -> bool) -> bool {
        self.domain(model)
            .available_indices()
            .iter()
            .any(|&i| check(&self.values[i]))
    }

    /// Whether every available value passes the check.
    pub fn for_each(&self, model: &Model, check: impl Fn(&T) -> bool) -> bool {
        self.domain(model)
            .available_indices()
            .iter()
            .all(|&i| check(&self.values[i]))
    }

    /// Whether any of the given values is still allowed to be selected.
    pub fn has_any_of(&self, model: &Model, values: &[T]) -> bool {
        self.exists(model, |candidate| values.contains(candidate))
    }

    /// The single assigned value.
    ///
    /// Fails when the variable is not assigned exactly one value; check
    /// [`Domain::is_assigned`] first.
    pub fn assigned_value(&self, model: &Model) -> Result<T> {
        let domain = self.domain(model);
        if !domain.is_assigned() {
            return Err(SolverError::NotAssigned(domain.name().to_string()).into());
        }
        Ok(self.values[domain.available_indices()[0]].clone())
    }

    /// Creates a mutation that assigns this variable the given value.
    /// A value that is not available resolves to the no-op mutation.
    pub fn assign_by_value(&self, model: &Model, value: &T) -> Mutation {
        let domain = self.domain(model);
        for &i in domain.available_indices() {
            if self.values[i] == *value {
                return domain.assign(i);
            }
        }
        Mutation::none()
    }

    /// Creates a mutation that updates the index holding the given value.
    pub fn update_by_value(
        &self,
        model: &Model,
        factor: Probability,
        delta: Priority,
        value: &T,
    ) -> Mutation {
        let domain = self.domain(model);
        for &i in domain.available_indices() {
            if self.values[i] == *value {
                return domain.update(factor, delta, &[i]);
            }
        }
        Mutation::none()
    }

    /// Creates a mutation that raises the priority of the index holding the
    /// given value.
    pub fn update_priority_by_value(&self, model: &Model, delta: Priority, value: &T) -> Mutation {
        self.update_by_value(model, 1.0, delta, value)
    }

    /// Creates a mutation that lowers the probability of the index holding
    /// the given value.
    pub fn update_probability_by_value(
        &self,
        model: &Model,
        factor: Probability,
        value: &T,
    ) -> Mutation {
        self.update_by_value(model, factor, 0, value)
    }

    /// Creates a mutation that excludes all values for which `should_ban`
    /// returns true.
    pub fn exclude_by(&self, model: &Model, should_ban: impl Fn(&T) -> bool) -> Mutation {
        let domain = self.domain(model);
        let mut buffer = model.index_buffer();
        buffer.clear();
        buffer.extend(
            domain
                .available_indices()
                .iter()
                .copied()
                .filter(|&i| should_ban(&self.values[i])),
        );
        domain.exclude(buffer.as_slice())
    }

    /// Creates a mutation that excludes all given values.
    pub fn exclude_by_value(&self, model: &Model, values: &[T]) -> Mutation {
        self.exclude_by(model, |candidate| values.contains(candidate))
    }
}
