//! The transcription store: what each infinite entity became.
//!
//! A store belongs to exactly one build pass. It is immutable once the
//! pass finishes and is discarded whenever the upstream model mutates,
//! which is what makes the lazily memoized tuple caches safe.

use crate::error::TranscriptionError;
use crate::finite::{FiniteCon, FiniteVar, ReducedVar};
use finitize_model::{ConstraintId, MeasureId, ParameterId, VariableId};
use finitize_supports::{SupportError, SupportKey};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// An ordered tuple of support coordinates, usable as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SupportTuple(Vec<SupportKey>);

impl SupportTuple {
    /// The empty tuple finite entities transcribe under.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_values(values: &[f64]) -> Result<Self, SupportError> {
        let mut keys = Vec::with_capacity(values.len());
        for value in values {
            keys.push(SupportKey::new(*value)?);
        }
        Ok(Self(keys))
    }

    pub fn from_keys(keys: Vec<SupportKey>) -> Self {
        Self(keys)
    }

    pub fn keys(&self) -> &[SupportKey] {
        &self.0
    }

    pub fn values(&self) -> Vec<f64> {
        self.0.iter().map(|key| key.value()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SupportTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}")?;
        }
        write!(f, ")")
    }
}

/// What a variable transcribed to at one support tuple.
///
/// A tuple over the full parameter set resolves to a finite counterpart;
/// a tuple over the subset a measure pins down resolves to a reduced
/// variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableSlot {
    Finite(FiniteVar),
    Reduced(ReducedVar),
}

/// A reference to a model entity, for store queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Variable(VariableId),
    Measure(MeasureId),
    Constraint(ConstraintId),
    Parameter(ParameterId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Variable(id) => write!(f, "{id}"),
            EntityRef::Measure(id) => write!(f, "{id}"),
            EntityRef::Constraint(id) => write!(f, "{id}"),
            EntityRef::Parameter(id) => write!(f, "{id}"),
        }
    }
}

/// Per-entity mapping record: the expansion axes, the tuple index, and
/// the index-aligned counterpart list.
#[derive(Debug)]
pub(crate) struct EntityRecord<T> {
    /// Parameters this entity was expanded over, in axis order.
    pub(crate) parameters: Vec<ParameterId>,
    pub(crate) lookup: HashMap<SupportTuple, usize>,
    pub(crate) mappings: Vec<T>,
    /// Ordered tuples, memoized on first query by inverting `lookup`.
    tuples: OnceCell<Vec<SupportTuple>>,
}

impl<T> EntityRecord<T> {
    pub(crate) fn new(parameters: Vec<ParameterId>) -> Self {
        Self {
            parameters,
            lookup: HashMap::new(),
            mappings: Vec::new(),
            tuples: OnceCell::new(),
        }
    }

    /// Insert a counterpart for `tuple`, or return the existing index.
    pub(crate) fn insert_with(
        &mut self,
        tuple: SupportTuple,
        make: impl FnOnce(usize) -> T,
    ) -> usize {
        if let Some(index) = self.lookup.get(&tuple) {
            return *index;
        }
        let index = self.mappings.len();
        self.mappings.push(make(index));
        self.lookup.insert(tuple, index);
        index
    }

    fn tuples(&self) -> &[SupportTuple] {
        self.tuples.get_or_init(|| {
            let mut ordered = vec![SupportTuple::empty(); self.mappings.len()];
            for (tuple, index) in &self.lookup {
                ordered[*index] = tuple.clone();
            }
            ordered
        })
    }
}

/// A record in the auxiliary reduced-variable list: the owning variable
/// with a subset of its parameters pinned to fixed coordinates.
#[derive(Debug, Clone)]
pub struct ReducedRecord {
    pub variable: VariableId,
    /// The pinned parameters, in the owning variable's axis order.
    pub fixed_parameters: Vec<ParameterId>,
    /// One coordinate per pinned parameter.
    pub fixed: SupportTuple,
}

/// Lookup key for a reduced variable: which variable, which parameters
/// are pinned, and at which coordinates. Keying by the pinned axes keeps
/// measures that integrate out different parameter subsets of the same
/// variable from aliasing when their fixed tuples happen to agree.
pub(crate) type ReducedKey = (VariableId, Vec<ParameterId>, SupportTuple);

/// Everything one transcription pass produced, minus the finite model
/// itself.
#[derive(Debug, Default)]
pub struct TranscriptionStore {
    /// Immutable per-parameter support snapshot taken at the start of the
    /// pass, every label included.
    pub(crate) supports: BTreeMap<ParameterId, Vec<f64>>,
    pub(crate) variables: HashMap<VariableId, EntityRecord<VariableSlot>>,
    pub(crate) measures: HashMap<MeasureId, EntityRecord<FiniteVar>>,
    pub(crate) constraints: HashMap<ConstraintId, EntityRecord<FiniteCon>>,
    pub(crate) reduced: Vec<ReducedRecord>,
    pub(crate) reduced_lookup: HashMap<ReducedKey, ReducedVar>,
}

impl TranscriptionStore {
    /// The support snapshot this pass expanded `id` over.
    pub fn parameter_supports(
        &self,
        id: ParameterId,
    ) -> Result<&[f64], TranscriptionError> {
        self.supports
            .get(&id)
            .map(Vec::as_slice)
            .ok_or(TranscriptionError::NotTranscribed(EntityRef::Parameter(id)))
    }

    /// Index-aligned counterpart slots of a variable, one per full tuple
    /// in cross-product order.
    pub fn variable_slots(
        &self,
        id: VariableId,
    ) -> Result<&[VariableSlot], TranscriptionError> {
        self.variables
            .get(&id)
            .map(|record| record.mappings.as_slice())
            .ok_or(TranscriptionError::NotTranscribed(EntityRef::Variable(id)))
    }

    /// The slot a variable transcribed to at one full tuple.
    pub fn variable_at(
        &self,
        id: VariableId,
        tuple: &SupportTuple,
    ) -> Result<VariableSlot, TranscriptionError> {
        let record = self
            .variables
            .get(&id)
            .ok_or(TranscriptionError::NotTranscribed(EntityRef::Variable(id)))?;
        let index = record
            .lookup
            .get(tuple)
            .ok_or(TranscriptionError::NotTranscribed(EntityRef::Variable(id)))?;
        Ok(record.mappings[*index])
    }

    /// The slot a variable transcribed to at a tuple over a subset of its
    /// parameters: the full axis set resolves to a finite counterpart, a
    /// measure-pinned proper subset resolves to a reduced variable.
    pub fn variable_slot_at(
        &self,
        id: VariableId,
        parameters: &[ParameterId],
        tuple: &SupportTuple,
    ) -> Result<VariableSlot, TranscriptionError> {
        let record = self
            .variables
            .get(&id)
            .ok_or(TranscriptionError::NotTranscribed(EntityRef::Variable(id)))?;
        if parameters == record.parameters.as_slice() {
            return self.variable_at(id, tuple);
        }
        self.reduced_lookup
            .get(&(id, parameters.to_vec(), tuple.clone()))
            .map(|rv| VariableSlot::Reduced(*rv))
            .ok_or(TranscriptionError::NotTranscribed(EntityRef::Variable(id)))
    }

    /// Index-aligned finite counterparts of a measure, one per tuple over
    /// its non-integrated parameters.
    pub fn measure_counterparts(
        &self,
        id: MeasureId,
    ) -> Result<&[FiniteVar], TranscriptionError> {
        self.measures
            .get(&id)
            .map(|record| record.mappings.as_slice())
            .ok_or(TranscriptionError::NotTranscribed(EntityRef::Measure(id)))
    }

    /// Index-aligned finite constraints of a constraint.
    pub fn constraint_counterparts(
        &self,
        id: ConstraintId,
    ) -> Result<&[FiniteCon], TranscriptionError> {
        self.constraints
            .get(&id)
            .map(|record| record.mappings.as_slice())
            .ok_or(TranscriptionError::NotTranscribed(EntityRef::Constraint(id)))
    }

    /// The parameters an entity was expanded over, in axis order.
    pub fn entity_parameters(
        &self,
        entity: EntityRef,
    ) -> Result<&[ParameterId], TranscriptionError> {
        match entity {
            EntityRef::Variable(id) => self
                .variables
                .get(&id)
                .map(|record| record.parameters.as_slice())
                .ok_or(TranscriptionError::NotTranscribed(entity)),
            EntityRef::Measure(id) => self
                .measures
                .get(&id)
                .map(|record| record.parameters.as_slice())
                .ok_or(TranscriptionError::NotTranscribed(entity)),
            EntityRef::Constraint(id) => self
                .constraints
                .get(&id)
                .map(|record| record.parameters.as_slice())
                .ok_or(TranscriptionError::NotTranscribed(entity)),
            EntityRef::Parameter(_) => {
                Err(TranscriptionError::UnsupportedEntityKind(entity))
            }
        }
    }

    /// The ordered support tuples of an entity, memoized; the i-th tuple
    /// corresponds to the i-th counterpart.
    pub fn support_tuples(
        &self,
        entity: EntityRef,
    ) -> Result<&[SupportTuple], TranscriptionError> {
        match entity {
            EntityRef::Variable(id) => self
                .variables
                .get(&id)
                .map(EntityRecord::tuples)
                .ok_or(TranscriptionError::NotTranscribed(entity)),
            EntityRef::Measure(id) => self
                .measures
                .get(&id)
                .map(EntityRecord::tuples)
                .ok_or(TranscriptionError::NotTranscribed(entity)),
            EntityRef::Constraint(id) => self
                .constraints
                .get(&id)
                .map(EntityRecord::tuples)
                .ok_or(TranscriptionError::NotTranscribed(entity)),
            EntityRef::Parameter(_) => {
                Err(TranscriptionError::UnsupportedEntityKind(entity))
            }
        }
    }

    pub fn num_reduced(&self) -> usize {
        self.reduced.len()
    }

    /// The auxiliary record behind a reduced-variable id.
    pub fn reduced(&self, id: ReducedVar) -> Result<&ReducedRecord, TranscriptionError> {
        self.reduced
            .get(id.0)
            .ok_or(TranscriptionError::InvalidReducedReference(id))
    }

    /// Resolve a reduced variable at a tuple over its *free* (non-fixed)
    /// parameters to the owning variable's finite counterpart.
    pub fn reduced_variable_at(
        &self,
        id: ReducedVar,
        free: &SupportTuple,
    ) -> Result<FiniteVar, TranscriptionError> {
        let record = self.reduced(id)?;
        let owner = self
            .variables
            .get(&record.variable)
            .ok_or(TranscriptionError::InvalidReducedReference(id))?;
        if free.len() + record.fixed.len() != owner.parameters.len() {
            return Err(TranscriptionError::InvalidReducedReference(id));
        }
        // Interleave free and fixed coordinates back into the owner's
        // axis order.
        let mut keys = Vec::with_capacity(owner.parameters.len());
        let mut free_iter = free.keys().iter();
        let mut fixed_iter = record.fixed.keys().iter();
        for parameter in &owner.parameters {
            let next = if record.fixed_parameters.contains(parameter) {
                fixed_iter.next()
            } else {
                free_iter.next()
            };
            let Some(key) = next else {
                return Err(TranscriptionError::InvalidReducedReference(id));
            };
            keys.push(*key);
        }
        let tuple = SupportTuple::from_keys(keys);
        match self.variable_at(record.variable, &tuple)? {
            VariableSlot::Finite(var) => Ok(var),
            VariableSlot::Reduced(_) => {
                Err(TranscriptionError::InvalidReducedReference(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(values: &[f64]) -> SupportTuple {
        SupportTuple::from_values(values).unwrap()
    }

    #[test]
    fn tuples_display_like_points() {
        assert_eq!(tuple(&[0.5, 1.0]).to_string(), "(0.5, 1)");
        assert_eq!(SupportTuple::empty().to_string(), "()");
    }

    #[test]
    fn record_reuses_existing_tuples() {
        let mut record: EntityRecord<usize> = EntityRecord::new(vec![]);
        let a = record.insert_with(tuple(&[0.0]), |i| i);
        let b = record.insert_with(tuple(&[1.0]), |i| i);
        let again = record.insert_with(tuple(&[0.0]), |_| unreachable!());
        assert_eq!((a, b, again), (0, 1, 0));
        assert_eq!(record.mappings, vec![0, 1]);
    }

    #[test]
    fn memoized_tuples_align_with_mappings() {
        let mut record: EntityRecord<usize> = EntityRecord::new(vec![]);
        record.insert_with(tuple(&[0.0]), |i| i);
        record.insert_with(tuple(&[0.5]), |i| i);
        record.insert_with(tuple(&[1.0]), |i| i);
        let tuples = record.tuples();
        assert_eq!(tuples.len(), 3);
        assert_eq!(tuples[1], tuple(&[0.5]));
        // Second call hits the cache and agrees.
        assert_eq!(record.tuples()[2], tuple(&[1.0]));
    }

    #[test]
    fn empty_store_reports_not_transcribed() {
        let store = TranscriptionStore::default();
        let err = store.variable_slots(VariableId(0)).unwrap_err();
        assert!(matches!(err, TranscriptionError::NotTranscribed(_)));
        let err = store
            .support_tuples(EntityRef::Parameter(ParameterId(0)))
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::UnsupportedEntityKind(_)));
    }

    #[test]
    fn dangling_reduced_reference_is_invalid() {
        let store = TranscriptionStore::default();
        let err = store.reduced(ReducedVar(0)).unwrap_err();
        assert!(matches!(err, TranscriptionError::InvalidReducedReference(_)));
    }
}
