//! The model: entity tables plus the support store operation surface.

use crate::entity::{
    Constraint, Derivative, DerivativeMethod, Measure, Parameter, Variable,
};
use crate::error::ModelError;
use crate::ids::{
    ConstraintId, DerivativeId, MeasureId, ParameterId, VariableId,
};
use finitize_supports::{
    Domain, GenerateRequest, GeneratorRegistry, GenerativeInfo, Label, LabelSelector,
    Method, SupportKey, round_sig,
};
use rand::RngCore;
use std::collections::BTreeMap;

/// The pre-transcription model.
///
/// Owns every parameter and entity record, the generator registry, and
/// the `ready` dirty bit read once before solving.
#[derive(Debug)]
pub struct Model {
    parameters: BTreeMap<ParameterId, Parameter>,
    variables: BTreeMap<VariableId, Variable>,
    measures: BTreeMap<MeasureId, Measure>,
    constraints: BTreeMap<ConstraintId, Constraint>,
    derivatives: BTreeMap<DerivativeId, Derivative>,
    registry: GeneratorRegistry,
    next_id: u64,
    next_measure_label: u64,
    ready: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        Self {
            parameters: BTreeMap::new(),
            variables: BTreeMap::new(),
            measures: BTreeMap::new(),
            constraints: BTreeMap::new(),
            derivatives: BTreeMap::new(),
            registry: GeneratorRegistry::with_defaults(),
            next_id: 0,
            next_measure_label: 0,
            ready: false,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The generator registry, for installing custom generators.
    pub fn registry_mut(&mut self) -> &mut GeneratorRegistry {
        &mut self.registry
    }

    // ---- entity construction -------------------------------------------

    /// Add a parameter over a scalar domain.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        domain: Domain,
    ) -> Result<ParameterId, ModelError> {
        let name = name.into();
        if !domain.is_scalar() {
            return Err(ModelError::NonScalarDomain {
                parameter_name: name,
                domain: domain.to_string(),
            });
        }
        let id = ParameterId(self.allocate_id());
        self.parameters.insert(id, Parameter::new(name, domain));
        Ok(id)
    }

    /// Add one parameter per scalar dimension of a group domain.
    ///
    /// Multivariate and collection domains split into components; each
    /// component parameter is named `name[i]`.
    pub fn add_parameter_group(
        &mut self,
        name: impl Into<String>,
        domain: Domain,
    ) -> Result<Vec<ParameterId>, ModelError> {
        let name = name.into();
        let components = domain.scalar_components();
        let mut ids = Vec::with_capacity(components.len());
        for (i, component) in components.into_iter().enumerate() {
            ids.push(self.add_parameter(format!("{name}[{i}]"), component)?);
        }
        Ok(ids)
    }

    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        parameters: Vec<ParameterId>,
    ) -> Result<VariableId, ModelError> {
        for pid in &parameters {
            if !self.parameters.contains_key(pid) {
                return Err(ModelError::UnknownParameter(*pid));
            }
        }
        let id = VariableId(self.allocate_id());
        self.variables.insert(
            id,
            Variable {
                name: name.into(),
                parameters,
            },
        );
        Ok(id)
    }

    /// Add a measure integrating `variable` over the `integrated`
    /// parameters, which must be a subset of the variable's.
    ///
    /// Allocates a fresh integer id behind the measure's unique support
    /// label.
    pub fn add_measure(
        &mut self,
        name: impl Into<String>,
        variable: VariableId,
        integrated: Vec<ParameterId>,
    ) -> Result<MeasureId, ModelError> {
        let deps = &self
            .variables
            .get(&variable)
            .ok_or(ModelError::UnknownVariable(variable))?
            .parameters;
        for pid in &integrated {
            if !deps.contains(pid) {
                return Err(ModelError::ParameterMismatch {
                    variable,
                    parameter: *pid,
                });
            }
        }
        let label_id = self.next_measure_label;
        self.next_measure_label += 1;
        let id = MeasureId(self.allocate_id());
        self.measures.insert(
            id,
            Measure {
                name: name.into(),
                variable,
                integrated,
                label_id,
            },
        );
        Ok(id)
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        variables: Vec<VariableId>,
    ) -> Result<ConstraintId, ModelError> {
        for vid in &variables {
            if !self.variables.contains_key(vid) {
                return Err(ModelError::UnknownVariable(*vid));
            }
        }
        let id = ConstraintId(self.allocate_id());
        self.constraints.insert(
            id,
            Constraint {
                name: name.into(),
                variables,
            },
        );
        Ok(id)
    }

    /// Record a derivative of `variable` with respect to `parameter`.
    pub fn add_derivative(
        &mut self,
        variable: VariableId,
        parameter: ParameterId,
    ) -> Result<DerivativeId, ModelError> {
        let deps = &self
            .variables
            .get(&variable)
            .ok_or(ModelError::UnknownVariable(variable))?
            .parameters;
        if !deps.contains(&parameter) {
            return Err(ModelError::ParameterMismatch {
                variable,
                parameter,
            });
        }
        let id = DerivativeId(self.allocate_id());
        self.derivatives.insert(
            id,
            Derivative {
                variable,
                parameter,
                materialized: false,
            },
        );
        self.ready = false;
        Ok(id)
    }

    // ---- entity access --------------------------------------------------

    pub fn parameter(&self, id: ParameterId) -> Result<&Parameter, ModelError> {
        self.parameters.get(&id).ok_or(ModelError::UnknownParameter(id))
    }

    pub fn variable(&self, id: VariableId) -> Result<&Variable, ModelError> {
        self.variables.get(&id).ok_or(ModelError::UnknownVariable(id))
    }

    pub fn measure(&self, id: MeasureId) -> Result<&Measure, ModelError> {
        self.measures.get(&id).ok_or(ModelError::UnknownMeasure(id))
    }

    pub fn constraint(&self, id: ConstraintId) -> Result<&Constraint, ModelError> {
        self.constraints.get(&id).ok_or(ModelError::UnknownConstraint(id))
    }

    pub fn derivative(&self, id: DerivativeId) -> Result<&Derivative, ModelError> {
        self.derivatives.get(&id).ok_or(ModelError::UnknownDerivative(id))
    }

    pub fn parameter_ids(&self) -> Vec<ParameterId> {
        self.parameters.keys().copied().collect()
    }

    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables.iter().map(|(id, v)| (*id, v))
    }

    pub fn measures(&self) -> impl Iterator<Item = (MeasureId, &Measure)> {
        self.measures.iter().map(|(id, m)| (*id, m))
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> {
        self.constraints.iter().map(|(id, c)| (*id, c))
    }

    // ---- usage queries --------------------------------------------------

    /// Whether any variable, measure, constraint, or derivative touches
    /// this parameter.
    pub fn is_parameter_used(&self, id: ParameterId) -> bool {
        self.variables.values().any(|v| v.parameters.contains(&id))
            || self.measures.values().any(|m| m.integrated.contains(&id))
            || self.derivatives.values().any(|d| d.parameter == id)
    }

    /// Measures referencing `id` through their variable or integration set.
    pub fn parameter_measures(&self, id: ParameterId) -> Vec<MeasureId> {
        self.measures
            .iter()
            .filter(|(_, m)| {
                m.integrated.contains(&id)
                    || self
                        .variables
                        .get(&m.variable)
                        .is_some_and(|v| v.parameters.contains(&id))
            })
            .map(|(mid, _)| *mid)
            .collect()
    }

    /// Derivatives taken with respect to `id`.
    pub fn parameter_derivatives(&self, id: ParameterId) -> Vec<DerivativeId> {
        self.derivatives
            .iter()
            .filter(|(_, d)| d.parameter == id)
            .map(|(did, _)| *did)
            .collect()
    }

    // ---- entity deletion ------------------------------------------------

    /// Delete a measure, stripping its unique label from every support
    /// that carried it.
    pub fn delete_measure(&mut self, id: MeasureId) -> Result<(), ModelError> {
        let measure = self.measures.remove(&id).ok_or(ModelError::UnknownMeasure(id))?;
        let label = Label::Measure(measure.label_id);
        let touched: Vec<ParameterId> = self.parameters.keys().copied().collect();
        for pid in touched {
            let removal = self
                .parameters
                .get_mut(&pid)
                .ok_or(ModelError::UnknownParameter(pid))?
                .supports
                .remove_matching(LabelSelector::One(label));
            if removal.values_changed() {
                self.invalidate_after_value_change(pid);
            }
        }
        self.ready = false;
        Ok(())
    }

    pub fn delete_derivative(&mut self, id: DerivativeId) -> Result<(), ModelError> {
        self.derivatives
            .remove(&id)
            .ok_or(ModelError::UnknownDerivative(id))?;
        self.ready = false;
        Ok(())
    }

    // ---- ready bit ------------------------------------------------------

    /// Whether the last transcription build is still current.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Set by a completed transcription build; cleared by every support
    /// or derivative mutation path.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    // ---- support store operations --------------------------------------

    /// Round and bounds-check values against a parameter, before any
    /// mutation happens.
    fn prepare_values(
        parameter: &Parameter,
        values: &[f64],
        check_bounds: bool,
    ) -> Result<Vec<SupportKey>, ModelError> {
        if values.is_empty() {
            return Err(finitize_supports::SupportError::EmptyValues.into());
        }
        let mut keys = Vec::with_capacity(values.len());
        for value in values {
            let rounded = round_sig(*value, parameter.sig_digits);
            if check_bounds && !parameter.domain.contains(rounded) {
                return Err(finitize_supports::SupportError::OutOfBounds {
                    value: rounded,
                    domain: parameter.domain.to_string(),
                }
                .into());
            }
            keys.push(SupportKey::new(rounded)?);
        }
        Ok(keys)
    }

    /// Replace all supports of a parameter.
    ///
    /// Fails unless the store is empty or `force` is set. Values are
    /// rounded and bounds-checked before anything mutates; collisions
    /// after rounding merge label sets and warn instead of failing.
    pub fn set_supports(
        &mut self,
        id: ParameterId,
        values: &[f64],
        label: Label,
        force: bool,
    ) -> Result<(), ModelError> {
        let parameter = self.parameters.get(&id).ok_or(ModelError::UnknownParameter(id))?;
        if !parameter.supports.is_empty() && !force {
            return Err(ModelError::ExistingSupports { parameter: id });
        }
        let keys = Self::prepare_values(parameter, values, true)?;
        let parameter = self
            .parameters
            .get_mut(&id)
            .ok_or(ModelError::UnknownParameter(id))?;
        parameter.supports.clear();
        for key in keys {
            if !parameter.supports.insert(key, label) {
                tracing::warn!(
                    parameter = %id,
                    value = key.value(),
                    "support duplicates an existing point after rounding; labels merged"
                );
            }
        }
        self.invalidate_after_value_change(id);
        Ok(())
    }

    /// Merge values into a parameter's supports.
    ///
    /// Existing points get `label` appended; new points are inserted.
    /// Returns whether any new value was created. Invalidation only runs
    /// when actual values changed, not on label-only merges.
    pub fn add_supports(
        &mut self,
        id: ParameterId,
        values: &[f64],
        label: Label,
        check_bounds: bool,
    ) -> Result<bool, ModelError> {
        let parameter = self.parameters.get(&id).ok_or(ModelError::UnknownParameter(id))?;
        let keys = Self::prepare_values(parameter, values, check_bounds)?;
        let parameter = self
            .parameters
            .get_mut(&id)
            .ok_or(ModelError::UnknownParameter(id))?;
        let mut created = false;
        for key in keys {
            created |= parameter.supports.insert(key, label);
        }
        if created {
            self.invalidate_after_value_change(id);
        }
        Ok(created)
    }

    /// Delete supports by label selector.
    ///
    /// [`LabelSelector::All`] clears the whole store, but fails while the
    /// parameter is still referenced by a measure or a derivative. Any
    /// other selector strips the matched labels and drops points whose
    /// entire label set was subsumed.
    pub fn delete_supports(
        &mut self,
        id: ParameterId,
        selector: LabelSelector,
    ) -> Result<(), ModelError> {
        if !self.parameters.contains_key(&id) {
            return Err(ModelError::UnknownParameter(id));
        }
        if selector == LabelSelector::All {
            let measures = self.parameter_measures(id);
            let derivatives = self.parameter_derivatives(id);
            if !measures.is_empty() || !derivatives.is_empty() {
                let dependents = measures
                    .iter()
                    .map(MeasureId::to_string)
                    .chain(derivatives.iter().map(DerivativeId::to_string))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ModelError::InvariantViolation {
                    parameter: id,
                    dependents,
                });
            }
        }
        let parameter = self
            .parameters
            .get_mut(&id)
            .ok_or(ModelError::UnknownParameter(id))?;
        let removal = parameter.supports.remove_matching(selector);
        if removal.values_changed() {
            self.invalidate_after_value_change(id);
        }
        Ok(())
    }

    /// Every mutation that adds or removes actual support values lands
    /// here: tear down materialized generative points, reset dependent
    /// derivative state, and mark the model stale if the parameter is in
    /// active use.
    fn invalidate_after_value_change(&mut self, id: ParameterId) {
        if let Some(parameter) = self.parameters.get_mut(&id)
            && parameter.has_generative
        {
            parameter.has_generative = false;
            if let Some(stamp) = parameter.generative.label() {
                parameter.supports.remove_matching(LabelSelector::One(stamp));
            }
        }
        for derivative in self.derivatives.values_mut() {
            if derivative.parameter == id {
                derivative.materialized = false;
            }
        }
        if self.is_parameter_used(id) {
            self.ready = false;
        }
    }

    pub fn num_supports(
        &self,
        id: ParameterId,
        selector: LabelSelector,
    ) -> Result<usize, ModelError> {
        Ok(self.parameter(id)?.supports.len_matching(selector))
    }

    pub fn has_supports(
        &self,
        id: ParameterId,
        selector: LabelSelector,
    ) -> Result<bool, ModelError> {
        Ok(self.parameter(id)?.supports.contains_matching(selector))
    }

    /// Ascending support values matched by `selector`.
    pub fn supports(
        &self,
        id: ParameterId,
        selector: LabelSelector,
    ) -> Result<Vec<f64>, ModelError> {
        Ok(self.parameter(id)?.supports.values_matching(selector))
    }

    /// Batched query over several parameters.
    ///
    /// With `combinatorics` the result is the full cross product, one row
    /// per support tuple, rightmost parameter fastest. Without it, every
    /// parameter must already hold the same number of matched supports
    /// and the rows align the i-th support of each.
    pub fn supports_grid(
        &self,
        ids: &[ParameterId],
        selector: LabelSelector,
        combinatorics: bool,
    ) -> Result<Vec<Vec<f64>>, ModelError> {
        let mut columns = Vec::with_capacity(ids.len());
        for id in ids {
            columns.push(self.supports(*id, selector)?);
        }
        if combinatorics {
            return Ok(cross_product(&columns));
        }
        let expected = columns.first().map_or(0, Vec::len);
        for (id, column) in ids.iter().zip(&columns) {
            if column.len() != expected {
                return Err(ModelError::UnalignedSupports {
                    parameter: *id,
                    expected,
                    found: column.len(),
                });
            }
        }
        let rows = (0..expected)
            .map(|i| columns.iter().map(|column| column[i]).collect())
            .collect();
        Ok(rows)
    }

    /// Run the generator registry for a parameter and merge the result
    /// into its store under the produced label.
    ///
    /// Returns whether any new value was created.
    pub fn generate_supports(
        &mut self,
        id: ParameterId,
        method: Method,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<bool, ModelError> {
        let parameter = self.parameters.get(&id).ok_or(ModelError::UnknownParameter(id))?;
        let domain = parameter.domain.clone();
        let request = GenerateRequest::new(count, parameter.sig_digits);
        let generated = self.registry.generate(&domain, method, &request, rng)?;
        let column = generated
            .columns
            .into_iter()
            .next()
            .ok_or(finitize_supports::SupportError::EmptyValues)?;
        self.add_supports(id, &column, generated.label, true)
    }

    /// Top up a parameter to at least `count` public supports using the
    /// domain's default method; a no-op when it already has enough.
    ///
    /// Generates a full `count`-point batch and merges it. Grid points
    /// dedup against existing values, so interval domains land on at
    /// least `count`; sampled domains keep their existing points plus
    /// `count` fresh draws and can overshoot.
    pub fn fill_in_supports(
        &mut self,
        id: ParameterId,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<bool, ModelError> {
        if self.num_supports(id, LabelSelector::Public)? >= count {
            return Ok(false);
        }
        self.generate_supports(id, Method::Automatic, count, rng)
    }

    /// Add the integration-region bounds of a measure as supports under
    /// the measure-bound label, on every integrated parameter.
    pub fn add_measure_bounds(
        &mut self,
        id: MeasureId,
        lower: f64,
        upper: f64,
    ) -> Result<(), ModelError> {
        let integrated = self.measure(id)?.integrated.clone();
        for pid in integrated {
            self.add_supports(pid, &[lower, upper], Label::MeasureBound, true)?;
        }
        Ok(())
    }

    /// Add evaluation supports owned by a measure, stamped with its
    /// unique label, on every integrated parameter.
    pub fn add_measure_supports(
        &mut self,
        id: MeasureId,
        values: &[f64],
    ) -> Result<(), ModelError> {
        let measure = self.measure(id)?;
        let label = Label::Measure(measure.label_id);
        let integrated = measure.integrated.clone();
        for pid in integrated {
            self.add_supports(pid, values, label, true)?;
        }
        Ok(())
    }

    /// Materialize generative supports for a parameter, if configured.
    ///
    /// Idempotent: a no-op when the parameter has no generative info or
    /// its points are already materialized. Derivation works from the
    /// current supports excluding previously generated points and needs
    /// at least two of them.
    ///
    /// Returns whether points were materialized by this call.
    pub fn ensure_generative_supports(
        &mut self,
        id: ParameterId,
    ) -> Result<bool, ModelError> {
        let parameter = self.parameters.get(&id).ok_or(ModelError::UnknownParameter(id))?;
        if parameter.generative.is_none() || parameter.has_generative {
            return Ok(false);
        }
        let stamp = match parameter.generative.label() {
            Some(stamp) => stamp,
            None => return Ok(false),
        };
        let base = parameter.supports.values_excluding_exclusive(stamp);
        let derived = parameter.generative.derive(&base)?;
        let sig_digits = parameter.sig_digits;
        let parameter = self
            .parameters
            .get_mut(&id)
            .ok_or(ModelError::UnknownParameter(id))?;
        for value in derived {
            let key = SupportKey::new(round_sig(value, sig_digits))?;
            parameter.supports.insert(key, stamp);
        }
        parameter.has_generative = true;
        Ok(true)
    }

    /// Replace a parameter's generative configuration, tearing down any
    /// materialized points.
    pub fn set_generative_info(
        &mut self,
        id: ParameterId,
        info: GenerativeInfo,
    ) -> Result<(), ModelError> {
        let parameter = self
            .parameters
            .get_mut(&id)
            .ok_or(ModelError::UnknownParameter(id))?;
        if parameter.has_generative {
            parameter.has_generative = false;
            if let Some(stamp) = parameter.generative.label() {
                parameter.supports.remove_matching(LabelSelector::One(stamp));
            }
        }
        parameter.generative = info;
        if self.is_parameter_used(id) {
            self.ready = false;
        }
        Ok(())
    }

    /// Retag how derivatives over this parameter are evaluated,
    /// invalidating dependent derivative state.
    pub fn set_derivative_method(
        &mut self,
        id: ParameterId,
        method: DerivativeMethod,
    ) -> Result<(), ModelError> {
        let parameter = self
            .parameters
            .get_mut(&id)
            .ok_or(ModelError::UnknownParameter(id))?;
        parameter.deriv_method = method;
        for derivative in self.derivatives.values_mut() {
            if derivative.parameter == id {
                derivative.materialized = false;
            }
        }
        if self.is_parameter_used(id) {
            self.ready = false;
        }
        Ok(())
    }

    /// Mark the derivative state over a parameter as built. Called by the
    /// transcription layer after a successful pass.
    pub fn mark_derivatives_materialized(&mut self, id: ParameterId) {
        for derivative in self.derivatives.values_mut() {
            if derivative.parameter == id {
                derivative.materialized = true;
            }
        }
    }
}

/// Full cross product of the given columns, one row per combination,
/// rightmost column fastest.
pub fn cross_product(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut rows = vec![Vec::new()];
    for column in columns {
        let mut next = Vec::with_capacity(rows.len() * column.len().max(1));
        for row in &rows {
            for value in column {
                let mut extended = row.clone();
                extended.push(*value);
                next.push(extended);
            }
        }
        rows = next;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use finitize_supports::UniformBasis;
    use finitize_supports::UnivariateDist;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn unit_interval(model: &mut Model) -> ParameterId {
        model
            .add_parameter("t", Domain::Interval { lower: 0.0, upper: 1.0 })
            .unwrap()
    }

    #[test]
    fn set_supports_round_trips_sorted_and_rounded() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model
            .set_supports(t, &[1.0, 0.0], Label::UserDefined, false)
            .unwrap();
        assert_eq!(model.supports(t, LabelSelector::All).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn set_without_force_refuses_to_clobber() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model.set_supports(t, &[0.5], Label::UserDefined, false).unwrap();
        let err = model
            .set_supports(t, &[0.25], Label::UserDefined, false)
            .unwrap_err();
        assert!(matches!(err, ModelError::ExistingSupports { .. }));
        model.set_supports(t, &[0.25], Label::UserDefined, true).unwrap();
        assert_eq!(model.supports(t, LabelSelector::All).unwrap(), vec![0.25]);
    }

    #[test]
    fn add_deduplicates_after_rounding() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        let created = model
            .add_supports(t, &[0.5, 0.5], Label::UserDefined, true)
            .unwrap();
        assert!(created);
        assert_eq!(model.num_supports(t, LabelSelector::All).unwrap(), 1);
        let parameter = model.parameter(t).unwrap();
        let labels = parameter
            .supports
            .labels(SupportKey::new(0.5).unwrap())
            .unwrap();
        assert_eq!(labels.len(), 1);
        assert!(labels.contains(&Label::UserDefined));
    }

    #[test]
    fn bounds_failure_leaves_prior_supports_unchanged() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model.set_supports(t, &[0.5], Label::UserDefined, false).unwrap();
        let err = model
            .set_supports(t, &[1.5], Label::UserDefined, true)
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::Support(finitize_supports::SupportError::OutOfBounds { .. })
        ));
        assert_eq!(model.supports(t, LabelSelector::All).unwrap(), vec![0.5]);
    }

    #[test]
    fn label_only_merge_does_not_invalidate() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model.set_supports(t, &[0.0, 1.0], Label::UserDefined, false).unwrap();
        model.add_variable("x", vec![t]).unwrap();
        model.set_ready(true);
        let created = model
            .add_supports(t, &[0.0], Label::UniformGrid, true)
            .unwrap();
        assert!(!created);
        assert!(model.is_ready());
        let created = model
            .add_supports(t, &[0.5], Label::UniformGrid, true)
            .unwrap();
        assert!(created);
        assert!(!model.is_ready());
    }

    #[test]
    fn delete_all_blocked_by_dependents_then_succeeds() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model.set_supports(t, &[0.0, 1.0], Label::UserDefined, false).unwrap();
        let x = model.add_variable("x", vec![t]).unwrap();
        let d = model.add_derivative(x, t).unwrap();
        let err = model.delete_supports(t, LabelSelector::All).unwrap_err();
        assert!(matches!(err, ModelError::InvariantViolation { .. }));
        assert_eq!(model.num_supports(t, LabelSelector::All).unwrap(), 2);

        model.delete_derivative(d).unwrap();
        model.delete_supports(t, LabelSelector::All).unwrap();
        assert_eq!(model.num_supports(t, LabelSelector::All).unwrap(), 0);
    }

    #[test]
    fn delete_specific_label_strips_and_drops() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model.set_supports(t, &[0.0, 1.0], Label::UserDefined, false).unwrap();
        model.add_supports(t, &[0.5, 1.0], Label::UniformGrid, true).unwrap();
        model
            .delete_supports(t, LabelSelector::One(Label::UniformGrid))
            .unwrap();
        // 0.5 carried only the grid label and vanished; 1.0 kept its
        // user label.
        assert_eq!(model.supports(t, LabelSelector::All).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn ensure_generative_is_idempotent() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model
            .set_generative_info(
                t,
                GenerativeInfo::UniformBasis(
                    UniformBasis::new(&[0.5], 0.0, 1.0, Label::Generative).unwrap(),
                ),
            )
            .unwrap();
        model
            .set_supports(t, &[0.0, 0.5, 1.0], Label::UserDefined, false)
            .unwrap();
        assert!(model.ensure_generative_supports(t).unwrap());
        let first = model.supports(t, LabelSelector::All).unwrap();
        assert_eq!(first, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(!model.ensure_generative_supports(t).unwrap());
        assert_eq!(model.supports(t, LabelSelector::All).unwrap(), first);
        assert!(model.parameter(t).unwrap().has_generative_supports());
        assert!(model.parameter(t).unwrap().has_internal_supports());
    }

    #[test]
    fn value_mutation_tears_down_generative_points() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model
            .set_generative_info(
                t,
                GenerativeInfo::UniformBasis(
                    UniformBasis::new(&[0.5], 0.0, 1.0, Label::Generative).unwrap(),
                ),
            )
            .unwrap();
        model.set_supports(t, &[0.0, 1.0], Label::UserDefined, false).unwrap();
        model.ensure_generative_supports(t).unwrap();
        assert_eq!(
            model.supports(t, LabelSelector::All).unwrap(),
            vec![0.0, 0.5, 1.0]
        );
        // Adding a real point deletes the derived ones and clears the flag.
        model.add_supports(t, &[0.25], Label::UserDefined, true).unwrap();
        assert!(!model.parameter(t).unwrap().has_generative_supports());
        assert_eq!(
            model.supports(t, LabelSelector::All).unwrap(),
            vec![0.0, 0.25, 1.0]
        );
        // The next ensure regenerates from the new base.
        assert!(model.ensure_generative_supports(t).unwrap());
        assert_eq!(
            model.supports(t, LabelSelector::All).unwrap(),
            vec![0.0, 0.125, 0.25, 0.625, 1.0]
        );
    }

    #[test]
    fn generative_needs_two_base_points() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model
            .set_generative_info(
                t,
                GenerativeInfo::UniformBasis(
                    UniformBasis::new(&[0.5], 0.0, 1.0, Label::Generative).unwrap(),
                ),
            )
            .unwrap();
        model.set_supports(t, &[0.5], Label::UserDefined, false).unwrap();
        let err = model.ensure_generative_supports(t).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Support(finitize_supports::SupportError::InsufficientSupports {
                found: 1
            })
        ));
    }

    #[test]
    fn generated_uniform_grid_end_to_end() {
        let mut model = Model::new();
        let t = model
            .add_parameter("t", Domain::Interval { lower: 0.0, upper: 10.0 })
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        model.generate_supports(t, Method::UniformGrid, 5, &mut rng).unwrap();
        assert_eq!(
            model.supports(t, LabelSelector::All).unwrap(),
            vec![0.0, 2.5, 5.0, 7.5, 10.0]
        );
        assert_eq!(
            model.num_supports(t, LabelSelector::One(Label::UniformGrid)).unwrap(),
            5
        );
    }

    #[test]
    fn fill_in_tops_up_sparse_parameters() {
        let mut model = Model::new();
        let t = model
            .add_parameter("t", Domain::Interval { lower: 0.0, upper: 1.0 })
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        model.set_supports(t, &[0.0, 1.0], Label::UserDefined, false).unwrap();
        assert!(model.fill_in_supports(t, 5, &mut rng).unwrap());
        assert_eq!(model.num_supports(t, LabelSelector::Public).unwrap(), 5);
        // Already enough: no-op.
        assert!(!model.fill_in_supports(t, 5, &mut rng).unwrap());
    }

    #[test]
    fn fill_in_merges_a_full_batch_on_sampled_domains() {
        let mut model = Model::new();
        let xi = model
            .add_parameter(
                "xi",
                Domain::Univariate(UnivariateDist::Normal { mean: 0.0, std_dev: 1.0 }),
            )
            .unwrap();
        model
            .set_supports(xi, &[-1.0, 1.0], Label::UserDefined, false)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(model.fill_in_supports(xi, 5, &mut rng).unwrap());
        // Existing points survive alongside the full batch of draws.
        assert_eq!(model.num_supports(xi, LabelSelector::Public).unwrap(), 7);
        assert_eq!(
            model
                .num_supports(xi, LabelSelector::One(Label::UserDefined))
                .unwrap(),
            2
        );
        assert!(!model.fill_in_supports(xi, 5, &mut rng).unwrap());
    }

    #[test]
    fn grid_query_cross_product_and_aligned() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        let s = model
            .add_parameter("s", Domain::Interval { lower: 0.0, upper: 2.0 })
            .unwrap();
        model.set_supports(t, &[0.0, 1.0], Label::UserDefined, false).unwrap();
        model.set_supports(s, &[0.0, 2.0], Label::UserDefined, false).unwrap();

        let product = model
            .supports_grid(&[t, s], LabelSelector::All, true)
            .unwrap();
        assert_eq!(
            product,
            vec![
                vec![0.0, 0.0],
                vec![0.0, 2.0],
                vec![1.0, 0.0],
                vec![1.0, 2.0],
            ]
        );

        let aligned = model
            .supports_grid(&[t, s], LabelSelector::All, false)
            .unwrap();
        assert_eq!(aligned, vec![vec![0.0, 0.0], vec![1.0, 2.0]]);

        model.add_supports(s, &[1.0], Label::UserDefined, true).unwrap();
        let err = model
            .supports_grid(&[t, s], LabelSelector::All, false)
            .unwrap_err();
        assert!(matches!(err, ModelError::UnalignedSupports { .. }));
    }

    #[test]
    fn measure_labels_are_unique_and_stripped_on_delete() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model.set_supports(t, &[0.0, 1.0], Label::UserDefined, false).unwrap();
        let x = model.add_variable("x", vec![t]).unwrap();
        let m1 = model.add_measure("m1", x, vec![t]).unwrap();
        let m2 = model.add_measure("m2", x, vec![t]).unwrap();
        assert_ne!(
            model.measure(m1).unwrap().label_id,
            model.measure(m2).unwrap().label_id
        );

        model.add_measure_supports(m1, &[0.25, 0.75]).unwrap();
        let label = Label::Measure(model.measure(m1).unwrap().label_id);
        assert_eq!(model.num_supports(t, LabelSelector::One(label)).unwrap(), 2);

        model.delete_measure(m1).unwrap();
        assert_eq!(model.num_supports(t, LabelSelector::One(label)).unwrap(), 0);
        assert_eq!(model.supports(t, LabelSelector::All).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn measure_bounds_carry_their_own_label() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        model.set_supports(t, &[0.5], Label::UserDefined, false).unwrap();
        let x = model.add_variable("x", vec![t]).unwrap();
        let m = model.add_measure("m", x, vec![t]).unwrap();
        model.add_measure_bounds(m, 0.0, 1.0).unwrap();
        assert_eq!(
            model
                .num_supports(t, LabelSelector::One(Label::MeasureBound))
                .unwrap(),
            2
        );
    }

    #[test]
    fn measure_over_foreign_parameter_is_rejected() {
        let mut model = Model::new();
        let t = unit_interval(&mut model);
        let s = model
            .add_parameter("s", Domain::Interval { lower: 0.0, upper: 1.0 })
            .unwrap();
        model.set_supports(t, &[0.0, 1.0], Label::UserDefined, false).unwrap();
        let x = model.add_variable("x", vec![t]).unwrap();
        let err = model.add_measure("m", x, vec![s]).unwrap_err();
        assert!(matches!(err, ModelError::ParameterMismatch { .. }));
    }

    #[test]
    fn weighted_sampling_is_reproducible_with_a_seed() {
        let mut model = Model::new();
        let xi = model
            .add_parameter(
                "xi",
                Domain::Univariate(UnivariateDist::Normal { mean: 0.0, std_dev: 1.0 }),
            )
            .unwrap();
        model
            .generate_supports(xi, Method::WeightedSample, 4, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let first = model.supports(xi, LabelSelector::All).unwrap();

        let mut other = Model::new();
        let xi2 = other
            .add_parameter(
                "xi",
                Domain::Univariate(UnivariateDist::Normal { mean: 0.0, std_dev: 1.0 }),
            )
            .unwrap();
        other
            .generate_supports(xi2, Method::WeightedSample, 4, &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(other.supports(xi2, LabelSelector::All).unwrap(), first);
    }

    #[test]
    fn parameter_groups_split_group_domains() {
        let mut model = Model::new();
        let ids = model
            .add_parameter_group(
                "xi",
                Domain::Multivariate(vec![
                    UnivariateDist::Normal { mean: 0.0, std_dev: 1.0 },
                    UnivariateDist::Exponential { rate: 1.0 },
                ]),
            )
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(model.parameter(ids[0]).unwrap().name, "xi[0]");
        assert!(model.parameter(ids[1]).unwrap().domain.is_scalar());

        let err = model
            .add_parameter("bad", Domain::Multivariate(vec![]))
            .unwrap_err();
        assert!(matches!(err, ModelError::NonScalarDomain { .. }));
    }
}
