//! The transcription pass: expand infinite entities over their support
//! cross products into finite counterparts.

use crate::error::TranscriptionError;
use crate::finite::{FiniteModel, FiniteVar, ReducedVar};
use crate::store::{
    EntityRecord, EntityRef, ReducedRecord, SupportTuple, TranscriptionStore,
    VariableSlot,
};
use finitize_model::{
    Measure, Model, ModelError, ParameterId, Variable, VariableId, cross_product,
};
use finitize_supports::LabelSelector;
use std::collections::BTreeMap;

/// Options for one transcription pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscribeOptions {
    /// Embed the support tuple in generated names instead of the ordinal
    /// index.
    pub verbose_naming: bool,
}

/// Transcribe a model into a finite counterpart model and the store
/// describing what every entity became.
///
/// The pass materializes pending generative supports first, snapshots
/// every parameter's supports once (all labels included), expands
/// variables, measures, and constraints over the snapshot, and finally
/// marks the model ready. Parameters with zero supports fail the pass
/// up front.
///
/// Determinism: the same un-mutated model transcribes to identical
/// mapping lists, and the i-th support tuple of an entity corresponds to
/// its i-th counterpart.
pub fn transcribe(
    model: &mut Model,
    options: &TranscribeOptions,
) -> Result<(FiniteModel, TranscriptionStore), TranscriptionError> {
    let parameter_ids = model.parameter_ids();
    for pid in &parameter_ids {
        if model.num_supports(*pid, LabelSelector::All)? == 0 {
            return Err(TranscriptionError::MissingSupports(*pid));
        }
    }
    for pid in &parameter_ids {
        model.ensure_generative_supports(*pid)?;
    }

    let mut store = TranscriptionStore::default();
    for pid in &parameter_ids {
        store
            .supports
            .insert(*pid, model.supports(*pid, LabelSelector::All)?);
    }

    let mut finite = FiniteModel::new();
    let variables: Vec<(VariableId, Variable)> =
        model.variables().map(|(id, v)| (id, v.clone())).collect();
    for (vid, variable) in &variables {
        let record = transcribe_variable(&store.supports, &mut finite, variable, options)?;
        store.variables.insert(*vid, record);
    }

    let measures: Vec<Measure> = model.measures().map(|(_, m)| m.clone()).collect();
    for (index, (mid, _)) in model.measures().enumerate() {
        let measure = &measures[index];
        let owner = model.variable(measure.variable)?;
        let record = transcribe_measure(&mut store, &mut finite, measure, owner, options)?;
        store.measures.insert(mid, record);
    }

    for (cid, constraint) in model.constraints() {
        let mut axes: Vec<ParameterId> = Vec::new();
        for vid in &constraint.variables {
            for pid in &model.variable(*vid)?.parameters {
                if !axes.contains(pid) {
                    axes.push(*pid);
                }
            }
        }
        let mut record = EntityRecord::new(axes.clone());
        let rows = if axes.is_empty() {
            vec![Vec::new()]
        } else {
            cross_product(&snapshot_columns(&store.supports, &axes)?)
        };
        for row in rows {
            let tuple = SupportTuple::from_values(&row).map_err(ModelError::from)?;
            let mut referenced = Vec::with_capacity(constraint.variables.len());
            for vid in &constraint.variables {
                let projected = project_tuple(&axes, &row, &model.variable(*vid)?.parameters);
                let tuple = SupportTuple::from_values(&projected).map_err(ModelError::from)?;
                let VariableSlot::Finite(var) = store.variable_at(*vid, &tuple)? else {
                    return Err(TranscriptionError::NotTranscribed(EntityRef::Variable(
                        *vid,
                    )));
                };
                referenced.push(var);
            }
            let verbose = format!("{}{tuple}", constraint.name);
            record.insert_with(tuple, |i| {
                let name = if options.verbose_naming {
                    verbose
                } else {
                    format!("{}[{i}]", constraint.name)
                };
                finite.add_constraint(name, referenced)
            });
        }
        store.constraints.insert(cid, record);
    }

    for pid in &parameter_ids {
        model.mark_derivatives_materialized(*pid);
    }
    model.set_ready(true);
    tracing::debug!(
        variables = finite.num_variables(),
        constraints = finite.num_constraints(),
        reduced = store.num_reduced(),
        "transcription pass complete"
    );
    Ok((finite, store))
}

fn snapshot_columns(
    supports: &BTreeMap<ParameterId, Vec<f64>>,
    parameters: &[ParameterId],
) -> Result<Vec<Vec<f64>>, TranscriptionError> {
    let mut columns = Vec::with_capacity(parameters.len());
    for pid in parameters {
        let column = supports
            .get(pid)
            .ok_or(TranscriptionError::MissingSupports(*pid))?;
        columns.push(column.clone());
    }
    Ok(columns)
}

/// Pick the coordinates of `target` parameters out of a row aligned with
/// `axes`.
fn project_tuple(axes: &[ParameterId], row: &[f64], target: &[ParameterId]) -> Vec<f64> {
    target
        .iter()
        .filter_map(|pid| axes.iter().position(|axis| axis == pid))
        .map(|position| row[position])
        .collect()
}

fn transcribe_variable(
    supports: &BTreeMap<ParameterId, Vec<f64>>,
    finite: &mut FiniteModel,
    variable: &Variable,
    options: &TranscribeOptions,
) -> Result<EntityRecord<VariableSlot>, TranscriptionError> {
    let mut record = EntityRecord::new(variable.parameters.clone());
    if !variable.is_infinite() {
        let var = finite.add_variable(variable.name.clone());
        record.insert_with(SupportTuple::empty(), |_| VariableSlot::Finite(var));
        return Ok(record);
    }
    let columns = snapshot_columns(supports, &variable.parameters)?;
    for row in cross_product(&columns) {
        let tuple = SupportTuple::from_values(&row).map_err(ModelError::from)?;
        let verbose = format!("{}{tuple}", variable.name);
        record.insert_with(tuple, |i| {
            let name = if options.verbose_naming {
                verbose
            } else {
                format!("{}[{i}]", variable.name)
            };
            VariableSlot::Finite(finite.add_variable(name))
        });
    }
    Ok(record)
}

/// One finite counterpart per tuple over the measure's non-integrated
/// parameters; when both kept and integrated parameters exist, one
/// reduced variable per fixed integrated tuple goes into the auxiliary
/// list and is registered in the owning variable's record.
fn transcribe_measure(
    store: &mut TranscriptionStore,
    finite: &mut FiniteModel,
    measure: &Measure,
    owner: &Variable,
    options: &TranscribeOptions,
) -> Result<EntityRecord<FiniteVar>, TranscriptionError> {
    let kept: Vec<ParameterId> = owner
        .parameters
        .iter()
        .filter(|pid| !measure.integrated.contains(pid))
        .copied()
        .collect();
    let integrated: Vec<ParameterId> = owner
        .parameters
        .iter()
        .filter(|pid| measure.integrated.contains(pid))
        .copied()
        .collect();

    let mut record = EntityRecord::new(kept.clone());
    let rows = if kept.is_empty() {
        vec![Vec::new()]
    } else {
        cross_product(&snapshot_columns(&store.supports, &kept)?)
    };
    for row in rows {
        let tuple = SupportTuple::from_values(&row).map_err(ModelError::from)?;
        let verbose = format!("{}{tuple}", measure.name);
        record.insert_with(tuple, |i| {
            let name = if options.verbose_naming {
                verbose
            } else {
                format!("{}[{i}]", measure.name)
            };
            finite.add_variable(name)
        });
    }

    if !kept.is_empty() && !integrated.is_empty() {
        let columns = snapshot_columns(&store.supports, &integrated)?;
        for row in cross_product(&columns) {
            let fixed = SupportTuple::from_values(&row).map_err(ModelError::from)?;
            let key = (measure.variable, integrated.clone(), fixed.clone());
            // Measures pinning the same axes at the same coordinates
            // share one reduced variable.
            if store.reduced_lookup.contains_key(&key) {
                continue;
            }
            let rv = ReducedVar(store.reduced.len());
            store.reduced.push(ReducedRecord {
                variable: measure.variable,
                fixed_parameters: integrated.clone(),
                fixed,
            });
            store.reduced_lookup.insert(key, rv);
        }
    }
    Ok(record)
}
