//! Support generator registry.
//!
//! Generation is dispatched through an explicit lookup table keyed by
//! `(DomainKind, Method)`. Unregistered pairs fail with a descriptive
//! error naming both tags; registering a new generator is the designed
//! extension seam for new domain types, never a runtime workaround.

use crate::domain::{Domain, DomainKind};
use crate::error::SupportError;
use crate::label::Label;
use crate::value::{DEFAULT_SIG_DIGITS, DEFAULT_SUPPORT_COUNT, round_sig};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Generation method selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Universal selector: dispatch to the domain's own default method.
    Automatic,
    UniformGrid,
    MonteCarlo,
    WeightedSample,
    /// Collection domains only: each sub-domain uses its own default.
    Mixture,
}

/// A generation request: how many points, at what rounding precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub count: usize,
    pub sig_digits: u32,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            count: DEFAULT_SUPPORT_COUNT,
            sig_digits: DEFAULT_SIG_DIGITS,
        }
    }
}

impl GenerateRequest {
    pub fn new(count: usize, sig_digits: u32) -> Self {
        Self { count, sig_digits }
    }
}

/// Raw generator output: one value column per scalar dimension, plus the
/// label recording how the points were produced.
///
/// `columns[d][s]` is dimension `d` of sample `s`; every column has the
/// requested length.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub columns: Vec<Vec<f64>>,
    pub label: Label,
}

/// A registered generator. Receives the registry so collection generators
/// can recurse into their sub-domains, and the already-resolved concrete
/// method (never [`Method::Automatic`]).
pub type Generator = fn(
    &GeneratorRegistry,
    &Domain,
    Method,
    &GenerateRequest,
    &mut dyn RngCore,
) -> Result<Generated, SupportError>;

/// Lookup table from `(DomainKind, Method)` to a generator.
#[derive(Clone)]
pub struct GeneratorRegistry {
    table: HashMap<(DomainKind, Method), Generator>,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut pairs: Vec<_> = self.table.keys().collect();
        pairs.sort();
        f.debug_struct("GeneratorRegistry")
            .field("registered", &pairs)
            .finish()
    }
}

impl GeneratorRegistry {
    /// An empty registry with no combinations registered.
    pub fn empty() -> Self {
        Self { table: HashMap::new() }
    }

    /// The registry with every required combination installed.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(DomainKind::Interval, Method::UniformGrid, interval_uniform_grid);
        registry.register(DomainKind::Interval, Method::MonteCarlo, interval_monte_carlo);
        registry.register(
            DomainKind::Univariate,
            Method::WeightedSample,
            univariate_weighted_sample,
        );
        registry.register(DomainKind::Univariate, Method::MonteCarlo, univariate_monte_carlo);
        registry.register(
            DomainKind::Multivariate,
            Method::WeightedSample,
            multivariate_weighted_sample,
        );
        for method in [
            Method::UniformGrid,
            Method::MonteCarlo,
            Method::WeightedSample,
            Method::Mixture,
        ] {
            registry.register(DomainKind::Collection, method, collection_generate);
        }
        registry
    }

    /// Install (or replace) the generator for one combination.
    pub fn register(&mut self, domain: DomainKind, method: Method, generator: Generator) {
        self.table.insert((domain, method), generator);
    }

    /// Generate supports for `domain` with `method`.
    ///
    /// [`Method::Automatic`] resolves to the domain's default before
    /// dispatch; an unregistered pair fails with
    /// [`SupportError::UnsupportedGenerator`].
    pub fn generate(
        &self,
        domain: &Domain,
        method: Method,
        request: &GenerateRequest,
        rng: &mut dyn RngCore,
    ) -> Result<Generated, SupportError> {
        if request.count == 0 {
            return Err(SupportError::EmptyValues);
        }
        let method = if method == Method::Automatic {
            domain.default_method()
        } else {
            method
        };
        let Some(generator) = self.table.get(&(domain.kind(), method)) else {
            return Err(SupportError::UnsupportedGenerator {
                domain: domain.kind(),
                method,
            });
        };
        generator(self, domain, method, request, rng)
    }
}

fn bounded_interval(domain: &Domain) -> Result<(f64, f64), SupportError> {
    let Domain::Interval { lower, upper } = domain else {
        return Err(SupportError::UnsupportedGenerator {
            domain: domain.kind(),
            method: Method::UniformGrid,
        });
    };
    if !(lower.is_finite() && upper.is_finite()) {
        return Err(SupportError::UnboundedInterval {
            lower: *lower,
            upper: *upper,
        });
    }
    Ok((*lower, *upper))
}

/// N evenly spaced points over `[lower, upper]`, endpoints included.
fn interval_uniform_grid(
    _registry: &GeneratorRegistry,
    domain: &Domain,
    _method: Method,
    request: &GenerateRequest,
    _rng: &mut dyn RngCore,
) -> Result<Generated, SupportError> {
    let (lower, upper) = bounded_interval(domain)?;
    let values = if request.count == 1 {
        vec![round_sig(lower, request.sig_digits)]
    } else {
        let step = (upper - lower) / (request.count - 1) as f64;
        (0..request.count)
            .map(|i| round_sig(lower + step * i as f64, request.sig_digits))
            .collect()
    };
    Ok(Generated {
        columns: vec![values],
        label: Label::UniformGrid,
    })
}

/// N draws from the uniform law over `[lower, upper]`.
fn interval_monte_carlo(
    _registry: &GeneratorRegistry,
    domain: &Domain,
    _method: Method,
    request: &GenerateRequest,
    rng: &mut dyn RngCore,
) -> Result<Generated, SupportError> {
    let (lower, upper) = bounded_interval(domain)?;
    let values = (0..request.count)
        .map(|_| round_sig(rng.gen_range(lower..=upper), request.sig_digits))
        .collect();
    Ok(Generated {
        columns: vec![values],
        label: Label::MonteCarlo,
    })
}

/// N draws from the distribution's own law.
fn univariate_weighted_sample(
    _registry: &GeneratorRegistry,
    domain: &Domain,
    _method: Method,
    request: &GenerateRequest,
    rng: &mut dyn RngCore,
) -> Result<Generated, SupportError> {
    let Domain::Univariate(dist) = domain else {
        return Err(SupportError::UnsupportedGenerator {
            domain: domain.kind(),
            method: Method::WeightedSample,
        });
    };
    let values = dist
        .sample_many(request.count, rng)?
        .into_iter()
        .map(|value| round_sig(value, request.sig_digits))
        .collect();
    Ok(Generated {
        columns: vec![values],
        label: Label::WeightedSample,
    })
}

/// Monte-Carlo over a univariate distribution.
///
/// Known approximation, kept for parity with the original design: this
/// delegates to the weighted-sample generator, so the draws follow the
/// distribution's own law rather than an unweighted uniform law. Only the
/// label differs.
fn univariate_monte_carlo(
    registry: &GeneratorRegistry,
    domain: &Domain,
    _method: Method,
    request: &GenerateRequest,
    rng: &mut dyn RngCore,
) -> Result<Generated, SupportError> {
    let generated = univariate_weighted_sample(
        registry,
        domain,
        Method::WeightedSample,
        request,
        rng,
    )?;
    Ok(Generated {
        columns: generated.columns,
        label: Label::MonteCarlo,
    })
}

/// N draws from a product of independent component laws, one sample per
/// column of the dimension-major result.
fn multivariate_weighted_sample(
    _registry: &GeneratorRegistry,
    domain: &Domain,
    _method: Method,
    request: &GenerateRequest,
    rng: &mut dyn RngCore,
) -> Result<Generated, SupportError> {
    let Domain::Multivariate(dists) = domain else {
        return Err(SupportError::UnsupportedGenerator {
            domain: domain.kind(),
            method: Method::WeightedSample,
        });
    };
    if dists.is_empty() {
        return Err(SupportError::EmptyValues);
    }
    let mut columns = Vec::with_capacity(dists.len());
    for dist in dists {
        let column = dist
            .sample_many(request.count, rng)?
            .into_iter()
            .map(|value| round_sig(value, request.sig_digits))
            .collect();
        columns.push(column);
    }
    Ok(Generated {
        columns,
        label: Label::WeightedSample,
    })
}

/// Generate each sub-domain of a collection independently into a
/// sample-major buffer, then transpose to the dimension-major layout.
///
/// With [`Method::Mixture`] every sub-domain resolves its own default
/// method; any other method is pushed down unchanged.
fn collection_generate(
    registry: &GeneratorRegistry,
    domain: &Domain,
    method: Method,
    request: &GenerateRequest,
    rng: &mut dyn RngCore,
) -> Result<Generated, SupportError> {
    let Domain::Collection(domains) = domain else {
        return Err(SupportError::UnsupportedGenerator {
            domain: domain.kind(),
            method,
        });
    };
    if domains.is_empty() {
        return Err(SupportError::EmptyValues);
    }
    let sub_method = if method == Method::Mixture {
        Method::Automatic
    } else {
        method
    };

    // Sample-major scratch: one row per sample, filled column-by-column.
    let mut rows: Vec<Vec<f64>> = vec![Vec::new(); request.count];
    for sub in domains {
        let generated = registry.generate(sub, sub_method, request, rng)?;
        for column in generated.columns {
            for (row, value) in rows.iter_mut().zip(column) {
                row.push(value);
            }
        }
    }

    // Transpose to the dimension-major layout the store expects.
    let dims = rows.first().map_or(0, Vec::len);
    let mut columns = vec![Vec::with_capacity(request.count); dims];
    for row in &rows {
        for (dim, value) in row.iter().enumerate() {
            columns[dim].push(*value);
        }
    }

    let label = match method {
        Method::UniformGrid => Label::UniformGrid,
        Method::MonteCarlo => Label::MonteCarlo,
        Method::WeightedSample => Label::WeightedSample,
        _ => Label::Mixture,
    };
    Ok(Generated { columns, label })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UnivariateDist;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn uniform_grid_spans_interval() {
        let registry = GeneratorRegistry::with_defaults();
        let domain = Domain::Interval { lower: 0.0, upper: 10.0 };
        let generated = registry
            .generate(&domain, Method::UniformGrid, &GenerateRequest::new(5, 6), &mut rng())
            .unwrap();
        assert_eq!(generated.columns, vec![vec![0.0, 2.5, 5.0, 7.5, 10.0]]);
        assert_eq!(generated.label, Label::UniformGrid);
    }

    #[test]
    fn automatic_resolves_to_domain_default() {
        let registry = GeneratorRegistry::with_defaults();
        let domain = Domain::Interval { lower: 0.0, upper: 1.0 };
        let generated = registry
            .generate(&domain, Method::Automatic, &GenerateRequest::new(3, 6), &mut rng())
            .unwrap();
        assert_eq!(generated.label, Label::UniformGrid);
        assert_eq!(generated.columns, vec![vec![0.0, 0.5, 1.0]]);
    }

    #[test]
    fn monte_carlo_stays_in_bounds_and_is_seedable() {
        let registry = GeneratorRegistry::with_defaults();
        let domain = Domain::Interval { lower: 2.0, upper: 3.0 };
        let request = GenerateRequest::new(20, 8);
        let a = registry
            .generate(&domain, Method::MonteCarlo, &request, &mut rng())
            .unwrap();
        let b = registry
            .generate(&domain, Method::MonteCarlo, &request, &mut rng())
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.label, Label::MonteCarlo);
        assert!(a.columns[0].iter().all(|v| (2.0..=3.0).contains(v)));
    }

    #[test]
    fn unbounded_interval_is_rejected() {
        let registry = GeneratorRegistry::with_defaults();
        let domain = Domain::Interval { lower: 0.0, upper: f64::INFINITY };
        let err = registry
            .generate(&domain, Method::UniformGrid, &GenerateRequest::default(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, SupportError::UnboundedInterval { .. }));
    }

    #[test]
    fn distribution_monte_carlo_aliases_weighted_sampling() {
        let registry = GeneratorRegistry::with_defaults();
        let domain = Domain::Univariate(UnivariateDist::Normal { mean: 0.0, std_dev: 1.0 });
        let request = GenerateRequest::new(6, 8);
        let weighted = registry
            .generate(&domain, Method::WeightedSample, &request, &mut rng())
            .unwrap();
        let monte_carlo = registry
            .generate(&domain, Method::MonteCarlo, &request, &mut rng())
            .unwrap();
        // Same seed, same draws — only the label differs.
        assert_eq!(weighted.columns, monte_carlo.columns);
        assert_eq!(weighted.label, Label::WeightedSample);
        assert_eq!(monte_carlo.label, Label::MonteCarlo);
    }

    #[test]
    fn multivariate_yields_one_column_per_component() {
        let registry = GeneratorRegistry::with_defaults();
        let domain = Domain::Multivariate(vec![
            UnivariateDist::Normal { mean: 0.0, std_dev: 1.0 },
            UnivariateDist::Exponential { rate: 1.0 },
            UnivariateDist::Uniform { lower: 0.0, upper: 1.0 },
        ]);
        let generated = registry
            .generate(&domain, Method::WeightedSample, &GenerateRequest::new(4, 8), &mut rng())
            .unwrap();
        assert_eq!(generated.columns.len(), 3);
        assert!(generated.columns.iter().all(|column| column.len() == 4));
    }

    #[test]
    fn collection_mixture_uses_sub_domain_defaults() {
        let registry = GeneratorRegistry::with_defaults();
        let domain = Domain::Collection(vec![
            Domain::Interval { lower: 0.0, upper: 1.0 },
            Domain::Univariate(UnivariateDist::Exponential { rate: 2.0 }),
        ]);
        let generated = registry
            .generate(&domain, Method::Automatic, &GenerateRequest::new(3, 6), &mut rng())
            .unwrap();
        assert_eq!(generated.label, Label::Mixture);
        assert_eq!(generated.columns.len(), 2);
        // First sub-domain defaulted to a uniform grid.
        assert_eq!(generated.columns[0], vec![0.0, 0.5, 1.0]);
        assert!(generated.columns[1].iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn unregistered_pair_names_both_tags() {
        let registry = GeneratorRegistry::with_defaults();
        let domain = Domain::Univariate(UnivariateDist::Exponential { rate: 1.0 });
        let err = registry
            .generate(&domain, Method::UniformGrid, &GenerateRequest::default(), &mut rng())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Univariate"), "{message}");
        assert!(message.contains("UniformGrid"), "{message}");
    }

    #[test]
    fn registering_fills_the_seam() {
        let mut registry = GeneratorRegistry::with_defaults();
        fn endpoints(
            _registry: &GeneratorRegistry,
            domain: &Domain,
            _method: Method,
            _request: &GenerateRequest,
            _rng: &mut dyn RngCore,
        ) -> Result<Generated, SupportError> {
            let Domain::Univariate(UnivariateDist::Uniform { lower, upper }) = domain else {
                return Err(SupportError::EmptyValues);
            };
            Ok(Generated {
                columns: vec![vec![*lower, *upper]],
                label: Label::UniformGrid,
            })
        }
        registry.register(DomainKind::Univariate, Method::UniformGrid, endpoints);
        let domain = Domain::Univariate(UnivariateDist::Uniform { lower: 1.0, upper: 2.0 });
        let generated = registry
            .generate(&domain, Method::UniformGrid, &GenerateRequest::default(), &mut rng())
            .unwrap();
        assert_eq!(generated.columns, vec![vec![1.0, 2.0]]);
    }
}
