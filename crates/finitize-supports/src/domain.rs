//! Domain descriptors: what a continuous parameter ranges over.
//!
//! A domain is generator input and a bounds oracle; it carries no supports
//! itself. Scalar parameters range over an interval or a univariate
//! distribution; groups of parameters share a multivariate or collection
//! domain that splits into one scalar component per dimension.

use crate::error::SupportError;
use crate::generator::Method;
use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A univariate probability law a parameter can range over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnivariateDist {
    Uniform { lower: f64, upper: f64 },
    Normal { mean: f64, std_dev: f64 },
    Exponential { rate: f64 },
}

impl UnivariateDist {
    /// Whether `value` lies in the distribution's support.
    pub fn in_support(&self, value: f64) -> bool {
        match self {
            UnivariateDist::Uniform { lower, upper } => value >= *lower && value <= *upper,
            UnivariateDist::Normal { .. } => value.is_finite(),
            UnivariateDist::Exponential { .. } => value >= 0.0,
        }
    }

    /// Draw `count` values from this law.
    pub fn sample_many<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>, SupportError> {
        match self {
            UnivariateDist::Uniform { lower, upper } => {
                if !(lower.is_finite() && upper.is_finite()) || lower > upper {
                    return Err(SupportError::InvalidDistribution {
                        reason: format!("uniform bounds [{lower}, {upper}]"),
                    });
                }
                Ok((0..count).map(|_| rng.gen_range(*lower..=*upper)).collect())
            }
            UnivariateDist::Normal { mean, std_dev } => {
                // rand_distr accepts a negative standard deviation, so
                // validate before constructing the distribution.
                if !mean.is_finite() || !std_dev.is_finite() || *std_dev <= 0.0 {
                    return Err(SupportError::InvalidDistribution {
                        reason: format!("normal({mean}, {std_dev})"),
                    });
                }
                let dist = rand_distr::Normal::new(*mean, *std_dev).map_err(|err| {
                    SupportError::InvalidDistribution {
                        reason: format!("normal({mean}, {std_dev}): {err}"),
                    }
                })?;
                Ok((0..count).map(|_| dist.sample(rng)).collect())
            }
            UnivariateDist::Exponential { rate } => {
                if !rate.is_finite() || *rate <= 0.0 {
                    return Err(SupportError::InvalidDistribution {
                        reason: format!("exponential({rate})"),
                    });
                }
                let dist = rand_distr::Exp::new(*rate).map_err(|err| {
                    SupportError::InvalidDistribution {
                        reason: format!("exponential({rate}): {err}"),
                    }
                })?;
                Ok((0..count).map(|_| dist.sample(rng)).collect())
            }
        }
    }
}

impl fmt::Display for UnivariateDist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnivariateDist::Uniform { lower, upper } => write!(f, "uniform({lower}, {upper})"),
            UnivariateDist::Normal { mean, std_dev } => write!(f, "normal({mean}, {std_dev})"),
            UnivariateDist::Exponential { rate } => write!(f, "exponential({rate})"),
        }
    }
}

/// Description of what a parameter (or parameter group) ranges over.
///
/// `Multivariate` and `Collection` describe groups; matrix-valued
/// distributions are flattened column-major into the multivariate case,
/// one component per entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Interval { lower: f64, upper: f64 },
    Univariate(UnivariateDist),
    Multivariate(Vec<UnivariateDist>),
    Collection(Vec<Domain>),
}

/// Tag used to key generator dispatch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    Interval,
    Univariate,
    Multivariate,
    Collection,
}

impl Domain {
    pub fn kind(&self) -> DomainKind {
        match self {
            Domain::Interval { .. } => DomainKind::Interval,
            Domain::Univariate(_) => DomainKind::Univariate,
            Domain::Multivariate(_) => DomainKind::Multivariate,
            Domain::Collection(_) => DomainKind::Collection,
        }
    }

    /// The generation method the domain defaults to when the caller asks
    /// for [`Method::Automatic`].
    pub fn default_method(&self) -> Method {
        match self {
            Domain::Interval { .. } => Method::UniformGrid,
            Domain::Univariate(_) | Domain::Multivariate(_) => Method::WeightedSample,
            Domain::Collection(_) => Method::Mixture,
        }
    }

    /// Number of scalar dimensions this domain spans.
    pub fn dimensions(&self) -> usize {
        match self {
            Domain::Interval { .. } | Domain::Univariate(_) => 1,
            Domain::Multivariate(dists) => dists.len(),
            Domain::Collection(domains) => domains.iter().map(Domain::dimensions).sum(),
        }
    }

    /// Whether this is a one-dimensional domain an individual parameter
    /// can own.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Domain::Interval { .. } | Domain::Univariate(_))
    }

    /// Split a group domain into one scalar domain per dimension.
    pub fn scalar_components(&self) -> Vec<Domain> {
        match self {
            Domain::Interval { .. } | Domain::Univariate(_) => vec![self.clone()],
            Domain::Multivariate(dists) => dists
                .iter()
                .map(|dist| Domain::Univariate(dist.clone()))
                .collect(),
            Domain::Collection(domains) => domains
                .iter()
                .flat_map(|domain| domain.scalar_components())
                .collect(),
        }
    }

    /// Scalar bounds check. Group domains validate per component after
    /// splitting, so a scalar value never belongs to them directly.
    pub fn contains(&self, value: f64) -> bool {
        match self {
            Domain::Interval { lower, upper } => value >= *lower && value <= *upper,
            Domain::Univariate(dist) => dist.in_support(value),
            Domain::Multivariate(_) | Domain::Collection(_) => false,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Interval { lower, upper } => write!(f, "[{lower}, {upper}]"),
            Domain::Univariate(dist) => write!(f, "{dist}"),
            Domain::Multivariate(dists) => write!(f, "multivariate({} components)", dists.len()),
            Domain::Collection(domains) => write!(f, "collection({} sub-domains)", domains.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn interval_containment() {
        let domain = Domain::Interval { lower: 0.0, upper: 1.0 };
        assert!(domain.contains(0.0));
        assert!(domain.contains(1.0));
        assert!(!domain.contains(1.5));
        assert!(!domain.contains(-0.1));
    }

    #[test]
    fn distribution_supports() {
        assert!(UnivariateDist::Normal { mean: 0.0, std_dev: 1.0 }.in_support(-10.0));
        assert!(!UnivariateDist::Exponential { rate: 2.0 }.in_support(-0.5));
        assert!(UnivariateDist::Uniform { lower: 2.0, upper: 3.0 }.in_support(2.5));
        assert!(!UnivariateDist::Uniform { lower: 2.0, upper: 3.0 }.in_support(3.5));
    }

    #[test]
    fn default_methods_per_kind() {
        assert_eq!(
            Domain::Interval { lower: 0.0, upper: 1.0 }.default_method(),
            Method::UniformGrid
        );
        assert_eq!(
            Domain::Univariate(UnivariateDist::Exponential { rate: 1.0 }).default_method(),
            Method::WeightedSample
        );
        assert_eq!(
            Domain::Collection(vec![Domain::Interval { lower: 0.0, upper: 1.0 }])
                .default_method(),
            Method::Mixture
        );
    }

    #[test]
    fn scalar_split_flattens_nested_groups() {
        let domain = Domain::Collection(vec![
            Domain::Interval { lower: 0.0, upper: 1.0 },
            Domain::Multivariate(vec![
                UnivariateDist::Normal { mean: 0.0, std_dev: 1.0 },
                UnivariateDist::Exponential { rate: 1.0 },
            ]),
        ]);
        assert_eq!(domain.dimensions(), 3);
        let components = domain.scalar_components();
        assert_eq!(components.len(), 3);
        assert!(components.iter().all(Domain::is_scalar));
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let dist = UnivariateDist::Normal { mean: 1.0, std_dev: 0.5 };
        let a = dist.sample_many(5, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = dist.sample_many(5, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_distribution_is_rejected() {
        let invalid = [
            UnivariateDist::Normal { mean: 0.0, std_dev: -1.0 },
            UnivariateDist::Normal { mean: 0.0, std_dev: 0.0 },
            UnivariateDist::Normal { mean: f64::NAN, std_dev: 1.0 },
            UnivariateDist::Exponential { rate: 0.0 },
            UnivariateDist::Exponential { rate: -2.0 },
            UnivariateDist::Uniform { lower: 1.0, upper: 0.0 },
        ];
        for dist in invalid {
            let err = dist.sample_many(1, &mut StdRng::seed_from_u64(0)).unwrap_err();
            assert!(
                matches!(err, SupportError::InvalidDistribution { .. }),
                "{dist} was accepted"
            );
        }
    }
}
