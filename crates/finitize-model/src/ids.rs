//! Integer-newtype identities for model entities.

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $display:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($display, "({})"), self.0)
            }
        }
    };
}

id_type!(
    /// Identity of an infinite parameter.
    ParameterId,
    "parameter"
);
id_type!(
    /// Identity of a decision variable (infinite or finite).
    VariableId,
    "variable"
);
id_type!(
    /// Identity of a measure.
    MeasureId,
    "measure"
);
id_type!(
    /// Identity of a constraint.
    ConstraintId,
    "constraint"
);
id_type!(
    /// Identity of a derivative record.
    DerivativeId,
    "derivative"
);
