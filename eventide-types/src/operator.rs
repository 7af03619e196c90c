use core::fmt;
use serde::{Deserialize, Serialize};

/// Payload-free discriminant of an operator kind.
///
/// Tags key the implementation registry and appear in graph descriptions,
/// logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum OperatorTag {
    /// Graph input placeholder; bound to caller data, never dispatched.
    Source,
    /// Last-known-value resampling onto another sampling.
    Sample,
    /// Elementwise user function.
    Map,
    /// Pairwise feature arithmetic on aligned inputs.
    Arithmetic,
    /// Feature projection.
    Select,
    /// Trailing time-window mean.
    MovingAverage,
    /// Timestamp shift.
    Lag,
}

impl OperatorTag {
    /// Every tag, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Source,
        Self::Sample,
        Self::Map,
        Self::Arithmetic,
        Self::Select,
        Self::MovingAverage,
        Self::Lag,
    ];

    /// Stable, snake-case identifier for logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Sample => "sample",
            Self::Map => "map",
            Self::Arithmetic => "arithmetic",
            Self::Select => "select",
            Self::MovingAverage => "moving_average",
            Self::Lag => "lag",
        }
    }

    /// True if evaluating this operator goes through the implementation registry.
    #[must_use]
    pub const fn is_dispatched(self) -> bool {
        !matches!(self, Self::Source)
    }
}

impl fmt::Display for OperatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
