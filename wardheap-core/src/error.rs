//! Error types for the wardheap core library.
//!
//! Defines the precondition errors raised while validating samples, the
//! errors raised while building a dendrogram, and a convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::{builder::ScoringStrategy, cluster::ClusterId};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// A sample matrix was rejected at construction.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SampleError {
    /// The matrix contained no rows.
    #[error("sample matrix contains no rows")]
    EmptySamples,
    /// The rows had no features.
    #[error("sample vectors must have positive dimension")]
    ZeroDimension,
    /// A row's length differed from the first row's.
    #[error("row {row} has length {actual} but expected {expected}")]
    RaggedRow {
        /// Offending row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// A flat buffer was not a whole number of rows.
    #[error("buffer of {len} values is not a multiple of dimension {dimension}")]
    RaggedBuffer {
        /// Number of values supplied.
        len: usize,
        /// Requested row dimension.
        dimension: usize,
    },
    /// A value was NaN or infinite.
    #[error("value at row {row}, column {column} is not finite")]
    NonFiniteValue {
        /// Row of the offending value.
        row: usize,
        /// Column of the offending value.
        column: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`SampleError`] variants.
    enum SampleErrorCode for SampleError {
        /// The matrix contained no rows.
        EmptySamples => EmptySamples => "SAMPLES_EMPTY",
        /// The rows had no features.
        ZeroDimension => ZeroDimension => "SAMPLES_ZERO_DIMENSION",
        /// A row's length differed from the first row's.
        RaggedRow => RaggedRow { .. } => "SAMPLES_RAGGED_ROW",
        /// A flat buffer was not a whole number of rows.
        RaggedBuffer => RaggedBuffer { .. } => "SAMPLES_RAGGED_BUFFER",
        /// A value was NaN or infinite.
        NonFiniteValue => NonFiniteValue { .. } => "SAMPLES_NON_FINITE_VALUE",
    }
}

/// Error type produced while configuring or running a Ward build.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum WardError {
    /// The requested number of final clusters was zero.
    #[error("target cluster count must be at least 1 (got {got})")]
    InvalidTargetClusters {
        /// The invalid target supplied by the caller.
        got: usize,
    },
    /// The requested number of final clusters exceeded the sample count.
    #[error("target cluster count {target} exceeds the {samples} available samples")]
    TargetExceedsSamples {
        /// Requested number of final clusters.
        target: usize,
        /// Number of samples in the matrix.
        samples: usize,
    },
    /// The requested scoring strategy is not compiled into this build.
    #[error("the requested scoring strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied.
        requested: ScoringStrategy,
    },
    /// A flat cut was requested at a level the dendrogram does not contain.
    #[error("cannot cut into {requested} clusters; valid range is {min}..={max}")]
    InvalidClusterCount {
        /// Requested number of flat clusters.
        requested: usize,
        /// Fewest clusters available in the dendrogram.
        min: usize,
        /// Most clusters available in the dendrogram.
        max: usize,
    },
    /// A cluster referenced a sample row outside the matrix.
    #[error("sample index {index} is out of bounds for {rows} rows")]
    SampleOutOfBounds {
        /// The offending sample index.
        index: usize,
        /// Number of rows in the matrix.
        rows: usize,
    },
    /// A merge candidate referenced a cluster id that was never created.
    #[error("cluster {id} does not exist")]
    UnknownCluster {
        /// The unknown cluster id.
        id: ClusterId,
    },
    /// The candidate queue ran dry before the terminal state was reached.
    #[error("merge queue exhausted with {active} active clusters remaining")]
    QueueExhausted {
        /// Number of clusters still active when the queue ran dry.
        active: usize,
    },
    /// The sample matrix was rejected.
    #[error(transparent)]
    Samples(#[from] SampleError),
}

define_error_codes! {
    /// Stable codes describing [`WardError`] variants.
    enum WardErrorCode for WardError {
        /// The requested number of final clusters was zero.
        InvalidTargetClusters => InvalidTargetClusters { .. } => "WARD_INVALID_TARGET_CLUSTERS",
        /// The requested number of final clusters exceeded the sample count.
        TargetExceedsSamples => TargetExceedsSamples { .. } => "WARD_TARGET_EXCEEDS_SAMPLES",
        /// The requested scoring strategy is not compiled into this build.
        BackendUnavailable => BackendUnavailable { .. } => "WARD_BACKEND_UNAVAILABLE",
        /// A flat cut was requested at a level the dendrogram does not contain.
        InvalidClusterCount => InvalidClusterCount { .. } => "WARD_INVALID_CLUSTER_COUNT",
        /// A cluster referenced a sample row outside the matrix.
        SampleOutOfBounds => SampleOutOfBounds { .. } => "WARD_SAMPLE_OUT_OF_BOUNDS",
        /// A merge candidate referenced a cluster id that was never created.
        UnknownCluster => UnknownCluster { .. } => "WARD_UNKNOWN_CLUSTER",
        /// The candidate queue ran dry before the terminal state was reached.
        QueueExhausted => QueueExhausted { .. } => "WARD_QUEUE_EXHAUSTED",
        /// The sample matrix was rejected.
        InvalidSamples => Samples(..) => "WARD_INVALID_SAMPLES",
    }
}

impl WardError {
    /// Retrieve the inner [`SampleErrorCode`] when the samples were rejected.
    #[must_use]
    pub const fn sample_code(&self) -> Option<SampleErrorCode> {
        match self {
            Self::Samples(error) => Some(error.code()),
            _ => None,
        }
    }

    /// Returns whether the error signals broken bookkeeping rather than bad
    /// input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::QueueExhausted { .. } | Self::UnknownCluster { .. })
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, WardError>;
