// We define separate error types within the public and internal crates and
// just have the public crate wrap the internal crate. At the time of writing,
// `slicestat_nostd_internal` reports `&'static str` everywhere, which we wrap
// in `InternalLegacyAdHoc`.
//
// Degenerate slices (slices without any particles) are NOT errors: the
// statistics of an empty slice are zero-filled.

use crate::values::DType;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Clone, Debug)]
enum ErrorKind {
    /// An error that occurs when an integer lies outside of the acceptable
    /// range of values
    IntegerRange(IntegerRangeError),
    /// An error that occurs within `slicestat_nostd_internal`
    InternalLegacyAdHoc(InternalLegacyAdHocError),
    /// An error that occurs when a permutation array isn't a permutation
    Permutation(PermutationError),
    /// An error that occurs when arrays that must be aligned have different
    /// lengths
    ShapeMismatch(ShapeMismatchError),
    /// An error that occurs when a thread pool can't be constructed
    ThreadPool(ThreadPoolError),
    /// An error that occurs when an operation receives a value array with an
    /// element type that it doesn't support
    UnsupportedType(UnsupportedTypeError),
}

/// converts a length or count into an `i64` for error reporting, saturating
/// at `i64::MAX`
pub(crate) fn saturating_i64(val: usize) -> i64 {
    i64::try_from(val).unwrap_or(i64::MAX)
}

// define constructor methods for Error
impl Error {
    /// produce an error indicating that an integer lies outside the acceptable
    /// range of values
    pub(crate) fn integer_range(
        description: &'static str,
        actual: i64,
        min_val: i64,
        max_val: i64,
    ) -> Self {
        Error {
            kind: ErrorKind::IntegerRange(IntegerRangeError {
                description,
                actual,
                min_val,
                max_val,
            }),
        }
    }

    /// wraps a legacy internal error string
    pub(crate) fn internal_legacy_adhoc(message: &'static str) -> Self {
        Error {
            kind: ErrorKind::InternalLegacyAdHoc(InternalLegacyAdHocError(message)),
        }
    }

    /// produce an error indicating that `index` appears more than once in a
    /// permutation array
    pub(crate) fn permutation(index: i32) -> Self {
        Error {
            kind: ErrorKind::Permutation(PermutationError { index }),
        }
    }

    /// produce an error indicating that an array has the wrong length
    pub(crate) fn shape_mismatch(description: &'static str, expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::ShapeMismatch(ShapeMismatchError {
                description,
                expected,
                actual,
            }),
        }
    }

    /// produce an error indicating that a thread pool couldn't be built
    pub(crate) fn thread_pool(err: rayon::ThreadPoolBuildError) -> Self {
        Error {
            kind: ErrorKind::ThreadPool(ThreadPoolError {
                what: err.to_string(),
            }),
        }
    }

    /// produce an error indicating that `operation` doesn't support `dtype`
    pub(crate) fn unsupported_type(operation: &'static str, dtype: DType) -> Self {
        Error {
            kind: ErrorKind::UnsupportedType(UnsupportedTypeError { operation, dtype }),
        }
    }

    /// Returns `true` when the error describes an unsupported element type
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self.kind, ErrorKind::UnsupportedType(_))
    }

    /// Returns `true` when the error describes mismatched array lengths
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::ShapeMismatch(_))
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for ErrorKind {}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::IntegerRange(ref err) => err.fmt(f),
            ErrorKind::InternalLegacyAdHoc(ref msg) => msg.fmt(f),
            ErrorKind::Permutation(ref err) => err.fmt(f),
            ErrorKind::ShapeMismatch(ref err) => err.fmt(f),
            ErrorKind::ThreadPool(ref err) => err.fmt(f),
            ErrorKind::UnsupportedType(ref err) => err.fmt(f),
        }
    }
}

/// An error that occurs when an integer lies outside of the acceptable
/// range of values
#[derive(Clone, Debug)]
struct IntegerRangeError {
    description: &'static str,
    actual: i64,
    min_val: i64,
    max_val: i64,
}

impl std::error::Error for IntegerRangeError {}

impl core::fmt::Display for IntegerRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} has a value of {}. The value should be no less than {} and \
             not exceed {}",
            self.description, self.actual, self.min_val, self.max_val
        )
    }
}

/// A temporary type that wraps the string errors from
/// `slicestat_nostd_internal`.
#[derive(Clone)]
struct InternalLegacyAdHocError(&'static str);

impl std::error::Error for InternalLegacyAdHocError {}

impl core::fmt::Display for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Debug for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.0, f)
    }
}

/// An error that occurs when a permutation array holds a duplicate entry
#[derive(Clone, Debug)]
struct PermutationError {
    index: i32,
}

impl std::error::Error for PermutationError {}

impl core::fmt::Display for PermutationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} appears more than once in the permutation array",
            self.index
        )
    }
}

/// An error that occurs when arrays that must be aligned have different
/// lengths
#[derive(Clone, Debug)]
struct ShapeMismatchError {
    description: &'static str,
    expected: usize,
    actual: usize,
}

impl std::error::Error for ShapeMismatchError {}

impl core::fmt::Display for ShapeMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} has a length of {}. It should have a length of {}",
            self.description, self.actual, self.expected
        )
    }
}

/// An error that occurs when a thread pool can't be constructed
#[derive(Clone, Debug)]
struct ThreadPoolError {
    // TODO we probably want to chain the rayon error instead of flattening it
    what: String,
}

impl std::error::Error for ThreadPoolError {}

impl core::fmt::Display for ThreadPoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "failed to build a thread pool: {}", self.what)
    }
}

/// An error that occurs when an operation doesn't support the element type of
/// a value array
#[derive(Clone, Debug)]
struct UnsupportedTypeError {
    operation: &'static str,
    dtype: DType,
}

impl std::error::Error for UnsupportedTypeError {}

impl core::fmt::Display for UnsupportedTypeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} doesn't support {} arrays. Currently only {} and {} arrays \
             are supported",
            self.operation,
            self.dtype,
            DType::Float64,
            DType::Int32
        )
    }
}
