//! Typed per-particle value arrays
//!
//! The reductions only operate on `f64` data. Other element kinds are
//! accepted at the API boundary so that we can fail fast with a descriptive
//! error (rather than silently producing wrong results):
//! - [`DType::Float64`] is used directly
//! - [`DType::Int32`] is losslessly converted to `f64`
//! - everything else produces an "unsupported type" error

use crate::Error;
use std::borrow::Cow;

/// The element type of a value array
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DType {
    Float64,
    Float32,
    Int64,
    Int32,
}

impl core::fmt::Display for DType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let name = match self {
            DType::Float64 => "float64",
            DType::Float32 => "float32",
            DType::Int64 => "int64",
            DType::Int32 => "int32",
        };
        f.write_str(name)
    }
}

/// A borrowed, read-only view of a caller-owned value array (1 entry per
/// particle)
#[derive(Clone, Copy, Debug)]
pub enum ValueArrayView<'a> {
    Float64(&'a [f64]),
    Float32(&'a [f32]),
    Int64(&'a [i64]),
    Int32(&'a [i32]),
}

impl<'a> ValueArrayView<'a> {
    pub fn dtype(&self) -> DType {
        match self {
            ValueArrayView::Float64(_) => DType::Float64,
            ValueArrayView::Float32(_) => DType::Float32,
            ValueArrayView::Int64(_) => DType::Int64,
            ValueArrayView::Int32(_) => DType::Int32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ValueArrayView::Float64(s) => s.len(),
            ValueArrayView::Float32(s) => s.len(),
            ValueArrayView::Int64(s) => s.len(),
            ValueArrayView::Int32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the values as `f64`s on behalf of `operation`.
    ///
    /// Float64 data is borrowed, Int32 data is converted. Other element
    /// types produce an error.
    pub(crate) fn as_f64(&self, operation: &'static str) -> Result<Cow<'a, [f64]>, Error> {
        match *self {
            ValueArrayView::Float64(s) => Ok(Cow::Borrowed(s)),
            ValueArrayView::Int32(s) => Ok(Cow::Owned(s.iter().map(|&x| x as f64).collect())),
            _ => Err(Error::unsupported_type(operation, self.dtype())),
        }
    }
}

macro_rules! impl_view_from {
    ($elem:ty, $variant:ident) => {
        impl<'a> From<&'a [$elem]> for ValueArrayView<'a> {
            fn from(values: &'a [$elem]) -> Self {
                ValueArrayView::$variant(values)
            }
        }

        impl<'a> From<&'a Vec<$elem>> for ValueArrayView<'a> {
            fn from(values: &'a Vec<$elem>) -> Self {
                ValueArrayView::$variant(values.as_slice())
            }
        }

        impl<'a, const N: usize> From<&'a [$elem; N]> for ValueArrayView<'a> {
            fn from(values: &'a [$elem; N]) -> Self {
                ValueArrayView::$variant(values.as_slice())
            }
        }

        impl From<Vec<$elem>> for ValueArray {
            fn from(values: Vec<$elem>) -> Self {
                ValueArray::$variant(values)
            }
        }
    };
}

impl_view_from!(f64, Float64);
impl_view_from!(f32, Float32);
impl_view_from!(i64, Int64);
impl_view_from!(i32, Int32);

/// An owned value array (e.g. the output of
/// [`crate::apply_permutation`])
#[derive(Clone, Debug, PartialEq)]
pub enum ValueArray {
    Float64(Vec<f64>),
    Float32(Vec<f32>),
    Int64(Vec<i64>),
    Int32(Vec<i32>),
}

impl ValueArray {
    pub fn view(&self) -> ValueArrayView<'_> {
        match self {
            ValueArray::Float64(v) => ValueArrayView::Float64(v),
            ValueArray::Float32(v) => ValueArrayView::Float32(v),
            ValueArray::Int64(v) => ValueArrayView::Int64(v),
            ValueArray::Int32(v) => ValueArrayView::Int32(v),
        }
    }

    pub fn dtype(&self) -> DType {
        self.view().dtype()
    }

    pub fn len(&self) -> usize {
        self.view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_f64_slice(&self) -> Option<&[f64]> {
        match self {
            ValueArray::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32_slice(&self) -> Option<&[i32]> {
        match self {
            ValueArray::Int32(v) => Some(v),
            _ => None,
        }
    }
}

impl<'a> From<&'a ValueArray> for ValueArrayView<'a> {
    fn from(values: &'a ValueArray) -> Self {
        values.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        let floats = vec![1.0, 2.5];
        let view = ValueArrayView::from(&floats);
        assert_eq!(view.dtype(), DType::Float64);
        assert!(matches!(view.as_f64("test"), Ok(Cow::Borrowed(_))));

        let ints = [3_i32, -4];
        let view = ValueArrayView::from(&ints);
        assert_eq!(*view.as_f64("test").unwrap(), [3.0, -4.0]);

        let singles = [1.0_f32];
        let err = ValueArrayView::from(&singles).as_f64("test").unwrap_err();
        assert!(err.is_unsupported_type());
    }

    #[test]
    fn owned_view() {
        let owned = ValueArray::from(vec![1_i64, 2, 3]);
        assert_eq!(owned.dtype(), DType::Int64);
        assert_eq!(owned.len(), 3);
        assert!(owned.as_f64_slice().is_none());
    }
}
