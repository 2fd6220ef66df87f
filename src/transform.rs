//! Transformation capability injected into a pipeline.
//!
//! The pipeline treats the transform as opaque: it hands each worker the
//! item's name and payload and wraps any failure as a
//! [`TransformationError`](crate::error::TransformationError).

use crate::error::BoxError;
use std::fmt;
use std::marker::PhantomData;

/// Turns one payload into an output value.
///
/// Implementations are shared read-only between workers, so they take
/// `&self` and must be `Send + Sync`. A transform must not mutate shared
/// state; each call sees only its own item.
pub trait Transform: Send + Sync + 'static {
    /// Value produced for a successful item.
    type Output: Clone + Send + 'static;

    /// Transform the payload of the item called `name`.
    fn transform(&self, name: &str, payload: &str) -> Result<Self::Output, BoxError>;
}

/// Passes the payload through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    type Output = String;

    fn transform(&self, _name: &str, payload: &str) -> Result<String, BoxError> {
        Ok(payload.to_string())
    }
}

/// Adapts a closure into a [`Transform`].
///
/// # Example
///
/// ```rust
/// use headless::transform::{FnTransform, Transform};
///
/// let upper = FnTransform::new(|_name: &str, payload: &str| {
///     Ok::<_, std::convert::Infallible>(payload.to_uppercase())
/// });
/// assert_eq!(upper.transform("a", "svg").unwrap(), "SVG");
/// ```
pub struct FnTransform<F, T, E> {
    func: F,
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<F, T, E> FnTransform<F, T, E>
where
    F: Fn(&str, &str) -> Result<T, E> + Send + Sync + 'static,
    T: Clone + Send + 'static,
    E: Into<BoxError> + 'static,
{
    /// Wrap a closure taking `(name, payload)`.
    pub fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<F, T, E> Transform for FnTransform<F, T, E>
where
    F: Fn(&str, &str) -> Result<T, E> + Send + Sync + 'static,
    T: Clone + Send + 'static,
    E: Into<BoxError> + 'static,
{
    type Output = T;

    fn transform(&self, name: &str, payload: &str) -> Result<T, BoxError> {
        (self.func)(name, payload).map_err(Into::into)
    }
}

impl<F, T, E> fmt::Debug for FnTransform<F, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransform").finish_non_exhaustive()
    }
}
