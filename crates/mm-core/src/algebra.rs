use std::fmt;
use std::ops::{Add, Mul};
use std::sync::Arc;

/// Element types a `Matrix` can hold.
///
/// Leaf tasks read operand cells from many threads and write result cells
/// from one thread each, so elements must be `Send + Sync`. `Clone` is used
/// to seed every dot product with the algebra's zero.
pub trait Element: Clone + Send + Sync {}

impl<T: Clone + Send + Sync> Element for T {}

type BinaryOp<T> = Arc<dyn Fn(&T, &T) -> T + Send + Sync>;

/// The operations every arithmetic step of a multiplication goes through.
///
/// An `Algebra` is the triple (multiply, add, zero) of a semiring-like
/// structure over `T`. Matrices carry one from construction and hand it,
/// unchanged, to every product they produce. Cloning is cheap: the two
/// operations are reference counted.
///
/// | Constructor | ⊗ (multiply) | ⊕ (add) | zero |
/// |-------------|--------------|---------|------|
/// | [`Algebra::standard`] | `*` | `+` | `T::default()` |
/// | [`Algebra::boolean`] | AND | OR | `false` |
/// | [`Algebra::min_plus`] | `+` | min | +∞ |
/// | [`Algebra::max_plus`] | `+` | max | -∞ |
#[derive(Clone)]
pub struct Algebra<T> {
    multiply: BinaryOp<T>,
    add: BinaryOp<T>,
    zero: T,
}

impl<T: Element> Algebra<T> {
    /// Build an algebra from its two operations and the additive identity.
    pub fn new<M, A>(multiply: M, add: A, zero: T) -> Self
    where
        M: Fn(&T, &T) -> T + Send + Sync + 'static,
        A: Fn(&T, &T) -> T + Send + Sync + 'static,
    {
        Algebra {
            multiply: Arc::new(multiply),
            add: Arc::new(add),
            zero,
        }
    }

    /// a ⊗ b
    pub fn multiply(&self, a: &T, b: &T) -> T {
        (self.multiply)(a, b)
    }

    /// a ⊕ b
    pub fn add(&self, a: &T, b: &T) -> T {
        (self.add)(a, b)
    }

    /// Returns the additive identity.
    pub fn zero(&self) -> &T {
        &self.zero
    }

    /// Folds `⊕ (a ⊗ b)` over the pairs, starting from zero.
    ///
    /// Pairs are combined strictly left to right, so every strategy that
    /// feeds the same pairs in the same order produces the same bits, even
    /// for non-associative operations such as float addition.
    pub fn dot<'l, 'r, I>(&self, pairs: I) -> T
    where
        I: IntoIterator<Item = (&'l T, &'r T)>,
        T: 'l + 'r,
    {
        pairs
            .into_iter()
            .fold(self.zero.clone(), |acc, (a, b)| {
                self.add(&acc, &self.multiply(a, b))
            })
    }
}

impl<T> Algebra<T>
where
    T: Element + Default + Add<Output = T> + Mul<Output = T> + 'static,
{
    /// Ordinary arithmetic: (`*`, `+`, `T::default()`).
    pub fn standard() -> Self {
        Algebra::new(
            |a: &T, b: &T| a.clone() * b.clone(),
            |a: &T, b: &T| a.clone() + b.clone(),
            T::default(),
        )
    }
}

impl Algebra<bool> {
    /// Boolean semiring (AND, OR, `false`); products compute reachability.
    pub fn boolean() -> Self {
        Algebra::new(|a: &bool, b: &bool| *a && *b, |a: &bool, b: &bool| *a || *b, false)
    }
}

impl Algebra<f64> {
    /// Tropical min-plus semiring; products compute shortest paths.
    pub fn min_plus() -> Self {
        Algebra::new(|a: &f64, b: &f64| a + b, |a: &f64, b: &f64| a.min(*b), f64::INFINITY)
    }

    /// Tropical max-plus semiring; products compute longest paths.
    pub fn max_plus() -> Self {
        Algebra::new(
            |a: &f64, b: &f64| a + b,
            |a: &f64, b: &f64| a.max(*b),
            f64::NEG_INFINITY,
        )
    }
}

impl<T: fmt::Debug> fmt::Debug for Algebra<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Algebra")
            .field("zero", &self.zero)
            .finish_non_exhaustive()
    }
}
