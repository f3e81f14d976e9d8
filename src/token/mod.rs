//! `GhostToken` - the session capability for a traversal run.
//!
//! A token is a zero-sized value created by [`GhostToken::new`] and branded with a
//! fresh, invariant lifetime. Everything a traversal run allocates (streams,
//! frontier bitsets, explored sets) carries the same brand, so state from two
//! different runs cannot be mixed: the compiler rejects it.
//!
//! ## Core invariant (linearity)
//!
//! `GhostToken<'brand>` is intentionally **not** `Copy`/`Clone`. Pipeline stages
//! only ever receive `&GhostToken<'brand>`; the run that created the token owns it
//! for the whole traversal.

/// Traits defining token capabilities.
pub mod traits;

pub use traits::GhostBorrow;

use core::marker::PhantomData;

/// Invariant lifetime marker.
///
/// `fn(&'brand ()) -> &'brand ()` is invariant in `'brand` and is `Send + Sync`,
/// so branded types stay shareable across the stage threads.
pub(crate) type InvariantBrand<'brand> = PhantomData<fn(&'brand ()) -> &'brand ()>;

/// A zero-sized token proving membership in one traversal session.
#[derive(Debug)]
pub struct GhostToken<'brand>(InvariantBrand<'brand>);

impl<'brand> GhostToken<'brand> {
    /// Creates a new token and executes a closure with it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dobfs::concurrency::epoch_stream;
    /// use dobfs::GhostToken;
    ///
    /// let got = GhostToken::new(|token| {
    ///     let (tx, rx) = epoch_stream::<u32>(4);
    ///     tx.send(7, &token).unwrap();
    ///     tx.close(&token).unwrap();
    ///     (rx.recv(&token).unwrap(), rx.recv(&token).unwrap())
    /// });
    /// assert_eq!(got, (Some(7), None));
    /// ```
    pub fn new<F, R>(f: F) -> R
    where
        F: for<'new_brand> FnOnce(GhostToken<'new_brand>) -> R,
    {
        f(GhostToken(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_zero_sized_and_shareable() {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}
        GhostToken::new(|token| {
            assert_eq!(core::mem::size_of_val(&token), 0);
            assert_send_sync(&token);
        });
    }

    #[test]
    fn token_closure_returns_value() {
        let v = GhostToken::new(|_token| 42);
        assert_eq!(v, 42);
    }
}
