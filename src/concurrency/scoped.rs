//! Branded scoped-thread helpers.
//!
//! Wraps `std::thread::scope` so that every spawned stage receives the shared
//! `&GhostToken<'brand>` of the run that spawned it. Stages never own the token;
//! they only prove session membership when touching branded streams.

use crate::GhostToken;

/// A scoped environment that can spawn tasks using a shared `&GhostToken<'brand>`.
pub struct GhostReadScope<'scope, 'env, 'brand> {
    scope: &'scope std::thread::Scope<'scope, 'env>,
    token: &'env GhostToken<'brand>,
}

impl<'scope, 'env, 'brand> GhostReadScope<'scope, 'env, 'brand> {
    /// Spawns a named scoped thread that receives `&GhostToken<'brand>`.
    ///
    /// # Errors
    /// Returns the OS error if the thread could not be created.
    #[inline]
    pub fn spawn_named<T, F>(
        &self,
        name: &str,
        f: F,
    ) -> std::io::Result<std::thread::ScopedJoinHandle<'scope, T>>
    where
        T: Send + 'scope,
        F: FnOnce(&'env GhostToken<'brand>) -> T + Send + 'scope,
    {
        let t = self.token;
        std::thread::Builder::new()
            .name(name.to_owned())
            .spawn_scoped(self.scope, move || f(t))
    }

    /// The token shared with spawned tasks.
    #[inline]
    pub fn token(&self) -> &'env GhostToken<'brand> {
        self.token
    }
}

/// Runs a scoped region where `&GhostToken<'brand>` is shared with spawned threads.
///
/// All threads spawned through the scope are joined before this returns.
#[inline]
pub fn with_read_scope<'env, 'brand, R, F>(token: &'env GhostToken<'brand>, f: F) -> R
where
    F: for<'scope> FnOnce(GhostReadScope<'scope, 'env, 'brand>) -> R,
{
    std::thread::scope(|scope| f(GhostReadScope { scope, token }))
}
