//! Per-job resource scopes.

use std::future::Future;
use std::marker::PhantomData;

/// Scope creation failed. The owning job counts as failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ScopeError(String);

impl ScopeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Produces the resource bundle a single job runs against.
///
/// Every call must return an independently owned scope: two jobs never observe
/// the same instance, and the queue drops each scope as soon as its job returns.
pub trait ScopeProvider: Send + Sync + 'static {
    type Scope: Send + 'static;

    fn create_scope(&self) -> impl Future<Output = Result<Self::Scope, ScopeError>> + Send;
}

/// A scope provider backed by a synchronous factory function.
pub struct FnScopeProvider<S, F> {
    factory: F,
    _scope: PhantomData<fn() -> S>,
}

impl<S, F> FnScopeProvider<S, F>
where
    F: Fn() -> Result<S, ScopeError> + Send + Sync + 'static,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            _scope: PhantomData,
        }
    }
}

impl<S, F> ScopeProvider for FnScopeProvider<S, F>
where
    S: Send + 'static,
    F: Fn() -> Result<S, ScopeError> + Send + Sync + 'static,
{
    type Scope = S;

    fn create_scope(&self) -> impl Future<Output = Result<S, ScopeError>> + Send {
        std::future::ready((self.factory)())
    }
}
