//! # Call Arities
//!
//! One generic dispatch path over positional-argument tuples instead of an
//! overload per argument count. Arities 0 through 5 share a single macro;
//! per-arity type safety is preserved because the operation trait is
//! parameterized by the concrete tuple.

use std::future::Future;

use farfut::Outcome;

/// A positional-argument tuple that can cross into an isolated context.
///
/// Implemented for tuples of 0 to 5 `Send + 'static` elements. Arguments
/// pass through to the operation unchanged; there is no defaulting.
pub trait CallArgs: Send + 'static {}

/// A deferred operation: a one-shot callable over a `CallArgs` tuple that
/// produces a future of a terminal [`Outcome`].
///
/// Implemented for any `FnOnce` of matching arity whose future is `Send`,
/// so plain closures returning async blocks qualify.
pub trait AsyncCall<A: CallArgs>: Send + 'static {
    /// The completed-value type.
    type Output: Send + 'static;
    /// The operation's own future.
    type Future: Future<Output = Outcome<Self::Output>> + Send + 'static;

    /// Applies the argument tuple and returns the operation's future.
    fn call(self, args: A) -> Self::Future;
}

macro_rules! impl_async_call {
    ($(($($arg:ident),*)),+ $(,)?) => {$(
        impl<$($arg: Send + 'static),*> CallArgs for ($($arg,)*) {}

        #[allow(non_snake_case)]
        impl<Func, Fut, Out $(, $arg)*> AsyncCall<($($arg,)*)> for Func
        where
            Func: FnOnce($($arg),*) -> Fut + Send + 'static,
            Fut: Future<Output = Outcome<Out>> + Send + 'static,
            Out: Send + 'static,
            $($arg: Send + 'static,)*
        {
            type Output = Out;
            type Future = Fut;

            fn call(self, ($($arg,)*): ($($arg,)*)) -> Fut {
                self($($arg),*)
            }
        }
    )+};
}

impl_async_call!(
    (),
    (A1),
    (A1, A2),
    (A1, A2, A3),
    (A1, A2, A3, A4),
    (A1, A2, A3, A4, A5),
);
