//! Stack growth for deep recursion over types.
//!
//! Type trees coming from real libraries can nest deeply (long generic
//! chains, function types of function types). Recursive walks over them
//! (signature rendering, alias expansion, type commonization) go through
//! [`ensure_sufficient_stack`].

/// If less than this remains, the stack is grown.
const RED_ZONE: usize = 100 * 1024;

/// Size of each additional stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if the remaining space is below the red zone.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
