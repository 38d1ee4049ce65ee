//! Stack growth for the recursive grammar functions.
//!
//! Every nesting level of the grammar goes through [`ensure_sufficient_stack`],
//! so deep but legal input never depends on the size of the calling
//! thread's stack. The nesting limit in `ParserConfig` still bounds how far
//! the stack can grow.

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deep_recurse(n: usize) -> usize {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { deep_recurse(n - 1) + 1 })
    }

    #[test]
    fn deep_recursion_does_not_overflow() {
        assert_eq!(deep_recurse(100_000), 100_000);
    }

    #[test]
    fn passes_results_through() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(result, Ok(7));
    }
}
