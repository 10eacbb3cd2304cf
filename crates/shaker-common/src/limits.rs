//! Centralized limits and thresholds for the bundler core.
//!
//! Analysis over cyclic value flow terminates through the recursion memo in
//! the analysis context; the limits here bound the remaining dimensions
//! (property path depth, re-export chains, inclusion passes) so that
//! pathological input degrades to conservative answers instead of
//! unbounded work.

/// Maximum property-path length considered by effect and value queries.
///
/// Queries over longer paths answer "effectful" / "unknown" without
/// recursing. Eight member accesses on a foldable value therefore stop
/// folding:
///
/// ```javascript
/// const o = { a: { b: { c: { d: { e: { f: { g: { h: 1 } } } } } } } };
/// if (o.a.b.c.d.e.f.g.h) {} // path of 8 keys: unknown
/// ```
pub const MAX_PATH_DEPTH: usize = 7;

/// Maximum number of re-export hops followed when tracing an export name.
///
/// Re-export cycles (`export * from './a'` in `b`, and the reverse in `a`)
/// are cut by a visited set; this bounds long acyclic chains.
pub const MAX_REEXPORT_DEPTH: usize = 256;

/// Maximum number of inclusion passes before the driver gives up and
/// keeps what it has.
///
/// Inclusion is monotonic over a finite node set, so the loop terminates on
/// its own; the bound only guards against a defect turning into a hang.
pub const MAX_INCLUSION_PASSES: usize = 10_000;

/// Maximum number of suffixed candidates tried for one safe name.
pub const MAX_RENAME_ATTEMPTS: u32 = 1_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_depth_allows_seven_keys() {
        assert_eq!(MAX_PATH_DEPTH, 7);
        const { assert!(MAX_INCLUSION_PASSES > MAX_REEXPORT_DEPTH) };
    }
}
