//! Domain-specific assertion macros for shelf harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that show the
//! whole selector state (query, status, results, selection) instead of a
//! single mismatched value.

/// Assert the visible result names, in order.
///
/// ```rust
/// assert_results!(selector, ["Brake pads front", "Brake pads rear"]);
/// ```
#[macro_export]
macro_rules! assert_results {
    ($selector:expr, [$($name:expr),* $(,)?]) => {{
        let actual: Vec<&str> = $selector.results().iter().map(|e| e.name.as_str()).collect();
        let expected: Vec<&str> = vec![$($name),*];
        if actual != expected {
            panic!(
                "assert_results! failed:\n  query:    {:?}\n  status:   {:?}\n  expected: {:?}\n  actual:   {:?}",
                $selector.query(),
                $selector.status(),
                expected,
                actual
            );
        }
    }};
}

/// Assert the label shown on the trigger (`None` = placeholder).
///
/// ```rust
/// assert_selected!(selector, "Jane Roe");
/// assert_selected!(selector, None);
/// ```
#[macro_export]
macro_rules! assert_selected {
    ($selector:expr, None) => {{
        if let Some(label) = $selector.selection().label() {
            panic!(
                "assert_selected! failed: expected no selection, found {:?} ({:?})",
                label,
                $selector.selection().current()
            );
        }
    }};
    ($selector:expr, $label:expr) => {{
        let expected: &str = $label;
        match $selector.selection().label() {
            Some(actual) if actual == expected => {}
            other => panic!(
                "assert_selected! failed:\n  expected: {:?}\n  actual:   {:?}\n  cache:    {:?}",
                expected,
                other,
                $selector.selection().current()
            ),
        }
    }};
}

/// Assert the search status with a pattern.
///
/// ```rust
/// assert_status!(selector, SearchStatus::Failed(SearchError::Status { status: 502 }));
/// assert_status!(selector, SearchStatus::Failed(_));
/// ```
#[macro_export]
macro_rules! assert_status {
    ($selector:expr, $pattern:pat) => {{
        let status = $selector.status();
        if !matches!(status, $pattern) {
            panic!(
                "assert_status! failed:\n  expected: {}\n  actual:   {:?}\n  query:    {:?}\n  results:  {}",
                stringify!($pattern),
                status,
                $selector.query(),
                $selector.results().len()
            );
        }
    }};
}
