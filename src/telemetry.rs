//! Structured reporting of contract violations.
//!
//! Sampling never panics on bad input. Caller mistakes (a zero bound, an empty
//! range) and entropy oddities (an all-zero draw) become [`ContractViolation`]
//! records. Each generator delivers them to the [`ViolationObserver`] attached
//! to it, or logs them through [`TracingObserver`] when none is attached.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use xoshiro_bounded::telemetry::{CollectingObserver, ViolationKind};
//! use xoshiro_bounded::{Rng, Xoshiro128StarStar};
//!
//! let observer = Arc::new(CollectingObserver::new());
//! let mut rng = Xoshiro128StarStar::from_state([1, 2, 3, 4])?
//!     .with_observer(observer.clone());
//!
//! assert_eq!(rng.bounded(0), 0);
//! assert!(observer.has_violation(ViolationKind::Configuration));
//! # Ok::<(), xoshiro_bounded::RngError>(())
//! ```

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Severity of a contract violation.
///
/// Severities are ordered from least to most severe, allowing filtering
/// and comparison operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    /// Unexpected but recoverable - operation continued normally.
    ///
    /// Example: an entropy draw came back all-zero and was retried.
    Warning,
    /// Caller broke a precondition - operation returned a fallback value.
    ///
    /// Example: `bounded(0)` returned `0`.
    Error,
    /// Critical invariant broken - generator state may be unusable.
    ///
    /// Example: an all-zero generator state.
    Critical,
}

impl ViolationSeverity {
    /// Returns a string representation suitable for logging/metrics labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories of contract violations.
///
/// # Forward Compatibility
///
/// This enum is marked `#[non_exhaustive]` because new violation categories
/// may be added in future versions. Always include a wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ViolationKind {
    /// A caller-supplied parameter was outside its domain.
    ///
    /// Examples:
    /// - `bounded(0)` / `random_uniform(0)`
    /// - `gen_range` with `start >= end`
    Configuration,
    /// The entropy source misbehaved without failing outright.
    ///
    /// Examples:
    /// - A 16-byte draw that was entirely zero
    Entropy,
    /// Runtime invariant check failed.
    ///
    /// Only checked in debug builds or when the `paranoid` feature is enabled.
    Invariant,
    /// Internal logic error (should never happen).
    ///
    /// These violations indicate bugs in the library itself.
    InternalError,
}

impl ViolationKind {
    /// Returns a string representation suitable for logging/metrics labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Entropy => "entropy",
            Self::Invariant => "invariant",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded contract violation.
///
/// # Serialization
///
/// This type implements `serde::Serialize` for structured JSON output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContractViolation {
    /// The severity level of this violation.
    pub severity: ViolationSeverity,
    /// The category where the violation occurred.
    pub kind: ViolationKind,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Source location where the violation was detected (file:line).
    pub location: &'static str,
    /// Additional structured context as key-value pairs.
    pub context: BTreeMap<String, String>,
}

impl ContractViolation {
    /// Creates a new contract violation.
    #[must_use]
    pub fn new(
        severity: ViolationSeverity,
        kind: ViolationKind,
        message: impl Into<String>,
        location: &'static str,
    ) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            location,
            context: BTreeMap::new(),
        }
    }

    /// Adds a context key-value pair.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Serializes this violation to a JSON string.
    ///
    /// Returns `None` if serialization fails (which should not happen for
    /// well-formed violations).
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// Serializes this violation to a pretty-printed JSON string.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json_pretty(&self) -> Option<String> {
        serde_json::to_string_pretty(self).ok()
    }
}

impl std::fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{}] {} (at {}",
            self.severity, self.kind, self.message, self.location
        )?;
        if !self.context.is_empty() {
            write!(f, ", context={:?}", self.context)?;
        }
        write!(f, ")")
    }
}

/// Receives contract violations raised by a generator.
///
/// Attach one with [`Xoshiro128StarStar::with_observer`] or
/// [`ThreadRng::set_violation_observer`]. Generators without an observer log
/// through [`TracingObserver`].
///
/// Observers are shared behind an `Arc` and may be cloned into other threads
/// together with the generator, so they must be `Send + Sync`.
///
/// [`Xoshiro128StarStar::with_observer`]: crate::Xoshiro128StarStar::with_observer
/// [`ThreadRng::set_violation_observer`]: crate::ThreadRng::set_violation_observer
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use xoshiro_bounded::telemetry::{ViolationObserver, ContractViolation};
///
/// #[derive(Default)]
/// struct CountingObserver(AtomicUsize);
///
/// impl ViolationObserver for CountingObserver {
///     fn on_violation(&self, _violation: &ContractViolation) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait ViolationObserver: Send + Sync {
    /// Called once per violation. Runs on the sampling thread.
    fn on_violation(&self, violation: &ContractViolation);
}

/// Built-in observer that logs violations via the `tracing` crate.
///
/// # Log Levels
///
/// - `Warning` severity → `tracing::warn!`
/// - `Error` and `Critical` severity → `tracing::error!`
///
/// All fields are emitted as structured tracing fields (`severity`, `kind`,
/// `location`, `context`), so JSON formatters pick them up unchanged.
#[derive(Debug, Default, Clone)]
pub struct TracingObserver;

impl TracingObserver {
    /// Creates a new tracing observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn format_context(context: &BTreeMap<String, String>) -> String {
        if context.is_empty() {
            return "{}".to_owned();
        }
        let pairs: Vec<String> = context.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{{{}}}", pairs.join(", "))
    }
}

impl ViolationObserver for TracingObserver {
    fn on_violation(&self, violation: &ContractViolation) {
        let severity = violation.severity.as_str();
        let kind = violation.kind.as_str();
        let location = violation.location;
        let context_str = Self::format_context(&violation.context);

        match violation.severity {
            ViolationSeverity::Warning => {
                tracing::warn!(
                    severity,
                    kind,
                    location,
                    context = %context_str,
                    "{}",
                    violation.message
                );
            },
            ViolationSeverity::Error | ViolationSeverity::Critical => {
                tracing::error!(
                    severity,
                    kind,
                    location,
                    context = %context_str,
                    "{}",
                    violation.message
                );
            },
        }
    }
}

/// Built-in observer that collects violations for testing.
///
/// # Example
///
/// ```
/// use xoshiro_bounded::telemetry::{CollectingObserver, ViolationKind, ViolationObserver,
///     ContractViolation, ViolationSeverity};
///
/// let observer = CollectingObserver::new();
/// observer.on_violation(&ContractViolation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::Entropy,
///     "all-zero draw",
///     "test.rs:1",
/// ));
///
/// assert_eq!(observer.violations().len(), 1);
/// assert!(observer.has_violation(ViolationKind::Entropy));
/// ```
#[derive(Debug, Default)]
pub struct CollectingObserver {
    violations: Mutex<Vec<ContractViolation>>,
}

impl CollectingObserver {
    /// Creates a new collecting observer with an empty violation list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            violations: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of all collected violations.
    #[must_use]
    pub fn violations(&self) -> Vec<ContractViolation> {
        self.violations.lock().clone()
    }

    /// Returns the number of collected violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.lock().len()
    }

    /// Returns true if no violations have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.lock().is_empty()
    }

    /// Checks if any violation of the specified kind has been collected.
    #[must_use]
    pub fn has_violation(&self, kind: ViolationKind) -> bool {
        self.violations.lock().iter().any(|v| v.kind == kind)
    }

    /// Checks if any violation with the specified severity has been collected.
    #[must_use]
    pub fn has_severity(&self, severity: ViolationSeverity) -> bool {
        self.violations
            .lock()
            .iter()
            .any(|v| v.severity == severity)
    }

    /// Clears all collected violations.
    pub fn clear(&self) {
        self.violations.lock().clear();
    }
}

impl ViolationObserver for CollectingObserver {
    fn on_violation(&self, violation: &ContractViolation) {
        self.violations.lock().push(violation.clone());
    }
}

/// Macro for reporting contract violations with location tracking.
///
/// Creates a [`ContractViolation`] with the current file and line and logs it
/// through [`TracingObserver`].
///
/// # Syntax
///
/// ```text
/// report_violation!(severity, kind, "message");
/// report_violation!(severity, kind, "message with {}", format_args);
/// ```
///
/// # Example
///
/// ```
/// use xoshiro_bounded::{report_violation, telemetry::{ViolationSeverity, ViolationKind}};
///
/// let limit = 0;
/// report_violation!(ViolationSeverity::Error, ViolationKind::Configuration,
///     "bounded called with limit {}", limit);
/// ```
#[macro_export]
macro_rules! report_violation {
    ($severity:expr, $kind:expr, $msg:literal) => {{
        use $crate::telemetry::ViolationObserver as _;
        let violation = $crate::telemetry::ContractViolation::new(
            $severity,
            $kind,
            $msg,
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::TracingObserver.on_violation(&violation);
    }};

    ($severity:expr, $kind:expr, $fmt:literal, $($arg:tt)+) => {{
        use $crate::telemetry::ViolationObserver as _;
        let violation = $crate::telemetry::ContractViolation::new(
            $severity,
            $kind,
            format!($fmt, $($arg)+),
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::TracingObserver.on_violation(&violation);
    }};
}

/// Asserts that no violations have been collected.
///
/// # Panics
///
/// Panics if the observer contains any violations, printing them for debugging.
#[macro_export]
macro_rules! assert_no_violations {
    ($observer:expr) => {{
        let violations = $observer.violations();
        assert!(
            violations.is_empty(),
            "Expected no violations, but found {}:\n{:#?}",
            violations.len(),
            violations
        );
    }};
}

/// Asserts that a violation of the specified kind was collected.
///
/// # Panics
///
/// Panics if no violation of the specified kind was found.
#[macro_export]
macro_rules! assert_violation {
    ($observer:expr, $kind:expr) => {{
        assert!(
            $observer.has_violation($kind),
            "Expected violation of kind {:?}, but found: {:#?}",
            $kind,
            $observer.violations()
        );
    }};
}

/// Delivers `violation` to `observer`, or logs it through [`TracingObserver`]
/// when there is none.
///
/// Generators call this with the observer they carry, so a caller who attached
/// a [`CollectingObserver`] sees exactly the violations that generator raised.
///
/// ```
/// use xoshiro_bounded::telemetry::{
///     report_to_observer, CollectingObserver, ContractViolation, ViolationKind, ViolationSeverity
/// };
/// use std::sync::Arc;
///
/// let observer = Arc::new(CollectingObserver::new());
/// let violation = ContractViolation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::Entropy,
///     "all-zero draw",
///     "seed.rs:1",
/// );
///
/// report_to_observer(Some(&observer), &violation);
/// assert_eq!(observer.len(), 1);
/// ```
pub fn report_to_observer<O: ViolationObserver + ?Sized>(
    observer: Option<&Arc<O>>,
    violation: &ContractViolation,
) {
    match observer {
        Some(obs) => obs.on_violation(violation),
        None => TracingObserver.on_violation(violation),
    }
}

/// [`report_violation!`] for code that holds an `Option<Arc<dyn ViolationObserver>>`.
///
/// `$observer` is anything with an `as_ref()` yielding `Option<&Arc<_>>`.
///
/// ```
/// use xoshiro_bounded::{report_violation_to, telemetry::{ViolationSeverity, ViolationKind,
///     CollectingObserver, ViolationObserver}};
/// use std::sync::Arc;
///
/// let collector = Arc::new(CollectingObserver::new());
/// let observer: Option<Arc<dyn ViolationObserver>> = Some(collector.clone());
///
/// report_violation_to!(observer, ViolationSeverity::Error, ViolationKind::Configuration,
///     "empty range [{}..{})", 5, 5);
/// assert_eq!(collector.len(), 1);
/// ```
#[macro_export]
macro_rules! report_violation_to {
    ($observer:expr, $severity:expr, $kind:expr, $msg:literal) => {{
        let violation = $crate::telemetry::ContractViolation::new(
            $severity,
            $kind,
            $msg,
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};

    ($observer:expr, $severity:expr, $kind:expr, $fmt:literal, $($arg:tt)+) => {{
        let violation = $crate::telemetry::ContractViolation::new(
            $severity,
            $kind,
            format!($fmt, $($arg)+),
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};
}

// ==========================================
// Runtime Invariant Checking
// ==========================================

/// A broken invariant found by [`InvariantChecker::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Name of the type whose invariant was violated.
    pub type_name: &'static str,
    /// Description of the violated invariant.
    pub invariant: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    #[must_use]
    pub fn new(type_name: &'static str, invariant: impl Into<String>) -> Self {
        Self {
            type_name,
            invariant: invariant.into(),
        }
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.type_name, self.invariant)
    }
}

/// Trait for types that maintain internal invariants.
///
/// Types implementing this trait can have their invariants checked at runtime
/// during debug builds or when the `paranoid` feature is enabled.
pub trait InvariantChecker {
    /// Checks that all invariants of this type are satisfied.
    ///
    /// Returns `Ok(())` if all invariants hold, or an `InvariantViolation`
    /// describing the first broken invariant.
    fn check_invariants(&self) -> Result<(), InvariantViolation>;
}

/// Macro for conditionally checking invariants in debug builds.
///
/// Expands to an invariant check in debug builds and to nothing in release
/// builds, unless the `paranoid` feature is enabled.
#[macro_export]
#[cfg(any(debug_assertions, feature = "paranoid"))]
macro_rules! debug_check_invariants {
    ($expr:expr) => {{
        use $crate::telemetry::InvariantChecker as _;
        if let Err(violation) = $expr.check_invariants() {
            $crate::report_violation!(
                $crate::telemetry::ViolationSeverity::Critical,
                $crate::telemetry::ViolationKind::Invariant,
                "{}",
                violation
            );
        }
    }};

    ($expr:expr, $context:expr) => {{
        use $crate::telemetry::InvariantChecker as _;
        if let Err(violation) = $expr.check_invariants() {
            $crate::report_violation!(
                $crate::telemetry::ViolationSeverity::Critical,
                $crate::telemetry::ViolationKind::Invariant,
                "{} [context: {}]",
                violation,
                $context
            );
        }
    }};
}

/// No-op version for release builds without `paranoid` feature.
#[macro_export]
#[cfg(not(any(debug_assertions, feature = "paranoid")))]
macro_rules! debug_check_invariants {
    ($expr:expr) => {{}};
    ($expr:expr, $context:expr) => {{}};
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    fn violation(severity: ViolationSeverity, kind: ViolationKind) -> ContractViolation {
        ContractViolation::new(severity, kind, "test message", "test.rs:1")
    }

    #[test]
    fn test_violation_severity_ordering() {
        assert!(ViolationSeverity::Warning < ViolationSeverity::Error);
        assert!(ViolationSeverity::Error < ViolationSeverity::Critical);
    }

    #[test]
    fn test_violation_kind_as_str() {
        assert_eq!(ViolationKind::Configuration.as_str(), "configuration");
        assert_eq!(ViolationKind::Entropy.as_str(), "entropy");
        assert_eq!(ViolationKind::Invariant.as_str(), "invariant");
        assert_eq!(ViolationKind::InternalError.as_str(), "internal_error");
    }

    #[test]
    fn test_contract_violation_context_and_display() {
        let v = ContractViolation::new(
            ViolationSeverity::Warning,
            ViolationKind::Entropy,
            "entropy draw produced an all-zero state",
            "rng.rs:42",
        )
        .with_context("attempt", "2");

        assert_eq!(v.context.get("attempt"), Some(&"2".to_owned()));
        let display = v.to_string();
        assert!(display.starts_with("[warning/entropy] entropy draw"));
        assert!(display.contains("rng.rs:42"));
        assert!(display.contains("attempt"));
    }

    #[test]
    fn test_collecting_observer() {
        let observer = CollectingObserver::new();
        assert!(observer.is_empty());

        observer.on_violation(&violation(ViolationSeverity::Warning, ViolationKind::Entropy));
        observer.on_violation(&violation(ViolationSeverity::Error, ViolationKind::Configuration));

        assert_eq!(observer.len(), 2);
        assert!(observer.has_violation(ViolationKind::Entropy));
        assert!(!observer.has_violation(ViolationKind::InternalError));
        assert!(observer.has_severity(ViolationSeverity::Error));
        assert!(!observer.has_severity(ViolationSeverity::Critical));

        observer.clear();
        crate::assert_no_violations!(observer);
    }

    #[test]
    fn test_collecting_observer_concurrent_writes() {
        use std::thread;

        let observer = Arc::new(CollectingObserver::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let observer = observer.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        observer.on_violation(&violation(
                            ViolationSeverity::Warning,
                            ViolationKind::Entropy,
                        ));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("Thread should not panic");
        }
        assert_eq!(observer.len(), 800);
    }

    #[test]
    fn test_report_to_observer_prefers_attached_observer() {
        let collector = Arc::new(CollectingObserver::new());
        let observer: Option<Arc<dyn ViolationObserver>> = Some(collector.clone());

        report_violation_to!(
            observer,
            ViolationSeverity::Error,
            ViolationKind::Configuration,
            "empty range [{}..{})",
            7,
            7
        );
        crate::assert_violation!(collector, ViolationKind::Configuration);
        assert_eq!(collector.violations()[0].message, "empty range [7..7)");

        // No observer: logged through tracing, never reaches the collector.
        let none: Option<Arc<dyn ViolationObserver>> = None;
        report_violation_to!(none, ViolationSeverity::Warning, ViolationKind::Entropy, "dropped");
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_report_violation_macro_does_not_panic() {
        report_violation!(
            ViolationSeverity::Warning,
            ViolationKind::Entropy,
            "all-zero draw"
        );
        report_violation!(
            ViolationSeverity::Critical,
            ViolationKind::InternalError,
            "unexpected residue {}",
            3
        );
    }

    struct NonZero(u32);

    impl InvariantChecker for NonZero {
        fn check_invariants(&self) -> Result<(), InvariantViolation> {
            if self.0 == 0 {
                return Err(InvariantViolation::new("NonZero", "value must not be zero"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_invariant_checker() {
        assert!(NonZero(1).check_invariants().is_ok());
        let err = NonZero(0).check_invariants().unwrap_err();
        assert_eq!(err.to_string(), "NonZero: value must not be zero");

        // Logs instead of panicking in either build mode.
        debug_check_invariants!(NonZero(0));
        debug_check_invariants!(NonZero(0), "test context");
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&ViolationSeverity::Warning).unwrap(),
            r#""warning""#
        );
        assert_eq!(
            serde_json::to_string(&ViolationKind::InternalError).unwrap(),
            r#""internal_error""#
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_contract_violation_to_json() {
        let json = violation(ViolationSeverity::Error, ViolationKind::Configuration)
            .with_context("limit", "0")
            .to_json()
            .unwrap();
        assert!(json.contains(r#""severity":"error""#));
        assert!(json.contains(r#""kind":"configuration""#));
        assert!(json.contains(r#""limit":"0""#));
    }
}
