use lasso::{Spur, ThreadedRodeo};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for group identity tokens.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Internal identity token of a polygon group.
///
/// Never exposed to the host: externally a group is addressed by its index
/// in the editor-wide collection. Internally modes and the change bus need a
/// handle that survives index shifts, which is what this is.
/// Backed by an interned `Spur`: 4 bytes, Copy, Eq, O(1) hashing.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(Spur);

impl GroupId {
    /// Intern a string as a GroupId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        GroupId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh, process-unique group id.
    pub fn next() -> Self {
        Self::with_prefix("polygon")
    }

    /// Generate a unique ID with a prefix (e.g. `polygon_1`, `polygon_2`).
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = GroupId::intern("polygon_manual");
        let b = GroupId::intern("polygon_manual");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "polygon_manual");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = GroupId::next();
        let b = GroupId::next();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("polygon_"));
    }
}
