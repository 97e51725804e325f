// ============================================================================
// Exactness Tag
// Records how a returned value relates to the true mathematical value
// ============================================================================

use std::cmp::Ordering;
use std::fmt;

/// Relation between a returned value and the exact value it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exactness {
    /// The returned value is the true value.
    Exact,
    /// The returned value exceeds the true value.
    RoundedUp,
    /// The returned value falls short of the true value.
    RoundedDown,
}

impl Exactness {
    /// Builds the tag from `returned.cmp(&exact)`.
    #[inline]
    pub const fn from_ordering(returned_vs_exact: Ordering) -> Self {
        match returned_vs_exact {
            Ordering::Less => Exactness::RoundedDown,
            Ordering::Equal => Exactness::Exact,
            Ordering::Greater => Exactness::RoundedUp,
        }
    }

    #[inline]
    pub const fn is_exact(self) -> bool {
        matches!(self, Exactness::Exact)
    }

    /// The tag seen from the negated value.
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Exactness::Exact => Exactness::Exact,
            Exactness::RoundedUp => Exactness::RoundedDown,
            Exactness::RoundedDown => Exactness::RoundedUp,
        }
    }
}

impl fmt::Display for Exactness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Exactness::Exact => "Exact",
            Exactness::RoundedUp => "RoundedUp",
            Exactness::RoundedDown => "RoundedDown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ordering() {
        assert_eq!(Exactness::from_ordering(Ordering::Less), Exactness::RoundedDown);
        assert_eq!(Exactness::from_ordering(Ordering::Equal), Exactness::Exact);
        assert_eq!(Exactness::from_ordering(Ordering::Greater), Exactness::RoundedUp);
    }

    #[test]
    fn test_flip() {
        assert_eq!(Exactness::RoundedUp.flip(), Exactness::RoundedDown);
        assert_eq!(Exactness::Exact.flip(), Exactness::Exact);
        assert!(Exactness::Exact.is_exact());
        assert!(!Exactness::RoundedDown.is_exact());
    }
}
