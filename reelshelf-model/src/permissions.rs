//! Capability bits granted by roles.
//!
//! A role stores its grants as a single integer. Each capability occupies one
//! bit, and a check succeeds only when *every* requested bit is present:
//!
//! ```
//! use reelshelf_model::Permissions;
//!
//! let user = Permissions::BORROW | Permissions::RETURN;
//! assert!(user.contains(Permissions::BORROW));
//! assert!(!user.contains(Permissions::BORROW | Permissions::MODERATE_MOVIE));
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Permissions(i32);

impl Permissions {
    pub const NONE: Self = Self(0);
    /// Borrow a movie from the catalog.
    pub const BORROW: Self = Self(0x01);
    /// Return a borrowed movie.
    pub const RETURN: Self = Self(0x02);
    /// Add and edit catalog entries.
    pub const MODERATE_MOVIE: Self = Self(0x04);
    /// Full administrative control.
    pub const ADMINISTER: Self = Self(0x80);
    /// Every bit of the low byte; what the administrator role is seeded with.
    pub const ALL: Self = Self(0xff);

    const NAMED: [(Self, &'static str); 4] = [
        (Self::BORROW, "BORROW"),
        (Self::RETURN, "RETURN"),
        (Self::MODERATE_MOVIE, "MODERATE_MOVIE"),
        (Self::ADMINISTER, "ADMINISTER"),
    ];

    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    /// `true` iff every bit in `requested` is also set in `self`.
    pub const fn contains(self, requested: Self) -> bool {
        (self.0 & requested.0) == requested.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the well-known capabilities present in this set.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Permissions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permissions({:#04x} {:?})", self.0, self.names())
    }
}
