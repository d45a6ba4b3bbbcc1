// Copyright 2026 the Halcyon authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A macro to define bit-flag sets in a structured way.
//!
//! Every flag set in the RHI (resource usage, pipeline stages, access masks,
//! shader-stage visibility) is declared through [`halcyon_bitflags!`] so that
//! all of them share the same combination, query, and `Debug` behaviour.

/// Declares a transparent bit-flag newtype with the usual set operations.
#[macro_export]
#[doc(hidden)]
macro_rules! halcyon_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Creates a flag set from raw bits. Unknown bits are kept.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits }
            }

            /// Returns the raw value of the flag set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if all flags in `other` are present in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is present in `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Returns `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Inserts the flags in `other` into `self`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Removes the flags in `other` from `self`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Returns a new set with `other` flags added.
            #[must_use]
            pub const fn with(mut self, other: Self) -> Self {
                self.bits |= other.bits;
                self
            }

            /// Returns a new set with `other` flags removed.
            #[must_use]
            pub const fn without(mut self, other: Self) -> Self {
                self.bits &= !other.bits;
                self
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::ops::BitXor for $name {
            type Output = Self;
            fn bitxor(self, other: Self) -> Self {
                Self { bits: self.bits ^ other.bits }
            }
        }

        impl core::ops::Not for $name {
            type Output = Self;
            fn not(self) -> Self {
                Self { bits: !self.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::ops::BitAndAssign for $name {
            fn bitand_assign(&mut self, other: Self) {
                self.bits &= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut bits = self.bits;
                let mut first = true;

                write!(f, "{} {{ ", stringify!($name))?;
                $(
                    if ($flag_value != 0) && (bits & $flag_value) == $flag_value {
                        if !first {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag_name))?;
                        bits &= !$flag_value;
                        first = false;
                    }
                )*
                if bits != 0 {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "UNKNOWN({bits:#x})")?;
                    first = false;
                }
                if self.bits == 0 && first {
                    write!(f, "EMPTY")?;
                }
                write!(f, " }}")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::halcyon_bitflags;

    halcyon_bitflags! {
        /// Flag set used to exercise the macro.
        pub struct Probe: u32 {
            const READ = 1 << 0;
            const WRITE = 1 << 1;
            const COPY_SRC = 1 << 2;
            const COPY_DST = 1 << 3;
            const COPY = Self::COPY_SRC.bits() | Self::COPY_DST.bits();
        }
    }

    #[test]
    fn empty_set_has_no_bits() {
        assert_eq!(Probe::EMPTY.bits(), 0);
        assert_eq!(Probe::default(), Probe::EMPTY);
        assert!(Probe::EMPTY.is_empty());
        assert_eq!(format!("{:?}", Probe::EMPTY), "Probe { EMPTY }");
    }

    #[test]
    fn union_and_contains() {
        let rw = Probe::READ | Probe::WRITE;
        assert!(rw.contains(Probe::READ));
        assert!(rw.contains(Probe::WRITE));
        assert!(!rw.contains(Probe::COPY_SRC));
        assert!(rw.contains(Probe::EMPTY));
        assert_eq!(format!("{rw:?}"), "Probe { READ | WRITE }");
    }

    #[test]
    fn intersects_requires_a_common_bit() {
        let rw = Probe::READ | Probe::WRITE;
        assert!(rw.intersects(Probe::WRITE | Probe::COPY_SRC));
        assert!(!rw.intersects(Probe::COPY));
        assert!(!rw.intersects(Probe::EMPTY));
    }

    #[test]
    fn composite_constant_expands_to_members() {
        assert!(Probe::COPY.contains(Probe::COPY_SRC));
        assert!(Probe::COPY.contains(Probe::COPY_DST));
        assert_eq!(format!("{:?}", Probe::COPY), "Probe { COPY_SRC | COPY_DST }");
    }

    #[test]
    fn insert_remove_roundtrip() {
        let mut flags = Probe::READ;
        flags.insert(Probe::COPY_DST);
        assert_eq!(flags, Probe::READ | Probe::COPY_DST);
        flags.remove(Probe::READ);
        assert_eq!(flags, Probe::COPY_DST);
        flags.remove(Probe::COPY);
        assert!(flags.is_empty());
    }

    #[test]
    fn with_and_without_do_not_mutate() {
        let base = Probe::READ;
        assert_eq!(base.with(Probe::WRITE), Probe::READ | Probe::WRITE);
        assert_eq!((Probe::READ | Probe::WRITE).without(Probe::READ), Probe::WRITE);
        assert_eq!(base, Probe::READ);
    }

    #[test]
    fn unknown_bits_are_kept_and_reported() {
        let raw = Probe::from_bits_truncate(1 << 8 | Probe::READ.bits());
        assert_eq!(format!("{raw:?}"), "Probe { READ | UNKNOWN(0x100) }");
    }
}
