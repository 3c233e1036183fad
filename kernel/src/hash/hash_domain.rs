//! Typed domain separators for state hashing.
//!
//! Every hash the engine computes selects a domain via [`HashDomain`], so
//! the routing key and the table bucket of one state are independent
//! values even though both come from the same packed bytes. Adding a new
//! domain is a single change here: the enum, `as_bytes()`, `ALL`, and
//! `Display` are all generated from the same macro invocation.

/// Declares `HashDomain` enum, `as_bytes()`, `ALL`, and `Display` from one list.
macro_rules! define_hash_domains {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $bytes:expr
        ),+ $(,)?
    ) => {
        /// Typed domain separator for [`super::raw_hash`].
        ///
        /// Every variant maps to a unique, null-terminated byte string used as
        /// a SHA-256 prefix.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashDomain {
            /// The raw domain-separator bytes (null-terminated).
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// All domain variants in declaration order.
            pub const ALL: &[HashDomain] = &[
                $( Self::$variant, )+
            ];
        }

        impl core::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => write!(f, stringify!($variant)), )+
                }
            }
        }
    };
}

define_hash_domains! {
    /// Work partitioning: selects the owning worker of a state.
    DistributionKey => b"HDASTAR::DISTRIBUTION_KEY::V1\0",

    /// Duplicate-table bucket selection.
    TableBucket => b"HDASTAR::TABLE_BUCKET::V1\0",
}
