//! Strongly-typed identifiers used across the domain.
//!
//! These are user-assigned business keys (strings), not surrogate ids: a
//! purchase order number is typed in by the user while the order is still
//! transient and becomes immutable once the order has been persisted.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! impl_str_newtype {
    ($(#[$doc:meta])* $t:ident, $name:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $t(String);

        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True while the key has not been assigned yet (transient drafts).
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            /// Parsing is stricter than construction: an empty key is rejected.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.is_empty() {
                    return Err(DomainError::invalid_id(concat!($name, ": empty key")));
                }
                Ok(Self(s.to_string()))
            }
        }
    };
}

impl_str_newtype!(
    /// Identifier of a purchase order (user-assigned on create).
    OrderId,
    "OrderId"
);

impl_str_newtype!(
    /// Key of a vendor reference entity.
    VendorNumber,
    "VendorNumber"
);

impl_str_newtype!(
    /// Key of a company reference entity.
    CompanyCode,
    "CompanyCode"
);

impl_str_newtype!(
    /// Key of a document type reference entity.
    DocumentTypeId,
    "DocumentTypeId"
);
