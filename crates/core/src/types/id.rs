//! Newtype IDs for type-safe entity references.
//!
//! The booking backend hands out opaque string identifiers. Use the
//! `define_id!` macro to create wrappers that prevent accidentally passing a
//! shop ID where a service ID is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use barberbook_core::define_id;
/// define_id!(ShopId);
/// define_id!(ServiceId);
///
/// let shop = ShopId::new("shop-1");
/// let service = ServiceId::new("shop-1");
///
/// // These are different types, so this won't compile:
/// // let _: ShopId = service;
/// assert_eq!(shop.as_str(), service.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Server-assigned entity IDs
define_id!(ShopId);
define_id!(ServiceId);
define_id!(BarberId);
define_id!(BookingId);
define_id!(UserId);
define_id!(TimeSlotId);

// Client-assigned IDs
define_id!(CartEntryId);

impl CartEntryId {
    /// Generate a fresh local identifier for a cart entry.
    ///
    /// Cart entries never leave the client under this ID, so a random UUID
    /// is enough to keep them distinct across reloads.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("cart-{}", uuid::Uuid::new_v4()))
    }
}
