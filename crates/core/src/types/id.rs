//! Newtype IDs for type-safe entity references.
//!
//! The booking backend identifies every record with an opaque string (a
//! document id). Use the `define_id!` macro to create wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
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
/// # use delegends_core::define_id;
/// define_id!(ChairId);
/// define_id!(ShiftId);
///
/// let chair = ChairId::new("64f1a2");
/// let shift = ShiftId::new("64f1a2");
/// assert_eq!(chair.as_str(), shift.as_str());
///
/// // These are different types, so this won't compile:
/// // let _: ChairId = shift;
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

            /// Borrow the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID, returning the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
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

define_id!(UserId);
define_id!(ServiceId);
define_id!(ProductId);
define_id!(BarberId);
define_id!(BookingId);
define_id!(OrderId);
define_id!(ReviewId);
define_id!(JobId);
define_id!(SalonId);
define_id!(LocationId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_as_str() {
        let id = ServiceId::new("65a0c1f2e4b0");
        assert_eq!(id.to_string(), "65a0c1f2e4b0");
        assert_eq!(id.as_str(), "65a0c1f2e4b0");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id: BookingId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(id, BookingId::from("abc123"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
    }
}
