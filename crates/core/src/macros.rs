// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`simple_display!`] — `Display` impl mapping enum variants to string literals
//! - [`string_id!`] — string newtype identifier with serde and `Borrow<str>`
//! - [`setters!`] — setter methods for production builder/config structs

/// Generate a `Display` impl that maps enum variants to string literals.
///
/// Unit variants match directly; data-carrying variants use `(..)` to ignore fields.
///
/// ```ignore
/// crate::simple_display! {
///     MyEnum {
///         Foo => "foo",
///         Bar(..) => "bar",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident $(( $($ignore:tt)* ))? => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant $(( $($ignore)* ))? => $str, )+
                })
            }
        }
    };
}

/// Generate a string newtype identifier.
///
/// Edison identifiers are human-chosen kebab strings (task ids) or derived
/// names (session ids), so the newtype wraps a plain `String` rather than a
/// generated short id. The expansion provides `new`, `as_str`, `Display`,
/// `From<String>`, `From<&str>`, `PartialEq<str>`, and `Borrow<str>` so the
/// id can key a `HashMap` looked up by `&str`.
///
/// ```ignore
/// crate::string_id! {
///     /// Doc comment for the id type.
///     pub struct TaskId;
/// }
/// ```
#[macro_export]
macro_rules! string_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new id from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the string value of this id.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the id is an empty string.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Default for $name {
            /// Empty id, used by serde `#[serde(default)]` fields only.
            fn default() -> Self {
                Self(String::new())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Generate setter methods for builder/config structs.
///
/// Field groups:
/// - `into { field: Type }` — setter takes `impl Into<Type>`
/// - `set { field: Type }` — setter takes `Type` directly
/// - `option { field: Type }` — struct field is `Option<Type>`,
///   setter wraps in `Some(v.into())`
#[macro_export]
macro_rules! setters {
    (
        impl $target:ident {
            $(into {
                $( $into_field:ident : $into_ty:ty ),* $(,)?
            })?
            $(set {
                $( $set_field:ident : $set_ty:ty ),* $(,)?
            })?
            $(option {
                $( $opt_field:ident : $opt_ty:ty ),* $(,)?
            })?
        }
    ) => {
        impl $target {
            $($(
                pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                    self.$into_field = v.into();
                    self
                }
            )*)?
            $($(
                pub fn $set_field(mut self, v: $set_ty) -> Self {
                    self.$set_field = v;
                    self
                }
            )*)?
            $($(
                pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                    self.$opt_field = Some(v.into());
                    self
                }
            )*)?
        }
    };
}
