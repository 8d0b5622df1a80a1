//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Reminder kinds and delivery channels travel as lowercase strings in JSON
//! payloads, database rows and log fields. The macro keeps the string mapping
//! in one place for both directions.
//!
//! # Example
//!
//! ```rust
//! use calnotify_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Priority {
//!     Low,
//!     Medium,
//!     High,
//! }
//!
//! impl_wire_enum_conversions!(Priority {
//!     Low => "low",
//!     Medium => "medium",
//!     High => "high",
//! });
//!
//! assert_eq!(Priority::High.to_string(), "high");
//! assert_eq!("MEDIUM".parse::<Priority>(), Ok(Priority::Medium));
//! ```

/// Implements Display and FromStr traits for wire-level enums
///
/// - Display writes the mapped string.
/// - FromStr parses case-insensitively, ignoring surrounding whitespace.
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Stable string form used on the wire and in storage.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
