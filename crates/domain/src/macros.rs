//! Label conversions for small configuration and domain enums.
//!
//! Several enums in this workspace travel as lowercase strings: in config
//! files, environment variables, log fields and metrics labels. This macro
//! generates `Display` and `FromStr` for them from a single mapping.
//!
//! # Example
//!
//! ```rust
//! use forecal_domain::impl_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Backend {
//!     Redis,
//!     Memory,
//! }
//!
//! impl_label_conversions!(Backend {
//!     Redis => "redis",
//!     Memory => "memory",
//! });
//!
//! assert_eq!(Backend::Redis.to_string(), "redis");
//! assert_eq!("MEMORY".parse::<Backend>(), Ok(Backend::Memory));
//! ```

/// Implements `Display` and case-insensitive `FromStr` for a label enum.
#[macro_export]
macro_rules! impl_label_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
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
