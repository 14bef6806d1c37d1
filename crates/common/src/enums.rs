//! String-backed enums
//!
//! API clients send enum values as strings (`"MatchIdentified"`). Parsing is
//! case-insensitive and an unknown value is a validation error, so handlers
//! can accept `String` fields and call `.parse()`.

/// Declare a fieldless enum with `as_str`, `ALL`, `Display` and a
/// case-insensitive `FromStr` that fails with `Error::Validation`.
///
/// ```ignore
/// string_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Priority { Low, High }
/// }
/// ```
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical string form
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        $crate::Error::validation(format!(
                            "'{}' is not a valid {}. Expected one of: {}",
                            s,
                            stringify!($name),
                            $name::ALL
                                .iter()
                                .map(|v| v.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ))
                    })
            }
        }
    };
}

/// Parse an optional string filter into an enum, treating blank as absent
pub fn parse_optional<T>(value: Option<&str>) -> crate::Result<Option<T>>
where
    T: std::str::FromStr<Err = crate::Error>,
{
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}
