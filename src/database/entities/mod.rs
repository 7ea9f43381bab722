//! sea-orm entities for every persisted table.
//!
//! Enumerated columns are stored as snake_case strings; each entity module
//! exposes the typed enum alongside the model.

/// Declare a closed string-backed enumeration with `as_str`, `Display`,
/// `FromStr` and serde support using the stored spelling.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::errors::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(crate::errors::CoreError::invalid_input(format!(
                        "Invalid {}: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

/// Encode a list attribute as the JSON text stored in the database.
pub fn encode_list<T: serde::Serialize>(values: &[T]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON text list column, treating malformed content as empty.
pub fn decode_list<T: serde::de::DeserializeOwned>(raw: &str) -> Vec<T> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub mod audit_logs;
pub mod capital_stack_layers;
pub mod documents;
pub mod investor_contacts;
pub mod investors;
pub mod project_investors;
pub mod project_updates;
pub mod projects;
pub mod user_sessions;
pub mod users;
