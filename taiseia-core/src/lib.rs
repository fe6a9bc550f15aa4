//! Core types and utilities for the TaiSEIA 101 protocol
//!
//! This crate provides the error type shared by every layer, the hex list
//! helpers used by the operator console, and the identifier tables (device
//! types, device classes, per-family services) together with the
//! [`ServiceRegistry`] that resolves them by id or by name.

/// Declares a `#[repr]` identifier enum with id/name lookups.
macro_rules! id_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $repr:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[repr($repr)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// Every variant, in id order
            pub const ALL: &'static [$name] = &[$( $name::$variant, )+];

            /// Look up a variant by its wire id
            pub fn from_id(id: $repr) -> Option<Self> {
                match id {
                    $( x if x == $value => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Wire id
            pub fn id(self) -> $repr {
                self as $repr
            }

            /// Protocol name
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

pub mod device;
pub mod error;
pub mod hex;
pub mod registry;
pub mod service;

pub use device::{DeviceClass, DeviceType};
pub use error::{TaiseiaError, TaiseiaResult};
pub use hex::{parse_hex_list, to_hex_list};
pub use registry::ServiceRegistry;
pub use service::{DehumidifierService, OpMode, PowerState, RegisterService, SaaSound};
