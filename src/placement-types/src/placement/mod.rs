//!
//! # PlacementAPI
//!
//! Desired state (spec), observed state (status) and the queries a
//! reconciler and its callers run against them.
//!

/// enum over a closed set of well-known string values,
/// with an escape variant so unknown values round trip unchanged
macro_rules! open_string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $value, )+
                    Self::Other(value) => value,
                }
            }

            /// all values known to this crate, in declaration order
            pub fn well_known() -> Vec<Self> {
                vec![$( Self::$variant ),+]
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $( $value => Self::$variant, )+
                    other => Self::Other(other.to_owned()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $( $value => Self::$variant, )+
                    _ => Self::Other(value),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(value) => value,
                    known => known.as_str().to_owned(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        // identity is the wire string, so `Other("x")` equals the known variant for "x"
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.as_str() == other.as_str()
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(self.as_str(), state)
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.as_str().cmp(other.as_str())
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }
    };
}

mod condition;
mod endpoint;
mod hash;
mod spec;
mod status;

pub use self::condition::*;
pub use self::endpoint::*;
pub use self::hash::*;
pub use self::spec::*;
pub use self::status::*;

use crate::registry::SchemeRegistry;
use crate::{Crd, CrdNames, EndpointNotFound, K8List, K8Obj, GROUP, V1BETA1};

pub const PLACEMENT_API: Crd = Crd {
    group: GROUP,
    version: V1BETA1,
    names: CrdNames {
        kind: "PlacementAPI",
        plural: "placementapis",
        singular: "placementapi",
    },
};

pub type PlacementApi = K8Obj<PlacementApiSpec>;
pub type PlacementApiList = K8List<PlacementApiSpec>;

/// register PlacementAPI kinds, called once from the process bootstrap
pub fn register_types(registry: &mut SchemeRegistry) {
    registry.register::<PlacementApiSpec>();
}

/// columns shown when listing PlacementAPI resources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintColumns {
    pub network_attachments: String,
    pub status: String,
    pub message: String,
}

impl PlacementApi {
    /// returns the service url published for this endpoint class
    pub fn get_endpoint(&self, endpoint: &Endpoint) -> Result<&str, EndpointNotFound> {
        self.status.get_endpoint(endpoint)
    }

    /// true if the service is ready to serve requests
    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }

    /// status and message are taken from the first condition in the sequence
    pub fn print_columns(&self) -> PrintColumns {
        let headline = self.status.conditions.headline();
        PrintColumns {
            network_attachments: format!("[{}]", self.spec.network_attachments.join(" ")),
            status: headline
                .map(|c| c.status.to_string())
                .unwrap_or_default(),
            message: headline.map(|c| c.message.clone()).unwrap_or_default(),
        }
    }
}
