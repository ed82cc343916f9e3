mod crd;
mod error;
mod metadata;
pub mod collaborator;
pub mod placement;
pub mod registry;

pub use self::crd::*;
pub use self::error::*;
pub use self::metadata::*;
pub use self::spec_def::*;

mod spec_def {

    use std::fmt::Debug;

    use serde::de::DeserializeOwned;
    use serde::Serialize;

    use super::Crd;

    pub trait Status:
        Sized + Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync
    {
    }

    /// Resource Spec
    pub trait Spec:
        Sized + Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync
    {
        type Status: Status;

        /// crd definition of this resource
        fn metadata() -> &'static Crd;

        fn api_version() -> String {
            Self::metadata().api_version()
        }

        fn kind() -> String {
            Self::metadata().names.kind.to_owned()
        }

        /// kind of the matching list resource
        fn list_kind() -> String {
            format!("{}List", Self::metadata().names.kind)
        }
    }
}
