mod error;
mod in_memory;
mod namespace;

pub use self::error::StoreError;
pub use self::in_memory::ApplyResult;
pub use self::in_memory::PlacementStore;
pub use self::namespace::NameSpace;

pub type SharedStore = std::sync::Arc<PlacementStore>;
