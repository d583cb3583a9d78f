pub mod error;
pub mod file;
pub mod memory;
pub mod overrides;
pub mod session;
pub mod trait_store;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use overrides::{LeadOverrides, LEAD_OVERRIDE_PREFIX};
pub use session::{Session, REMEMBERED_EMAIL_KEY, TOKEN_KEY};
pub use trait_store::KeyValueStore;
