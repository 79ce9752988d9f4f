pub mod memory;
pub mod patient_repo;
pub mod store;
pub mod user_repo;

pub use memory::MemoryStore;
pub use patient_repo::PatientRepository;
pub use store::{IdentityStore, PatientStore};
pub use user_repo::UserRepository;
