mod session_store_memory;
mod user_profile_repo_memory;

pub use session_store_memory::*;
pub use user_profile_repo_memory::*;
