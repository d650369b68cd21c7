// store

mod session_store;

pub use session_store::*;

// provider

mod identity_provider;

pub use identity_provider::*;

// repo

mod user_profile_repo;

pub use user_profile_repo::*;
