mod identity_provider_fake;
mod token_client_oidc;

pub use identity_provider_fake::*;
pub use token_client_oidc::*;
