mod fallback_store;
mod login_handler_impl;
mod refresh_guards;
mod session_cache;
mod token_refresher_impl;

pub use fallback_store::*;
pub use login_handler_impl::*;
pub use refresh_guards::*;
pub use session_cache::*;
pub use token_refresher_impl::*;
