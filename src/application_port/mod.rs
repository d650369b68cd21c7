mod login_handler;
mod token_refresher;

pub use login_handler::*;
pub use token_refresher::*;
