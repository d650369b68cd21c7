mod user_profile_repo_mysql;

pub use user_profile_repo_mysql::*;

mod util;
