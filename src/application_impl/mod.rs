mod clock_impl;
mod credential_recheck_fake;
mod session_manager;
mod token_generator_impl;

pub use clock_impl::*;
pub use credential_recheck_fake::*;
pub use session_manager::*;
pub use token_generator_impl::*;
