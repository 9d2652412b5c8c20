// store

mod session_store;

pub use session_store::*;

// collaborators

mod clock;
mod credential_recheck;
mod token_generator;

pub use clock::*;
pub use credential_recheck::*;
pub use token_generator::*;
