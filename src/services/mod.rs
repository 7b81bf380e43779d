pub mod directory;
pub mod token_service;

pub use directory::{AccountDirectory, InMemoryAccountDirectory};
pub use token_service::TokenService;
