pub mod auth_handlers;
pub mod pin_handlers;
