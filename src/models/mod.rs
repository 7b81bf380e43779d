pub mod authenticated_principal;
pub mod token_claims;
pub mod wallet_account;

pub use authenticated_principal::AuthenticatedPrincipal;
pub use token_claims::Claims;
pub use wallet_account::WalletAccount;
