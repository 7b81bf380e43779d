use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::AppResult;
use crate::models::wallet_account::WalletAccount;

/// External account-lookup collaborator. Persistent storage and all query
/// logic over accounts live behind this seam.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn find_by_mobile(&self, mobile_number: &str) -> AppResult<Option<WalletAccount>>;
}

/// In-memory directory used as the development and test seam.
#[derive(Default)]
pub struct InMemoryAccountDirectory {
    accounts: DashMap<String, WalletAccount>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: WalletAccount) {
        self.accounts.insert(account.mobile_number.clone(), account);
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn find_by_mobile(&self, mobile_number: &str) -> AppResult<Option<WalletAccount>> {
        Ok(self.accounts.get(mobile_number).map(|a| a.value().clone()))
    }
}
