//! Account service with an in-memory ledger.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    errors::{AccountError, AccountResult},
    models::{EntryDirection, EntryType, LedgerEntry, User, UserProfile},
};
use crate::game::{
    constants::DEFAULT_BALANCE,
    entities::{Chips, UserId},
};

/// Narrow interface a room uses to reach user accounts. Balances stay
/// owned by the account service; rooms only ask for adjustments.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Display data for a user
    async fn profile(&self, user_id: UserId) -> AccountResult<UserProfile>;

    /// Current balance
    async fn balance(&self, user_id: UserId) -> AccountResult<Chips>;

    /// Take chips from a user, returning the new balance
    ///
    /// # Errors
    ///
    /// * `AccountError::InvalidAmount` - Amount is not positive
    /// * `AccountError::InsufficientBalance` - Not enough chips
    async fn debit(
        &self,
        user_id: UserId,
        room_id: &str,
        amount: Chips,
        entry_type: EntryType,
    ) -> AccountResult<Chips>;

    /// Give chips to a user, returning the new balance
    async fn credit(
        &self,
        user_id: UserId,
        room_id: &str,
        amount: Chips,
        entry_type: EntryType,
    ) -> AccountResult<Chips>;

    /// Record that the user holds a seat in `room_id`
    ///
    /// # Errors
    ///
    /// * `AccountError::AlreadySeated` - User is seated in a different room
    async fn claim_seat(&self, user_id: UserId, room_id: &str) -> AccountResult<()>;

    /// Clear the user's seated flag
    async fn release_seat(&self, user_id: UserId) -> AccountResult<()>;

    /// Mark the user online or offline
    async fn set_online(&self, user_id: UserId, online: bool) -> AccountResult<()>;
}

/// In-memory account service
pub struct InMemoryAccounts {
    users: RwLock<HashMap<UserId, User>>,
    entries: RwLock<Vec<LedgerEntry>>,
    default_balance: Chips,
}

impl InMemoryAccounts {
    /// Create a new account service
    ///
    /// # Arguments
    ///
    /// * `default_balance` - Balance granted to every new user
    pub fn new(default_balance: Chips) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            entries: RwLock::new(Vec::new()),
            default_balance,
        }
    }

    /// Provision a new user
    pub async fn create_user(&self, name: &str, avatar: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            avatar: avatar.to_string(),
            balance: self.default_balance,
            online: false,
            seated_in: None,
            created_at: now,
            updated_at: now,
        };
        self.users.write().await.insert(user.id, user.clone());
        log::info!("Created user {} ({})", user.id, user.name);
        user
    }

    /// Get a user record
    pub async fn get_user(&self, user_id: UserId) -> AccountResult<User> {
        self.users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(AccountError::UserNotFound(user_id))
    }

    /// Ledger history for one user, oldest first
    pub async fn entries_for(&self, user_id: UserId) -> Vec<LedgerEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect()
    }

    async fn record(
        &self,
        user_id: UserId,
        room_id: &str,
        amount: Chips,
        balance_after: Chips,
        direction: EntryDirection,
        entry_type: EntryType,
    ) {
        log::debug!(
            "Ledger {} {} of {} for user {} in room {} (balance {})",
            entry_type,
            direction,
            amount,
            user_id,
            room_id,
            balance_after
        );
        self.entries.write().await.push(LedgerEntry {
            user_id,
            room_id: room_id.to_string(),
            amount,
            balance_after,
            direction,
            entry_type,
            created_at: Utc::now(),
        });
    }
}

impl Default for InMemoryAccounts {
    fn default() -> Self {
        Self::new(DEFAULT_BALANCE)
    }
}

#[async_trait]
impl AccountService for InMemoryAccounts {
    async fn profile(&self, user_id: UserId) -> AccountResult<UserProfile> {
        self.get_user(user_id).await.map(|user| user.profile())
    }

    async fn balance(&self, user_id: UserId) -> AccountResult<Chips> {
        self.get_user(user_id).await.map(|user| user.balance)
    }

    async fn debit(
        &self,
        user_id: UserId,
        room_id: &str,
        amount: Chips,
        entry_type: EntryType,
    ) -> AccountResult<Chips> {
        if amount <= 0 {
            return Err(AccountError::InvalidAmount(amount));
        }

        let balance_after = {
            let mut users = self.users.write().await;
            let user = users
                .get_mut(&user_id)
                .ok_or(AccountError::UserNotFound(user_id))?;
            if user.balance < amount {
                return Err(AccountError::InsufficientBalance {
                    available: user.balance,
                    required: amount,
                });
            }
            user.balance -= amount;
            user.updated_at = Utc::now();
            user.balance
        };

        self.record(
            user_id,
            room_id,
            amount,
            balance_after,
            EntryDirection::Debit,
            entry_type,
        )
        .await;
        Ok(balance_after)
    }

    async fn credit(
        &self,
        user_id: UserId,
        room_id: &str,
        amount: Chips,
        entry_type: EntryType,
    ) -> AccountResult<Chips> {
        if amount <= 0 {
            return Err(AccountError::InvalidAmount(amount));
        }

        let balance_after = {
            let mut users = self.users.write().await;
            let user = users
                .get_mut(&user_id)
                .ok_or(AccountError::UserNotFound(user_id))?;
            user.balance += amount;
            user.updated_at = Utc::now();
            user.balance
        };

        self.record(
            user_id,
            room_id,
            amount,
            balance_after,
            EntryDirection::Credit,
            entry_type,
        )
        .await;
        Ok(balance_after)
    }

    async fn claim_seat(&self, user_id: UserId, room_id: &str) -> AccountResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or(AccountError::UserNotFound(user_id))?;
        match &user.seated_in {
            Some(current) if current != room_id => Err(AccountError::AlreadySeated(current.clone())),
            _ => {
                user.seated_in = Some(room_id.to_string());
                user.updated_at = Utc::now();
                Ok(())
            }
        }
    }

    async fn release_seat(&self, user_id: UserId) -> AccountResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or(AccountError::UserNotFound(user_id))?;
        user.seated_in = None;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_online(&self, user_id: UserId, online: bool) -> AccountResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&user_id)
            .ok_or(AccountError::UserNotFound(user_id))?;
        user.online = online;
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_user_gets_default_balance() {
        let accounts = InMemoryAccounts::default();
        let user = accounts.create_user("alice", "fox").await;
        assert_eq!(user.balance, 500);
        assert!(!user.online);
        assert_eq!(user.seated_in, None);
        assert_eq!(accounts.balance(user.id).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn test_debit_and_credit_are_recorded() {
        let accounts = InMemoryAccounts::new(1000);
        let user = accounts.create_user("bob", "owl").await;

        let after_bet = accounts
            .debit(user.id, "abcde", 100, EntryType::Bet)
            .await
            .unwrap();
        assert_eq!(after_bet, 900);

        let after_payout = accounts
            .credit(user.id, "abcde", 200, EntryType::Payout)
            .await
            .unwrap();
        assert_eq!(after_payout, 1100);

        let entries = accounts.entries_for(user.id).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].direction, EntryDirection::Debit);
        assert_eq!(entries[1].entry_type, EntryType::Payout);
        assert_eq!(entries[1].balance_after, 1100);
    }

    #[tokio::test]
    async fn test_debit_rejects_overdraft() {
        let accounts = InMemoryAccounts::new(50);
        let user = accounts.create_user("carol", "bee").await;
        let err = accounts
            .debit(user.id, "abcde", 100, EntryType::Bet)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientBalance {
                available: 50,
                required: 100
            }
        );
        assert_eq!(accounts.balance(user.id).await.unwrap(), 50);
        assert!(accounts.entries_for(user.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected() {
        let accounts = InMemoryAccounts::default();
        let user = accounts.create_user("dave", "cat").await;
        assert_eq!(
            accounts.credit(user.id, "abcde", 0, EntryType::Refund).await,
            Err(AccountError::InvalidAmount(0))
        );
        assert_eq!(
            accounts.debit(user.id, "abcde", -5, EntryType::Bet).await,
            Err(AccountError::InvalidAmount(-5))
        );
    }

    #[tokio::test]
    async fn test_user_holds_one_seat_system_wide() {
        let accounts = InMemoryAccounts::default();
        let user = accounts.create_user("erin", "dog").await;

        accounts.claim_seat(user.id, "room1").await.unwrap();
        accounts.claim_seat(user.id, "room1").await.unwrap();
        assert_eq!(
            accounts.claim_seat(user.id, "room2").await,
            Err(AccountError::AlreadySeated("room1".to_string()))
        );

        accounts.release_seat(user.id).await.unwrap();
        accounts.claim_seat(user.id, "room2").await.unwrap();
        assert_eq!(
            accounts.get_user(user.id).await.unwrap().seated_in.as_deref(),
            Some("room2")
        );
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let accounts = InMemoryAccounts::default();
        let id = Uuid::new_v4();
        assert_eq!(
            accounts.balance(id).await,
            Err(AccountError::UserNotFound(id))
        );
        assert_eq!(
            AccountError::UserNotFound(id).client_message(),
            "User not found"
        );
        assert_eq!(
            accounts.profile(id).await,
            Err(AccountError::UserNotFound(id))
        );
    }

    #[tokio::test]
    async fn test_profile_carries_display_fields() {
        let accounts = InMemoryAccounts::default();
        let user = accounts.create_user(" gus ", "yak").await;
        let profile = accounts.profile(user.id).await.unwrap();
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.name, "gus");
        assert_eq!(profile.avatar, "yak");
    }
}
