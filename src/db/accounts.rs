use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::domain::ledger;
use crate::domain::policy::RoleKind;
use crate::domain::repository::AccountRepository;
use crate::domain::types::{Account, TransferReceipt};
use crate::entities::{role, user};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct DbAccountRepository<'a> {
    pub db: &'a DatabaseConnection,
}

impl AccountRepository for DbAccountRepository<'_> {
    async fn find_account(&self, id: Uuid) -> AppResult<Option<Account>> {
        match user::Entity::find_by_id(id).one(self.db).await? {
            Some(model) => Ok(Some(account_from_model(self.db, &model).await?)),
            None => Ok(None),
        }
    }

    async fn set_balance(&self, id: Uuid, new_balance: i32) -> AppResult<Account> {
        let account = self
            .db
            .transaction::<_, Account, AppError>(|txn| {
                Box::pin(async move {
                    let model = lock_user(txn, id).await?;
                    let mut account = account_from_model(txn, &model).await?;
                    ledger::set_balance(&mut account, new_balance)?;

                    let mut active: user::ActiveModel = model.into();
                    active.credits = Set(account.credits);
                    active.update(txn).await?;

                    Ok(account)
                })
            })
            .await?;

        Ok(account)
    }

    async fn transfer(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        amount: i32,
    ) -> AppResult<TransferReceipt> {
        let receipt = self
            .db
            .transaction::<_, TransferReceipt, AppError>(|txn| {
                Box::pin(async move {
                    // Always lock the lower id first so crossing transfers cannot deadlock
                    let (sender_model, receiver_model) = if sender_id <= receiver_id {
                        let s = lock_user(txn, sender_id).await?;
                        let r = lock_user(txn, receiver_id).await?;
                        (s, r)
                    } else {
                        let r = lock_user(txn, receiver_id).await?;
                        let s = lock_user(txn, sender_id).await?;
                        (s, r)
                    };

                    let mut sender = account_from_model(txn, &sender_model).await?;
                    let mut receiver = account_from_model(txn, &receiver_model).await?;
                    let receipt = ledger::transfer(&mut sender, &mut receiver, amount)?;

                    let mut active: user::ActiveModel = sender_model.into();
                    active.credits = Set(sender.credits);
                    active.update(txn).await?;

                    let mut active: user::ActiveModel = receiver_model.into();
                    active.credits = Set(receiver.credits);
                    active.update(txn).await?;

                    Ok(receipt)
                })
            })
            .await?;

        Ok(receipt)
    }
}

/// `SELECT ... FOR UPDATE` on one user row.
async fn lock_user<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<user::Model> {
    user::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}

async fn account_from_model<C: ConnectionTrait>(
    conn: &C,
    model: &user::Model,
) -> AppResult<Account> {
    let role = role::Entity::find_by_id(model.role_id).one(conn).await?;

    Ok(Account {
        id: model.id,
        role: role
            .map(|r| RoleKind::from_title(&r.title))
            .unwrap_or(RoleKind::Other),
        credits: model.credits,
    })
}
