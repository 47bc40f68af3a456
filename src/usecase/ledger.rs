use uuid::Uuid;

use crate::domain::policy::{can_mutate_credits, ensure};
use crate::domain::repository::AccountRepository;
use crate::domain::types::{Account, CurrentUser, TransferReceipt};
use crate::error::{AppError, AppResult};

// ── SetBalance ───────────────────────────────────────────────────────────────

pub struct SetBalanceUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> SetBalanceUseCase<A> {
    pub async fn execute(
        &self,
        caller: &CurrentUser,
        user_id: Uuid,
        credits: i64,
    ) -> AppResult<Account> {
        find_account(&self.accounts, user_id).await?;
        ensure(
            can_mutate_credits(caller, user_id),
            "You can only change your own credits",
        )?;

        let account = self
            .accounts
            .set_balance(user_id, to_credits(credits)?)
            .await?;

        tracing::info!(
            user_id = %user_id,
            by = %caller.id,
            credits = account.credits,
            "Credit balance set"
        );
        Ok(account)
    }
}

// ── TransferCredits ──────────────────────────────────────────────────────────

pub struct TransferCreditsInput {
    pub receiver_id: Uuid,
    pub amount: i64,
}

pub struct TransferCreditsUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> TransferCreditsUseCase<A> {
    pub async fn execute(
        &self,
        caller: &CurrentUser,
        sender_id: Uuid,
        input: TransferCreditsInput,
    ) -> AppResult<TransferReceipt> {
        find_account(&self.accounts, sender_id).await?;
        ensure(
            can_mutate_credits(caller, sender_id),
            "You can only transfer your own credits",
        )?;
        if input.amount <= 0 {
            return Err(AppError::InvalidAmount(
                "Transfer amount must be positive".to_string(),
            ));
        }
        let amount = to_credits(input.amount)?;
        find_account(&self.accounts, input.receiver_id).await?;

        let receipt = self
            .accounts
            .transfer(sender_id, input.receiver_id, amount)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    sender_id = %sender_id,
                    receiver_id = %input.receiver_id,
                    amount,
                    kind = e.kind(),
                    "Credit transfer refused"
                )
            })?;

        tracing::info!(
            sender_id = %receipt.sender_id,
            receiver_id = %receipt.receiver_id,
            amount = receipt.amount,
            by = %caller.id,
            "Credits transferred"
        );
        Ok(receipt)
    }
}

async fn find_account<A: AccountRepository>(accounts: &A, id: Uuid) -> AppResult<Account> {
    accounts
        .find_account(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}

fn to_credits(value: i64) -> AppResult<i32> {
    if value < 0 {
        return Err(AppError::InvalidAmount(
            "Credits cannot be negative".to_string(),
        ));
    }
    i32::try_from(value)
        .map_err(|_| AppError::InvalidAmount(format!("{} credits is out of range", value)))
}
