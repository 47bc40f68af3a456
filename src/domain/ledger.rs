use crate::domain::policy::RoleKind;
use crate::domain::types::{Account, TransferReceipt};
use crate::error::{AppError, AppResult};

/// Upper bound on a credit amount requested at registration.
pub const SIGNUP_CREDIT_CAP: i32 = 10_000;

/// Credits granted on registration.
///
/// An explicit non-negative request wins over the role default, capped at
/// [`SIGNUP_CREDIT_CAP`]. Negative requests fall back to the role default.
pub fn signup_credits(role: RoleKind, requested: Option<i64>) -> i32 {
    match requested {
        Some(amount) if amount >= 0 => amount.min(SIGNUP_CREDIT_CAP as i64) as i32,
        _ => default_grant(role),
    }
}

fn default_grant(role: RoleKind) -> i32 {
    match role {
        RoleKind::Admin => 1000,
        RoleKind::Premium => 500,
        RoleKind::Standard => 100,
        RoleKind::Suspended | RoleKind::Other => 50,
    }
}

pub fn has_sufficient_funds(account: &Account, amount: i32) -> bool {
    account.credits >= amount
}

/// Administrative overwrite of a balance.
pub fn set_balance(account: &mut Account, new_balance: i32) -> AppResult<()> {
    if new_balance < 0 {
        return Err(AppError::InvalidAmount(
            "Credits cannot be negative".to_string(),
        ));
    }
    account.credits = new_balance;
    Ok(())
}

/// Move `amount` credits from `sender` to `receiver`.
///
/// Both accounts are left untouched unless every check passes.
pub fn transfer(
    sender: &mut Account,
    receiver: &mut Account,
    amount: i32,
) -> AppResult<TransferReceipt> {
    if amount <= 0 {
        return Err(AppError::InvalidAmount(
            "Transfer amount must be positive".to_string(),
        ));
    }
    if !has_sufficient_funds(sender, amount) {
        return Err(AppError::InsufficientFunds {
            balance: sender.credits,
            requested: amount,
        });
    }
    if sender.id == receiver.id {
        return Err(AppError::Validation(
            "Sender and receiver must be different users".to_string(),
        ));
    }

    let sender_balance = sender.credits - amount;
    let receiver_balance = receiver.credits.checked_add(amount).ok_or_else(|| {
        AppError::InvalidAmount("Receiver balance would overflow".to_string())
    })?;

    sender.credits = sender_balance;
    receiver.credits = receiver_balance;

    Ok(TransferReceipt {
        sender_id: sender.id,
        receiver_id: receiver.id,
        amount,
        sender_balance,
        receiver_balance,
    })
}
