use uuid::Uuid;

use carpool_backend::domain::ledger::signup_credits;
use carpool_backend::domain::policy::RoleKind;
use carpool_backend::error::AppError;
use carpool_backend::usecase::ledger::{
    SetBalanceUseCase, TransferCreditsInput, TransferCreditsUseCase,
};

use crate::helpers::{MockAccountRepo, account, caller};

// ── Signup grants ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_grant_role_defaults_and_cap_requested_amounts() {
    assert_eq!(signup_credits(RoleKind::Admin, None), 1000);
    assert_eq!(signup_credits(RoleKind::Premium, None), 500);
    assert_eq!(signup_credits(RoleKind::Standard, None), 100);
    assert_eq!(signup_credits(RoleKind::Other, None), 50);
    assert_eq!(signup_credits(RoleKind::Standard, Some(50_000)), 10_000);
    assert_eq!(signup_credits(RoleKind::Standard, Some(0)), 0);
    assert_eq!(signup_credits(RoleKind::Premium, Some(-5)), 500);
}

// ── TransferCreditsUseCase ───────────────────────────────────────────────────

#[tokio::test]
async fn should_move_exact_amount_and_conserve_total() {
    let alice = account(100, RoleKind::Standard);
    let bob = account(20, RoleKind::Standard);
    let repo = MockAccountRepo::new(vec![alice.clone(), bob.clone()]);
    let total = repo.total();

    let usecase = TransferCreditsUseCase {
        accounts: repo.clone(),
    };
    let receipt = usecase
        .execute(
            &caller(alice.id, RoleKind::Standard),
            alice.id,
            TransferCreditsInput {
                receiver_id: bob.id,
                amount: 30,
            },
        )
        .await
        .unwrap();

    assert_eq!(receipt.sender_balance, 70);
    assert_eq!(receipt.receiver_balance, 50);
    assert_eq!(repo.balance(alice.id), 70);
    assert_eq!(repo.balance(bob.id), 50);
    assert_eq!(repo.total(), total);
}

#[tokio::test]
async fn should_refuse_overdraft_and_leave_balances_untouched() {
    let alice = account(10, RoleKind::Standard);
    let bob = account(0, RoleKind::Standard);
    let repo = MockAccountRepo::new(vec![alice.clone(), bob.clone()]);

    let usecase = TransferCreditsUseCase {
        accounts: repo.clone(),
    };
    let result = usecase
        .execute(
            &caller(alice.id, RoleKind::Standard),
            alice.id,
            TransferCreditsInput {
                receiver_id: bob.id,
                amount: 11,
            },
        )
        .await;

    assert!(
        matches!(result, Err(AppError::InsufficientFunds { balance: 10, requested: 11 })),
        "expected InsufficientFunds, got {result:?}"
    );
    assert_eq!(repo.balance(alice.id), 10);
    assert_eq!(repo.balance(bob.id), 0);
}

#[tokio::test]
async fn should_report_missing_funds_before_self_transfer() {
    let alice = account(10, RoleKind::Standard);
    let repo = MockAccountRepo::new(vec![alice.clone()]);
    let usecase = TransferCreditsUseCase {
        accounts: repo.clone(),
    };
    let me = caller(alice.id, RoleKind::Standard);
    let to_self = |amount| TransferCreditsInput {
        receiver_id: alice.id,
        amount,
    };

    let over = usecase.execute(&me, alice.id, to_self(11)).await;
    assert!(
        matches!(over, Err(AppError::InsufficientFunds { balance: 10, requested: 11 })),
        "expected InsufficientFunds, got {over:?}"
    );
    let within = usecase.execute(&me, alice.id, to_self(5)).await;
    assert!(matches!(within, Err(AppError::Validation(_))));
    assert_eq!(repo.balance(alice.id), 10);
}

#[tokio::test]
async fn should_allow_spending_the_whole_balance() {
    let alice = account(10, RoleKind::Standard);
    let bob = account(0, RoleKind::Standard);
    let repo = MockAccountRepo::new(vec![alice.clone(), bob.clone()]);

    let usecase = TransferCreditsUseCase {
        accounts: repo.clone(),
    };
    usecase
        .execute(
            &caller(alice.id, RoleKind::Standard),
            alice.id,
            TransferCreditsInput {
                receiver_id: bob.id,
                amount: 10,
            },
        )
        .await
        .unwrap();

    assert_eq!(repo.balance(alice.id), 0);
    assert_eq!(repo.balance(bob.id), 10);
}

#[tokio::test]
async fn should_reject_non_positive_amounts() {
    let alice = account(10, RoleKind::Standard);
    let bob = account(0, RoleKind::Standard);
    let repo = MockAccountRepo::new(vec![alice.clone(), bob.clone()]);
    let usecase = TransferCreditsUseCase { accounts: repo };

    for amount in [0, -1] {
        let result = usecase
            .execute(
                &caller(alice.id, RoleKind::Standard),
                alice.id,
                TransferCreditsInput {
                    receiver_id: bob.id,
                    amount,
                },
            )
            .await;
        assert!(
            matches!(result, Err(AppError::InvalidAmount(_))),
            "amount {amount}: got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_forbid_sending_from_someone_elses_account() {
    let alice = account(100, RoleKind::Standard);
    let bob = account(0, RoleKind::Standard);
    let repo = MockAccountRepo::new(vec![alice.clone(), bob.clone()]);

    let usecase = TransferCreditsUseCase {
        accounts: repo.clone(),
    };
    let result = usecase
        .execute(
            &caller(bob.id, RoleKind::Standard),
            alice.id,
            TransferCreditsInput {
                receiver_id: bob.id,
                amount: 50,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(repo.balance(alice.id), 100);
}

#[tokio::test]
async fn should_report_unknown_receiver() {
    let alice = account(100, RoleKind::Standard);
    let repo = MockAccountRepo::new(vec![alice.clone()]);

    let usecase = TransferCreditsUseCase { accounts: repo };
    let result = usecase
        .execute(
            &caller(alice.id, RoleKind::Standard),
            alice.id,
            TransferCreditsInput {
                receiver_id: Uuid::new_v4(),
                amount: 5,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn should_never_go_negative_over_a_series_of_transfers() {
    let a = account(40, RoleKind::Standard);
    let b = account(15, RoleKind::Premium);
    let repo = MockAccountRepo::new(vec![a.clone(), b.clone()]);
    let total = repo.total();
    let admin = caller(Uuid::new_v4(), RoleKind::Admin);
    let usecase = TransferCreditsUseCase {
        accounts: repo.clone(),
    };

    let moves = [(a.id, b.id, 25), (b.id, a.id, 60), (a.id, b.id, 16), (a.id, b.id, 1)];
    for (from, to, amount) in moves {
        let _ = usecase
            .execute(&admin, from, TransferCreditsInput { receiver_id: to, amount })
            .await;
        assert!(repo.balance(a.id) >= 0);
        assert!(repo.balance(b.id) >= 0);
        assert_eq!(repo.total(), total);
    }
}

// ── SetBalanceUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_forbid_non_admin_setting_another_users_credits() {
    let alice = account(100, RoleKind::Standard);
    let bob = account(5, RoleKind::Standard);
    let repo = MockAccountRepo::new(vec![alice.clone(), bob.clone()]);

    let usecase = SetBalanceUseCase {
        accounts: repo.clone(),
    };
    let result = usecase
        .execute(&caller(alice.id, RoleKind::Standard), bob.id, 9999)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(repo.balance(bob.id), 5);
}

#[tokio::test]
async fn should_let_admin_correct_any_balance() {
    let bob = account(5, RoleKind::Standard);
    let repo = MockAccountRepo::new(vec![bob.clone()]);

    let usecase = SetBalanceUseCase {
        accounts: repo.clone(),
    };
    let updated = usecase
        .execute(&caller(Uuid::new_v4(), RoleKind::Admin), bob.id, 250)
        .await
        .unwrap();

    assert_eq!(updated.credits, 250);
    assert_eq!(repo.balance(bob.id), 250);
}

#[tokio::test]
async fn should_reject_negative_balance() {
    let alice = account(100, RoleKind::Standard);
    let repo = MockAccountRepo::new(vec![alice.clone()]);

    let usecase = SetBalanceUseCase {
        accounts: repo.clone(),
    };
    let result = usecase
        .execute(&caller(alice.id, RoleKind::Standard), alice.id, -1)
        .await;

    assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    assert_eq!(repo.balance(alice.id), 100);
}
