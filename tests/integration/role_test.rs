use uuid::Uuid;

use carpool_backend::domain::policy::RoleKind;
use carpool_backend::domain::repository::RoleRepository;
use carpool_backend::error::AppError;
use carpool_backend::usecase::roles::{
    AssignRoleUseCase, CreateRoleUseCase, DeleteRoleUseCase, ListRoleMembersUseCase,
    ListRolesUseCase, UpdateRoleUseCase,
};

use crate::helpers::{MockRoleRepo, caller};

fn admin() -> carpool_backend::domain::types::CurrentUser {
    caller(Uuid::new_v4(), RoleKind::Admin)
}

// ── CreateRoleUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_normalize_new_role_titles() {
    let repo = MockRoleRepo::seeded();
    let usecase = CreateRoleUseCase { roles: repo.clone() };

    let role = usecase
        .execute(&admin(), "driver", Some("Trip drivers"))
        .await
        .unwrap();

    assert_eq!(role.title, "ROLE_DRIVER");
    assert_eq!(role.users_count, 0);
    assert!(repo.find_role_by_title("driver").await.unwrap().is_some());
}

#[tokio::test]
async fn should_conflict_on_duplicate_title() {
    let usecase = CreateRoleUseCase {
        roles: MockRoleRepo::seeded(),
    };

    let result = usecase.execute(&admin(), "premium", None).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn should_forbid_non_admin_role_management() {
    let repo = MockRoleRepo::seeded();
    let premium = caller(Uuid::new_v4(), RoleKind::Premium);

    let created = CreateRoleUseCase { roles: repo.clone() }
        .execute(&premium, "driver", None)
        .await;
    let updated = UpdateRoleUseCase { roles: repo.clone() }
        .execute(&premium, 3, Some("member"), None)
        .await;
    let deleted = DeleteRoleUseCase { roles: repo.clone() }
        .execute(&premium, 4)
        .await;

    assert!(matches!(created, Err(AppError::Forbidden(_))));
    assert!(matches!(updated, Err(AppError::Forbidden(_))));
    assert!(matches!(deleted, Err(AppError::Forbidden(_))));
    assert_eq!(repo.list_roles().await.unwrap().len(), 4);
}

// ── DeleteRoleUseCase / AssignRoleUseCase ────────────────────────────────────

#[tokio::test]
async fn should_block_deleting_role_in_use_until_users_are_reassigned() {
    let user_id = Uuid::new_v4();
    let repo = MockRoleRepo::seeded().with_user(user_id, 3);
    let admin = admin();
    let delete = DeleteRoleUseCase { roles: repo.clone() };

    let result = delete.execute(&admin, 3).await;
    assert!(
        matches!(&result, Err(AppError::RoleInUse { title, users: 1 }) if title == "ROLE_USER"),
        "expected RoleInUse, got {result:?}"
    );

    let premium = AssignRoleUseCase { roles: repo.clone() }
        .execute(&admin, user_id, 2)
        .await
        .unwrap();
    assert_eq!(premium.users_count, 1);

    delete.execute(&admin, 3).await.unwrap();
    assert!(repo.find_role(3).await.unwrap().is_none());
}

#[tokio::test]
async fn should_report_unknown_user_or_role_on_assignment() {
    let user_id = Uuid::new_v4();
    let repo = MockRoleRepo::seeded().with_user(user_id, 3);
    let usecase = AssignRoleUseCase { roles: repo };

    assert!(matches!(
        usecase.execute(&admin(), user_id, 99).await,
        Err(AppError::NotFound(m)) if m.contains("Role")
    ));
    assert!(matches!(
        usecase.execute(&admin(), Uuid::new_v4(), 2).await,
        Err(AppError::NotFound(m)) if m.contains("User")
    ));
}

#[tokio::test]
async fn should_list_roles_with_user_counts() {
    let repo = MockRoleRepo::seeded()
        .with_user(Uuid::new_v4(), 3)
        .with_user(Uuid::new_v4(), 3)
        .with_user(Uuid::new_v4(), 1);

    let roles = ListRolesUseCase { roles: repo }.execute().await.unwrap();

    let counts: Vec<(String, u64)> = roles.into_iter().map(|r| (r.title, r.users_count)).collect();
    assert_eq!(
        counts,
        vec![
            ("ROLE_ADMIN".to_string(), 1),
            ("ROLE_PREMIUM".to_string(), 0),
            ("ROLE_USER".to_string(), 2),
            ("ROLE_SUSPENDED".to_string(), 0),
        ]
    );
}

#[tokio::test]
async fn should_list_members_of_a_role() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let repo = MockRoleRepo::seeded()
        .with_user(a, 2)
        .with_user(b, 2)
        .with_user(Uuid::new_v4(), 3);
    let usecase = ListRoleMembersUseCase { roles: repo };

    let (role, members) = usecase.execute(2).await.unwrap();
    let mut ids: Vec<Uuid> = members.iter().map(|m| m.id).collect();
    ids.sort();
    let mut expected = vec![a, b];
    expected.sort();

    assert_eq!(role.title, "ROLE_PREMIUM");
    assert_eq!(role.users_count, 2);
    assert_eq!(ids, expected);
    assert!(usecase.execute(4).await.unwrap().1.is_empty());
    assert!(matches!(usecase.execute(99).await, Err(AppError::NotFound(_))));
}
