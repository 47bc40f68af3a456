use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::policy::{ensure_role_deletable, normalize_role_title};
use crate::domain::repository::RoleRepository;
use crate::domain::types::{RoleMember, RoleRecord};
use crate::entities::{role, user};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct DbRoleRepository<'a> {
    pub db: &'a DatabaseConnection,
}

impl RoleRepository for DbRoleRepository<'_> {
    async fn find_role(&self, id: i32) -> AppResult<Option<RoleRecord>> {
        match role::Entity::find_by_id(id).one(self.db).await? {
            Some(model) => Ok(Some(record_from_model(self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_role_by_title(&self, title: &str) -> AppResult<Option<RoleRecord>> {
        let found = role::Entity::find()
            .filter(role::Column::Title.eq(normalize_role_title(title)))
            .one(self.db)
            .await?;

        match found {
            Some(model) => Ok(Some(record_from_model(self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        let roles = role::Entity::find()
            .order_by_asc(role::Column::Id)
            .all(self.db)
            .await?;

        let mut records = Vec::with_capacity(roles.len());
        for model in roles {
            records.push(record_from_model(self.db, model).await?);
        }
        Ok(records)
    }

    async fn list_role_members(&self, id: i32) -> AppResult<Vec<RoleMember>> {
        let users = user::Entity::find()
            .filter(user::Column::RoleId.eq(id))
            .order_by_asc(user::Column::Email)
            .all(self.db)
            .await?;

        Ok(users
            .into_iter()
            .map(|u| RoleMember {
                id: u.id,
                email: u.email,
                first_name: u.first_name,
                last_name: u.last_name,
            })
            .collect())
    }

    async fn create_role(&self, title: &str, description: Option<&str>) -> AppResult<RoleRecord> {
        let title = normalize_role_title(title);
        if title_taken(self.db, &title, None).await? {
            return Err(AppError::Conflict(format!("Role {} already exists", title)));
        }

        let model = role::ActiveModel {
            title: Set(title),
            description: Set(description.map(str::to_string)),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(RoleRecord {
            id: model.id,
            title: model.title,
            description: model.description,
            users_count: 0,
        })
    }

    async fn update_role(
        &self,
        id: i32,
        title: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<RoleRecord> {
        let model = role::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role {} not found", id)))?;

        let mut active: role::ActiveModel = model.into();
        if let Some(title) = title {
            let title = normalize_role_title(title);
            if title_taken(self.db, &title, Some(id)).await? {
                return Err(AppError::Conflict(format!("Role {} already exists", title)));
            }
            active.title = Set(title);
        }
        if let Some(description) = description {
            active.description = Set(Some(description.to_string()));
        }

        let model = active.update(self.db).await?;
        record_from_model(self.db, model).await
    }

    async fn delete_role(&self, id: i32) -> AppResult<()> {
        self.db
            .transaction::<_, (), AppError>(|txn| {
                Box::pin(async move {
                    let model = role::Entity::find_by_id(id)
                        .lock_exclusive()
                        .one(txn)
                        .await?
                        .ok_or_else(|| AppError::NotFound(format!("Role {} not found", id)))?;

                    let users = users_with_role(txn, id).await?;
                    ensure_role_deletable(&model.title, users)?;

                    role::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(())
                })
            })
            .await?;
        Ok(())
    }

    async fn assign_role(&self, user_id: Uuid, role_id: i32) -> AppResult<bool> {
        let Some(model) = user::Entity::find_by_id(user_id).one(self.db).await? else {
            return Ok(false);
        };

        let mut active: user::ActiveModel = model.into();
        active.role_id = Set(role_id);
        active.update(self.db).await?;
        Ok(true)
    }
}

async fn users_with_role<C: ConnectionTrait>(conn: &C, role_id: i32) -> AppResult<u64> {
    Ok(user::Entity::find()
        .filter(user::Column::RoleId.eq(role_id))
        .count(conn)
        .await?)
}

async fn title_taken<C: ConnectionTrait>(
    conn: &C,
    title: &str,
    except: Option<i32>,
) -> AppResult<bool> {
    let mut query = role::Entity::find().filter(role::Column::Title.eq(title));
    if let Some(id) = except {
        query = query.filter(role::Column::Id.ne(id));
    }
    Ok(query.one(conn).await?.is_some())
}

async fn record_from_model<C: ConnectionTrait>(conn: &C, model: role::Model) -> AppResult<RoleRecord> {
    let users_count = users_with_role(conn, model.id).await?;
    Ok(RoleRecord {
        id: model.id,
        title: model.title,
        description: model.description,
        users_count,
    })
}
