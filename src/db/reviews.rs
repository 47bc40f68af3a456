use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::repository::ReviewRepository;
use crate::domain::types::{NewReview, ReviewChanges, ReviewFilter};
use crate::entities::review;
use crate::error::AppResult;

#[derive(Clone)]
pub struct DbReviewRepository<'a> {
    pub db: &'a DatabaseConnection,
}

impl ReviewRepository for DbReviewRepository<'_> {
    async fn list_reviews(&self, filter: ReviewFilter) -> AppResult<Vec<review::Model>> {
        let mut query = review::Entity::find().order_by_desc(review::Column::CreatedAt);
        if let Some(kind) = filter.kind {
            query = query.filter(review::Column::Kind.eq(kind));
        }
        if filter.rated_only {
            query = query.filter(review::Column::Rating.gt(0));
        }
        if let Some(trip_id) = filter.trip_id {
            query = query.filter(review::Column::TripId.eq(trip_id));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        Ok(query.all(self.db).await?)
    }

    async fn find_review(&self, id: Uuid) -> AppResult<Option<review::Model>> {
        Ok(review::Entity::find_by_id(id).one(self.db).await?)
    }

    async fn create_review(&self, new: NewReview) -> AppResult<review::Model> {
        let model = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(new.kind),
            author_name: Set(new.author_name),
            rating: Set(new.rating),
            comment: Set(new.comment),
            trip_id: Set(new.trip_id),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(model)
    }

    async fn update_review(
        &self,
        id: Uuid,
        changes: ReviewChanges,
    ) -> AppResult<Option<review::Model>> {
        let Some(model) = review::Entity::find_by_id(id).one(self.db).await? else {
            return Ok(None);
        };

        let mut active: review::ActiveModel = model.into();
        if let Some(author_name) = changes.author_name {
            active.author_name = Set(author_name);
        }
        if let Some(rating) = changes.rating {
            active.rating = Set(Some(rating));
        }
        if let Some(comment) = changes.comment {
            active.comment = Set(comment);
        }

        Ok(Some(active.update(self.db).await?))
    }

    async fn delete_review(&self, id: Uuid) -> AppResult<bool> {
        let result = review::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(result.rows_affected > 0)
    }
}
