use uuid::Uuid;

use crate::domain::repository::{ReviewRepository, TripRepository};
use crate::domain::types::{NewReview, ReviewChanges, ReviewFilter, TripStage};
use crate::entities::review;
use crate::error::{AppError, AppResult};
use crate::usecase::trips::find_trip;

// ── ListReviews ──────────────────────────────────────────────────────────────

pub struct ListReviewsUseCase<V: ReviewRepository, T: TripRepository> {
    pub reviews: V,
    pub trips: T,
}

impl<V: ReviewRepository, T: TripRepository> ListReviewsUseCase<V, T> {
    /// Filtering by trip requires the trip to exist as a finished trip.
    pub async fn execute(&self, filter: ReviewFilter) -> AppResult<Vec<review::Model>> {
        if let Some(trip_id) = filter.trip_id {
            find_trip(&self.trips, TripStage::Finished, trip_id).await?;
        }
        self.reviews.list_reviews(filter).await
    }
}

// ── FindReview ───────────────────────────────────────────────────────────────

pub struct FindReviewUseCase<V: ReviewRepository> {
    pub reviews: V,
}

impl<V: ReviewRepository> FindReviewUseCase<V> {
    pub async fn execute(&self, id: Uuid) -> AppResult<review::Model> {
        self.reviews
            .find_review(id)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

// ── CreateReview ─────────────────────────────────────────────────────────────

pub struct CreateReviewUseCase<V: ReviewRepository, T: TripRepository> {
    pub reviews: V,
    pub trips: T,
}

impl<V: ReviewRepository, T: TripRepository> CreateReviewUseCase<V, T> {
    pub async fn execute(&self, review: NewReview) -> AppResult<review::Model> {
        let mut missing = Vec::new();
        if review.author_name.trim().is_empty() {
            missing.push("author_name");
        }
        if review.comment.trim().is_empty() {
            missing.push("comment");
        }
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "The following fields are required: {}",
                missing.join(", ")
            )));
        }
        if let Some(trip_id) = review.trip_id {
            find_trip(&self.trips, TripStage::Finished, trip_id).await?;
        }

        let created = self.reviews.create_review(review).await?;
        tracing::info!(review_id = %created.id, kind = ?created.kind, "Review created");
        Ok(created)
    }
}

// ── UpdateReview ─────────────────────────────────────────────────────────────

pub struct UpdateReviewUseCase<V: ReviewRepository> {
    pub reviews: V,
}

impl<V: ReviewRepository> UpdateReviewUseCase<V> {
    pub async fn execute(&self, id: Uuid, changes: ReviewChanges) -> AppResult<review::Model> {
        if changes.comment.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(AppError::Validation("comment cannot be blank".to_string()));
        }
        self.reviews
            .update_review(id, changes)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

// ── DeleteReview ─────────────────────────────────────────────────────────────

pub struct DeleteReviewUseCase<V: ReviewRepository> {
    pub reviews: V,
}

impl<V: ReviewRepository> DeleteReviewUseCase<V> {
    pub async fn execute(&self, id: Uuid) -> AppResult<()> {
        if !self.reviews.delete_review(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(review_id = %id, "Review deleted");
        Ok(())
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Review {} not found", id))
}
