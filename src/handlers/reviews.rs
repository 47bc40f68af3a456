use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::types::{NewReview, ReviewChanges, ReviewFilter, ReviewKind, RECENT_LIMIT};
use crate::entities::review;
use crate::error::AppResult;
use crate::usecase::reviews::{
    CreateReviewUseCase, DeleteReviewUseCase, FindReviewUseCase, ListReviewsUseCase,
    UpdateReviewUseCase,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub kind: Option<ReviewKind>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    #[serde(default = "default_kind")]
    pub kind: ReviewKind,
    pub author_name: String,
    pub rating: Option<i32>,
    pub comment: String,
    pub trip_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub author_name: Option<String>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

fn default_kind() -> ReviewKind {
    ReviewKind::Feedback
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> AppResult<Json<Vec<review::Model>>> {
    list(
        &state,
        ReviewFilter {
            kind: query.kind,
            ..ReviewFilter::default()
        },
    )
    .await
}

/// Reviews carrying a rating
pub async fn list_rated_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> AppResult<Json<Vec<review::Model>>> {
    list(
        &state,
        ReviewFilter {
            kind: query.kind,
            rated_only: true,
            ..ReviewFilter::default()
        },
    )
    .await
}

/// The newest reviews, optionally of one kind
pub async fn list_recent_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> AppResult<Json<Vec<review::Model>>> {
    list(
        &state,
        ReviewFilter {
            kind: query.kind,
            limit: Some(RECENT_LIMIT),
            ..ReviewFilter::default()
        },
    )
    .await
}

/// Reviews of one finished trip
pub async fn list_trip_reviews(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Query(query): Query<ReviewListQuery>,
) -> AppResult<Json<Vec<review::Model>>> {
    list(
        &state,
        ReviewFilter {
            kind: query.kind,
            trip_id: Some(trip_id),
            ..ReviewFilter::default()
        },
    )
    .await
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<review::Model>> {
    let usecase = FindReviewUseCase {
        reviews: state.review_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

pub async fn create_review(
    State(state): State<AppState>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<review::Model>> {
    let usecase = CreateReviewUseCase {
        reviews: state.review_repo(),
        trips: state.trip_repo(),
    };
    let created = usecase
        .execute(NewReview {
            kind: payload.kind,
            author_name: payload.author_name.trim().to_string(),
            rating: payload.rating,
            comment: payload.comment,
            trip_id: payload.trip_id,
        })
        .await?;
    Ok(Json(created))
}

pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> AppResult<Json<review::Model>> {
    let usecase = UpdateReviewUseCase {
        reviews: state.review_repo(),
    };
    let updated = usecase
        .execute(
            id,
            ReviewChanges {
                author_name: payload.author_name,
                rating: payload.rating,
                comment: payload.comment,
            },
        )
        .await?;
    Ok(Json(updated))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let usecase = DeleteReviewUseCase {
        reviews: state.review_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(serde_json::json!({"message": "Review deleted successfully"})))
}

async fn list(state: &AppState, filter: ReviewFilter) -> AppResult<Json<Vec<review::Model>>> {
    let usecase = ListReviewsUseCase {
        reviews: state.review_repo(),
        trips: state.trip_repo(),
    };
    Ok(Json(usecase.execute(filter).await?))
}
