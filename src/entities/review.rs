use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rider feedback and validation feedback share one table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "review_kind")]
#[serde(rename_all = "snake_case")]
pub enum ReviewKind {
    #[sea_orm(string_value = "feedback")]
    Feedback,
    #[sea_orm(string_value = "validation")]
    Validation,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: ReviewKind,
    pub author_name: String,
    pub rating: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    pub trip_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trip::Entity",
        from = "Column::TripId",
        to = "super::trip::Column::Id"
    )]
    Trip,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
