use sea_orm::entity::prelude::*;

/// Unique on (user_id, reservation_id).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub reservation_id: Uuid,
    pub date: Date,
    pub slot: String,
    pub check_in_time: DateTimeUtc,
    pub scanned_by: Uuid,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
