use sea_orm::entity::prelude::*;

/// One weekday of a cafe's schedule. `day_of_week` holds the English day
/// name; times are naive wall-clock values.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "opening_hours")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cafe_id: Uuid,
    pub day_of_week: String,
    pub open_time: Time,
    pub close_time: Time,
    pub is_closed: bool,
    #[sea_orm(column_name = "is_open_24_hours")]
    pub is_open_24_hours: bool,
    pub is_everyday_open: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cafes::Entity",
        from = "Column::CafeId",
        to = "super::cafes::Column::Id",
        on_delete = "Cascade"
    )]
    Cafes,
}

impl Related<super::cafes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cafes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
