use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub label: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cafe_payment_methods::Entity")]
    CafePaymentMethods,
}

impl Related<super::cafes::Entity> for Entity {
    fn to() -> RelationDef {
        super::cafe_payment_methods::Relation::Cafes.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::cafe_payment_methods::Relation::PaymentMethods.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
