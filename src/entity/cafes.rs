use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cafes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub google_maps_url: Option<String>,
    pub instagram_url: Option<String>,
    pub instagram_username: Option<String>,
    pub parking: Option<String>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub price_range: Option<String>,
    pub main_image_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cafe_images::Entity")]
    CafeImages,
    #[sea_orm(has_many = "super::opening_hours::Entity")]
    OpeningHours,
    #[sea_orm(has_many = "super::cafe_facilities::Entity")]
    CafeFacilities,
    #[sea_orm(has_many = "super::cafe_payment_methods::Entity")]
    CafePaymentMethods,
    #[sea_orm(has_many = "super::favorites::Entity")]
    Favorites,
}

impl Related<super::cafe_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CafeImages.def()
    }
}

impl Related<super::opening_hours::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OpeningHours.def()
    }
}

impl Related<super::facilities::Entity> for Entity {
    fn to() -> RelationDef {
        super::cafe_facilities::Relation::Facilities.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::cafe_facilities::Relation::Cafes.def().rev())
    }
}

impl Related<super::payment_methods::Entity> for Entity {
    fn to() -> RelationDef {
        super::cafe_payment_methods::Relation::PaymentMethods.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::cafe_payment_methods::Relation::Cafes.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
