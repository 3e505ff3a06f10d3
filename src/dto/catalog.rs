use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Facility, PaymentMethod};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilityRequest {
    pub code: String,
    pub label: String,
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacilityRequest {
    pub code: Option<String>,
    pub label: Option<String>,
    /// An empty string clears the icon.
    pub icon: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FacilityList {
    pub items: Vec<Facility>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CafeRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDetail {
    #[serde(flatten)]
    pub facility: Facility,
    pub cafes: Vec<CafeRef>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentMethodRequest {
    pub code: String,
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentMethodList {
    pub items: Vec<PaymentMethod>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CafeIdQuery {
    pub cafe_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceCafeFacilitiesRequest {
    pub cafe_id: Uuid,
    #[serde(default)]
    pub facility_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CafePaymentMethodRequest {
    pub cafe_id: Uuid,
    pub payment_method_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub cafes: u64,
    pub facilities: u64,
    pub payment_methods: u64,
    pub users: u64,
}
