use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    directory::CafeListing,
    dto::{
        auth::{LoginRequest, LoginResponse},
        cafes::{
            CafeList, CafeListingList, CafeStatus, CreateCafeRequest, DayHours, UpdateCafeRequest,
        },
        catalog::{
            AdminStats, CafePaymentMethodRequest, CafeRef, CreateFacilityRequest,
            CreatePaymentMethodRequest, FacilityDetail, FacilityList, PaymentMethodList,
            ReplaceCafeFacilitiesRequest, UpdateFacilityRequest,
        },
        favorites::{AddFavoriteRequest, FavoriteCafeList, FavoriteState},
        images::{CafeImageList, CreateCafeImageRequest, SetMainImageRequest, UploadResponse},
        opening_hours::{
            CreateOpeningHourRequest, EverydayHoursRequest, OpeningHourList,
            UpdateOpeningHourRequest,
        },
        users::{CreateUserRequest, UpdateUserRequest, UserList},
    },
    models::{CafeDetail, CafeImage, CafeSummary, Facility, OpeningHour, PaymentMethod, User},
    opening_hours::{DayOfWeek, Locale, StatusReason},
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, cafes, facilities, favorites, health, images, opening_hours, params,
        payment_methods, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::me,
        cafes::list_cafes,
        cafes::search_cafes,
        cafes::get_cafe,
        cafes::cafe_status,
        cafes::create_cafe,
        cafes::update_cafe,
        cafes::delete_cafe,
        facilities::list_facilities,
        facilities::get_facility,
        facilities::create_facility,
        facilities::update_facility,
        facilities::delete_facility,
        facilities::list_cafe_facilities,
        facilities::replace_cafe_facilities,
        payment_methods::list_payment_methods,
        payment_methods::create_payment_method,
        payment_methods::delete_payment_method,
        payment_methods::list_cafe_payment_methods,
        payment_methods::link_cafe_payment_method,
        payment_methods::unlink_cafe_payment_method,
        opening_hours::list_opening_hours,
        opening_hours::create_opening_hour,
        opening_hours::update_opening_hour,
        opening_hours::apply_everyday,
        images::list_images,
        images::create_image,
        images::delete_image,
        images::set_main_image,
        images::upload,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        favorites::toggle_favorite,
        admin::stats
    ),
    components(
        schemas(
            User,
            CafeSummary,
            CafeDetail,
            CafeListing,
            CafeImage,
            Facility,
            PaymentMethod,
            OpeningHour,
            DayOfWeek,
            Locale,
            StatusReason,
            CafeStatus,
            DayHours,
            CafeRef,
            FacilityDetail,
            AdminStats,
            LoginRequest,
            LoginResponse,
            CreateCafeRequest,
            UpdateCafeRequest,
            CreateFacilityRequest,
            UpdateFacilityRequest,
            CreatePaymentMethodRequest,
            ReplaceCafeFacilitiesRequest,
            CafePaymentMethodRequest,
            CreateOpeningHourRequest,
            UpdateOpeningHourRequest,
            EverydayHoursRequest,
            CreateCafeImageRequest,
            SetMainImageRequest,
            UploadResponse,
            CreateUserRequest,
            UpdateUserRequest,
            AddFavoriteRequest,
            FavoriteState,
            CafeList,
            CafeListingList,
            FacilityList,
            PaymentMethodList,
            OpeningHourList,
            CafeImageList,
            UserList,
            FavoriteCafeList,
            params::Pagination,
            health::HealthData,
            Meta,
            ApiResponse<CafeDetail>,
            ApiResponse<CafeList>,
            ApiResponse<CafeListingList>,
            ApiResponse<CafeStatus>,
            ApiResponse<User>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Cafes", description = "Cafe directory, search and open status"),
        (name = "Facilities", description = "Facility catalog and cafe facility sets"),
        (name = "Payment Methods", description = "Payment method catalog and cafe links"),
        (name = "Opening Hours", description = "Weekly opening hours"),
        (name = "Images", description = "Cafe images and uploads"),
        (name = "Users", description = "Account management"),
        (name = "Favorites", description = "Favorite cafes of the signed-in user"),
        (name = "Admin", description = "Admin dashboard endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
