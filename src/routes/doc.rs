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
    cart::CartLine,
    dto::{
        addresses::{AddressInput, AddressList},
        coupons::{ApplyCouponRequest, ApplyCouponResponse},
        orders::{CheckoutRequest, CheckoutResponse, ConfirmPaymentRequest, OrderList, OrderPlaced},
        pricing::{AppliedCoupon, QuoteRequest, QuoteResponse, ShippingRateList},
    },
    models::{Address, Coupon, DiscountType, Order, ShippingRate},
    pricing::Quote,
    response::{ApiResponse, Meta},
    routes::{addresses, coupons, health, orders, params, pricing},
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
        pricing::quote,
        pricing::list_shipping_rates,
        coupons::apply_coupon,
        addresses::list_addresses,
        addresses::create_address,
        addresses::update_address,
        orders::list_orders,
        orders::checkout,
        orders::confirm_payment,
        orders::get_order,
    ),
    components(
        schemas(
            CartLine,
            Coupon,
            DiscountType,
            ShippingRate,
            Address,
            Order,
            Quote,
            QuoteRequest,
            QuoteResponse,
            ShippingRateList,
            AppliedCoupon,
            ApplyCouponRequest,
            ApplyCouponResponse,
            AddressInput,
            AddressList,
            CheckoutRequest,
            CheckoutResponse,
            ConfirmPaymentRequest,
            OrderPlaced,
            OrderList,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<QuoteResponse>,
            ApiResponse<ApplyCouponResponse>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<OrderPlaced>,
            ApiResponse<OrderList>,
            ApiResponse<AddressList>,
            ApiResponse<ShippingRateList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Pricing", description = "Cart price breakdown"),
        (name = "Coupons", description = "Coupon application"),
        (name = "Addresses", description = "Saved shipping addresses"),
        (name = "Orders", description = "Checkout and order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
