pub mod address_service;
pub mod coupon_service;
pub mod order_service;
pub mod pricing_service;
