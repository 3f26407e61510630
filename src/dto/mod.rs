pub mod addresses;
pub mod coupons;
pub mod orders;
pub mod pricing;
