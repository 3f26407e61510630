pub mod addresses;
pub mod coupons;
pub mod orders;
pub mod shipping_rates;

pub use addresses::Entity as Addresses;
pub use coupons::Entity as Coupons;
pub use orders::Entity as Orders;
pub use shipping_rates::Entity as ShippingRates;
