//! Aggregates module
pub mod product;
pub mod order;
pub mod coupon;

pub use product::{Product, ProductSource, StandardProduct, CustomProduct};
pub use order::{Order, OrderStatus, Channel, Customer, ProductSnapshot, NewDeliveryOrder, DeliveryOrderRecord, NOT_AVAILABLE};
pub use coupon::Coupon;
