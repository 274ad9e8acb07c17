//! Infrastructure Layer
//!
//! Adapters binding the ports to Postgres, Stripe and NATS.

pub mod events;
pub mod postgres;
pub mod stripe;

pub use events::EventPublisher;
pub use postgres::PgStore;
pub use stripe::StripeGateway;
