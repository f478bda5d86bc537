pub mod checkout;
pub mod common;
pub mod health;
pub mod orders;
pub mod products;
