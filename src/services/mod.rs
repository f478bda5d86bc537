pub mod catalog;
pub mod checkout;
pub mod gateway;
pub mod orders;
