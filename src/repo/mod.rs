pub mod accounts;
pub mod payments;
pub mod rates;
