pub mod context;
pub mod currency;
pub mod quote;
