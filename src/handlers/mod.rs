pub mod dictionary;
pub mod filter;
