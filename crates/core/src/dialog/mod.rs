pub mod extract;
pub mod respond;
pub mod types;
pub mod validate;
