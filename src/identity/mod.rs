pub mod account;

pub use account::{normalize_address, AptosAccount};
