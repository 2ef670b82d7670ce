pub mod dh;
pub mod encode;
pub mod error;
pub mod filter;
pub mod math;
pub mod search;
pub mod xor;

pub use error::{Error, Result};
