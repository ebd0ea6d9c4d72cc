pub mod caption;

pub use caption::*;
