//! Record property sources.

mod fixed;
mod remote;

pub use fixed::StaticPropertySource;
pub use remote::HttpPropertySource;
