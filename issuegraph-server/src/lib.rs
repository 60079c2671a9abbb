pub mod browser;
pub mod http;
