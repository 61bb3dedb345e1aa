pub mod https;
pub mod tls;
