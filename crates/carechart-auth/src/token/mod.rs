//! Signed session tokens (HS256 JWT).

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::Claims;
pub use decoder::TokenDecoder;
pub use encoder::TokenEncoder;
