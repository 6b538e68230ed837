//! Wire-level building blocks: tag constants, width selection and the byte sink

pub mod format;
pub mod sink;
pub mod width;

pub use format::ExtType;
pub use sink::ByteSink;
pub use width::{Header, IntWidth, Prefix};
