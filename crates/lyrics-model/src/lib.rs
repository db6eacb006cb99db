pub mod song;
pub mod album;
pub mod emotion;
pub mod error;

pub use song::*;
pub use album::*;
pub use emotion::*;
pub use error::*;
