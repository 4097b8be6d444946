pub mod types;
pub mod kdf;
pub mod cipher;
pub mod digest;

pub use types::*;
pub use kdf::*;
pub use cipher::*;
pub use digest::*;
