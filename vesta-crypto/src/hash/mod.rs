mod digest;
mod hasher;

pub use digest::Hash;
pub use hasher::{hash_to_size, DigestSizeError, Hasher};
