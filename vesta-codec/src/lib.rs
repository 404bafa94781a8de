/// Shared re-export of minicbor across all Vesta crates
pub use minicbor;

/// Round-trip friendly common helper structs
pub mod utils;
