//! Password hashing capability
//!
//! Exposes hashing as an opaque `make`/`verify` capability behind the
//! [`Hasher`] trait, with Argon2id as the default driver. Consumers hold a
//! `dyn Hasher` so the algorithm can be swapped without touching callers.
//!
//! # Examples
//!
//! ```
//! use hash::Hasher;
//! use hash::drivers::Argon2Hasher;
//!
//! let hasher = Argon2Hasher::new();
//! let hashed = hasher.make("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hashed).unwrap());
//! assert!(!hasher.verify("wrong_password", &hashed).unwrap());
//! ```

pub mod drivers;
pub mod errors;
pub mod hasher;

// Re-export commonly used items
pub use drivers::Argon2Hasher;
pub use errors::HashError;
pub use hasher::Hasher;
