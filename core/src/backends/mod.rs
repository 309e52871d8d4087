//! Concrete [`Connector`](crate::files::Connector) implementations.
//!
//! Backends depend on native libraries (libssh2, OpenSSL) and are gated
//! behind cargo features so the sync engine can be built and tested
//! without them.

#[cfg(feature = "ssh")]
pub mod ssh;
