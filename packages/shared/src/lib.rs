//! Utilities shared by the Filedrop binaries.

pub mod logger;
