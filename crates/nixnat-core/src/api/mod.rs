//! API implementation submodules.
//!
//! Each submodule contains `impl XnatApi` blocks; the struct itself lives in
//! `lib.rs`.

mod listing;
mod sync;
mod upload;
