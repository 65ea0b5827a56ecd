pub mod application;
pub mod auth;
pub mod cli;
pub mod domain;
pub mod http;
pub mod io;
pub mod storage;

pub use domain::*;
pub use storage::Repository;
