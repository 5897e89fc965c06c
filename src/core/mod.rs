//! Core translation engine module

pub mod backend;
pub mod config;
pub mod errors;
pub mod marian;
pub mod models;
pub mod registry;
pub mod translator;
