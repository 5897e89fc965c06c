//! HTTP layer

pub mod api;
pub mod form;
