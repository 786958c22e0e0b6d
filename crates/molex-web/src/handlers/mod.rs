//! HTTP handlers for all web routes.

pub mod dashboard;
pub mod panels;
pub mod api;
