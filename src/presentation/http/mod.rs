//! HTTP Layer
//!
//! Routes, handlers, request extractors and the OpenAPI document.

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
