mod access_tests;
mod auth_tests;
mod health_tests;
mod language_tests;
mod metrics_tests;
mod openapi_tests;
