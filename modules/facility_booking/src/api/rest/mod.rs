pub mod dto;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod principal;
pub mod routes;
