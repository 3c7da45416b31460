//! bfhl-service: a single `/bfhl` endpoint that computes Fibonacci
//! sequences, prime filters, HCF/LCM, or forwards a short question to a
//! text generation API.

pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod services;
pub mod startup;
