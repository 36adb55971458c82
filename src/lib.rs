pub mod models;

pub mod api_client;
pub mod config;
pub mod error;

#[cfg(test)]
mod testing;
