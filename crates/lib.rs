pub mod discord;
pub mod domain;
pub mod infra;
pub mod observability;
pub mod payments;

#[cfg(test)]
mod http_stub;
