//! Library crate for leaderboard-back, exposing the HTTP service layers and
//! the leaderboard sync engine for binaries and integration tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod sync;
