//! Deterministic frame-stepped simulation core for a two-fighter fighting game

pub mod bot;
pub mod config;
pub mod game;
pub mod util;
