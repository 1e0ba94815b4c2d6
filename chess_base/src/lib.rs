//! # Base types for blindchess
//!
//! This is an auxiliary crate for `blindchess` which contains board coordinates, pieces
//! and a few geometry helpers. It has no game logic of its own.
//!
//! Normally you don't want to use this crate directly. Use `blindchess` instead.

pub mod bitboard;
pub mod geometry;
pub mod types;
