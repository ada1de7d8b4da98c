//! Email-classification dashboard fed by a published spreadsheet export.
//!
//! `feed` fetches and parses the CSV, `refresh` runs the periodic cycle and
//! owns the resulting state, `dashboard` derives what gets drawn, and
//! `terminal` / `daemon` are the two front ends.

pub mod config;
pub mod daemon;
pub mod dashboard;
pub mod domain;
pub mod feed;
pub mod refresh;
pub mod terminal;
