//! gitpulse - Branch divergence and commit activity explorer
//!
//! Reads a git repository through a [`git::CommitSource`], computes how two
//! refs diverged and how one ref's history is distributed over time, and
//! lets the user browse the results in a terminal UI.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod git;
pub mod navigation;
pub mod reporters;
