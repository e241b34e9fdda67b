//! Interactive navigation over analysis results
//!
//! The controller is a plain state machine: [`NavigationState::update`]
//! takes a [`Msg`] and returns [`Effect`]s. Loading runs on background
//! threads through [`Worker`], whose results come back as messages. The
//! terminal front end in `cli::tui` only decodes keys and draws state.

pub mod controller;
pub mod search;
pub mod state;
pub mod worker;

pub use controller::{Effect, Input, Msg};
pub use state::{Dataset, Flow, NavigationState, Row, SearchState, Side, View};
pub use worker::Worker;
