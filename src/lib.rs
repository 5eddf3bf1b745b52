//! salesreq: a conversational sales request assistant.
//!
//! Collects a sales request over several chat turns, checks the accumulated
//! text against a checklist prompt with a hosted completion model, and asks
//! one follow-up question at a time until the model reports `Success!`.
//!
//! See `DESIGN.md` for the module map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod elicit;
pub mod logging;
pub mod providers;
pub mod repl;
