//! Lifecycle core for single-node storage clusters.
//!
//! Every observation comes fresh from the container engine. The modules
//! compose bottom-up: [`identity`], [`network`], [`port`] and [`state`]
//! answer single questions, [`readiness`] drives the two-phase wait, and
//! [`controller`] ties them into the user-facing operations.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod controller;
pub mod credentials;
pub mod engine;
pub mod exec;
pub mod identity;
pub mod logs;
pub mod network;
pub mod port;
pub mod readiness;
pub mod registry;
pub mod state;
