//! # AppDynamics agent buildpack framework
//!
//! Installs the AppDynamics Java agent in the application being staged and derives the agent
//! configuration from the services bound to it. The `app-dynamics-agent` binary exposes the
//! `detect`, `compile` and `release` phases on top of this library.

pub mod application;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod framework;
pub mod http;
pub mod java_opts;
pub mod logging;
pub mod package;
pub mod proxy;
pub mod secret;
pub mod services;
