//! Workstation provisioning engine.
//!
//! Brings a fresh Linux desktop to a known state from a single TOML file:
//! dotfiles copied into the home directory, system/Flatpak/Snap packages,
//! shell environment, Git identity, group memberships, GNOME workspaces and
//! an optional catalogue of third-party tools. Every step checks before it
//! acts, so reruns are cheap and resume after failures.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: parse and validate `conf/provision.toml`
//! - **[`resources`]**: idempotent `check + apply` primitives (files, packages, …)
//! - **[`tasks`]**: named, phase-tagged, dependency-ordered units of work
//! - **[`commands`]**: top-level orchestration of a provisioning pass
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod tasks;
pub mod tools;
pub mod wait;
