//! Treatment Dialogue - Scripted therapeutic dialogue engine
//!
//! This crate walks a user through one of six treatment modalities, one
//! step per turn, driven by a registry of scripted steps and internal
//! routing signals. It includes a nested "digging deeper" protocol for
//! clearing related problems.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
