//! cam-prefs: ESP32 camera module preferences
//!
//! A library for the persisted network settings of a camera module:
//! staged changes committed before a reboot, factory defaults on first
//! boot, and the dotted-quad codec for address fields.

pub mod address;
pub mod command;
pub mod config;
pub mod namespace;
pub mod prefs;
