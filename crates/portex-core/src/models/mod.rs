//! Data models for fragments, security records, and configuration.

pub mod fragment;
pub mod security;
pub mod config;
