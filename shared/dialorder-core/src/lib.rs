//! Dialorder Core - Shared domain types and service infrastructure
//!
//! This crate provides:
//! - Standard service trait every webhook service implements
//! - Common domain types (SessionKey, PhoneNumber, minor-unit money)
//! - Error handling utilities
//! - Configuration management

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::ServiceConfig;
pub use domain::*;
pub use error::{DialorderError, Result};
pub use service::{DependencyStatus, DialorderService, HealthStatus, MicroserviceRuntime, ReadinessStatus};
