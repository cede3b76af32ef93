//! Core domain types and logic.

pub mod price;
pub mod granularity;
pub mod frequency;
pub mod strategy;
pub mod simulation;
pub mod ranking;
pub mod summary;
pub mod comparison;
pub mod config_validation;
pub mod error;
