//! CLI functionality for the clinguard tool
//!
//! This module contains all CLI-related functionality including:
//! - Protocol evaluation against a snapshot file
//! - Protocol file checking
//! - Output formatting

pub mod check;
pub mod evaluate;
pub mod output;
