//! Common test utilities for cartoframe.
//!
//! This module provides shared utilities for the integration tests.

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod image_utils;
