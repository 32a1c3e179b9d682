// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for fncache
//!
//! Inspection and maintenance commands over an on-disk catalog.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_drop_cache, handle_drop_function, handle_list, handle_repair, handle_show,
    handle_tables,
};
