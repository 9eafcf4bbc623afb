// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring and subcommands behind the `ragchat` binary.

pub mod app;
pub mod ask;
pub mod ingest;
pub mod serve;
