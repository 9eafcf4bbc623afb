// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed queries against the chat log and account tables.

pub mod messages;
pub mod users;
