// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for ragchat.
//!
//! Serves the chat turn as Server-Sent Events, plus context lookup,
//! knowledge-base ingestion, direct message writes, chat log search,
//! registration and login. Public routes are `/health`, `/metrics`,
//! `/api/register` and `/api/login`; everything else sits behind the
//! session middleware when login is required.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod sse;

pub use auth::SessionUser;
pub use server::{AppState, GatewaySettings, HealthState, build_router, start_server};
