//! # reply-gateway
//!
//! REST gateway that drafts human-sounding replies to social media posts.
//!
//! A post and its target platform go in; a prompt tuned to the platform's
//! tone is sent to a hosted LLM, the reply is stored, and the stored
//! interaction is returned. The same sequence also runs over CSV files
//! through the `reply-cli` binary.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)          reply-cli (batch, report)
//!     │                        │
//!     ├── REST Handlers (api/) ├── BatchRunner (batch)
//!     │                        │
//!     └──────── ReplyService (service/) ────────┘
//!                  │            │
//!     Prompt Builder (prompt)   │
//!                  │            │
//!     ReplyGenerator (generator/): Gemini | stub
//!                               │
//!     ReplyStore (persistence/): SQLite | PostgreSQL | memory
//! ```

pub mod api;
pub mod app_state;
pub mod batch;
pub mod config;
pub mod domain;
pub mod error;
pub mod generator;
pub mod persistence;
pub mod prompt;
pub mod report;
pub mod service;
pub mod telemetry;
