//! Gopher protocol implementation (RFC 1436).
//!
//! # Architecture
//!
//! - **`item`**: menu line codec and the item type enumeration
//! - **`directory`**: ordered menus with text and JSON encodings
//! - **`parser`**: parses the one-line request a client sends
//! - **`request`**: the request handed to handlers
//! - **`writer`**: response writer bound to either document or menu mode
//! - **`connection`**: per-connection state machine
//!
//! # Connection State Machine
//!
//! A Gopher connection carries exactly one request:
//!
//! ```text
//!        ┌─────────────┐
//!        │  Accepted   │ ← Wait for the selector line
//!        └──────┬──────┘
//!               │ Selector received (EOF/timeout → Closed, garbage → error reply)
//!               ▼
//!        ┌──────────────────┐
//!        │   RequestRead    │ ← Route to a handler
//!        └──────┬───────────┘
//!               │ Handler returned (or failed)
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatched     │ ← Terminate menu, flush
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │
//!        └──────────────────┘
//! ```
//!
//! # Wire format
//!
//! ```text
//! <type><description>\t<selector>\t<host>\t<port>[\t<extra>]*\r\n
//! ```
//!
//! Menus end with a line holding a single `.`; documents end when the
//! server closes the connection.

pub mod connection;
pub mod directory;
pub mod item;
pub mod parser;
pub mod request;
pub mod writer;
