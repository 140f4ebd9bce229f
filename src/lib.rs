// Copyright 2025 The rfbcore Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # rfbcore
//!
//! The server side of the RFB (Remote Framebuffer) protocol, the wire
//! protocol spoken by VNC viewers, implemented per RFC 6143 over a byte
//! stream the caller has already connected.
//!
//! The crate deliberately stops at the protocol: it does not listen on
//! sockets, capture screens, or schedule anything. The host accepts a
//! connection, hands the stream to [`Session::handshake`], pulls client
//! input with [`Session::wait_event`], and pushes updates it has encoded
//! itself. One session drives one connection.
//!
//! ## Features
//!
//! - **RFB 3.8 handshake**: version exchange, security negotiation,
//!   client/server initialization
//! - **VNC authentication**: the DES challenge-response required by the
//!   protocol, with the cipher implemented bit-exactly in-crate
//! - **Pixel format codec**: true-color formats at 8/16/24/32/64 bpp,
//!   either endianness, arbitrary channel layouts
//! - **Stream agnostic**: anything `AsyncRead + AsyncWrite + Unpin`
//!
//! ## Quick Start
//!
//! ```no_run
//! use rfbcore::{ServerConfig, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5900").await?;
//!     let (stream, _) = listener.accept().await?;
//!
//!     let config = ServerConfig {
//!         desktop_name: "my desktop".to_string(),
//!         ..ServerConfig::default()
//!     };
//!     let mut session = Session::handshake(stream, &config).await?;
//!
//!     while let Some(event) = session.wait_event().await? {
//!         println!("client sent {event:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           Your Application              │
//! │                                         │
//! │  • Accept the connection                │
//! │  • Encode rectangle payloads            │
//! │  • React to input events                │
//! └──────────────────┬──────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │            Session (Public)             │
//! │                                         │
//! │  • Handshake & authentication           │
//! │  • wait_event pull / send_* push        │
//! └──────┬───────────┬───────────┬──────────┘
//!        ▼           ▼           ▼
//!   ┌────────┐ ┌──────────┐ ┌────────┐
//!   │ codec  │ │ VNC auth │ │  DES   │
//!   └────────┘ └──────────┘ └────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod des;
pub mod encoding;
pub mod error;
pub mod events;
pub mod keysym;
pub mod protocol;
pub mod session;

// Internal modules
mod auth;

// Re-exports
pub use config::ServerConfig;
pub use encoding::Encoding;
pub use error::{Result, RfbError};
pub use events::ClientEvent;
pub use keysym::Key;
pub use protocol::{Color, PixelFormat, ProtocolVersion, UpdateRectangle, PROTOCOL_VERSION};
pub use session::Session;
