//! Server-side session configuration.

use crate::protocol::PixelFormat;

/// Everything the host decides before handing a connection to
/// [`Session::handshake`](crate::session::Session::handshake).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Framebuffer width in pixels, announced in `ServerInit`.
    pub width: u16,
    /// Framebuffer height in pixels, announced in `ServerInit`.
    pub height: u16,
    /// Desktop name shown in the viewer's window title.
    pub desktop_name: String,
    /// Initial pixel format, in effect until the client replaces it with
    /// `SetPixelFormat`.
    pub pixel_format: PixelFormat,
    /// `Some` offers VNC authentication with this password; `None` offers
    /// no authentication.
    pub password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            desktop_name: "rfbcore".to_string(),
            pixel_format: PixelFormat::bgrx8888(),
            password: None,
        }
    }
}
