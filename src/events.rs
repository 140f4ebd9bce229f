//! Client events surfaced by the session loop.

use crate::encoding::Encoding;
use crate::keysym::Key;
use crate::protocol::PixelFormat;

/// One message from the connected viewer, as returned by
/// [`Session::wait_event`](crate::session::Session::wait_event).
///
/// The borrowed variants (`SetEncodings`, `ClientCutText`) point into
/// scratch storage owned by the session and are invalidated by the next
/// `wait_event` call; copy anything you need to keep.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent<'a> {
    /// The client changed its pixel format. The session has already
    /// adopted it for subsequent updates.
    SetPixelFormat(PixelFormat),

    /// The list of encodings the client supports, in preference order.
    /// Unknown tags are preserved verbatim.
    SetEncodings(&'a [Encoding]),

    /// The client wants a framebuffer update for a region.
    FramebufferUpdateRequest {
        /// True if the client only needs changes since its last update;
        /// the server may still answer with a full update.
        incremental: bool,
        /// X coordinate of the requested region.
        x: u16,
        /// Y coordinate of the requested region.
        y: u16,
        /// Width of the requested region.
        width: u16,
        /// Height of the requested region.
        height: u16,
    },

    /// A key was pressed or released.
    KeyEvent {
        /// The X11 keysym of the key.
        key: Key,
        /// True on press, false on release.
        down: bool,
    },

    /// The pointer moved or a button changed state.
    PointerEvent {
        /// X coordinate of the pointer.
        x: u16,
        /// Y coordinate of the pointer.
        y: u16,
        /// Button bitmask (bit 0 = left, 1 = middle, 2 = right).
        buttons: u8,
    },

    /// Clipboard bytes from the client, declared ISO 8859-1 by the
    /// protocol.
    ClientCutText(&'a [u8]),
}
