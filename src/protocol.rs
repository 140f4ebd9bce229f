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

//! RFB (Remote Framebuffer) protocol constants and wire structures.
//!
//! This module provides the building blocks for the RFB conversation:
//! protocol version parsing, message-type and security constants, the
//! 16-byte pixel format record with its pixel codec, and the server-side
//! message structures. It follows RFC 6143.
//!
//! # Protocol Overview
//!
//! An RFB session runs through the following phases:
//! 1. **Protocol Version** - Server and client exchange version literals
//! 2. **Security Handshake** - Authentication selection and execution
//! 3. **Initialization** - Exchange of framebuffer parameters
//! 4. **Normal Operation** - Client input against server updates

use bytes::{Buf, BufMut, BytesMut};

use crate::encoding::Encoding;
use crate::error::{Result, RfbError};

/// The RFB protocol version literal advertised by the server.
///
/// This server implements RFB protocol version 3.8. The literal must be
/// exactly 12 bytes including the newline, as specified by RFC 6143.
pub const PROTOCOL_VERSION: &str = "RFB 003.008\n";

// Client-to-Server Message Types

/// Message type: Client requests to change the pixel format.
pub const CLIENT_MSG_SET_PIXEL_FORMAT: u8 = 0;

/// Message type: Client specifies the encodings it supports, ordered by
/// preference.
pub const CLIENT_MSG_SET_ENCODINGS: u8 = 2;

/// Message type: Client requests a framebuffer update, either incremental
/// (changes only) or a full refresh of the region.
pub const CLIENT_MSG_FRAMEBUFFER_UPDATE_REQUEST: u8 = 3;

/// Message type: Client sends a keyboard event (keysym plus press state).
pub const CLIENT_MSG_KEY_EVENT: u8 = 4;

/// Message type: Client sends a pointer event (position plus button mask).
pub const CLIENT_MSG_POINTER_EVENT: u8 = 5;

/// Message type: Client transfers clipboard contents to the server.
pub const CLIENT_MSG_CLIENT_CUT_TEXT: u8 = 6;

// Server-to-Client Message Types

/// Message type: Server sends a framebuffer update containing one or more
/// rectangles of encoded pixel data.
pub const SERVER_MSG_FRAMEBUFFER_UPDATE: u8 = 0;

/// Message type: Server sets colour map entries (indexed color modes).
pub const SERVER_MSG_SET_COLOUR_MAP_ENTRIES: u8 = 1;

/// Message type: Server rings the bell (audible or visual alert).
pub const SERVER_MSG_BELL: u8 = 2;

/// Message type: Server transfers clipboard contents to the client.
///
/// The text is declared ISO 8859-1 by the protocol.
pub const SERVER_MSG_SERVER_CUT_TEXT: u8 = 3;

// Security Types

/// Security type: Invalid/Unknown.
///
/// Indicates an error or unsupported security mechanism.
pub const SECURITY_TYPE_INVALID: u8 = 0;

/// Security type: None (no authentication).
///
/// The connection proceeds directly to the initialization phase.
pub const SECURITY_TYPE_NONE: u8 = 1;

/// Security type: VNC Authentication.
///
/// DES-encrypted challenge-response: the server sends a 16-byte challenge,
/// which the client encrypts with the password and returns.
pub const SECURITY_TYPE_VNC_AUTH: u8 = 2;

// Security Results

/// Security result: Authentication successful.
pub const SECURITY_RESULT_OK: u32 = 0;

/// Security result: Authentication failed.
///
/// Followed by a length-prefixed human-readable reason string in RFB 3.8.
pub const SECURITY_RESULT_FAILED: u32 = 1;

/// An RFB protocol version as exchanged in the 12-byte handshake literal.
///
/// The literal has the fixed ASCII form `"RFB xxx.yyy\n"` with two
/// three-digit decimal fields. This server always speaks 3.8; the version
/// reported by the client is parsed strictly and kept on the session for
/// observability only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    /// Major version field.
    pub major: u16,
    /// Minor version field.
    pub minor: u16,
}

impl ProtocolVersion {
    /// RFB 3.8, the only version this server negotiates.
    pub const RFB_3_8: Self = Self { major: 3, minor: 8 };

    /// Parses the 12-byte handshake literal.
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::ProtocolMismatch`] if the framing (`"RFB "`,
    /// `'.'`, `'\n'`) or either three-digit field deviates from the
    /// required form.
    pub fn parse(raw: &[u8; 12]) -> Result<Self> {
        if &raw[..4] != b"RFB " || raw[7] != b'.' || raw[11] != b'\n' {
            return Err(RfbError::ProtocolMismatch(format!(
                "bad version literal {:?}",
                String::from_utf8_lossy(raw)
            )));
        }

        Ok(Self {
            major: version_field(&raw[4..7])?,
            minor: version_field(&raw[8..11])?,
        })
    }

    /// Produces the 12-byte wire form `"RFB xxx.yyy\n"`.
    #[must_use]
    pub fn wire(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        let text = format!("RFB {:03}.{:03}\n", self.major % 1000, self.minor % 1000);
        out.copy_from_slice(text.as_bytes());
        out
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn version_field(digits: &[u8]) -> Result<u16> {
    let mut value = 0u16;
    for &d in digits {
        if !d.is_ascii_digit() {
            return Err(RfbError::ProtocolMismatch(
                "non-digit in version field".to_string(),
            ));
        }
        value = value * 10 + u16::from(d - b'0');
    }
    Ok(value)
}

/// A color as the host hands it to the codec: three channels in `[0, 1]`.
///
/// Values are clamped only on paths that require it (colour map entries);
/// the pixel encoder uses truncating conversion as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
}

impl Color {
    /// Creates a color from its three channels.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Describes how a logical color maps to bytes on the wire.
///
/// This is the 16-byte record exchanged in `ServerInit` and
/// `SetPixelFormat`: color depth, endianness, and per-channel maxima and
/// shifts. The session starts from the server's configured format and
/// replaces it wholesale whenever the client issues `SetPixelFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    /// Number of bits per pixel on the wire. 8, 16, 24, 32 and 64 are
    /// understood by the codec.
    pub bits_per_pixel: u8,
    /// Number of useful bits within the pixel.
    pub depth: u8,
    /// True if multi-byte pixel values are sent most-significant first.
    ///
    /// Applies to the encoded pixel value only, never to protocol framing.
    pub big_endian: bool,
    /// True for true-color formats; false requests a colour map, which
    /// this codec does not produce.
    pub true_color: bool,
    /// Maximum red value, `2^N - 1` for an N-bit channel.
    pub red_max: u16,
    /// Maximum green value.
    pub green_max: u16,
    /// Maximum blue value.
    pub blue_max: u16,
    /// Left shift of the red channel within the pixel value.
    pub red_shift: u8,
    /// Left shift of the green channel.
    pub green_shift: u8,
    /// Left shift of the blue channel.
    pub blue_shift: u8,
}

impl PixelFormat {
    /// Creates the canonical 32-bit BGRX format: depth 24, little-endian,
    /// true-color, 8 bits per channel, red at bits 16-23, green at 8-15,
    /// blue at 0-7. Blue lands in the first wire byte.
    #[must_use]
    pub fn bgrx8888() -> Self {
        Self {
            bits_per_pixel: 32,
            depth: 24,
            big_endian: false,
            true_color: true,
            red_max: 255,
            green_max: 255,
            blue_max: 255,
            red_shift: 16,
            green_shift: 8,
            blue_shift: 0,
        }
    }

    /// Creates a 16-bit RGB565 format.
    ///
    /// 5 bits red, 6 bits green, 5 bits blue; common for embedded displays
    /// and bandwidth-constrained clients.
    #[must_use]
    pub fn rgb565() -> Self {
        Self {
            bits_per_pixel: 16,
            depth: 16,
            big_endian: false,
            true_color: true,
            red_max: 31,   // 5 bits
            green_max: 63, // 6 bits
            blue_max: 31,  // 5 bits
            red_shift: 11,
            green_shift: 5,
            blue_shift: 0,
        }
    }

    /// Checks the record against the invariants RFC 6143 expects of it:
    /// a bits-per-pixel value the codec understands, `depth` no wider
    /// than `bits_per_pixel`, channel maxima of the form `2^N - 1`, and
    /// shifts inside the pixel.
    ///
    /// The session does not enforce this on `SetPixelFormat` (formats are
    /// replaced wholesale); it is available to hosts that want a stricter
    /// policy.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.wire_bytes() == 0 {
            return false;
        }
        if self.depth == 0 || self.depth > self.bits_per_pixel {
            return false;
        }
        if !self.true_color {
            return true;
        }

        let all_ones = |max: u16| (u32::from(max) & (u32::from(max) + 1)) == 0;
        all_ones(self.red_max)
            && all_ones(self.green_max)
            && all_ones(self.blue_max)
            && self.red_shift < self.bits_per_pixel
            && self.green_shift < self.bits_per_pixel
            && self.blue_shift < self.bits_per_pixel
    }

    /// Number of bytes one encoded pixel occupies on the wire, or 0 for a
    /// bits-per-pixel value the codec does not understand.
    #[must_use]
    pub fn wire_bytes(&self) -> usize {
        match self.bits_per_pixel {
            8 => 1,
            16 => 2,
            24 => 3,
            32 => 4,
            64 => 8,
            _ => 0,
        }
    }

    /// Serializes the 16-byte wire record.
    ///
    /// One byte each for bits-per-pixel, depth and the two flags, the
    /// three maxima as big-endian u16, the three shifts, then three
    /// padding bytes.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u8(self.bits_per_pixel);
        buf.put_u8(self.depth);
        buf.put_u8(u8::from(self.big_endian));
        buf.put_u8(u8::from(self.true_color));
        buf.put_u16(self.red_max);
        buf.put_u16(self.green_max);
        buf.put_u16(self.blue_max);
        buf.put_u8(self.red_shift);
        buf.put_u8(self.green_shift);
        buf.put_u8(self.blue_shift);
        buf.put_bytes(0, 3); // padding
    }

    /// Deserializes the 16-byte wire record.
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::UnexpectedEnd`] if fewer than 16 bytes are
    /// available.
    pub fn from_bytes(buf: &mut BytesMut) -> Result<Self> {
        if buf.len() < 16 {
            return Err(RfbError::UnexpectedEnd);
        }

        let pf = Self {
            bits_per_pixel: buf.get_u8(),
            depth: buf.get_u8(),
            big_endian: buf.get_u8() != 0,
            true_color: buf.get_u8() != 0,
            red_max: buf.get_u16(),
            green_max: buf.get_u16(),
            blue_max: buf.get_u16(),
            red_shift: buf.get_u8(),
            green_shift: buf.get_u8(),
            blue_shift: buf.get_u8(),
        };
        buf.advance(3);
        Ok(pf)
    }

    /// Encodes one color into its on-wire bytes, appending them to `buf`.
    ///
    /// Each channel is scaled by its maximum with truncating conversion
    /// and placed at its shift; the combined value is written in
    /// [`wire_bytes`](Self::wire_bytes) bytes honoring `big_endian`. A
    /// bits-per-pixel value the codec does not understand appends nothing
    /// (the pixel is skipped).
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::UnsupportedPixelFormat`] for colour-mapped
    /// (non-true-color) formats.
    pub fn encode(&self, color: Color, buf: &mut BytesMut) -> Result<()> {
        if !self.true_color {
            return Err(RfbError::UnsupportedPixelFormat);
        }

        let width = self.wire_bytes();
        if width == 0 {
            return Ok(());
        }

        let pixel = channel_bits(color.r, self.red_max, self.red_shift)
            | channel_bits(color.g, self.green_max, self.green_shift)
            | channel_bits(color.b, self.blue_max, self.blue_shift);

        if self.big_endian {
            buf.put_slice(&pixel.to_be_bytes()[8 - width..]);
        } else {
            buf.put_slice(&pixel.to_le_bytes()[..width]);
        }
        Ok(())
    }

    /// Decodes one on-wire pixel back into a color; the inverse of
    /// [`encode`](Self::encode) for true-color formats.
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::UnsupportedPixelFormat`] for colour-mapped
    /// formats and for input whose length is not exactly
    /// [`wire_bytes`](Self::wire_bytes).
    pub fn decode(&self, raw: &[u8]) -> Result<Color> {
        if !self.true_color {
            return Err(RfbError::UnsupportedPixelFormat);
        }

        let width = self.wire_bytes();
        if width == 0 || raw.len() != width {
            return Err(RfbError::UnsupportedPixelFormat);
        }

        let mut word = [0u8; 8];
        let pixel = if self.big_endian {
            word[8 - width..].copy_from_slice(raw);
            u64::from_be_bytes(word)
        } else {
            word[..width].copy_from_slice(raw);
            u64::from_le_bytes(word)
        };

        Ok(Color {
            r: channel_value(pixel, self.red_max, self.red_shift),
            g: channel_value(pixel, self.green_max, self.green_shift),
            b: channel_value(pixel, self.blue_max, self.blue_shift),
        })
    }
}

fn channel_bits(value: f32, max: u16, shift: u8) -> u64 {
    // Truncating conversion; `as` saturates on out-of-range input.
    ((f32::from(max) * value) as u64) << (u32::from(shift) & 63)
}

fn channel_value(pixel: u64, max: u16, shift: u8) -> f32 {
    if max == 0 {
        return 0.0;
    }
    ((pixel >> (u32::from(shift) & 63)) & u64::from(max)) as f32 / f32::from(max)
}

/// The `ServerInit` message sent once security negotiation completes.
///
/// Provides the client with the framebuffer dimensions, the server's
/// pixel format, and the desktop name.
#[derive(Debug)]
pub struct ServerInit<'a> {
    /// Width of the framebuffer in pixels.
    pub framebuffer_width: u16,
    /// Height of the framebuffer in pixels.
    pub framebuffer_height: u16,
    /// The pixel format the server will use until the client changes it.
    pub pixel_format: PixelFormat,
    /// Desktop name presented in the client's window title.
    pub name: &'a str,
}

impl ServerInit<'_> {
    /// Serializes the message: width, height, 16-byte pixel format, then
    /// the length-prefixed desktop name.
    ///
    /// # Errors
    ///
    /// Returns [`RfbError::Overflow`] if the name does not fit the
    /// protocol's u32 length field.
    pub fn write_to(&self, buf: &mut BytesMut) -> Result<()> {
        let name_len = u32::try_from(self.name.len()).map_err(|_| RfbError::Overflow)?;

        buf.put_u16(self.framebuffer_width);
        buf.put_u16(self.framebuffer_height);
        self.pixel_format.write_to(buf);
        buf.put_u32(name_len);
        buf.put_slice(self.name.as_bytes());
        Ok(())
    }
}

/// One rectangle of a `FramebufferUpdate` message.
///
/// `data` is the finished on-wire payload for `encoding`; the session
/// writes it verbatim and never re-encodes. For [`Encoding::RAW`] that is
/// `width * height` pixels in the session's current format, row-major.
#[derive(Debug, Clone, Copy)]
pub struct UpdateRectangle<'a> {
    /// X coordinate of the top-left corner.
    pub x: u16,
    /// Y coordinate of the top-left corner.
    pub y: u16,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Encoding tag describing `data`.
    pub encoding: Encoding,
    /// Encoding-specific payload, written verbatim.
    pub data: &'a [u8],
}

impl UpdateRectangle<'_> {
    /// Writes the rectangle header followed by the payload.
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u16(self.x);
        buf.put_u16(self.y);
        buf.put_u16(self.width);
        buf.put_u16(self.height);
        buf.put_i32(self.encoding.0);
        buf.put_slice(self.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_literal_round_trip() {
        let parsed = ProtocolVersion::parse(b"RFB 003.008\n").unwrap();
        assert_eq!(parsed, ProtocolVersion { major: 3, minor: 8 });
        assert_eq!(&parsed.wire(), b"RFB 003.008\n");
    }

    #[test]
    fn version_literal_framing_is_strict() {
        let bad: [&[u8; 12]; 5] = [
            b"RFB 003,008\n",
            b"RFB 003.008 ",
            b"rfb 003.008\n",
            b"RFB 0O3.008\n",
            b"RFB  03.008\n",
        ];
        for raw in bad {
            assert!(
                matches!(ProtocolVersion::parse(raw), Err(RfbError::ProtocolMismatch(_))),
                "accepted {:?}",
                String::from_utf8_lossy(raw)
            );
        }
    }

    #[test]
    fn pixel_format_round_trip() {
        for pf in [PixelFormat::bgrx8888(), PixelFormat::rgb565()] {
            let mut buf = BytesMut::new();
            pf.write_to(&mut buf);
            assert_eq!(buf.len(), 16);
            assert_eq!(PixelFormat::from_bytes(&mut buf).unwrap(), pf);
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn pixel_format_short_buffer() {
        let mut buf = BytesMut::from(&[0u8; 15][..]);
        assert!(matches!(
            PixelFormat::from_bytes(&mut buf),
            Err(RfbError::UnexpectedEnd)
        ));
    }

    #[test]
    fn bgrx8888_encodes_little_endian_with_blue_first() {
        let pf = PixelFormat::bgrx8888();
        let mut buf = BytesMut::new();
        pf.encode(Color::new(1.0, 0.2, 0.0), &mut buf).unwrap();

        // (51 << 8) | (255 << 16), little-endian: blue byte first.
        assert_eq!(&buf[..], &[0x00, 0x33, 0xff, 0x00]);
    }

    #[test]
    fn truncates_rather_than_rounds() {
        let pf = PixelFormat::bgrx8888();
        let mut buf = BytesMut::new();
        // 255 * 0.999 = 254.745; rounding would give 255.
        pf.encode(Color::new(0.999, 0.0, 0.0), &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x00, 0x00, 0xfe, 0x00]);
    }

    #[test]
    fn rgb565_packs_into_two_bytes() {
        let pf = PixelFormat::rgb565();
        let mut buf = BytesMut::new();
        pf.encode(Color::new(1.0, 0.0, 0.0), &mut buf).unwrap();
        assert_eq!(u16::from_le_bytes([buf[0], buf[1]]), 0xf800);
    }

    #[test]
    fn big_endian_flag_swaps_pixel_bytes_only() {
        let mut pf = PixelFormat::bgrx8888();
        pf.big_endian = true;
        let mut buf = BytesMut::new();
        pf.encode(Color::new(1.0, 0.0, 0.0), &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x00, 0xff, 0x00, 0x00]);
    }

    #[test]
    fn unknown_bpp_is_skipped() {
        let mut pf = PixelFormat::bgrx8888();
        pf.bits_per_pixel = 48;
        let mut buf = BytesMut::new();
        pf.encode(Color::new(1.0, 1.0, 1.0), &mut buf).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn indexed_color_is_rejected() {
        let mut pf = PixelFormat::bgrx8888();
        pf.true_color = false;
        let mut buf = BytesMut::new();
        assert!(matches!(
            pf.encode(Color::new(0.0, 0.0, 0.0), &mut buf),
            Err(RfbError::UnsupportedPixelFormat)
        ));
        assert!(matches!(
            pf.decode(&[0, 0, 0, 0]),
            Err(RfbError::UnsupportedPixelFormat)
        ));
    }

    #[test]
    fn decode_inverts_encode() {
        for pf in [PixelFormat::bgrx8888(), PixelFormat::rgb565()] {
            let color = Color::new(1.0, 0.2, 0.6);
            let mut buf = BytesMut::new();
            pf.encode(color, &mut buf).unwrap();
            let back = pf.decode(&buf).unwrap();

            // Lossy by channel depth, never by more than one step.
            let step = 1.0 / f32::from(pf.red_max.min(pf.green_max).min(pf.blue_max));
            assert!((back.r - color.r).abs() <= step);
            assert!((back.g - color.g).abs() <= step);
            assert!((back.b - color.b).abs() <= step);
        }
    }

    #[test]
    fn validity_checks() {
        assert!(PixelFormat::bgrx8888().is_valid());
        assert!(PixelFormat::rgb565().is_valid());

        let mut pf = PixelFormat::bgrx8888();
        pf.depth = 40;
        assert!(!pf.is_valid());

        let mut pf = PixelFormat::bgrx8888();
        pf.green_max = 200; // not 2^N - 1
        assert!(!pf.is_valid());

        let mut pf = PixelFormat::bgrx8888();
        pf.red_shift = 32;
        assert!(!pf.is_valid());
    }

    #[test]
    fn server_init_layout() {
        let init = ServerInit {
            framebuffer_width: 1024,
            framebuffer_height: 768,
            pixel_format: PixelFormat::bgrx8888(),
            name: "test",
        };
        let mut buf = BytesMut::new();
        init.write_to(&mut buf).unwrap();

        assert_eq!(&buf[..4], &[0x04, 0x00, 0x03, 0x00]);
        assert_eq!(&buf[20..24], &[0, 0, 0, 4]);
        assert_eq!(&buf[24..], b"test");
    }
}
