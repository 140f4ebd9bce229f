//! One RFB session over a caller-provided byte stream.
//!
//! [`Session::handshake`] runs the RFB 3.8 opening sequence (protocol
//! version, security negotiation and authentication, client/server init)
//! and returns the live session. After that the host pulls client input
//! with [`Session::wait_event`] and pushes updates, bells, colour map
//! entries and clipboard text with the `send_*` operations.
//!
//! # Protocol Flow
//!
//! 1. **Handshake**: version exchange and security negotiation
//! 2. **Initialization**: ClientInit / ServerInit exchange
//! 3. **Normal operation**: client messages against server pushes
//!
//! All operations take `&mut self` and run on the single underlying
//! stream, so pushes are serialized against the read path by
//! construction. A host that wants to push from one task while another
//! pulls must wrap the session in its own synchronization; the session
//! never locks internally. Cancellation is the host's job too: drop the
//! session or close the stream, and the next operation fails.

use bytes::{BufMut, BytesMut};
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::auth::VncAuth;
use crate::config::ServerConfig;
use crate::encoding::Encoding;
use crate::error::{Result, RfbError};
use crate::events::ClientEvent;
use crate::keysym::Key;
use crate::protocol::{
    Color, PixelFormat, ProtocolVersion, ServerInit, UpdateRectangle,
    CLIENT_MSG_CLIENT_CUT_TEXT, CLIENT_MSG_FRAMEBUFFER_UPDATE_REQUEST, CLIENT_MSG_KEY_EVENT,
    CLIENT_MSG_POINTER_EVENT, CLIENT_MSG_SET_ENCODINGS, CLIENT_MSG_SET_PIXEL_FORMAT,
    PROTOCOL_VERSION, SECURITY_RESULT_FAILED, SECURITY_RESULT_OK, SECURITY_TYPE_NONE,
    SECURITY_TYPE_VNC_AUTH, SERVER_MSG_BELL, SERVER_MSG_FRAMEBUFFER_UPDATE,
    SERVER_MSG_SERVER_CUT_TEXT, SERVER_MSG_SET_COLOUR_MAP_ENTRIES,
};

/// Upper bound on client cut text accepted into the scratch buffer.
/// The length field is client-controlled; an unchecked value would let a
/// hostile client make the server allocate 4 GiB.
const MAX_CUT_TEXT: usize = 10 * 1024 * 1024;

/// A live RFB session with one connected viewer.
///
/// Created by [`Session::handshake`]; consumed by dropping it (or the
/// stream). All errors are terminal: a failed operation leaves the wire
/// in an undefined position and the session must be discarded.
pub struct Session<S> {
    stream: S,
    protocol_version: ProtocolVersion,
    shared_connection: bool,
    pixel_format: PixelFormat,
    /// Scratch for `ClientCutText` payloads; grows to the largest seen.
    cut_text: BytesMut,
    /// Scratch for `SetEncodings` payloads.
    encodings: Vec<Encoding>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
    /// Runs the server side of the RFB 3.8 opening sequence and returns
    /// the established session.
    ///
    /// The server always advertises 3.8 and stays committed to it; the
    /// version the client reports is parsed strictly and surfaced via
    /// [`protocol_version`](Self::protocol_version) for observability.
    /// Exactly one security type is offered, decided by
    /// `config.password`.
    ///
    /// # Errors
    ///
    /// - [`RfbError::ProtocolMismatch`] for a malformed client version
    ///   literal or a security type the server did not offer.
    /// - [`RfbError::AuthenticationFailed`] if the VNC-auth response does
    ///   not match (the failure result and reason are sent first).
    /// - [`RfbError::Overflow`] if the desktop name exceeds the u32
    ///   length field.
    /// - [`RfbError::UnexpectedEnd`] / [`RfbError::Io`] on transport
    ///   problems.
    pub async fn handshake(mut stream: S, config: &ServerConfig) -> Result<Self> {
        stream.write_all(PROTOCOL_VERSION.as_bytes()).await?;

        let mut version_buf = [0u8; 12];
        stream.read_exact(&mut version_buf).await?;
        let protocol_version = ProtocolVersion::parse(&version_buf)?;
        info!("client reports RFB {protocol_version}");

        let offered = if config.password.is_some() {
            SECURITY_TYPE_VNC_AUTH
        } else {
            SECURITY_TYPE_NONE
        };
        stream.write_all(&[1, offered]).await?;

        let chosen = stream.read_u8().await?;
        if chosen != offered {
            return Err(RfbError::ProtocolMismatch(format!(
                "client chose security type {chosen}, offered {offered}"
            )));
        }

        if let Some(password) = &config.password {
            let auth = VncAuth::new(password);
            let challenge = VncAuth::generate_challenge();
            stream.write_all(&challenge).await?;

            let mut response = [0u8; 16];
            stream.read_exact(&mut response).await?;

            if !auth.verify(&challenge, &response) {
                let reason = b"authentication failure";
                let mut msg = BytesMut::with_capacity(8 + reason.len());
                msg.put_u32(SECURITY_RESULT_FAILED);
                msg.put_u32(reason.len() as u32);
                msg.put_slice(reason);
                stream.write_all(&msg).await?;
                warn!("VNC authentication failed");
                return Err(RfbError::AuthenticationFailed);
            }
            debug!("VNC authentication succeeded");
        }

        let mut result = BytesMut::with_capacity(4);
        result.put_u32(SECURITY_RESULT_OK);
        stream.write_all(&result).await?;

        let shared_connection = stream.read_u8().await? != 0;

        let server_init = ServerInit {
            framebuffer_width: config.width,
            framebuffer_height: config.height,
            pixel_format: config.pixel_format,
            name: &config.desktop_name,
        };
        let mut init = BytesMut::new();
        server_init.write_to(&mut init)?;
        stream.write_all(&init).await?;

        info!(
            "handshake completed: {}x{}, shared={shared_connection}",
            config.width, config.height
        );

        Ok(Self {
            stream,
            protocol_version,
            shared_connection,
            pixel_format: config.pixel_format,
            cut_text: BytesMut::new(),
            encodings: Vec::new(),
        })
    }

    /// The protocol version the client reported during the handshake.
    #[must_use]
    pub fn protocol_version(&self) -> ProtocolVersion {
        self.protocol_version
    }

    /// Whether the client asked to share the desktop with other viewers.
    #[must_use]
    pub fn shared_connection(&self) -> bool {
        self.shared_connection
    }

    /// The pixel format currently in effect for framebuffer updates.
    #[must_use]
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Releases the session, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Reads the next client message and returns it as an event.
    ///
    /// Returns `Ok(None)` when the client closes the stream cleanly at a
    /// message boundary; end-of-stream in the middle of a message is
    /// [`RfbError::UnexpectedEnd`]. An unknown message type is a fatal
    /// [`RfbError::ProtocolViolation`].
    ///
    /// `SetPixelFormat` additionally replaces the session's current
    /// format as a side effect. Events that carry variable-length data
    /// borrow scratch storage that the next call invalidates.
    pub async fn wait_event(&mut self) -> Result<Option<ClientEvent<'_>>> {
        let mut message_type = [0u8; 1];
        if self.stream.read(&mut message_type).await? == 0 {
            debug!("client closed the connection");
            return Ok(None);
        }

        match message_type[0] {
            CLIENT_MSG_SET_PIXEL_FORMAT => {
                let mut raw = [0u8; 19]; // 3 padding + 16 format
                self.stream.read_exact(&mut raw).await?;
                let format = PixelFormat::from_bytes(&mut BytesMut::from(&raw[3..]))?;
                if !format.is_valid() {
                    warn!("client set a dubious pixel format: {format:?}");
                } else {
                    debug!("client set pixel format: {format:?}");
                }
                self.pixel_format = format;
                Ok(Some(ClientEvent::SetPixelFormat(format)))
            }
            CLIENT_MSG_SET_ENCODINGS => {
                let mut padding = [0u8; 1];
                self.stream.read_exact(&mut padding).await?;
                let count = self.stream.read_u16().await?;
                self.encodings.clear();
                for _ in 0..count {
                    let tag = self.stream.read_i32().await?;
                    self.encodings.push(Encoding(tag));
                }
                debug!("client supports {:?}", self.encodings);
                Ok(Some(ClientEvent::SetEncodings(&self.encodings)))
            }
            CLIENT_MSG_FRAMEBUFFER_UPDATE_REQUEST => {
                let incremental = self.stream.read_u8().await? != 0;
                let x = self.stream.read_u16().await?;
                let y = self.stream.read_u16().await?;
                let width = self.stream.read_u16().await?;
                let height = self.stream.read_u16().await?;
                Ok(Some(ClientEvent::FramebufferUpdateRequest {
                    incremental,
                    x,
                    y,
                    width,
                    height,
                }))
            }
            CLIENT_MSG_KEY_EVENT => {
                let down = self.stream.read_u8().await? != 0;
                let mut padding = [0u8; 2];
                self.stream.read_exact(&mut padding).await?;
                let key = Key(self.stream.read_u32().await?);
                Ok(Some(ClientEvent::KeyEvent { key, down }))
            }
            CLIENT_MSG_POINTER_EVENT => {
                let buttons = self.stream.read_u8().await?;
                let x = self.stream.read_u16().await?;
                let y = self.stream.read_u16().await?;
                Ok(Some(ClientEvent::PointerEvent { x, y, buttons }))
            }
            CLIENT_MSG_CLIENT_CUT_TEXT => {
                let mut padding = [0u8; 3];
                self.stream.read_exact(&mut padding).await?;
                let length = self.stream.read_u32().await? as usize;
                if length > MAX_CUT_TEXT {
                    return Err(RfbError::ProtocolViolation(format!(
                        "cut text of {length} bytes exceeds the {MAX_CUT_TEXT} byte limit"
                    )));
                }
                self.cut_text.clear();
                self.cut_text.resize(length, 0);
                self.stream.read_exact(&mut self.cut_text).await?;
                Ok(Some(ClientEvent::ClientCutText(&self.cut_text)))
            }
            unknown => Err(RfbError::ProtocolViolation(format!(
                "unknown client message type {unknown}"
            ))),
        }
    }

    /// Sends a `FramebufferUpdate` carrying the given rectangles.
    ///
    /// Rectangle payloads are written verbatim; the caller encodes them
    /// (for [`Encoding::RAW`], pixels in the session's current format).
    /// The whole message is assembled in memory and flushed with a single
    /// write to keep it in as few TCP segments as possible.
    ///
    /// # Errors
    ///
    /// [`RfbError::Overflow`] if there are more than 65535 rectangles,
    /// otherwise only transport errors.
    pub async fn send_framebuffer_update(
        &mut self,
        rectangles: &[UpdateRectangle<'_>],
    ) -> Result<()> {
        let count = u16::try_from(rectangles.len()).map_err(|_| RfbError::Overflow)?;

        let mut msg = BytesMut::new();
        msg.put_u8(SERVER_MSG_FRAMEBUFFER_UPDATE);
        msg.put_u8(0); // padding
        msg.put_u16(count);
        for rectangle in rectangles {
            rectangle.write_to(&mut msg);
        }
        self.stream.write_all(&msg).await?;
        Ok(())
    }

    /// Sends `SetColourMapEntries` for indexed-color clients, starting at
    /// palette slot `first`.
    ///
    /// Channels are clamped to `[0, 1]` and scaled to the full u16 range
    /// with rounding.
    ///
    /// # Errors
    ///
    /// [`RfbError::Overflow`] if there are more than 65535 colors,
    /// otherwise only transport errors.
    pub async fn send_set_color_map_entries(
        &mut self,
        first: u16,
        colors: &[Color],
    ) -> Result<()> {
        let count = u16::try_from(colors.len()).map_err(|_| RfbError::Overflow)?;

        let mut msg = BytesMut::with_capacity(6 + colors.len() * 6);
        msg.put_u8(SERVER_MSG_SET_COLOUR_MAP_ENTRIES);
        msg.put_u8(0); // padding
        msg.put_u16(first);
        msg.put_u16(count);
        for color in colors {
            msg.put_u16(map_channel(color.r));
            msg.put_u16(map_channel(color.g));
            msg.put_u16(map_channel(color.b));
        }
        self.stream.write_all(&msg).await?;
        Ok(())
    }

    /// Rings the client's bell: a single message-type byte.
    pub async fn send_bell(&mut self) -> Result<()> {
        self.stream.write_all(&[SERVER_MSG_BELL]).await?;
        Ok(())
    }

    /// Pushes clipboard bytes to the client. The protocol declares the
    /// text ISO 8859-1; the bytes go out verbatim.
    ///
    /// # Errors
    ///
    /// [`RfbError::Overflow`] if the text exceeds the u32 length field,
    /// otherwise only transport errors.
    pub async fn send_server_cut_text(&mut self, text: &[u8]) -> Result<()> {
        let length = u32::try_from(text.len()).map_err(|_| RfbError::Overflow)?;

        let mut msg = BytesMut::with_capacity(8 + text.len());
        msg.put_u8(SERVER_MSG_SERVER_CUT_TEXT);
        msg.put_bytes(0, 3); // padding
        msg.put_u32(length);
        msg.put_slice(text);
        self.stream.write_all(&msg).await?;
        Ok(())
    }
}

/// Scales one color channel to a colour map entry.
fn map_channel(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::DuplexStream;

    fn open_session(stream: DuplexStream) -> Session<DuplexStream> {
        Session {
            stream,
            protocol_version: ProtocolVersion::RFB_3_8,
            shared_connection: false,
            pixel_format: PixelFormat::bgrx8888(),
            cut_text: BytesMut::new(),
            encodings: Vec::new(),
        }
    }

    /// Reads everything the peer wrote until it dropped its end.
    async fn drain(stream: &mut DuplexStream) -> Vec<u8> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).await.unwrap();
        bytes
    }

    #[tokio::test]
    async fn handshake_without_security() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);

        // The entire client script fits in the duplex buffer up front.
        client_io.write_all(b"RFB 003.008\n").await.unwrap();
        client_io.write_all(&[SECURITY_TYPE_NONE]).await.unwrap();
        client_io.write_all(&[0x00]).await.unwrap(); // not shared

        let config = ServerConfig {
            width: 1280,
            height: 720,
            desktop_name: "mydesktop".to_string(),
            ..ServerConfig::default()
        };
        let session = Session::handshake(server_io, &config).await.unwrap();
        assert_eq!(session.protocol_version(), ProtocolVersion::RFB_3_8);
        assert!(!session.shared_connection());
        assert_eq!(session.pixel_format(), PixelFormat::bgrx8888());

        drop(session);
        let sent = drain(&mut client_io).await;

        assert_eq!(&sent[..12], b"RFB 003.008\n");
        assert_eq!(&sent[12..14], &[0x01, SECURITY_TYPE_NONE]);
        assert_eq!(&sent[14..18], &[0, 0, 0, 0]); // SecurityResult OK
        // The very next byte is the high byte of the screen width.
        assert_eq!(&sent[18..22], &[0x05, 0x00, 0x02, 0xd0]); // 1280 x 720
        let mut format = BytesMut::from(&sent[22..38]);
        assert_eq!(
            PixelFormat::from_bytes(&mut format).unwrap(),
            PixelFormat::bgrx8888()
        );
        assert_eq!(&sent[38..42], &[0, 0, 0, 9]);
        assert_eq!(&sent[42..], b"mydesktop");
    }

    #[tokio::test]
    async fn handshake_rejects_bad_version_literal() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        client_io.write_all(b"HTTP/1.1 200").await.unwrap();

        let result = Session::handshake(server_io, &ServerConfig::default()).await;
        assert!(matches!(result, Err(RfbError::ProtocolMismatch(_))));
    }

    #[tokio::test]
    async fn handshake_rejects_unoffered_security_type() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        client_io.write_all(b"RFB 003.008\n").await.unwrap();
        client_io.write_all(&[SECURITY_TYPE_VNC_AUTH]).await.unwrap();

        let result = Session::handshake(server_io, &ServerConfig::default()).await;
        assert!(matches!(result, Err(RfbError::ProtocolMismatch(_))));
    }

    #[tokio::test]
    async fn handshake_with_vnc_auth_succeeds() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);

        let client = tokio::spawn(async move {
            let mut version = [0u8; 12];
            client_io.read_exact(&mut version).await.unwrap();
            client_io.write_all(b"RFB 003.008\n").await.unwrap();

            let mut offer = [0u8; 2];
            client_io.read_exact(&mut offer).await.unwrap();
            assert_eq!(offer, [0x01, SECURITY_TYPE_VNC_AUTH]);
            client_io.write_all(&[SECURITY_TYPE_VNC_AUTH]).await.unwrap();

            let mut challenge = [0u8; 16];
            client_io.read_exact(&mut challenge).await.unwrap();
            let response = VncAuth::new("secret").expected_response(&challenge);
            client_io.write_all(&response).await.unwrap();

            let mut result = [0u8; 4];
            client_io.read_exact(&mut result).await.unwrap();
            assert_eq!(result, [0, 0, 0, 0]);

            client_io.write_all(&[0x01]).await.unwrap(); // shared
        });

        let config = ServerConfig {
            password: Some("secret".to_string()),
            ..ServerConfig::default()
        };
        let session = Session::handshake(server_io, &config).await.unwrap();
        assert!(session.shared_connection());
        client.await.unwrap();
    }

    #[tokio::test]
    async fn handshake_with_vnc_auth_rejects_wrong_response() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);

        let client = tokio::spawn(async move {
            let mut version = [0u8; 12];
            client_io.read_exact(&mut version).await.unwrap();
            client_io.write_all(b"RFB 003.008\n").await.unwrap();

            let mut offer = [0u8; 2];
            client_io.read_exact(&mut offer).await.unwrap();
            client_io.write_all(&[SECURITY_TYPE_VNC_AUTH]).await.unwrap();

            let mut challenge = [0u8; 16];
            client_io.read_exact(&mut challenge).await.unwrap();
            // A client that never ran DES: sixteen zero bytes.
            client_io.write_all(&[0u8; 16]).await.unwrap();

            let mut result = [0u8; 4];
            client_io.read_exact(&mut result).await.unwrap();
            assert_eq!(result, [0, 0, 0, 1]);

            let mut reason_len = [0u8; 4];
            client_io.read_exact(&mut reason_len).await.unwrap();
            let mut reason = vec![0u8; u32::from_be_bytes(reason_len) as usize];
            client_io.read_exact(&mut reason).await.unwrap();
        });

        let config = ServerConfig {
            password: Some("secret".to_string()),
            ..ServerConfig::default()
        };
        let result = Session::handshake(server_io, &config).await;
        assert!(matches!(result, Err(RfbError::AuthenticationFailed)));
        client.await.unwrap();
    }

    #[tokio::test]
    async fn key_event_for_return() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        client_io
            .write_all(&[0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0xff, 0x0d])
            .await
            .unwrap();
        drop(client_io);

        let mut session = open_session(server_io);
        let event = session.wait_event().await.unwrap().unwrap();
        assert_eq!(
            event,
            ClientEvent::KeyEvent {
                key: Key::RETURN,
                down: true
            }
        );
        assert!(session.wait_event().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn framebuffer_update_request() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        client_io
            .write_all(&[0x03, 0x00, 0x00, 0x0a, 0x00, 0x14, 0x00, 0x80, 0x00, 0x60])
            .await
            .unwrap();
        drop(client_io);

        let mut session = open_session(server_io);
        let event = session.wait_event().await.unwrap().unwrap();
        assert_eq!(
            event,
            ClientEvent::FramebufferUpdateRequest {
                incremental: false,
                x: 10,
                y: 20,
                width: 128,
                height: 96
            }
        );
    }

    #[tokio::test]
    async fn set_pixel_format_replaces_session_format() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        let mut msg = BytesMut::new();
        msg.put_u8(CLIENT_MSG_SET_PIXEL_FORMAT);
        msg.put_bytes(0, 3);
        PixelFormat::rgb565().write_to(&mut msg);
        client_io.write_all(&msg).await.unwrap();
        drop(client_io);

        let mut session = open_session(server_io);
        let event = session.wait_event().await.unwrap().unwrap();
        assert_eq!(event, ClientEvent::SetPixelFormat(PixelFormat::rgb565()));
        assert_eq!(session.pixel_format(), PixelFormat::rgb565());
    }

    #[tokio::test]
    async fn set_encodings_preserves_unknown_tags() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        let mut msg = BytesMut::new();
        msg.put_u8(CLIENT_MSG_SET_ENCODINGS);
        msg.put_u8(0);
        msg.put_u16(4);
        msg.put_i32(16); // ZRLE
        msg.put_i32(0); // Raw
        msg.put_i32(-239); // Cursor pseudo-encoding
        msg.put_i32(0x574d_5601); // vendor tag, unknown here
        client_io.write_all(&msg).await.unwrap();
        drop(client_io);

        let mut session = open_session(server_io);
        let event = session.wait_event().await.unwrap().unwrap();
        assert_eq!(
            event,
            ClientEvent::SetEncodings(&[
                Encoding::ZRLE,
                Encoding::RAW,
                Encoding::CURSOR,
                Encoding(0x574d_5601)
            ])
        );
    }

    #[tokio::test]
    async fn pointer_event_and_cut_text() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        client_io
            .write_all(&[0x05, 0x01, 0x00, 0x40, 0x00, 0x2a])
            .await
            .unwrap();
        client_io
            .write_all(&[0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, b'h', b'i'])
            .await
            .unwrap();
        drop(client_io);

        let mut session = open_session(server_io);
        let event = session.wait_event().await.unwrap().unwrap();
        assert_eq!(
            event,
            ClientEvent::PointerEvent {
                x: 64,
                y: 42,
                buttons: 0x01
            }
        );
        let event = session.wait_event().await.unwrap().unwrap();
        assert_eq!(event, ClientEvent::ClientCutText(b"hi"));
        assert!(session.wait_event().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn eof_mid_message_is_an_error() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        client_io.write_all(&[0x04, 0x01]).await.unwrap();
        drop(client_io);

        let mut session = open_session(server_io);
        assert!(matches!(
            session.wait_event().await,
            Err(RfbError::UnexpectedEnd)
        ));
    }

    #[tokio::test]
    async fn unknown_message_type_is_a_violation() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        client_io.write_all(&[0xaa]).await.unwrap();
        drop(client_io);

        let mut session = open_session(server_io);
        assert!(matches!(
            session.wait_event().await,
            Err(RfbError::ProtocolViolation(_))
        ));
    }

    #[tokio::test]
    async fn oversized_cut_text_is_a_violation() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        let mut msg = BytesMut::new();
        msg.put_u8(CLIENT_MSG_CLIENT_CUT_TEXT);
        msg.put_bytes(0, 3);
        msg.put_u32(0xffff_ffff);
        client_io.write_all(&msg).await.unwrap();
        drop(client_io);

        let mut session = open_session(server_io);
        assert!(matches!(
            session.wait_event().await,
            Err(RfbError::ProtocolViolation(_))
        ));
    }

    #[tokio::test]
    async fn framebuffer_update_wire_format() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        let mut session = open_session(server_io);

        let data = [0xde, 0xad, 0xbe, 0xef];
        let rect = UpdateRectangle {
            x: 1,
            y: 2,
            width: 1,
            height: 1,
            encoding: Encoding::RAW,
            data: &data,
        };
        session.send_framebuffer_update(&[rect]).await.unwrap();
        drop(session);

        let sent = drain(&mut client_io).await;
        assert_eq!(
            sent,
            [
                0x00, 0x00, // type, padding
                0x00, 0x01, // one rectangle
                0x00, 0x01, 0x00, 0x02, 0x00, 0x01, 0x00, 0x01, // x, y, w, h
                0x00, 0x00, 0x00, 0x00, // Raw
                0xde, 0xad, 0xbe, 0xef,
            ]
        );
    }

    #[tokio::test]
    async fn bell_is_a_single_byte() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        let mut session = open_session(server_io);
        session.send_bell().await.unwrap();
        drop(session);

        assert_eq!(drain(&mut client_io).await, [0x02]);
    }

    #[tokio::test]
    async fn server_cut_text_wire_format() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        let mut session = open_session(server_io);
        session.send_server_cut_text(b"HI").await.unwrap();
        drop(session);

        assert_eq!(
            drain(&mut client_io).await,
            [0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, b'H', b'I']
        );
    }

    #[tokio::test]
    async fn color_map_entries_clamp_and_round() {
        let (server_io, mut client_io) = tokio::io::duplex(4096);
        let mut session = open_session(server_io);
        session
            .send_set_color_map_entries(
                3,
                &[Color::new(0.0, 1.5, 0.5), Color::new(-1.0, 1.0, 0.25)],
            )
            .await
            .unwrap();
        drop(session);

        let sent = drain(&mut client_io).await;
        assert_eq!(&sent[..6], &[0x01, 0x00, 0x00, 0x03, 0x00, 0x02]);
        let entry = |i: usize| u16::from_be_bytes([sent[6 + 2 * i], sent[7 + 2 * i]]);
        assert_eq!(entry(0), 0); // 0.0
        assert_eq!(entry(1), 65535); // clamped from 1.5
        assert_eq!(entry(2), 32768); // 0.5 rounds up
        assert_eq!(entry(3), 0); // clamped from -1.0
        assert_eq!(entry(4), 65535);
        assert_eq!(entry(5), 16384); // 0.25
    }

    #[tokio::test]
    async fn too_many_rectangles_overflow() {
        let (server_io, _client_io) = tokio::io::duplex(64);
        let mut session = open_session(server_io);

        let rect = UpdateRectangle {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            encoding: Encoding::RAW,
            data: &[],
        };
        let rects = vec![rect; usize::from(u16::MAX) + 1];
        assert!(matches!(
            session.send_framebuffer_update(&rects).await,
            Err(RfbError::Overflow)
        ));
    }
}
