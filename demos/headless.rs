//! A headless host for the session core: serves a static gradient to any
//! VNC viewer on port 5900 and logs the input events it receives.
//!
//! Run with `RUST_LOG=debug cargo run --example headless`, then point a
//! viewer at `localhost:5900`. Set `VNC_PASSWORD` to exercise VNC
//! authentication.

use bytes::BytesMut;
use log::{info, warn};

use rfbcore::{ClientEvent, Color, Encoding, Key, PixelFormat, ServerConfig, Session, UpdateRectangle};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ServerConfig {
        width: 640,
        height: 480,
        desktop_name: "rfbcore headless".to_string(),
        password: std::env::var("VNC_PASSWORD").ok(),
        ..ServerConfig::default()
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:5900").await?;
    info!("listening on 127.0.0.1:5900");

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("viewer connected from {peer}");
        if let Err(err) = serve(stream, &config).await {
            warn!("session ended: {err}");
        }
    }
}

async fn serve(stream: tokio::net::TcpStream, config: &ServerConfig) -> rfbcore::Result<()> {
    stream.set_nodelay(true)?;
    let mut session = Session::handshake(stream, config).await?;
    info!(
        "client speaks RFB {}, shared={}",
        session.protocol_version(),
        session.shared_connection()
    );

    loop {
        let event = match session.wait_event().await? {
            Some(event) => event,
            None => {
                info!("viewer disconnected");
                return Ok(());
            }
        };

        match event {
            ClientEvent::FramebufferUpdateRequest { incremental, .. } => {
                // A static screen has nothing new for incremental requests.
                if !incremental {
                    let pixels = gradient(config.width, config.height, &session.pixel_format())?;
                    let rect = UpdateRectangle {
                        x: 0,
                        y: 0,
                        width: config.width,
                        height: config.height,
                        encoding: Encoding::RAW,
                        data: &pixels,
                    };
                    session.send_framebuffer_update(&[rect]).await?;
                }
            }
            ClientEvent::KeyEvent { key, down } => {
                info!("key {key:?} {}", if down { "pressed" } else { "released" });
                if key == Key::RETURN && down {
                    session.send_bell().await?;
                }
            }
            ClientEvent::PointerEvent { x, y, buttons } => {
                info!("pointer at ({x}, {y}) buttons {buttons:#05b}");
            }
            ClientEvent::ClientCutText(text) => {
                // The slice borrows the session; copy before pushing back.
                let text = text.to_vec();
                info!("clipboard from client: {:?}", String::from_utf8_lossy(&text));
                session.send_server_cut_text(&text).await?;
            }
            ClientEvent::SetEncodings(encodings) => {
                info!("client encodings: {encodings:?}");
            }
            ClientEvent::SetPixelFormat(format) => {
                info!("client pixel format: {format:?}");
            }
        }
    }
}

/// Renders a full-screen gradient in the client's current pixel format.
fn gradient(width: u16, height: u16, format: &PixelFormat) -> rfbcore::Result<Vec<u8>> {
    let mut buf = BytesMut::with_capacity(usize::from(width) * usize::from(height) * 4);
    for y in 0..height {
        for x in 0..width {
            let color = Color::new(
                f32::from(x) / f32::from(width),
                f32::from(y) / f32::from(height),
                0.4,
            );
            format.encode(color, &mut buf)?;
        }
    }
    Ok(buf.to_vec())
}
