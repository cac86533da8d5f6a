//! Pairing loop: accept players two at a time and hand each pair to its own
//! session task.

use std::io;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use crate::engine::board::Layout;
use crate::engine::types::Color;

use super::registry::SessionRegistry;
use super::session::spawn_session;

/// Accept players forever. The first connection of each pair plays white.
pub async fn serve(
    listener: TcpListener,
    layout: Layout,
    registry: Arc<SessionRegistry>,
) -> io::Result<()> {
    info!(addr = %listener.local_addr()?, %layout, "waiting for players");
    loop {
        let white = accept_player(&listener, Color::White).await;
        let black = accept_player(&listener, Color::Black).await;

        match spawn_session(white, black, layout, registry.clone()).await {
            Ok((id, _)) => info!(session = %id, "players paired"),
            Err(e) => error!(error = %e, "could not start session"),
        }
    }
}

/// Wait for the next connection, retrying past transient accept errors.
async fn accept_player(listener: &TcpListener, side: Color) -> TcpStream {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    warn!(%addr, error = %e, "could not disable Nagle");
                }
                info!(%addr, %side, "player connected");
                return stream;
            }
            Err(e) => warn!(error = %e, "accept failed"),
        }
    }
}
