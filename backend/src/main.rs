use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use draft_core::drawing::Drawing;
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::{Arc, PoisonError, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, info_span, warn, Instrument};

mod commands;
mod config;

use commands::{apply, format_error, render};
use config::Config;

// Application State
struct AppState {
    /// Current snapshot. Edits swap in a new `Arc`; readers keep the one they took.
    drawing: RwLock<Arc<Drawing>>,
}

impl AppState {
    fn snapshot(&self) -> Arc<Drawing> {
        self.drawing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let shared_state = Arc::new(AppState {
        drawing: RwLock::new(Arc::new(Drawing::new())),
    });

    let mut app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health));

    app = match &config.static_dir {
        Some(dir) => {
            info!("serving editor from {}", dir.display());
            app.fallback_service(ServeDir::new(dir))
        }
        None => app.route("/", get(root)),
    };

    let app = app
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", config.addr, e);
            return;
        }
    };
    info!("listening on {}", config.addr);
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", e);
    }
}

async fn root() -> &'static str {
    "Pattern drafting backend"
}

async fn health() -> &'static str {
    "ok"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let session = uuid::Uuid::new_v4();
    ws.on_upgrade(move |socket| {
        handle_socket(socket, state).instrument(info_span!("session", id = %session))
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    info!("Client connected");
    let (mut sender, mut receiver) = socket.split();

    // Initial state so the view can draw immediately
    {
        let snapshot = state.snapshot();
        for reply in [commands::Reply::Drawing, commands::Reply::Resolution] {
            if sender.send(Message::Text(render(reply, &snapshot))).await.is_err() {
                return;
            }
        }
    }

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };
        debug!("Received message: {}", text);

        // Edits are applied under the write lock; replies render from the
        // resulting snapshot after the lock is released.
        let outcome = {
            let mut current = state.drawing.write().unwrap_or_else(PoisonError::into_inner);
            match apply(&current, &text) {
                Ok(applied) => {
                    if let Some(next) = applied.next {
                        *current = Arc::new(next);
                    }
                    Ok((applied.replies, current.clone()))
                }
                Err(e) => Err(e),
            }
        };

        match outcome {
            Ok((replies, snapshot)) => {
                let command = text.split(':').next().unwrap_or_default();
                info!("Applied {} ({} points, {} variables)", command, snapshot.points.len(), snapshot.variables.len());
                for reply in replies {
                    if sender.send(Message::Text(render(reply, &snapshot))).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("Command failed: {}", e);
                if sender.send(Message::Text(format_error(&e))).await.is_err() {
                    return;
                }
            }
        }
    }

    info!("Client disconnected");
}
