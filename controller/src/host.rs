use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rumqttc::{AsyncClient, ClientError, Event, Incoming, MqttOptions, QoS};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use climate_common::{
    mode_set_topic, temperature_set_topic, ClimateEngine, InputEvent, RuntimeConfig, StatusSink,
};

use crate::{
    actor::{self, EngineHandle},
    store::AppStore,
};

#[derive(Clone)]
struct AppState {
    engine: EngineHandle,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

const MAX_MQTT_PAYLOAD_BYTES: usize = 512;

struct MqttStatusSink {
    client: AsyncClient,
}

impl StatusSink for MqttStatusSink {
    type Error = ClientError;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, true, payload.to_vec())
    }
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let store = AppStore::new();
    let mut runtime = store.load_runtime_config().await.unwrap_or_else(|err| {
        warn!("failed to load runtime config from store: {err:#}");
        RuntimeConfig::default()
    });
    apply_env_overrides(&mut runtime);

    let checkpoint = store
        .open_checkpoint()
        .await
        .context("failed to open setpoint checkpoint")?;

    let mqtt = match runtime.transport.topic.as_deref() {
        Some(topic) if !topic.trim().is_empty() => Some(connect_mqtt(&runtime).await?),
        _ => {
            info!("no transport topic configured, running without mqtt");
            None
        }
    };
    let sink = mqtt.as_ref().map(|(client, _)| MqttStatusSink {
        client: client.clone(),
    });

    let engine = ClimateEngine::new(&runtime, checkpoint, sink, 0)
        .context("invalid climate configuration")?;
    let handle = actor::spawn(engine, Duration::from_millis(runtime.climate.cycle_delay_ms));

    if let Some((_, eventloop)) = mqtt {
        spawn_mqtt_loop(handle.clone(), eventloop);
    }

    let app = Router::new()
        .route("/api/status", get(handle_get_status))
        .route("/api/input", post(handle_post_input))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { engine: handle });

    let port = std::env::var("CONTROLLER_HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind controller server at {addr}"))?;

    info!(device = %runtime.device.id, "controller listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn apply_env_overrides(runtime: &mut RuntimeConfig) {
    let transport = &mut runtime.transport;
    if let Ok(host) = std::env::var("MQTT_HOST") {
        transport.mqtt_host = host;
    }
    if let Some(port) = std::env::var("MQTT_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
    {
        transport.mqtt_port = port;
    }
    if let Ok(user) = std::env::var("MQTT_USER") {
        transport.mqtt_user = user;
    }
    if let Ok(pass) = std::env::var("MQTT_PASS") {
        transport.mqtt_pass = pass;
    }
}

async fn connect_mqtt(runtime: &RuntimeConfig) -> anyhow::Result<(AsyncClient, rumqttc::EventLoop)> {
    let transport = &runtime.transport;
    let mut options = MqttOptions::new(
        transport.client_id.clone(),
        transport.mqtt_host.clone(),
        transport.mqtt_port,
    );
    if !transport.mqtt_user.is_empty() {
        options.set_credentials(transport.mqtt_user.clone(), transport.mqtt_pass.clone());
    }

    let (client, eventloop) = AsyncClient::new(options, 64);

    let base = transport
        .topic
        .as_deref()
        .unwrap_or_default()
        .trim_end_matches('/');
    for topic in [mode_set_topic(base), temperature_set_topic(base)] {
        client
            .subscribe(topic.as_str(), QoS::AtMostOnce)
            .await
            .with_context(|| format!("failed to subscribe to {topic}"))?;
    }

    Ok((client, eventloop))
}

fn spawn_mqtt_loop(engine: EngineHandle, mut eventloop: rumqttc::EventLoop) {
    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::Publish(message))) => {
                    if let Err(err) =
                        handle_mqtt_message(&engine, message.topic, message.payload.to_vec()).await
                    {
                        warn!("mqtt message handling error: {err:#}");
                    }
                }
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    info!("mqtt connected");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("mqtt poll error: {err}");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    });
}

async fn handle_mqtt_message(
    engine: &EngineHandle,
    topic: String,
    payload: Vec<u8>,
) -> anyhow::Result<()> {
    if payload.len() > MAX_MQTT_PAYLOAD_BYTES {
        warn!(
            "dropping oversized MQTT payload on topic {} ({} bytes)",
            topic,
            payload.len()
        );
        return Ok(());
    }

    let message = String::from_utf8(payload).context("non utf8 mqtt payload")?;
    engine.transport(topic, message).await?;
    Ok(())
}

async fn handle_get_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.engine.snapshot().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(err) => error_response(StatusCode::SERVICE_UNAVAILABLE, &err.to_string()),
    }
}

async fn handle_post_input(
    State(state): State<AppState>,
    Json(event): Json<InputEvent>,
) -> impl IntoResponse {
    if let Err(err) = state.engine.input(event).await {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, &err.to_string());
    }

    match state.engine.snapshot().await {
        Ok(snapshot) => Json(snapshot.update).into_response(),
        Err(err) => error_response(StatusCode::SERVICE_UNAVAILABLE, &err.to_string()),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down controller");
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
