use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};
use tracing::{debug, info, warn};

use climate_common::{
    command_from_topic, Checkpoint, ClimateEngine, ClimateUpdate, DisplayStatus, EngineOutput,
    InputEvent, StatusSink,
};

const REQUEST_BUFFER: usize = 32;

#[derive(Debug, Error)]
#[error("climate engine task has stopped")]
pub struct EngineStopped;

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub update: ClimateUpdate,
    pub status: DisplayStatus,
}

enum Request {
    Input(InputEvent),
    Transport { topic: String, payload: String },
    Snapshot(oneshot::Sender<Snapshot>),
}

#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Request>,
}

impl EngineHandle {
    pub async fn input(&self, event: InputEvent) -> Result<(), EngineStopped> {
        self.tx
            .send(Request::Input(event))
            .await
            .map_err(|_| EngineStopped)
    }

    pub async fn transport(&self, topic: String, payload: String) -> Result<(), EngineStopped> {
        self.tx
            .send(Request::Transport { topic, payload })
            .await
            .map_err(|_| EngineStopped)
    }

    pub async fn snapshot(&self) -> Result<Snapshot, EngineStopped> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Snapshot(reply))
            .await
            .map_err(|_| EngineStopped)?;
        rx.await.map_err(|_| EngineStopped)
    }
}

pub fn spawn<C, S>(engine: ClimateEngine<C, S>, cycle: Duration) -> EngineHandle
where
    C: Checkpoint + Send + 'static,
    S: StatusSink + Send + 'static,
{
    let (tx, rx) = mpsc::channel(REQUEST_BUFFER);
    tokio::spawn(run(engine, rx, cycle, Instant::now()));
    EngineHandle { tx }
}

async fn run<C, S>(
    mut engine: ClimateEngine<C, S>,
    mut rx: mpsc::Receiver<Request>,
    cycle: Duration,
    origin: Instant,
) where
    C: Checkpoint,
    S: StatusSink,
{
    let now_ms = || -> u64 { origin.elapsed().as_millis().try_into().unwrap_or(u64::MAX) };
    let mut interval = tokio::time::interval(cycle);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                execute_engine_outputs(engine.tick(now_ms()));
            }
            request = rx.recv() => {
                let Some(request) = request else {
                    info!("engine handles dropped, stopping climate engine");
                    break;
                };
                handle_request(&mut engine, request, now_ms());
            }
        }
    }
}

fn handle_request<C: Checkpoint, S: StatusSink>(
    engine: &mut ClimateEngine<C, S>,
    request: Request,
    now_ms: u64,
) {
    match request {
        Request::Input(event) => {
            for command in event.commands() {
                execute_engine_outputs(engine.apply(command, now_ms));
            }
        }
        Request::Transport { topic, payload } => match command_from_topic(&topic, &payload) {
            Some(command) => execute_engine_outputs(engine.apply(command, now_ms)),
            None => debug!("ignoring transport message on {topic}"),
        },
        Request::Snapshot(reply) => {
            let snapshot = Snapshot {
                update: engine.update(now_ms),
                status: engine.display_status().clone(),
            };
            // The requester may have given up.
            let _ = reply.send(snapshot);
        }
    }
}

fn execute_engine_outputs(outputs: Vec<EngineOutput>) {
    for output in outputs {
        match output {
            EngineOutput::Update(update) => info!(
                mode = update.mode.as_str(),
                action = update.action.as_str(),
                temperature = ?update.temperature,
                connected = update.connected,
                "climate update"
            ),
            EngineOutput::Status(status) => debug!("display status: {}", status.text),
            EngineOutput::PublishFailed(err) => warn!("status publish failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climate_common::{
        ClimateAction, ClimateConfig, ClimateMode, MemoryCheckpoint, RuntimeConfig,
        TransportConfig,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct NoSink;

    impl StatusSink for NoSink {
        type Error = std::convert::Infallible;

        fn publish(&mut self, _topic: &str, _payload: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn spawn_heat_only() -> EngineHandle {
        let runtime = RuntimeConfig {
            climate: ClimateConfig {
                has_cooling: false,
                startup_grace_ms: 0,
                ..ClimateConfig::default()
            },
            transport: TransportConfig {
                advertise: false,
                ..TransportConfig::default()
            },
            ..RuntimeConfig::default()
        };
        let engine =
            ClimateEngine::<_, NoSink>::new(&runtime, MemoryCheckpoint::new(), None, 0).unwrap();
        spawn(engine, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn input_events_reach_the_engine() {
        let handle = spawn_heat_only();
        let event: InputEvent =
            serde_json::from_value(json!({ "payload": "heat", "temperature": 15.0 })).unwrap();

        handle.input(event).await.unwrap();
        let snapshot = handle.snapshot().await.unwrap();

        assert_eq!(snapshot.update.mode, ClimateMode::Heat);
        assert_eq!(snapshot.update.temperature, Some(15.0));
        assert_eq!(snapshot.update.action, ClimateAction::Heating);
        assert!(snapshot.update.connected);
    }

    #[tokio::test]
    async fn transport_topics_route_to_commands() {
        let handle = spawn_heat_only();

        handle
            .transport("climate/zone1/mode/set".to_string(), "off".to_string())
            .await
            .unwrap();
        handle
            .transport("climate/zone1/unknown".to_string(), "heat".to_string())
            .await
            .unwrap();
        let snapshot = handle.snapshot().await.unwrap();

        assert_eq!(snapshot.update.mode, ClimateMode::Off);
        assert_eq!(
            snapshot.status,
            DisplayStatus::for_state(ClimateMode::Off, ClimateAction::None, None)
        );
    }
}
