//! Paced background execution of an episode.
//!
//! The runner moves an owned [`Episode`] onto one named worker thread. Steps
//! are therefore always serialized. Events flow back through a bounded
//! channel; the worker blocks when the consumer falls behind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::error::{AgentError, AgentResult, ExecutionError};

use super::config::RunnerConfig;
use super::{Episode, EpisodeId, EpisodeSnapshot, StepRecord};

const STREAM_PATH: &str = "episode_runner";

/// Event published by the runner.
#[derive(Debug, Clone)]
pub enum EpisodeEvent {
    /// One step was taken.
    Step(Box<StepRecord>),
    /// The episode ended or was stopped. Always the last event.
    Finished(Box<EpisodeSnapshot>),
}

/// Handle to an episode running on a worker thread.
///
/// Dropping the handle stops the episode and joins the worker.
#[derive(Debug)]
pub struct EpisodeRunner {
    id: EpisodeId,
    rx: Receiver<EpisodeEvent>,
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<Episode>>,
}

impl EpisodeRunner {
    /// Starts running `episode` in the background.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::SpawnFailed`] if the thread cannot start.
    pub fn start(episode: Episode, config: RunnerConfig) -> AgentResult<Self> {
        let id = episode.id();
        let (tx, rx) = bounded::<EpisodeEvent>(config.event_capacity.max(1));
        let stop = Arc::new(AtomicBool::new(false));

        let name = format!("wumpus-episode-{}", &id.to_string()[..8]);
        let thread_stop = Arc::clone(&stop);
        let join = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run(episode, &tx, &thread_stop, config.step_delay))
            .map_err(|e| ExecutionError::SpawnFailed {
                name,
                message: e.to_string(),
            })?;

        Ok(Self {
            id,
            rx,
            stop,
            join: Some(join),
        })
    }

    /// Identifier of the running episode.
    #[must_use]
    pub const fn id(&self) -> EpisodeId {
        self.id
    }

    /// Requests a stop; honored between steps.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Receives the next event (blocking).
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Disconnected`] after the last event.
    pub fn recv(&self) -> AgentResult<EpisodeEvent> {
        self.rx.recv().map_err(|_| disconnected())
    }

    /// Receives the next event with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Timeout`] or
    /// [`ExecutionError::Disconnected`].
    pub fn recv_timeout(&self, timeout: Duration) -> AgentResult<EpisodeEvent> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => AgentError::Execution(ExecutionError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => disconnected(),
        })
    }

    /// Returns the next event if one is ready.
    #[must_use]
    pub fn try_recv(&self) -> Option<EpisodeEvent> {
        self.rx.try_recv().ok()
    }

    /// Iterates events until the worker exits.
    pub fn events(&self) -> impl Iterator<Item = EpisodeEvent> + '_ {
        self.rx.iter()
    }

    /// Waits for the worker to exit and returns the episode. Unread events
    /// are discarded.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the worker panicked.
    pub fn join(mut self) -> AgentResult<Episode> {
        for _ in self.rx.iter() {}
        let handle = self
            .join
            .take()
            .ok_or_else(|| AgentError::internal("episode worker already joined"))?;
        handle
            .join()
            .map_err(|_| AgentError::internal("episode worker panicked"))
    }
}

impl Drop for EpisodeRunner {
    fn drop(&mut self) {
        self.stop();
        // Unblock a worker waiting on a full channel.
        self.rx = crossbeam_channel::never();
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

fn disconnected() -> AgentError {
    AgentError::Execution(ExecutionError::Disconnected {
        path: STREAM_PATH.to_string(),
    })
}

fn run(mut episode: Episode, tx: &Sender<EpisodeEvent>, stop: &AtomicBool, delay: Duration) -> Episode {
    while episode.is_playing() {
        if stop.load(Ordering::Acquire) {
            episode.stop();
            break;
        }
        match episode.step() {
            Ok(record) => {
                if tx.send(EpisodeEvent::Step(Box::new(record))).is_err() {
                    return episode;
                }
            }
            Err(e) => {
                tracing::warn!(episode = %episode.id(), error = %e, "step failed");
                episode.stop();
                break;
            }
        }
        if episode.is_playing() && !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    let _ = tx.send(EpisodeEvent::Finished(Box::new(episode.snapshot())));
    episode
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::{EpisodeConfig, EpisodeOutcome};
    use crate::world::WumpusWorld;

    fn episode(text: &str) -> Episode {
        Episode::new(EpisodeConfig::default(), Some(WumpusWorld::parse(text).unwrap())).unwrap()
    }

    #[test]
    fn test_runner_streams_steps_then_finish() {
        let runner = EpisodeRunner::start(episode("-G\n--\n"), RunnerConfig::default()).unwrap();

        let mut steps = 0;
        let mut finished = None;
        for event in runner.events() {
            match event {
                EpisodeEvent::Step(record) => {
                    steps += 1;
                    assert_eq!(record.step, steps);
                }
                EpisodeEvent::Finished(snapshot) => finished = Some(snapshot),
            }
        }

        let snapshot = finished.unwrap();
        assert_eq!(steps, 2);
        assert_eq!(snapshot.outcome, Some(EpisodeOutcome::GoldGrabbed));
        assert!(runner.recv().unwrap_err().is_execution());
    }

    #[test]
    fn test_stop_is_honored_between_steps() {
        let config = RunnerConfig {
            step_delay: Duration::from_millis(50),
            event_capacity: 4,
        };
        let runner = EpisodeRunner::start(episode("----\n----\n----\n---G\n"), config).unwrap();
        let first = runner.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(first, EpisodeEvent::Step(_)));

        runner.stop();
        let episode = runner.join().unwrap();
        assert_eq!(episode.outcome(), Some(EpisodeOutcome::Stopped));
    }

    #[test]
    fn test_drop_with_unread_events_does_not_hang() {
        let config = RunnerConfig {
            step_delay: Duration::ZERO,
            event_capacity: 1,
        };
        let runner = EpisodeRunner::start(episode("----\n----\n----\n---G\n"), config).unwrap();
        drop(runner);
    }
}
