//! Off-thread graph fetches.
//!
//! Each request runs on its own worker thread and reports back over a
//! channel that the session polls once per tick. Requests are tagged with a
//! generation; starting a new one drops the previous receiver, so a stale
//! worker's result is discarded and never applied.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context;
use tracing::{debug, info};

use crate::error::SceneError;
use crate::graph::GraphPayload;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded { ticket: LoadTicket, payload: GraphPayload },
    Failed { ticket: LoadTicket, message: String },
}

type WorkerResult = (u64, Result<GraphPayload, String>);

#[derive(Debug, Default)]
pub struct GraphLoader {
    generation: u64,
    pending: Option<(LoadTicket, Receiver<WorkerResult>)>,
}

impl GraphLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `fetch` on a worker thread, superseding any request still in
    /// flight.
    pub fn request<F>(&mut self, fetch: F) -> LoadTicket
    where
        F: FnOnce() -> anyhow::Result<GraphPayload> + Send + 'static,
    {
        let ticket = self.supersede();
        let (tx, rx) = mpsc::channel();
        let generation = ticket.generation();

        thread::spawn(move || {
            let result = fetch().map_err(|error| format!("{error:#}"));
            let _ = tx.send((generation, result));
        });

        debug!(generation, "graph load requested");
        self.pending = Some((ticket, rx));
        ticket
    }

    /// Invalidates whatever is in flight. Used directly when a payload is
    /// applied synchronously.
    pub fn supersede(&mut self) -> LoadTicket {
        if let Some((stale, _)) = self.pending.take() {
            info!(generation = stale.generation(), "discarding superseded graph load");
        }
        self.generation += 1;
        LoadTicket(self.generation)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Non-blocking. Yields the newest request's outcome once it is ready.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        let (ticket, rx) = self.pending.take()?;
        match rx.try_recv() {
            Ok((generation, _)) if generation != self.generation => {
                debug!(generation, "dropping stale graph load result");
                None
            }
            Ok((_, Ok(payload))) => Some(LoadOutcome::Loaded { ticket, payload }),
            Ok((_, Err(message))) => Some(LoadOutcome::Failed { ticket, message }),
            Err(TryRecvError::Empty) => {
                self.pending = Some((ticket, rx));
                None
            }
            Err(TryRecvError::Disconnected) => Some(LoadOutcome::Failed {
                ticket,
                message: SceneError::WorkerDisconnected.to_string(),
            }),
        }
    }
}

/// Reads a payload file. Meant as a [`GraphLoader::request`] fetch.
pub fn read_payload_file(path: impl AsRef<Path>) -> anyhow::Result<GraphPayload> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    GraphPayload::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse graph payload from {}", path.display()))
}
