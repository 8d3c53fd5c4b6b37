use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use super::event::Event;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event file i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("event serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Authoritative in-memory event collection, mirrored to a JSON file after
/// every mutation. Insertion order is preserved on disk and in memory; the
/// grid regroups by day at projection time.
///
/// Consumers subscribe to a generation counter that is bumped on every
/// successful add/delete and re-project when it advances.
pub struct EventStore {
    events: Vec<Event>,
    path: PathBuf,
    generation: watch::Sender<u64>,
}

impl EventStore {
    /// Open the store backed by `path`. A missing file yields an empty
    /// store. A file that fails to decode as the expected array shape is
    /// logged, deleted, and likewise yields an empty store; corruption
    /// never blocks mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let events = load_events(&path)?;
        let (generation, _) = watch::channel(0);
        Ok(Self {
            events,
            path,
            generation,
        })
    }

    /// Append a freshly-constructed event and persist. The store performs
    /// no field validation; the form gates submission. A failed write
    /// rolls the append back so memory, disk and subscribers stay in step.
    pub fn add_event(
        &mut self,
        title: String,
        location: String,
        date: NaiveDate,
        time: String,
    ) -> Result<&Event> {
        self.events.push(Event::new(title, location, date, time));
        if let Err(err) = self.persist() {
            self.events.pop();
            return Err(err);
        }
        self.notify();
        Ok(self.events.last().expect("just pushed"))
    }

    /// Remove the event with `id`, if present. An absent id is a no-op,
    /// not an error. A failed write reinstates the event at its old
    /// position.
    pub fn delete_event(&mut self, id: Uuid) -> Result<bool> {
        let Some(idx) = self.events.iter().position(|ev| ev.id == id) else {
            return Ok(false);
        };
        let removed = self.events.remove(idx);
        if let Err(err) = self.persist() {
            self.events.insert(idx, removed);
            return Err(err);
        }
        self.notify();
        Ok(true)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Serialize the full collection and rewrite the backing file. Written
    /// to a temp file first so a failed write never truncates good data.
    fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.events)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn notify(&self) {
        self.generation.send_modify(|g| *g += 1);
    }
}

fn load_events(path: &Path) -> Result<Vec<Event>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    match serde_json::from_str::<Vec<Event>>(&raw) {
        Ok(events) => Ok(events),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "discarding malformed event file"
            );
            // Corruption must never block readiness; a file we cannot
            // delete is only logged and overwritten on the next persist.
            if let Err(remove_err) = fs::remove_file(path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %remove_err,
                    "failed to remove malformed event file"
                );
            }
            Ok(Vec::new())
        }
    }
}
