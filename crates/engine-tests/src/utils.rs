//! Recording fakes for the cluster collaborators.

use async_trait::async_trait;
use engine_core::{
    connectors::{
        backend::{Backend, ClosedEngine, EngineWriter, OpenedEngine},
        directory::StoreDirectory,
    },
    error::{BackendError, DirectoryError},
};
use engine_processing::error::ImportStep;
use model::{
    records::kv::{KvPair, Rows},
    store::{Store, StoreState, SwitchMode},
};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

/// Every collaborator call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListStores(StoreState),
    SwitchMode { address: String, mode: SwitchMode },
    OpenEngine { table: String, shard_id: i32 },
    AcquireWriter,
    WriteRows(Vec<KvPair>),
    CloseWriter,
    CloseEngine,
    Import,
    Cleanup,
}

pub fn switch(address: &str, mode: SwitchMode) -> Call {
    Call::SwitchMode {
        address: address.to_string(),
        mode,
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|c| c == call)
    }
}

/// The three-store cluster used by most scenarios.
pub fn three_stores() -> Vec<Store> {
    vec![
        Store::new("s1", StoreState::Normal),
        Store::new("s2", StoreState::Offline),
        Store::new("s3", StoreState::Disconnected),
    ]
}

pub struct RecordingDirectory {
    stores: Vec<Store>,
    failing: HashSet<String>,
    fail_listing: bool,
    switch_delay: Option<Duration>,
    log: CallLog,
}

impl RecordingDirectory {
    pub fn new(stores: Vec<Store>, log: CallLog) -> Self {
        Self {
            stores,
            failing: HashSet::new(),
            fail_listing: false,
            switch_delay: None,
            log,
        }
    }

    pub fn failing_switch(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Makes every `switch_mode` take this long, on the tokio clock.
    pub fn slow_switch(mut self, delay: Duration) -> Self {
        self.switch_delay = Some(delay);
        self
    }
}

#[async_trait]
impl StoreDirectory for RecordingDirectory {
    async fn list_stores(&self, min_state: StoreState) -> Result<Vec<Store>, DirectoryError> {
        self.log.push(Call::ListStores(min_state));
        if self.fail_listing {
            return Err(DirectoryError::Unavailable("placement driver down".into()));
        }
        Ok(self
            .stores
            .iter()
            .filter(|s| s.state >= min_state)
            .cloned()
            .collect())
    }

    async fn switch_mode(&self, address: &str, mode: SwitchMode) -> Result<(), DirectoryError> {
        self.log.push(switch(address, mode));
        if let Some(delay) = self.switch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(address) {
            return Err(DirectoryError::Rejected {
                address: address.to_string(),
                mode,
                reason: "injected".into(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Behavior {
    fail_at: Option<ImportStep>,
    import_delay: Option<Duration>,
}

impl Behavior {
    fn check(&self, step: ImportStep) -> Result<(), BackendError> {
        if self.fail_at == Some(step) {
            return Err(BackendError::Other(format!("injected failure at {step}")));
        }
        Ok(())
    }
}

pub struct RecordingBackend {
    log: CallLog,
    behavior: Behavior,
}

impl RecordingBackend {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            behavior: Behavior::default(),
        }
    }

    pub fn failing_at(mut self, step: ImportStep) -> Self {
        self.behavior.fail_at = Some(step);
        self
    }

    /// Makes `import` take this long, on the tokio clock.
    pub fn slow_import(mut self, delay: Duration) -> Self {
        self.behavior.import_delay = Some(delay);
        self
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn open_engine(
        &self,
        table: &str,
        shard_id: i32,
    ) -> Result<Box<dyn OpenedEngine>, BackendError> {
        self.log.push(Call::OpenEngine {
            table: table.to_string(),
            shard_id,
        });
        self.behavior.check(ImportStep::OpenEngine)?;
        Ok(Box::new(RecordingEngine {
            log: self.log.clone(),
            behavior: self.behavior.clone(),
        }))
    }
}

struct RecordingEngine {
    log: CallLog,
    behavior: Behavior,
}

#[async_trait]
impl OpenedEngine for RecordingEngine {
    fn id(&self) -> &str {
        "recording"
    }

    async fn local_writer(&self) -> Result<Box<dyn EngineWriter>, BackendError> {
        self.log.push(Call::AcquireWriter);
        self.behavior.check(ImportStep::AcquireWriter)?;
        Ok(Box::new(RecordingWriter {
            log: self.log.clone(),
            behavior: self.behavior.clone(),
        }))
    }

    async fn close(self: Box<Self>) -> Result<Box<dyn ClosedEngine>, BackendError> {
        self.log.push(Call::CloseEngine);
        self.behavior.check(ImportStep::CloseEngine)?;
        Ok(Box::new(RecordingClosedEngine {
            log: self.log,
            behavior: self.behavior,
        }))
    }
}

struct RecordingWriter {
    log: CallLog,
    behavior: Behavior,
}

#[async_trait]
impl EngineWriter for RecordingWriter {
    async fn write_rows(&mut self, rows: &Rows) -> Result<(), BackendError> {
        self.log.push(Call::WriteRows(rows.as_slice().to_vec()));
        self.behavior.check(ImportStep::WriteRows)
    }

    async fn close(self: Box<Self>) -> Result<(), BackendError> {
        self.log.push(Call::CloseWriter);
        self.behavior.check(ImportStep::CloseWriter)
    }
}

struct RecordingClosedEngine {
    log: CallLog,
    behavior: Behavior,
}

#[async_trait]
impl ClosedEngine for RecordingClosedEngine {
    async fn import(&mut self) -> Result<(), BackendError> {
        self.log.push(Call::Import);
        if let Some(delay) = self.behavior.import_delay {
            tokio::time::sleep(delay).await;
        }
        self.behavior.check(ImportStep::Import)
    }

    async fn cleanup(self: Box<Self>) -> Result<(), BackendError> {
        self.log.push(Call::Cleanup);
        self.behavior.check(ImportStep::Cleanup)
    }
}
