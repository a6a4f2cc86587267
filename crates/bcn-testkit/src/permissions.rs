use async_trait::async_trait;
use bcn_permissions::{PermissionApi, PermissionError, PermissionKind, PermissionStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::CallJournal;

#[derive(Debug)]
struct Answers {
    default: PermissionStatus,
    overrides: HashMap<PermissionKind, Result<PermissionStatus, PermissionError>>,
}

/// Scripted permission API. Clones share answers, so a test can keep a
/// handle after boxing one into a `PermissionGate` and flip answers later.
#[derive(Clone, Debug)]
pub struct FakePermissionApi {
    answers: Arc<Mutex<Answers>>,
    journal: CallJournal,
}

impl FakePermissionApi {
    pub fn granting(journal: CallJournal) -> Self {
        Self::with_default(PermissionStatus::Granted, journal)
    }

    pub fn denying(journal: CallJournal) -> Self {
        Self::with_default(PermissionStatus::Denied, journal)
    }

    fn with_default(default: PermissionStatus, journal: CallJournal) -> Self {
        Self {
            answers: Arc::new(Mutex::new(Answers {
                default,
                overrides: HashMap::new(),
            })),
            journal,
        }
    }

    /// Answer every request with `status` from now on; clears overrides.
    pub fn answer_all(&self, status: PermissionStatus) {
        if let Ok(mut a) = self.answers.lock() {
            a.default = status;
            a.overrides.clear();
        }
    }

    pub fn answer(&self, kind: PermissionKind, status: PermissionStatus) {
        if let Ok(mut a) = self.answers.lock() {
            a.overrides.insert(kind, Ok(status));
        }
    }

    pub fn fail(&self, kind: PermissionKind, reason: &str) {
        if let Ok(mut a) = self.answers.lock() {
            a.overrides.insert(
                kind,
                Err(PermissionError::RequestFailed {
                    kind,
                    reason: reason.to_string(),
                }),
            );
        }
    }
}

#[async_trait]
impl PermissionApi for FakePermissionApi {
    async fn request_permission(&self, kind: PermissionKind) -> Result<PermissionStatus, PermissionError> {
        self.journal.record(format!("request_permission:{}", kind.as_str()));
        let a = self
            .answers
            .lock()
            .map_err(|_| PermissionError::RequestFailed {
                kind,
                reason: "fake poisoned".to_string(),
            })?;
        a.overrides.get(&kind).cloned().unwrap_or(Ok(a.default))
    }
}
