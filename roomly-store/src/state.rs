/// Loading/error flags of one logical operation.
///
/// `loading` and `error` are never both set: starting a request clears the
/// previous error, and settling clears `loading`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub loading: bool,
    pub error: Option<String>,
}

impl RequestState {
    pub fn begin(&mut self) {
        self.error = None;
        self.loading = true;
    }

    pub fn succeed(&mut self) {
        self.loading = false;
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Drop the loading flag without recording an outcome.
    pub fn abandon(&mut self) {
        self.loading = false;
    }

    pub fn is_idle(&self) -> bool {
        !self.loading
    }
}

/// What a store action did to its state.
///
/// State remains the primary channel; this is for callers that want to
/// branch on the result (e.g. show a toast only on `Failed`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The response was merged into state.
    Applied,
    /// No request was issued (duplicate, nothing to load, or re-entry).
    Skipped,
    /// The request was cancelled or its response was outdated on arrival.
    Superseded,
    /// The request failed; the message is also stored in state.
    Failed(String),
}

impl SyncOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncOutcome::Applied)
    }
}
