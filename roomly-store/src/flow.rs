use std::future::Future;

use roomly_core::ApiError;

/// Failure of a multi-step flow.
///
/// Steps listed in `completed` already took effect on the backend; nothing
/// is rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowError {
    pub flow: &'static str,
    pub step: &'static str,
    pub completed: Vec<&'static str>,
    pub error: ApiError,
}

impl std::fmt::Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed at step '{}'", self.flow, self.step)?;
        if !self.completed.is_empty() {
            write!(f, " after [{}]", self.completed.join(", "))?;
        }
        write!(f, ": {}", self.error)
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Runs named steps in order, stopping at the first failure.
///
/// ```ignore
/// let mut flow = Flow::new("approve-booking");
/// let booking = flow.step("approve", approve(id)).await?;
/// let rental = flow.step("create-rental", create_rental(&booking)).await?;
/// ```
#[derive(Debug)]
pub struct Flow {
    name: &'static str,
    completed: Vec<&'static str>,
}

impl Flow {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            completed: Vec::new(),
        }
    }

    pub async fn step<T, Fut>(&mut self, step: &'static str, fut: Fut) -> Result<T, FlowError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match fut.await {
            Ok(value) => {
                tracing::info!(flow = self.name, step, "step completed");
                self.completed.push(step);
                Ok(value)
            }
            Err(error) => {
                tracing::warn!(
                    flow = self.name,
                    step,
                    completed = ?self.completed,
                    error = %error,
                    "flow aborted"
                );
                Err(FlowError {
                    flow: self.name,
                    step,
                    completed: self.completed.clone(),
                    error,
                })
            }
        }
    }

    pub fn completed(&self) -> &[&'static str] {
        &self.completed
    }

    /// Names of every completed step.
    pub fn finish(self) -> Vec<&'static str> {
        tracing::info!(flow = self.name, steps = self.completed.len(), "flow finished");
        self.completed
    }
}
