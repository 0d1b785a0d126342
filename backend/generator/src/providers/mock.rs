use std::collections::VecDeque;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use appify_core::{CodeGenerator, GenerationRequest, TurnResult};

/// A generator that replays scripted outcomes and records what it was asked.
///
/// Once the script runs out it answers with a plain explanation.
pub struct MockGenerator {
    name: String,
    script: Mutex<VecDeque<std::result::Result<TurnResult, String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_result(mut self, result: TurnResult) -> Self {
        self.script.get_mut().push_back(Ok(result));
        self
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.script.get_mut().push_back(Err(message.into()));
        self
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CodeGenerator for MockGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<TurnResult> {
        self.requests.lock().await.push(request.clone());
        match self.script.lock().await.pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(TurnResult::explanation_only("Mock response")),
        }
    }
}
