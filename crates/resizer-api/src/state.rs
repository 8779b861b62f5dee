use resizer_processing::PipelineOrchestrator;
use resizer_storage::Storage;
use std::sync::Arc;

/// Shared state handed to every handler
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub pipeline: PipelineOrchestrator,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, pipeline: PipelineOrchestrator) -> Self {
        Self { storage, pipeline }
    }
}
