use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::LLMProvider;
use crate::shared::utils::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub llm: Arc<dyn LLMProvider>,
}
