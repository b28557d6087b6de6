/*!
 * LLM enrichment of glossary terms.
 *
 * - `tasks`: task types, sampling table and the `ContextProcessor`
 * - `batch`: round-based bounded-concurrency runner with retries
 * - `prompts`: prompt templates
 * - `json_repair`: best-effort repair of JSON replies
 */

pub mod batch;
pub mod json_repair;
pub mod prompts;
pub mod tasks;

pub use batch::{BatchOutcome, BatchRunner, MAX_RETRY, ProgressCallback};
pub use json_repair::{parse_repaired, repair_json};
pub use prompts::PromptTemplate;
pub use tasks::{ContextProcessor, TaskType, WorkerConfig};
