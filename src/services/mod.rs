pub mod blackboard;
pub mod chunker;
pub mod exemplar;
pub mod invoker;
pub mod parallel;
pub mod prompt_runner;
pub mod rag;
pub mod registry;
pub mod retry;
pub mod window_store;

pub use blackboard::Blackboard;
pub use chunker::ContentChunker;
pub use exemplar::{DomainTypeInfo, DomainTypeRegistry, ExemplarGenerator, ToolGroupFactory};
pub use invoker::{ActionInvoker, OperationContext};
pub use parallel::parallel_map;
pub use prompt_runner::PromptRunner;
pub use rag::{
    CompressionEnhancer, DeduplicationEnhancer, EnhancementPipeline, FilterEnhancer,
    RerankingEnhancer, ResponseEnhancer, StageReport,
};
pub use registry::MetadataReader;
pub use retry::{with_timeout, RetryPolicy};
pub use window_store::WindowStore;
