pub mod bulk_orchestrator;
pub mod draft;
