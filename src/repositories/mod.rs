pub mod cursor_repository;
pub mod memory;
pub mod report_repository;
pub mod traits;
pub mod user_repository;

// Re-export all repositories for convenient access
pub use cursor_repository::CursorRepository;
pub use memory::MemoryStore;
pub use report_repository::ReportRepository;
pub use traits::{CursorStore, MatchCommit, ReportStore, Teardown, UserStore};
pub use user_repository::UserRepository;
