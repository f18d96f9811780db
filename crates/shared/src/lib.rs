// Public modules
pub mod archive;
pub mod config;
pub mod content;
pub mod dates;
pub mod logging;
pub mod models;
pub mod news;
pub mod pipeline;
pub mod publish;
pub mod render;

// Re-export commonly used types
pub use archive::{ArchiveManager, ArchiveReport};
pub use config::{Config, Overrides};
pub use content::{ContentLoad, ContentLoader, ContentOrigin};
pub use models::{
    ArchiveIndexEntry, BreakingNewsItem, BreakingNewsStore, ContentRecord, SectionValue, Urgency,
};
pub use news::{NewsPoller, NewsSource, PollReport};
pub use pipeline::{run_daily, DailyReport};
pub use publish::{GitPublisher, PublishOutcome};
pub use render::DocumentRenderer;
