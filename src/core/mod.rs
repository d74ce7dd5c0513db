// Core algorithm exports
pub mod best;
pub mod compatibility;
pub mod matcher;
pub mod partition;
pub mod path;

pub use best::BestSlot;
pub use compatibility::is_compatible;
pub use matcher::{Matcher, MatchResult, EngineError, SearchStats};
pub use partition::partition;
pub use path::Path;
