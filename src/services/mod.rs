// Service exports
pub mod daily;
pub mod store;
pub mod zulip;

pub use daily::{run_daily, weekday_key, Messages, PipelineError};
pub use store::{InMemoryProfileStore, ProfileStore, StoreError};
pub use zulip::{Notifier, NotifyError, ZulipClient};
