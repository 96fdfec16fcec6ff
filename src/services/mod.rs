// Service exports
pub mod fetcher;
pub mod notify;
pub mod sheets;

pub use fetcher::{FetchError, Fetcher};
pub use notify::{NotifyError, NotifySink, TopicPublisher};
pub use sheets::{SheetError, SheetSink, SheetsClient};
