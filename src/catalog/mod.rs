pub mod goodreads;
mod html;
pub mod spydus;
pub mod types;

/// Desktop browser user agent; both sites serve reduced markup to unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
