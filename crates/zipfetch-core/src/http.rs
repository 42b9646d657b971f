//! Shared libcurl settings for the size probe and the body transfer.

use std::time::Duration;

/// Per-handle curl options derived from config.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/s for this long.
    pub low_speed_time: Duration,
    pub low_speed_limit: u32,
    /// Hard cap on one request, so a completely stuck transfer eventually fails.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_time: Duration::from_secs(60),
            low_speed_limit: 1024,
            timeout: Duration::from_secs(3600),
            user_agent: concat!("zipfetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CurlOptions {
    /// Applies redirects, timeouts and user agent to `easy`.
    pub(crate) fn apply(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        easy.timeout(self.timeout)?;
        easy.useragent(&self.user_agent)?;
        Ok(())
    }
}

pub(crate) fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}
