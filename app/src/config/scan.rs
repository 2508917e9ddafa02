use chrono::Duration;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ScanConfig {
    window_minutes: Option<i64>,
}

impl ScanConfig {
    /// Submissions for the same repository spaced closer than this window
    /// fold into one scan.
    pub fn window(&self) -> Duration {
        Duration::minutes(self.window_minutes.unwrap_or(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_five_minutes() {
        let config = ScanConfig::default();
        assert_eq!(config.window(), Duration::minutes(5));
    }
}
