//! Host browser environment detection
//!
//! Classifies the hosting context from its user-agent string. The
//! classification only steers strategy applicability; misdetection is
//! harmless because the chain always ends in a direct download.

/// User-agent tokens of in-app browsers that hijack plain downloads.
const IN_APP_TOKENS: [&str; 7] = [
    "fban",
    "fbav",
    "instagram",
    "line",
    "twitter",
    "snapchat",
    "tiktok",
];

/// The hosting browser, as inferred from its user agent.
#[derive(Debug, Clone, Default)]
pub struct BrowserEnvironment {
    user_agent: String,
}

impl BrowserEnvironment {
    pub fn from_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into().to_ascii_lowercase(),
        }
    }

    pub fn is_android(&self) -> bool {
        self.user_agent.contains("android")
    }

    pub fn is_ios(&self) -> bool {
        ["ipad", "iphone", "ipod"]
            .iter()
            .any(|token| self.user_agent.contains(token))
    }

    /// Inside a social/messaging in-app browser.
    pub fn is_in_app(&self) -> bool {
        IN_APP_TOKENS
            .iter()
            .any(|token| self.user_agent.contains(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36";
    const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

    #[test]
    fn test_platform_detection() {
        assert!(BrowserEnvironment::from_user_agent(IPHONE_UA).is_ios());
        assert!(!BrowserEnvironment::from_user_agent(IPHONE_UA).is_android());
        assert!(BrowserEnvironment::from_user_agent(ANDROID_UA).is_android());
        assert!(!BrowserEnvironment::from_user_agent(DESKTOP_UA).is_ios());
        assert!(!BrowserEnvironment::from_user_agent(DESKTOP_UA).is_android());
    }

    #[test]
    fn test_in_app_detection() {
        let ua = format!("{ANDROID_UA} Instagram 300.0.0.0");
        assert!(BrowserEnvironment::from_user_agent(&ua).is_in_app());
        let ua = format!("{IPHONE_UA} [FBAN/FBIOS;FBAV/400.0]");
        assert!(BrowserEnvironment::from_user_agent(&ua).is_in_app());
        assert!(!BrowserEnvironment::from_user_agent(DESKTOP_UA).is_in_app());
    }

    #[test]
    fn test_default_is_plain_context() {
        let env = BrowserEnvironment::default();
        assert!(!env.is_android() && !env.is_ios() && !env.is_in_app());
    }
}
