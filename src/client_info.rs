/// Platform metadata posted with every message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientInfo {
    pub os: String,
    pub browser: String,
}

impl ClientInfo {
    pub fn from_user_agent(user_agent: &str) -> Self {
        Self {
            os: detect_os(user_agent).to_string(),
            browser: detect_browser(user_agent).to_string(),
        }
    }

    /// Reads `navigator.userAgent`.
    #[cfg(target_arch = "wasm32")]
    pub fn current() -> Self {
        let user_agent = web_sys::window()
            .and_then(|window| window.navigator().user_agent().ok())
            .unwrap_or_default();
        Self::from_user_agent(&user_agent)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "windows" => "Windows",
            "macos" => "MacOS",
            "ios" => "iOS",
            "android" => "Android",
            "linux" => "Linux",
            _ => "Unknown",
        };
        Self {
            os: os.to_string(),
            browser: "Native".to_string(),
        }
    }
}

pub fn detect_os(user_agent: &str) -> &'static str {
    // iOS and Android agents also carry "Mac OS X" and "Linux".
    if user_agent.contains("Windows") {
        "Windows"
    } else if ["iPhone", "iPad", "iPod"].iter().any(|t| user_agent.contains(t)) {
        "iOS"
    } else if user_agent.contains("Macintosh") || user_agent.contains("Mac OS X") {
        "MacOS"
    } else if user_agent.contains("Android") {
        "Android"
    } else if user_agent.contains("Linux") || user_agent.contains("X11") {
        "Linux"
    } else {
        "Unknown"
    }
}

pub fn detect_browser(user_agent: &str) -> &'static str {
    // Order matters: Edge and Opera embed "Chrome", Chrome embeds "Safari".
    if user_agent.contains("Edg/") || user_agent.contains("Edge/") {
        "Edge"
    } else if user_agent.contains("OPR/") || user_agent.contains("Opera") {
        "Opera"
    } else if user_agent.contains("Chrome/") || user_agent.contains("CriOS/") {
        "Chrome"
    } else if user_agent.contains("Firefox/") || user_agent.contains("FxiOS/") {
        "Firefox"
    } else if user_agent.contains("Safari/") {
        "Safari"
    } else {
        "Unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
    const EDGE_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.2478.51";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1";
    const FIREFOX_LINUX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0";
    const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36";
    const SAFARI_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15";

    #[test]
    fn test_detect_os() {
        assert_eq!(detect_os(CHROME_WINDOWS), "Windows");
        assert_eq!(detect_os(SAFARI_IPHONE), "iOS");
        assert_eq!(detect_os(FIREFOX_LINUX), "Linux");
        assert_eq!(detect_os(CHROME_ANDROID), "Android");
        assert_eq!(detect_os(SAFARI_MAC), "MacOS");
        assert_eq!(detect_os(""), "Unknown");
    }

    #[test]
    fn test_detect_browser() {
        assert_eq!(detect_browser(CHROME_WINDOWS), "Chrome");
        assert_eq!(detect_browser(EDGE_WINDOWS), "Edge");
        assert_eq!(detect_browser(SAFARI_IPHONE), "Safari");
        assert_eq!(detect_browser(FIREFOX_LINUX), "Firefox");
        assert_eq!(detect_browser(CHROME_ANDROID), "Chrome");
        assert_eq!(detect_browser("curl/8.0"), "Unknown");
    }

    #[test]
    fn test_from_user_agent() {
        let info = ClientInfo::from_user_agent(SAFARI_MAC);
        assert_eq!(info.os, "MacOS");
        assert_eq!(info.browser, "Safari");
    }
}
