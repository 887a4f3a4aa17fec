//! SDK version information and user agent construction.

/// Current SDK version.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.bitbuffet.dev";

/// API version segment appended to the base URL.
pub const API_VERSION: &str = "v1";

/// Build the User-Agent string for SDK requests.
pub fn build_user_agent(suffix: Option<&str>) -> String {
    let mut ua = format!(
        "BitBuffet-SDK-Rust/{} ({}; {})",
        SDK_VERSION,
        std::env::consts::OS,
        std::env::consts::ARCH
    );

    if let Some(s) = suffix {
        ua.push(' ');
        ua.push_str(s);
    }

    ua
}
