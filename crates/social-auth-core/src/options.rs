// SocialAuthOptions — configuration for the dispatch filter.
//
// All redirect targets and routing parameters live here. The filter itself
// holds no per-request mutable state; options are set once at composition
// time and shared immutably afterwards.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the social-login dispatch filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialAuthOptions {
    /// Path prefix the filter is installed at. The path segment after this
    /// prefix is the provider id: base `/auth` + request `/auth/mock` means
    /// provider `mock`.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Where to send the browser after a successful login.
    #[serde(default = "default_post_login_url")]
    pub post_login_url: String,

    /// Where to send the browser when no local account matched and a
    /// sign-in attempt was recorded for signup completion.
    #[serde(default = "default_signup_url")]
    pub signup_url: String,

    /// Where to send the browser on failure. Receives the error code as a
    /// query parameter (see `error_param`).
    #[serde(default = "default_failure_url")]
    pub failure_url: String,

    /// Fallback redirect after a connect when the provider does not supply
    /// its own post-connect URL.
    #[serde(default = "default_post_connect_url")]
    pub post_connect_url: String,

    /// Query parameter that flags a request as a connect action
    /// (link-to-existing-account) rather than a login.
    #[serde(default = "default_connect_param")]
    pub connect_param: String,

    /// Query parameter name carrying the error code on the failure redirect.
    #[serde(default = "default_error_param")]
    pub error_param: String,
}

fn default_base_path() -> String {
    "/auth".to_string()
}

fn default_post_login_url() -> String {
    "/".to_string()
}

fn default_signup_url() -> String {
    "/signup".to_string()
}

fn default_failure_url() -> String {
    "/signin".to_string()
}

fn default_post_connect_url() -> String {
    "/".to_string()
}

fn default_connect_param() -> String {
    "connect".to_string()
}

fn default_error_param() -> String {
    "error".to_string()
}

impl Default for SocialAuthOptions {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            post_login_url: default_post_login_url(),
            signup_url: default_signup_url(),
            failure_url: default_failure_url(),
            post_connect_url: default_post_connect_url(),
            connect_param: default_connect_param(),
            error_param: default_error_param(),
        }
    }
}

impl SocialAuthOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = path.into();
        self
    }

    pub fn with_post_login_url(mut self, url: impl Into<String>) -> Self {
        self.post_login_url = url.into();
        self
    }

    pub fn with_signup_url(mut self, url: impl Into<String>) -> Self {
        self.signup_url = url.into();
        self
    }

    pub fn with_failure_url(mut self, url: impl Into<String>) -> Self {
        self.failure_url = url.into();
        self
    }

    pub fn with_post_connect_url(mut self, url: impl Into<String>) -> Self {
        self.post_connect_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SocialAuthOptions::default();
        assert_eq!(opts.base_path, "/auth");
        assert_eq!(opts.post_login_url, "/");
        assert_eq!(opts.signup_url, "/signup");
        assert_eq!(opts.failure_url, "/signin");
        assert_eq!(opts.connect_param, "connect");
        assert_eq!(opts.error_param, "error");
    }

    #[test]
    fn test_builder() {
        let opts = SocialAuthOptions::new()
            .with_base_path("/social")
            .with_post_login_url("/home")
            .with_failure_url("/login?retry=true");
        assert_eq!(opts.base_path, "/social");
        assert_eq!(opts.post_login_url, "/home");
        assert_eq!(opts.failure_url, "/login?retry=true");
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let opts: SocialAuthOptions = serde_json::from_str(r#"{"basePath": "/s"}"#).unwrap();
        assert_eq!(opts.base_path, "/s");
        assert_eq!(opts.signup_url, "/signup");
    }
}
