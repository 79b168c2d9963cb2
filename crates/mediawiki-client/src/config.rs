//! Wiki connection parameters.

use std::fmt;
use std::time::Duration;

use url::Url;

/// Default host when nothing is configured.
pub const DEFAULT_HOST: &str = "wiki.example.com";

/// Default script path when nothing is configured.
pub const DEFAULT_PATH: &str = "/wiki/";

/// Default per-request network timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection parameters for the remote wiki.
///
/// Built once at startup and shared read-only afterwards. `scheme` is
/// derived from the HTTPS flag and has no setter of its own.
#[derive(Clone, PartialEq, Eq)]
pub struct WikiConfig {
    host: String,
    path: String,
    scheme: &'static str,
    bot_user: Option<String>,
    bot_pass: Option<String>,
    timeout: Duration,
}

impl WikiConfig {
    /// Create a configuration for `host` and script `path`.
    ///
    /// A missing leading or trailing slash on `path` is added.
    pub fn new(host: impl Into<String>, path: impl Into<String>, use_https: bool) -> Self {
        Self {
            host: host.into(),
            path: normalize_path(&path.into()),
            scheme: if use_https { "https" } else { "http" },
            bot_user: None,
            bot_pass: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set bot credentials. Empty strings count as absent.
    pub fn with_bot_credentials(
        mut self,
        user: Option<impl Into<String>>,
        pass: Option<impl Into<String>>,
    ) -> Self {
        self.bot_user = user.map(Into::into).filter(|u| !u.is_empty());
        self.bot_pass = pass.map(Into::into).filter(|p| !p.is_empty());
        self
    }

    /// Set the network timeout applied to every backend request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wiki host, possibly with a port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Script path, always starting and ending with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `"https"` or `"http"`.
    pub fn scheme(&self) -> &'static str {
        self.scheme
    }

    /// Network timeout for backend requests.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Bot username and password, when both are configured.
    pub fn bot_credentials(&self) -> Option<(&str, &str)> {
        match (&self.bot_user, &self.bot_pass) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    /// Whether both bot username and password are set.
    pub fn is_auth_configured(&self) -> bool {
        self.bot_credentials().is_some()
    }

    /// The Action API endpoint.
    pub fn api_url(&self) -> String {
        format!("{}://{}{}api.php", self.scheme, self.host, self.path)
    }

    /// Canonical URL of the page `title`.
    ///
    /// Spaces become underscores and each subpage segment is
    /// percent-encoded, so `?`, `#` and `%` stay part of the title.
    pub fn page_url(&self, title: &str) -> String {
        let base = format!("{}://{}{}index.php", self.scheme, self.host, self.path);
        let title = title.replace(' ', "_");
        match Url::parse(&base) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.extend(title.split('/'));
                }
                url.into()
            }
            // A host that does not parse fails every request anyway.
            Err(_) => format!("{base}/{title}"),
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PATH, true)
    }
}

impl fmt::Debug for WikiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WikiConfig")
            .field("host", &self.host)
            .field("path", &self.path)
            .field("scheme", &self.scheme)
            .field("bot_user", &self.bot_user)
            .field("auth", &self.is_auth_configured())
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}
