//! Application base URL handed out under `base-url`.

/// Base URL split into origin, base path and path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseUrl {
    pub origin: String,
    pub base_path: String,
    pub path: String,
}

impl BaseUrl {
    /// Parses `scheme://host[:port]/path`; anything without `://` is a path.
    /// Credentials are dropped.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (origin, path) = match raw.find("://") {
            Some(scheme_end) => {
                let after_scheme = &raw[scheme_end + 3..];
                let path_start = after_scheme.find('/').unwrap_or(after_scheme.len());
                let authority = &after_scheme[..path_start];
                let host = authority.rsplit('@').next().unwrap_or(authority);
                (
                    format!("{}{}", &raw[..scheme_end + 3], host),
                    &after_scheme[path_start..],
                )
            }
            None => (String::new(), raw),
        };
        Self {
            origin,
            base_path: String::new(),
            path: path.to_string(),
        }
    }

    /// Moves the current path into the base path, as done once at boot.
    pub fn with_path_as_base(mut self) -> Self {
        if !self.path.is_empty() {
            self.base_path = self.path.trim_end_matches('/').to_string();
            self.path = String::new();
        }
        self
    }

    pub fn to_url_string(&self) -> String {
        format!("{}{}{}", self.origin, self.base_path, self.path)
    }
}
