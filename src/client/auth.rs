use base64::Engine;

/// Credentials attached to every request sent to a cluster.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Use an API key via the `Authorization: ApiKey` header
    Apikey(String),
    /// Use username and password via Basic Auth headers
    Basic(String, String),
    /// Don't send an Authorization header
    None,
}

impl Auth {
    /// Pick the credential to use from whatever is configured.
    ///
    /// An API key wins over username/password when both are present. Empty
    /// strings count as absent.
    pub fn new(
        username: Option<String>,
        password: Option<String>,
        apikey: Option<String>,
    ) -> Self {
        let present = |s: Option<String>| s.filter(|s| !s.is_empty());
        match (present(apikey), present(username), present(password)) {
            (Some(apikey), _, _) => Self::Apikey(apikey),
            (None, Some(username), Some(password)) => Self::Basic(username, password),
            _ => Self::None,
        }
    }

    /// Value for the `Authorization` header, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Apikey(apikey) => Some(format!("ApiKey {}", apikey)),
            Self::Basic(username, password) => {
                let credentials = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                Some(format!("Basic {}", credentials))
            }
            Self::None => None,
        }
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apikey(_) => write!(f, "Apikey"),
            Self::Basic(_, _) => write!(f, "Basic"),
            Self::None => write!(f, "None"),
        }
    }
}

// Secrets never reach logs.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apikey(_) => f.write_str("Apikey(***)"),
            Self::Basic(username, _) => write!(f, "Basic({}, ***)", username),
            Self::None => f.write_str("None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apikey_takes_precedence() {
        let auth = Auth::new(
            Some("elastic".to_string()),
            Some("changeme".to_string()),
            Some("abc123".to_string()),
        );
        assert_eq!(auth, Auth::Apikey("abc123".to_string()));
        assert_eq!(auth.header_value().unwrap(), "ApiKey abc123");
    }

    #[test]
    fn test_basic_requires_both_parts() {
        let auth = Auth::new(Some("elastic".to_string()), None, None);
        assert_eq!(auth, Auth::None);

        let auth = Auth::new(
            Some("elastic".to_string()),
            Some("changeme".to_string()),
            Some(String::new()),
        );
        assert_eq!(
            auth.header_value().unwrap(),
            "Basic ZWxhc3RpYzpjaGFuZ2VtZQ=="
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let auth = Auth::Basic("elastic".to_string(), "changeme".to_string());
        let debug = format!("{:?}", auth);
        assert!(debug.contains("elastic"));
        assert!(!debug.contains("changeme"));
        assert_eq!(auth.to_string(), "Basic");
    }
}
