//! Provider-specific query representation
//!
//! Connectors translate a `DataRequest` into an `UpstreamQuery`: a base URL
//! plus ordered query parameters. Parameters that carry credentials are
//! tracked so logs and error payloads can use a key-free URL.

/// A fully resolved upstream GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQuery {
    endpoint: String,
    params: Vec<(String, String)>,
    credential_param: Option<&'static str>,
}

impl UpstreamQuery {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
            credential_param: None,
        }
    }

    /// Join a base URL and a path without doubling slashes
    pub fn at(base_url: &str, path: &str) -> Self {
        Self::new(format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Mark the parameter name that carries the API key
    pub fn credential_param(mut self, name: &'static str) -> Self {
        self.credential_param = Some(name);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// URL sent on the wire, credentials included
    pub fn url(&self) -> String {
        render(&self.endpoint, self.params.iter())
    }

    /// URL safe for logs and response bodies
    pub fn public_url(&self) -> String {
        render(
            &self.endpoint,
            self.params
                .iter()
                .filter(|(k, _)| Some(k.as_str()) != self.credential_param),
        )
    }
}

fn render<'a>(endpoint: &str, params: impl Iterator<Item = &'a (String, String)>) -> String {
    let params: Vec<&(String, String)> = params.collect();
    if params.is_empty() {
        return endpoint.to_string();
    }
    // Encoding a slice of string pairs cannot fail
    let encoded = serde_urlencoded::to_string(&params).unwrap_or_default();
    format!("{}?{}", endpoint, encoded)
}
