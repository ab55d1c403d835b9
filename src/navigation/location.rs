use std::fmt::{Display, Formatter};

/// A requested screen: path plus decoded query pairs, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    /// Parse `"/admin?page=branch"`. A missing leading slash is added, a trailing
    /// slash (other than root) and any `#fragment` are dropped.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let raw = raw.split('#').next().unwrap_or("");
        let (path, query) = match raw.split_once('?') {
            Some((p, q)) => (p, q),
            None => (raw, ""),
        };
        let mut path = if path.starts_with('/') { path.to_string() } else { format!("/{}", path) };
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }
        let query = query
            .split('&')
            .filter(|kv| !kv.is_empty())
            .map(|kv| {
                let (k, v) = kv.split_once('=').unwrap_or((kv, ""));
                (decode(k), decode(v))
            })
            .collect();
        Self { path, query }
    }

    pub fn new(path: impl Into<String>) -> Self {
        Self::parse(&path.into())
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.query.retain(|(k, _)| k != key);
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

fn decode(s: &str) -> String {
    let plus_as_space = s.replace('+', " ");
    urlencoding::decode(&plus_as_space).map(|c| c.into_owned()).unwrap_or(plus_as_space)
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, urlencoding::encode(k), urlencoding::encode(v))?;
        }
        Ok(())
    }
}

impl From<&str> for Location {
    fn from(s: &str) -> Self { Location::parse(s) }
}
