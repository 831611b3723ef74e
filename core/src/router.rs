//! Path routing and history-style navigation for the application shell.
//!
//! # Design
//! `RouteTable` is a static, ordered list of `(pattern, view)` pairs where a
//! `:name` segment captures a parameter. `Navigator` keeps an in-memory
//! history stack on top of it: moving through history re-resolves the
//! current route and never reloads anything.

use std::collections::BTreeMap;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    fn parse(raw: &str) -> Self {
        let segments = split_segments(raw)
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    fn matches(&self, path: &[&str]) -> Option<BTreeMap<String, String>> {
        if path.len() != self.segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (segment, actual) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(lit) if lit == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), decode_param(actual));
                }
            }
        }
        Some(params)
    }
}

/// Percent-decode a captured segment. Escapes that do not form valid UTF-8
/// leave the segment as written.
fn decode_param(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Reduce a URL or path to its path component: drops scheme and authority,
/// the query string and the fragment.
pub fn path_of(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(i) => {
            let after = &url[i + 3..];
            match after.find('/') {
                Some(j) => &after[j..],
                None => "/",
            }
        }
        None => url,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    match &rest[..end] {
        "" => "/",
        path => path,
    }
}

/// A resolved route: which view to render and the captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<V> {
    pub view: V,
    pub pattern: String,
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl<V> RouteMatch<V> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable<V> {
    routes: Vec<(Pattern, V)>,
}

impl<V> Default for RouteTable<V> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<V: Clone> RouteTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, view: V) -> Self {
        self.routes.push((Pattern::parse(pattern), view));
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First route in table order whose pattern matches `url`.
    pub fn resolve(&self, url: &str) -> Option<RouteMatch<V>> {
        let path = path_of(url);
        let segments: Vec<&str> = split_segments(path).collect();
        self.routes.iter().find_map(|(pattern, view)| {
            pattern.matches(&segments).map(|params| RouteMatch {
                view: view.clone(),
                pattern: pattern.raw.clone(),
                path: path.to_string(),
                params,
            })
        })
    }
}

/// Views of the poll front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Landing page with the poll creation form.
    Landing,
    Admin,
    /// Poll detail and voting; expects an `id` parameter.
    Poll,
}

impl View {
    pub fn routes() -> RouteTable<View> {
        RouteTable::new()
            .route("/", View::Landing)
            .route("/admin", View::Admin)
            .route("/poll/:id", View::Poll)
    }
}

/// History-stack navigation over a `RouteTable`.
#[derive(Debug, Clone)]
pub struct Navigator<V> {
    table: RouteTable<V>,
    entries: Vec<String>,
    index: usize,
    current: Option<RouteMatch<V>>,
}

impl<V: Clone> Navigator<V> {
    /// Start at `initial_url`, typically the browser's location at mount.
    pub fn new(table: RouteTable<V>, initial_url: &str) -> Self {
        let location = path_of(initial_url).to_string();
        let current = table.resolve(initial_url);
        Self {
            table,
            entries: vec![location],
            index: 0,
            current,
        }
    }

    pub fn current(&self) -> Option<&RouteMatch<V>> {
        self.current.as_ref()
    }

    pub fn location(&self) -> &str {
        &self.entries[self.index]
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// New history entry; forward entries are discarded.
    pub fn push(&mut self, url: &str) -> Option<&RouteMatch<V>> {
        self.entries.truncate(self.index + 1);
        self.entries.push(path_of(url).to_string());
        self.index += 1;
        self.settle()
    }

    /// Overwrite the current history entry.
    pub fn replace(&mut self, url: &str) -> Option<&RouteMatch<V>> {
        self.entries[self.index] = path_of(url).to_string();
        self.settle()
    }

    /// Returns false when already at the oldest entry.
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.index -= 1;
        self.settle();
        true
    }

    pub fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.index += 1;
        self.settle();
        true
    }

    fn settle(&mut self) -> Option<&RouteMatch<V>> {
        self.current = self.table.resolve(&self.entries[self.index]);
        debug!(
            location = %self.entries[self.index],
            pattern = self.current.as_ref().map(|m| m.pattern.as_str()),
            "navigated"
        );
        self.current.as_ref()
    }
}
