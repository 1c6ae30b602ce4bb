//! Segment tree.
//!
//! Each node is one path segment. Children are tried in priority order:
//! static segments, then the parameter child, then the wildcard child.
//! Parameter names live on the route, not on the node, so `/users/:id`
//! and `/users/{user}/posts` can share the parameter node.

use crate::method_router::MethodRouter;

/// Kind of a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal segment.
    Static(String),
    /// `{name}` or `:name`.
    Param(String),
    /// `*name`, matches the rest of the path.
    Wildcard(String),
}

impl Segment {
    /// Parses one segment.
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Self::Param(name.to_string())
        } else if let Some(name) = raw.strip_prefix(':') {
            Self::Param(name.to_string())
        } else if let Some(name) = raw.strip_prefix('*') {
            Self::Wildcard(name.to_string())
        } else {
            Self::Static(raw.to_string())
        }
    }
}

/// Splits a path into segments, ignoring empty ones.
pub fn parse_path(path: &str) -> Vec<Segment> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(Segment::parse)
        .collect()
}

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route<T> {
    /// Pattern as registered.
    pub pattern: String,
    /// Parameter names in path order.
    pub names: Vec<String>,
    /// Route value.
    pub value: T,
}

/// A node in the segment tree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    segment: String,
    routes: MethodRouter<Route<T>>,
    static_children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
    wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    /// Creates the root node.
    #[must_use]
    pub fn root() -> Self {
        Self::with_segment("")
    }

    fn with_segment(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            routes: MethodRouter::new(),
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Returns the method table at the end of `segments`, creating nodes
    /// as needed.
    pub fn endpoint_mut(&mut self, segments: &[Segment]) -> &mut MethodRouter<Route<T>> {
        let Some((first, rest)) = segments.split_first() else {
            return &mut self.routes;
        };
        let child = match first {
            Segment::Static(literal) => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(literal))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children
                            .insert(index, Node::with_segment(literal.as_str()));
                        index
                    }
                };
                &mut self.static_children[index]
            }
            Segment::Param(_) => self
                .param_child
                .get_or_insert_with(|| Box::new(Node::with_segment("{}"))),
            Segment::Wildcard(_) => self
                .wildcard_child
                .get_or_insert_with(|| Box::new(Node::with_segment("*"))),
        };
        child.endpoint_mut(rest)
    }

    /// Finds the node matching `path`, returning its method table and the
    /// captured parameter values in path order.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<(&MethodRouter<Route<T>>, Vec<String>)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut values = Vec::new();
        let node = self.find_segments(&segments, &mut values)?;
        Some((&node.routes, values))
    }

    fn find_segments<'a>(
        &'a self,
        segments: &[&str],
        values: &mut Vec<String>,
    ) -> Option<&'a Self> {
        let Some((segment, rest)) = segments.split_first() else {
            if !self.routes.is_empty() {
                return Some(self);
            }
            // `/files/*path` also matches `/files/`
            let wildcard = self
                .wildcard_child
                .as_deref()
                .filter(|w| !w.routes.is_empty())?;
            values.push(String::new());
            return Some(wildcard);
        };

        if let Ok(index) = self
            .static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
        {
            if let Some(found) = self.static_children[index].find_segments(rest, values) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            let mark = values.len();
            values.push((*segment).to_string());
            if let Some(found) = child.find_segments(rest, values) {
                return Some(found);
            }
            values.truncate(mark);
        }

        if let Some(child) = &self.wildcard_child {
            if !child.routes.is_empty() {
                values.push(segments.join("/"));
                return Some(child);
            }
        }

        None
    }

    /// Visits every route in the tree.
    pub fn for_each_route<'a>(&'a self, f: &mut impl FnMut(&'a http::Method, &'a Route<T>)) {
        for (method, route) in self.routes.iter() {
            f(method, route);
        }
        for child in &self.static_children {
            child.for_each_route(f);
        }
        if let Some(child) = &self.param_child {
            child.for_each_route(f);
        }
        if let Some(child) = &self.wildcard_child {
            child.for_each_route(f);
        }
    }
}
