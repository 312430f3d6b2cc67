//! Edge key types.
//!
//! Edges are identified by `v`, `w`, and an optional `name` (for multigraph support).

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
    ) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }

    /// Returns the endpoint opposite to `id`, if `id` is one of the endpoints.
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.v == id {
            Some(self.w.as_str())
        } else if self.w == id {
            Some(self.v.as_str())
        } else {
            None
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.v == self.w
    }
}
