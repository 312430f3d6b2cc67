//! Graph configuration options.

#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    /// Allows several edges between the same pair of nodes, distinguished by name.
    pub multigraph: bool,
    /// Undirected graphs store each edge once with its endpoints in sorted order.
    pub directed: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            multigraph: false,
            directed: true,
        }
    }
}

impl GraphOptions {
    pub fn undirected() -> Self {
        Self {
            multigraph: false,
            directed: false,
        }
    }
}
