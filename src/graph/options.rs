//! Graph instantiation options.

/// How element storage grows once the current capacity is exhausted.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GrowthPolicy {
    /// Double the capacity (clamped to the maximum).
    Double,
    /// Grow by a fixed number of ids per expansion.
    Increment(u32),
}

/// Tunables for a new [`crate::Graph`].
///
/// ```
/// use tgraph::GraphOptions;
///
/// let opts = GraphOptions::new()
///     .initial_vertex_capacity(1024)
///     .initial_edge_capacity(4096);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct GraphOptions {
    pub(crate) initial_vertex_capacity: u32,
    pub(crate) initial_edge_capacity: u32,
    pub(crate) max_capacity: u32,
    pub(crate) growth: GrowthPolicy,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: 1024,
            initial_edge_capacity: 1024,
            max_capacity: u32::MAX / 2,
            growth: GrowthPolicy::Double,
        }
    }
}

impl GraphOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertex ids available before the first expansion.
    pub fn initial_vertex_capacity(mut self, capacity: u32) -> Self {
        self.initial_vertex_capacity = capacity.max(1);
        self
    }

    /// Number of edge ids available before the first expansion.
    pub fn initial_edge_capacity(mut self, capacity: u32) -> Self {
        self.initial_edge_capacity = capacity.max(1);
        self
    }

    /// Hard upper bound on ids per element kind. Exceeding it is an
    /// error, not a panic.
    pub fn max_capacity(mut self, max: u32) -> Self {
        self.max_capacity = max.max(1);
        self
    }

    /// Expansion policy applied when the id space is exhausted.
    pub fn growth(mut self, policy: GrowthPolicy) -> Self {
        self.growth = policy;
        self
    }
}
