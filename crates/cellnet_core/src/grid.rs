//! Node arena sorted by position.
//!
//! Nodes live in one contiguous vector ordered by [`Position`]; links refer
//! to their destination by index into that vector. Because the node count
//! and positions never change after construction, indices stay valid across
//! relinking.

use cellnet_data::{Link, Node, Position, RuleSet};
use rand::Rng;

use crate::error::GridError;

/// Weight of each Moore-neighbour link created by [`Grid::build`].
pub const BUILD_NEIGHBOR_WEIGHT: f64 = 0.12;
/// Weight of the self-loop created by [`Grid::build`].
pub const BUILD_CENTER_WEIGHT: f64 = 0.04;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    nodes: Vec<Node>,
}

impl Grid {
    /// Builds one node per position in `[origin.x, width) × [origin.y, height)`
    /// and links every node to its eight Moore neighbours on a torus, plus a
    /// self-loop.
    ///
    /// `width` and `height` are exclusive upper bounds and must be positive.
    /// Wraparound targets `[0, width) × [0, height)`, so any origin other
    /// than `(0, 0)` leaves wrapped neighbours unresolved and yields
    /// [`GridError::MissingNeighbor`].
    pub fn build(
        origin: Position,
        width: i32,
        height: i32,
        initial_active: bool,
    ) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 || width <= origin.x || height <= origin.y {
            return Err(GridError::InvalidDimensions {
                origin,
                width,
                height,
            });
        }

        let cells = (i64::from(width) - i64::from(origin.x))
            .saturating_mul(i64::from(height) - i64::from(origin.y));
        let mut nodes = Vec::with_capacity(usize::try_from(cells).unwrap_or(0));
        for x in origin.x..width {
            for y in origin.y..height {
                nodes.push(Node::new(Position::new(x, y)));
            }
        }
        nodes.sort_by_key(|n| n.position);

        let mut grid = Self { nodes };
        let mut all_links = Vec::with_capacity(grid.nodes.len());
        for (idx, node) in grid.nodes.iter().enumerate() {
            let mut links = Vec::with_capacity(9);
            for offset in RuleSet::moore_neighborhood() {
                let target = grid.neighbor(node.position, offset, (width, height))?;
                links.push(Link::new(target, BUILD_NEIGHBOR_WEIGHT));
            }
            links.push(Link::new(idx, BUILD_CENTER_WEIGHT));
            all_links.push(links);
        }

        for (node, links) in grid.nodes.iter_mut().zip(all_links) {
            node.links = links;
            node.active = initial_active;
        }

        if tracing::enabled!(tracing::Level::TRACE) {
            for node in &grid.nodes {
                for link in &node.links {
                    tracing::trace!(
                        from = %node.position,
                        to = %grid.nodes[link.target].position,
                        weight = link.weight,
                        "link"
                    );
                }
            }
        }

        Ok(grid)
    }

    /// Adopts a node list produced elsewhere (typically a save file).
    ///
    /// Rejects lists that are not strictly ascending by position, that
    /// contain links to indices outside the list, or whose greatest
    /// position leaves no positive torus extent.
    pub fn from_nodes(mut nodes: Vec<Node>) -> Result<Self, GridError> {
        for (index, pair) in nodes.windows(2).enumerate() {
            if pair[0].position >= pair[1].position {
                return Err(GridError::UnsortedGrid {
                    index: index + 1,
                    position: pair[1].position,
                });
            }
        }
        let len = nodes.len();
        for (node_index, node) in nodes.iter_mut().enumerate() {
            if let Some(link) = node.links.iter().find(|l| l.target >= len) {
                return Err(GridError::DanglingLink {
                    node_index,
                    target: link.target,
                });
            }
            node.input_sum = 0.0;
        }
        let grid = Self { nodes };
        if !grid.is_empty() {
            grid.torus_extent()?;
        }
        Ok(grid)
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Binary search for the node at `position`.
    #[must_use]
    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.nodes
            .binary_search_by_key(&position, |n| n.position)
            .ok()
    }

    /// Torus extent derived from the greatest position present, plus one.
    #[must_use]
    pub fn extent(&self) -> (i32, i32) {
        match self.nodes.last() {
            Some(last) => (
                last.position.x.saturating_add(1),
                last.position.y.saturating_add(1),
            ),
            None => (0, 0),
        }
    }

    /// [`Grid::extent`], or [`GridError::InvalidDimensions`] when either side
    /// is not positive.
    pub fn torus_extent(&self) -> Result<(i32, i32), GridError> {
        let (width, height) = self.extent();
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimensions {
                origin: self.nodes.first().map(|n| n.position).unwrap_or_default(),
                width,
                height,
            });
        }
        Ok((width, height))
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.active).count()
    }

    pub fn set_active(&mut self, index: usize, active: bool) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.active = active;
                true
            }
            None => false,
        }
    }

    /// Activates each node independently with probability `density`.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R, density: f64) {
        let density = density.clamp(0.0, 1.0);
        for node in &mut self.nodes {
            node.active = rng.gen_bool(density);
        }
    }

    /// Indices of every node holding a link whose destination is `index`.
    ///
    /// This is the inbound-edge query: the nodes for which `index` is a
    /// neighbour, not the neighbours of `index`.
    #[must_use]
    pub fn inbound_sources(&self, index: usize) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.links.iter().any(|l| l.target == index))
            .map(|(i, _)| i)
            .collect()
    }

    /// Replaces every node's links with those described by `rules`.
    ///
    /// Each node gets a self-loop weighted `center_weight` (omitted when it
    /// is exactly zero), then one link per neighbourhood offset to the node
    /// at `position + offset`, wrapped onto the grid's extent. All link
    /// lists are computed before any is replaced, so a failure leaves the
    /// grid untouched.
    pub fn relink(&mut self, rules: &RuleSet) -> Result<(), GridError> {
        if self.is_empty() {
            return Ok(());
        }
        let extent = self.torus_extent()?;
        let mut all_links = Vec::with_capacity(self.nodes.len());

        for (idx, node) in self.nodes.iter().enumerate() {
            let mut links = Vec::with_capacity(rules.neighborhood.len() + 1);
            if rules.center_weight != 0.0 {
                links.push(Link::new(idx, rules.center_weight));
            }
            for &offset in &rules.neighborhood {
                let target = self.neighbor(node.position, offset, extent)?;
                links.push(Link::new(target, rules.neighbor_weight));
            }
            all_links.push(links);
        }

        for (node, links) in self.nodes.iter_mut().zip(all_links) {
            node.links = links;
        }
        Ok(())
    }

    /// Reconstructs a rule set from the links of the node at `index`.
    ///
    /// A self-loop supplies the center weight; every other link supplies an
    /// offset and the neighbour weight. Offsets are mapped back into the
    /// signed range around the node, so a link across the seam reads as
    /// `-1` rather than `width - 1`.
    #[must_use]
    pub fn infer_rule(&self, index: usize, activation_values: Vec<f64>) -> Option<RuleSet> {
        let node = self.nodes.get(index)?;
        let (width, height) = self.torus_extent().ok()?;

        let mut center_weight = 0.0;
        let mut neighbor_weight = 0.0;
        let mut neighborhood = Vec::with_capacity(node.links.len());
        for link in &node.links {
            if link.target == index {
                center_weight = link.weight;
                continue;
            }
            neighbor_weight = link.weight;
            let dest = self.nodes.get(link.target)?.position;
            neighborhood.push(Position::new(
                signed_offset(i64::from(dest.x) - i64::from(node.position.x), width),
                signed_offset(i64::from(dest.y) - i64::from(node.position.y), height),
            ));
        }

        Some(RuleSet {
            activation_values,
            neighborhood,
            neighbor_weight,
            center_weight,
        })
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    fn neighbor(
        &self,
        node: Position,
        offset: Position,
        (width, height): (i32, i32),
    ) -> Result<usize, GridError> {
        let expected = node.offset_on_torus(offset, width, height).ok_or(
            GridError::InvalidDimensions {
                origin: node,
                width,
                height,
            },
        )?;
        self.index_of(expected).ok_or_else(|| {
            tracing::error!(
                node = %node,
                expected = %expected,
                nodes = self.nodes.len(),
                "Neighbour lookup failed, grid ordering invariant broken"
            );
            GridError::MissingNeighbor { node, expected }
        })
    }
}

fn signed_offset(delta: i64, extent: i32) -> i32 {
    let extent = i64::from(extent);
    let d = delta.rem_euclid(extent);
    // |result| <= extent / 2, which fits in i32.
    (if d > extent / 2 { d - extent } else { d }) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(w: i32, h: i32) -> Grid {
        Grid::build(Position::new(0, 0), w, h, false).expect("build grid")
    }

    fn targets(grid: &Grid, p: Position) -> Vec<Position> {
        let idx = grid.index_of(p).expect("node present");
        grid.nodes()[idx]
            .links
            .iter()
            .map(|l| grid.nodes()[l.target].position)
            .collect()
    }

    #[test]
    fn test_build_is_sorted_and_complete() {
        let g = grid(6, 4);
        assert_eq!(g.len(), 24);
        assert!(g.nodes().windows(2).all(|w| w[0].position < w[1].position));
        assert_eq!(g.extent(), (6, 4));
    }

    #[test]
    fn test_build_links_moore_plus_self() {
        let g = grid(5, 5);
        let idx = g.index_of(Position::new(2, 2)).unwrap();
        let node = &g.nodes()[idx];
        assert_eq!(node.links.len(), 9);
        let last = node.links.last().unwrap();
        assert_eq!(last.target, idx);
        assert!((last.weight - BUILD_CENTER_WEIGHT).abs() < f64::EPSILON);
        assert!(node.links[..8]
            .iter()
            .all(|l| (l.weight - BUILD_NEIGHBOR_WEIGHT).abs() < f64::EPSILON));
    }

    #[test]
    fn test_build_wraps_corners() {
        let g = grid(4, 3);
        let t = targets(&g, Position::new(3, 2));
        assert!(t.contains(&Position::new(0, 0)));
        assert!(t.contains(&Position::new(0, 2)));
        assert!(t.contains(&Position::new(3, 0)));
        let t = targets(&g, Position::new(0, 0));
        assert!(t.contains(&Position::new(3, 2)));
    }

    #[test]
    fn test_build_rejects_empty_bounds() {
        assert!(matches!(
            Grid::build(Position::new(0, 0), 0, 5, true),
            Err(GridError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_build_rejects_non_positive_extent_below_origin() {
        let err = Grid::build(Position::new(-3, -3), 0, 0, false).unwrap_err();
        assert!(matches!(
            err,
            GridError::InvalidDimensions {
                width: 0,
                height: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_build_with_offset_origin_reports_missing_neighbor() {
        let err = Grid::build(Position::new(2, 2), 5, 5, false).unwrap_err();
        assert!(matches!(err, GridError::MissingNeighbor { .. }));
    }

    #[test]
    fn test_relink_custom_neighborhood() {
        let mut g = grid(5, 5);
        let rules = RuleSet {
            activation_values: vec![0.5],
            neighborhood: vec![Position::new(1, 0), Position::new(0, -2)],
            neighbor_weight: 0.25,
            center_weight: 0.0,
        };
        g.relink(&rules).unwrap();
        let t = targets(&g, Position::new(4, 1));
        assert_eq!(t, vec![Position::new(0, 1), Position::new(4, 4)]);
        let idx = g.index_of(Position::new(4, 1)).unwrap();
        assert!(g.nodes()[idx].links.iter().all(|l| l.weight == 0.25));
    }

    #[test]
    fn test_relink_accepts_offsets_at_integer_limits() {
        let mut g = grid(4, 4);
        let rules = RuleSet {
            activation_values: vec![0.1],
            neighborhood: vec![Position::new(i32::MAX, 0), Position::new(0, i32::MIN)],
            neighbor_weight: 0.1,
            center_weight: 0.0,
        };
        g.relink(&rules).unwrap();
        // i32::MAX is 3 mod 4, i32::MIN is 0 mod 4.
        assert_eq!(
            targets(&g, Position::new(0, 0)),
            vec![Position::new(3, 0), Position::new(0, 0)]
        );
        assert_eq!(
            targets(&g, Position::new(2, 3)),
            vec![Position::new(1, 3), Position::new(2, 3)]
        );
    }

    #[test]
    fn test_failed_relink_leaves_links_untouched() {
        let mut nodes: Vec<Node> = [(0, 0), (0, 1), (1, 0), (1, 1), (2, 2)]
            .into_iter()
            .map(|(x, y)| Node::new(Position::new(x, y)))
            .collect();
        nodes[0].add_link(Link::new(3, 0.3));
        let mut g = Grid::from_nodes(nodes).unwrap();
        let before = g.clone();

        let err = g.relink(&RuleSet::default()).unwrap_err();
        assert!(matches!(err, GridError::MissingNeighbor { .. }));
        assert_eq!(g, before);
    }

    #[test]
    fn test_relink_empty_grid_is_noop() {
        let mut g = Grid::from_nodes(Vec::new()).unwrap();
        g.relink(&RuleSet::default()).unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn test_relink_keeps_self_loop_first() {
        let mut g = grid(3, 3);
        let rules = RuleSet {
            center_weight: 0.5,
            ..RuleSet::default()
        };
        g.relink(&rules).unwrap();
        for (idx, node) in g.nodes().iter().enumerate() {
            assert_eq!(node.links[0].target, idx);
            assert_eq!(node.links.len(), 9);
        }
    }

    #[test]
    fn test_inbound_sources_is_reverse_query() {
        let mut g = grid(5, 5);
        let rules = RuleSet {
            activation_values: vec![],
            neighborhood: vec![Position::new(1, 0)],
            neighbor_weight: 1.0,
            center_weight: 0.0,
        };
        g.relink(&rules).unwrap();
        let target = g.index_of(Position::new(2, 2)).unwrap();
        let sources: Vec<Position> = g
            .inbound_sources(target)
            .into_iter()
            .map(|i| g.nodes()[i].position)
            .collect();
        assert_eq!(sources, vec![Position::new(1, 2)]);
    }

    #[test]
    fn test_infer_rule_round_trips_default() {
        let mut g = grid(6, 6);
        let rules = RuleSet::default();
        g.relink(&rules).unwrap();
        let inferred = g.infer_rule(0, rules.activation_values.clone()).unwrap();
        assert_eq!(inferred, rules);
    }

    #[test]
    fn test_from_nodes_rejects_unsorted() {
        let nodes = vec![Node::new(Position::new(1, 0)), Node::new(Position::new(0, 0))];
        assert!(matches!(
            Grid::from_nodes(nodes),
            Err(GridError::UnsortedGrid { index: 1, .. })
        ));
    }

    #[test]
    fn test_from_nodes_rejects_negative_extent() {
        let nodes = vec![
            Node::new(Position::new(-2, -1)),
            Node::new(Position::new(-1, -1)),
        ];
        let err = Grid::from_nodes(nodes).unwrap_err();
        assert!(matches!(
            err,
            GridError::InvalidDimensions {
                width: 0,
                height: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_infer_rule_reads_seam_links_as_negative() {
        let g = grid(5, 5);
        let inferred = g.infer_rule(0, vec![]).unwrap();
        assert!(inferred.neighborhood.contains(&Position::new(-1, -1)));
        assert!(inferred.neighborhood.contains(&Position::new(1, 1)));
    }

    #[test]
    fn test_from_nodes_rejects_dangling_link() {
        let mut node = Node::new(Position::new(0, 0));
        node.add_link(Link::new(3, 1.0));
        assert!(matches!(
            Grid::from_nodes(vec![node]),
            Err(GridError::DanglingLink { target: 3, .. })
        ));
    }
}
