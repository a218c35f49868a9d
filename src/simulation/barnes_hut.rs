//! # Barnes–Hut Octree (3D)
//!
//! This module implements the **3D Barnes–Hut octree** used by
//! [`BarnesHutGravity`](crate::simulation::forces::BarnesHutGravity) to
//! approximate gravitational acceleration in `O(N log N)` instead of the
//! `O(N²)` all-pairs sum.
//!
//! ## Core Concepts
//!
//! - The bounding cube of all bodies is recursively split into 8 octants.
//! - Every region is a node stored in a flat arena (`Vec<OctreeNode>`);
//!   nodes refer to their children by [`NodeId`], with [`NodeId::EMPTY`]
//!   marking an unused octant slot.
//! - A node is either empty, a leaf holding bodies, or internal with
//!   children, never a leaf and internal at once.
//! - Each node stores its total mass and center of mass (COM), filled in by
//!   a bottom-up pass once every body has been inserted.
//!
//! ## Lifecycle
//!
//! The tree is rebuilt from scratch on every force computation. The arena
//! is cleared, not dropped, so its capacity carries over between steps.
//!
//! ## Depth floor
//!
//! Exactly coincident bodies can never be separated by splitting. Once a
//! node reaches `max_depth` (or has zero size, which happens when every body
//! sits on the same point) further bodies are chained into that leaf
//! instead of splitting it. Leaves are always resolved body by body, so the
//! floor costs no accuracy.

use log::debug;

use crate::simulation::forces::softened_accel;
use crate::simulation::states::{Body, NVec3};

/// Depth at which leaves stop splitting and start chaining bodies
pub const MAX_DEPTH: usize = 48;

/// Root cube edge = largest bbox extent * BOUNDS_PAD, so boundary bodies are interior
const BOUNDS_PAD: f64 = 1.1;

/// End-of-chain / no-body marker for body links
const NO_BODY: u32 = u32::MAX;

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for an unused octant slot
    pub const EMPTY: NodeId = NodeId(u32::MAX);

    /// The root always lives at the start of the arena
    pub const ROOT: NodeId = NodeId(0);

    fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize, "NodeId overflow");
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// A single octree node.
///
/// Each node covers the cube of edge `size` centered at `center`, and holds:
/// - nothing (an empty octant),
/// - one body, or a chain of coincident bodies at the depth floor (leaf),
/// - up to 8 children (internal node).
#[derive(Debug, Clone)]
pub struct OctreeNode {
    pub center: NVec3,
    pub size: f64,
    pub mass: f64,
    pub com: NVec3,
    pub children: [NodeId; 8],
    pub depth: usize,
    first_body: u32, // head of this leaf's body chain, NO_BODY if none
}

impl OctreeNode {
    fn new(center: NVec3, size: f64, depth: usize) -> Self {
        Self {
            center,
            size,
            mass: 0.0,
            com: center,
            children: [NodeId::EMPTY; 8],
            depth,
            first_body: NO_BODY,
        }
    }

    /// True if this node directly holds at least one body
    pub fn is_leaf(&self) -> bool {
        self.first_body != NO_BODY
    }

    /// True if at least one octant slot is occupied
    pub fn has_children(&self) -> bool {
        self.children.iter().any(|c| !c.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        !self.is_leaf() && !self.has_children()
    }
}

/// A complete 3D Barnes–Hut octree over a body slice.
///
/// Besides the node arena the tree keeps its own copy of positions and
/// masses, so traversal never needs to borrow the bodies while their
/// accelerations are being written.
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    positions: Vec<NVec3>,
    masses: Vec<f64>,
    next_in_leaf: Vec<u32>, // links bodies chained into the same floor leaf
    max_depth: usize,
    depth_reached: usize,
    floor_hits: usize,
}

impl Default for Octree {
    fn default() -> Self {
        Self::new()
    }
}

impl Octree {
    /// An empty tree with the default depth floor
    pub fn new() -> Self {
        Self::with_max_depth(MAX_DEPTH)
    }

    /// An empty tree that stops splitting at `max_depth`
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            nodes: Vec::new(),
            positions: Vec::new(),
            masses: Vec::new(),
            next_in_leaf: Vec::new(),
            max_depth,
            depth_reached: 0,
            floor_hits: 0,
        }
    }

    /// Rebuild the tree from the current state of `bodies`.
    ///
    /// This:
    /// 1. Clears the arena (keeping its allocation).
    /// 2. Computes the padded bounding cube of all body positions.
    /// 3. Inserts each body top-down, splitting occupied leaves.
    /// 4. Computes total mass and center of mass for every node (bottom-up).
    ///
    /// With no bodies the tree stays empty and has no root.
    pub fn build(&mut self, bodies: &[Body]) {
        self.nodes.clear();
        self.positions.clear();
        self.masses.clear();
        self.next_in_leaf.clear();
        self.depth_reached = 0;
        self.floor_hits = 0;

        if bodies.is_empty() {
            return;
        }

        self.positions.extend(bodies.iter().map(|b| b.position));
        self.masses.extend(bodies.iter().map(|b| b.mass));
        self.next_in_leaf.resize(bodies.len(), NO_BODY);

        let (center, size) = bounding_cube(&self.positions);
        self.nodes.push(OctreeNode::new(center, size, 0));

        for i in 0..bodies.len() {
            self.insert(NodeId::ROOT.index(), i as u32);
        }

        if self.floor_hits > 0 {
            debug!(
                "octree depth floor hit {} times; coincident bodies share a leaf",
                self.floor_hits
            );
        }

        self.compute_mass_and_com(NodeId::ROOT.index());
    }

    /// Root node, if any body was inserted
    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId::ROOT)
        }
    }

    pub fn node(&self, id: NodeId) -> &OctreeNode {
        &self.nodes[id.index()]
    }

    /// Number of nodes currently in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest level any node was created at during the last build
    pub fn depth_reached(&self) -> usize {
        self.depth_reached
    }

    /// How many insertions were chained at the depth floor in the last build
    pub fn floor_hits(&self) -> usize {
        self.floor_hits
    }

    /// Indices of the bodies held directly by a leaf (empty for other nodes)
    pub fn leaf_bodies(&self, id: NodeId) -> LeafBodies<'_> {
        LeafBodies {
            next_in_leaf: &self.next_in_leaf,
            current: self.nodes[id.index()].first_body,
        }
    }

    /// Compute the net acceleration on body `body` using the tree.
    ///
    /// Traverses from the root:
    /// - nodes with zero aggregate mass are skipped,
    /// - leaves are resolved body by body, skipping `body` itself,
    /// - an internal node far enough away (`size / distance < theta`) acts as
    ///   one pseudo-body of its total mass at its COM,
    /// - otherwise its non-empty children are visited.
    ///
    /// # Parameters
    /// - `body`  : index of the body (as passed to [`Octree::build`])
    /// - `g`     : gravitational constant
    /// - `eps2`  : softening squared
    /// - `theta` : opening angle
    pub fn acceleration_on(&self, body: usize, g: f64, eps2: f64, theta: f64) -> NVec3 {
        let mut acc = NVec3::zeros();
        if let Some(root) = self.root() {
            let pos = self.positions[body];
            self.traverse_node(root.index(), body as u32, pos, g, eps2, theta, &mut acc);
        }
        acc
    }

    // helpers ==============================================================================

    /// Insert body `body` below node `node_idx`.
    ///
    /// - A node with children forwards the body to the matching octant.
    /// - An empty node becomes a leaf holding the body.
    /// - An occupied leaf above the depth floor is split: its occupant and
    ///   the new body are both reinserted into children of half the size.
    /// - An occupied leaf at the floor chains the new body onto its list.
    fn insert(&mut self, node_idx: usize, body: u32) {
        let node = &self.nodes[node_idx];

        if node.has_children() {
            self.insert_into_child(node_idx, body);
            return;
        }

        if node.first_body == NO_BODY {
            self.nodes[node_idx].first_body = body;
            return;
        }

        if node.depth >= self.max_depth || node.size <= 0.0 {
            // chain after the current tail so bodies keep insertion order
            let mut tail = node.first_body;
            while self.next_in_leaf[tail as usize] != NO_BODY {
                tail = self.next_in_leaf[tail as usize];
            }
            self.next_in_leaf[tail as usize] = body;
            self.floor_hits += 1;
            return;
        }

        // above the floor a leaf holds exactly one body
        let existing = node.first_body;
        self.nodes[node_idx].first_body = NO_BODY;
        self.insert_into_child(node_idx, existing);
        self.insert_into_child(node_idx, body);
    }

    /// Forward `body` into the child octant of `node_idx` that contains it,
    /// creating that child on first use.
    fn insert_into_child(&mut self, node_idx: usize, body: u32) {
        let parent = &self.nodes[node_idx];
        let (center, size, depth) = (parent.center, parent.size, parent.depth);
        let octant = octant_for_point(&self.positions[body as usize], &center);

        let slot = parent.children[octant];

        let child = if !slot.is_empty() {
            slot
        } else {
            let id = NodeId::new(self.nodes.len());
            let child_depth = depth + 1;
            self.nodes.push(OctreeNode::new(
                child_center(&center, size, octant),
                size * 0.5,
                child_depth,
            ));
            self.nodes[node_idx].children[octant] = id;
            self.depth_reached = self.depth_reached.max(child_depth);
            id
        };

        self.insert(child.index(), body);
    }

    /// Post-order pass filling `mass` and `com` for the subtree at `node_idx`.
    ///
    /// - A single-body leaf takes the body's own mass and position.
    /// - A chained floor leaf takes the mass-weighted mean of its bodies.
    /// - An internal node sums its non-empty children.
    ///
    /// Nodes whose total mass is zero report their own center as COM; they
    /// are never used for force since traversal skips them.
    fn compute_mass_and_com(&mut self, node_idx: usize) {
        let first_body = self.nodes[node_idx].first_body;
        let children = self.nodes[node_idx].children; // [NodeId; 8] is Copy

        if first_body != NO_BODY && self.next_in_leaf[first_body as usize] == NO_BODY {
            let b = first_body as usize;
            let node = &mut self.nodes[node_idx];
            node.mass = self.masses[b];
            node.com = self.positions[b];
            return;
        }

        let mut mass = 0.0;
        let mut weighted = NVec3::zeros();

        let mut b = first_body;
        while b != NO_BODY {
            let m = self.masses[b as usize];
            mass += m;
            weighted += self.positions[b as usize] * m;
            b = self.next_in_leaf[b as usize];
        }

        for child in children.iter().filter(|c| !c.is_empty()) {
            self.compute_mass_and_com(child.index());
            let cn = &self.nodes[child.index()];
            if cn.mass != 0.0 {
                mass += cn.mass;
                weighted += cn.com * cn.mass;
            }
        }

        let node = &mut self.nodes[node_idx];
        node.mass = mass;
        node.com = if mass != 0.0 {
            weighted / mass
        } else if first_body != NO_BODY {
            self.positions[first_body as usize]
        } else {
            node.center
        };
    }

    #[allow(clippy::too_many_arguments)]
    fn traverse_node(&self, node_idx: usize, body: u32, pos: NVec3, g: f64, eps2: f64, theta: f64, acc: &mut NVec3) {
        let node = &self.nodes[node_idx];

        if node.mass == 0.0 {
            return;
        }

        // Leaves are always exact, whatever their distance
        if node.is_leaf() {
            let mut b = node.first_body;
            while b != NO_BODY {
                let m = self.masses[b as usize];
                if b != body && m != 0.0 {
                    *acc += softened_accel(self.positions[b as usize] - pos, m, g, eps2);
                }
                b = self.next_in_leaf[b as usize];
            }
            return;
        }

        let r = node.com - pos;
        let dist = r.norm();

        // dist == 0 gives an infinite ratio, so the node is opened
        if node.size / dist < theta {
            *acc += softened_accel(r, node.mass, g, eps2);
        } else {
            for child in node.children.iter().filter(|c| !c.is_empty()) {
                self.traverse_node(child.index(), body, pos, g, eps2, theta, acc);
            }
        }
    }
}

/// Iterator over the body indices chained in one leaf
pub struct LeafBodies<'a> {
    next_in_leaf: &'a [u32],
    current: u32,
}

impl Iterator for LeafBodies<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.current == NO_BODY {
            return None;
        }
        let idx = self.current as usize;
        self.current = self.next_in_leaf[idx];
        Some(idx)
    }
}

// helpers ===========================================================================

/// Padded bounding cube of a non-empty point set, as `(center, size)`.
///
/// `size` is the largest axis extent times [`BOUNDS_PAD`]; it is zero when
/// every point coincides.
fn bounding_cube(points: &[NVec3]) -> (NVec3, f64) {
    let mut min = NVec3::repeat(f64::INFINITY);
    let mut max = NVec3::repeat(f64::NEG_INFINITY);

    for p in points {
        min = min.inf(p);
        max = max.sup(p);
    }

    let center = (min + max) * 0.5;
    let extent = max - min;
    let size = extent.x.max(extent.y).max(extent.z) * BOUNDS_PAD;
    (center, size)
}

/// Octant of `p` relative to a node center.
///
/// Bit 0 is x, bit 1 is y, bit 2 is z; a bit is set when the coordinate is
/// `>=` the center's. Matches the layout of `OctreeNode::children`.
fn octant_for_point(p: &NVec3, center: &NVec3) -> usize {
    let mut idx = 0;

    if p.x >= center.x { idx |= 1; }
    if p.y >= center.y { idx |= 2; }
    if p.z >= center.z { idx |= 4; }

    idx
}

/// Center of child `octant` of a cube at `center` with edge `size`
fn child_center(center: &NVec3, size: f64, octant: usize) -> NVec3 {
    let q = size * 0.25;
    let sign = |bit: usize| if octant & bit == 0 { -q } else { q };
    center + NVec3::new(sign(1), sign(2), sign(4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn body(x: f64, y: f64, z: f64, m: f64) -> Body {
        Body::new(NVec3::new(x, y, z), NVec3::zeros(), m)
    }

    /// Walk every node, asserting no node is both a leaf and internal
    fn assert_exclusive(tree: &Octree) {
        for node in &tree.nodes {
            assert!(!(node.is_leaf() && node.has_children()));
        }
    }

    #[test]
    fn octant_bits_follow_axes() {
        let c = NVec3::zeros();
        assert_eq!(octant_for_point(&NVec3::new(-1.0, -1.0, -1.0), &c), 0);
        assert_eq!(octant_for_point(&NVec3::new(1.0, -1.0, -1.0), &c), 1);
        assert_eq!(octant_for_point(&NVec3::new(-1.0, 1.0, -1.0), &c), 2);
        assert_eq!(octant_for_point(&NVec3::new(-1.0, -1.0, 1.0), &c), 4);
        assert_eq!(octant_for_point(&NVec3::new(1.0, 1.0, 1.0), &c), 7);
        // on the split plane goes to the upper half
        assert_eq!(octant_for_point(&NVec3::new(0.0, 0.0, 0.0), &c), 7);
    }

    #[test]
    fn child_centers_stay_inside_parent() {
        let c = NVec3::new(1.0, 2.0, 3.0);
        for octant in 0..8 {
            let cc = child_center(&c, 4.0, octant);
            assert_eq!(octant_for_point(&cc, &c), octant);
            assert_relative_eq!((cc - c).amax(), 1.0);
        }
    }

    #[test]
    fn bounding_cube_is_padded() {
        let pts = [NVec3::new(0.0, 0.0, 0.0), NVec3::new(2.0, 1.0, 0.5)];
        let (center, size) = bounding_cube(&pts);
        assert_relative_eq!(center, NVec3::new(1.0, 0.5, 0.25));
        assert_relative_eq!(size, 2.2);
    }

    #[test]
    fn empty_build_has_no_root() {
        let mut tree = Octree::new();
        tree.build(&[]);
        assert!(tree.root().is_none());
        assert_eq!(tree.acceleration_on(0, 1.0, 0.0, 0.5), NVec3::zeros());
    }

    #[test]
    fn single_body_is_root_leaf() {
        let mut tree = Octree::new();
        tree.build(&[body(1.0, 2.0, 3.0, 5.0)]);

        let root = tree.node(NodeId::ROOT);
        assert!(root.is_leaf());
        assert!(!root.has_children());
        assert_eq!(root.mass, 5.0);
        assert_eq!(root.com, NVec3::new(1.0, 2.0, 3.0));
        assert_eq!(tree.leaf_bodies(NodeId::ROOT).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn second_body_splits_the_leaf() {
        let mut tree = Octree::new();
        tree.build(&[body(-1.0, -1.0, -1.0, 1.0), body(1.0, 1.0, 1.0, 3.0)]);

        let root = tree.node(NodeId::ROOT);
        assert!(!root.is_leaf());
        assert!(!root.children[0].is_empty());
        assert!(!root.children[7].is_empty());
        assert_eq!(root.children.iter().filter(|c| !c.is_empty()).count(), 2);

        let low = tree.node(root.children[0]);
        assert_eq!(tree.leaf_bodies(root.children[0]).collect::<Vec<_>>(), vec![0]);
        assert_relative_eq!(low.size, root.size * 0.5);

        assert_relative_eq!(root.mass, 4.0);
        assert_relative_eq!(root.com, NVec3::new(0.5, 0.5, 0.5));
        assert_exclusive(&tree);
    }

    #[test]
    fn aggregation_matches_direct_sums() {
        let bodies: Vec<Body> = (0..40)
            .map(|i| {
                let f = i as f64;
                body((f * 0.37).sin() * 5.0, (f * 0.13).cos() * 5.0, (f * 0.07).sin() * 5.0, 1.0 + f * 0.1)
            })
            .collect();

        let mut tree = Octree::new();
        tree.build(&bodies);

        let total: f64 = bodies.iter().map(|b| b.mass).sum();
        let com = bodies.iter().fold(NVec3::zeros(), |acc, b| acc + b.position * b.mass) / total;

        let root = tree.node(NodeId::ROOT);
        assert_relative_eq!(root.mass, total, epsilon = 1e-12);
        assert_relative_eq!(root.com, com, epsilon = 1e-12);
        assert_exclusive(&tree);

        // each body ends up in exactly one leaf
        let mut seen = vec![0; bodies.len()];
        for (i, node) in tree.nodes.iter().enumerate() {
            if node.is_leaf() {
                for b in tree.leaf_bodies(NodeId::new(i)) {
                    seen[b] += 1;
                }
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn coincident_bodies_collapse_into_one_leaf() {
        let bodies = vec![body(2.0, 2.0, 2.0, 1.0); 5];
        let mut tree = Octree::new();
        tree.build(&bodies);

        // zero-size root: no splitting at all
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.floor_hits(), 4);
        assert_eq!(tree.leaf_bodies(NodeId::ROOT).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_relative_eq!(tree.node(NodeId::ROOT).mass, 5.0);
    }

    #[test]
    fn depth_floor_bounds_the_tree() {
        let mut bodies = vec![body(0.0, 0.0, 0.0, 1.0), body(0.0, 0.0, 0.0, 1.0)];
        bodies.push(body(10.0, 10.0, 10.0, 1.0));

        let mut tree = Octree::with_max_depth(6);
        tree.build(&bodies);

        assert!(tree.depth_reached() <= 6);
        assert_eq!(tree.floor_hits(), 1);
        assert_exclusive(&tree);
    }

    #[test]
    fn rebuild_reuses_arena() {
        let bodies: Vec<Body> = (0..16).map(|i| body(i as f64, (i * i) as f64, 0.0, 1.0)).collect();
        let mut tree = Octree::new();
        tree.build(&bodies);
        let first = tree.len();
        tree.build(&bodies);
        assert_eq!(tree.len(), first);
        tree.build(&bodies[..1]);
        assert_eq!(tree.len(), 1);
    }
}
