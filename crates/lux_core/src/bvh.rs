//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat array and refer to their children by index, so the
//! tree can be shared read-only between render threads and flattened for the
//! GPU as is. Construction uses a binned surface area heuristic (SAH) with a
//! median split fallback.

use std::ops::ControlFlow;

use lux_math::{Axis, Bounds, Interval, Ray, Tolerance, Vec3};

use crate::hittable::{Bounded, HitInfo, Hittable};

/// Maximum number of shapes in a leaf node.
pub const LEAF_THRESHOLD: usize = 4;

/// Number of centroid bins evaluated per SAH split.
pub const BIN_COUNT: usize = 32;

const TRAVERSAL_COST: f32 = 1.0;
const INTERSECTION_COST: f32 = 1.0;

/// A node of the flattened tree.
///
/// Leaves have `shape_count > 0` and `left = right = -1`; internal nodes have
/// both children set and `shape_count = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNode {
    pub bounds: Bounds,
    pub left: i32,
    pub right: i32,
    /// First entry of this leaf in [`Bvh::shape_indices`]
    pub shape_index: u32,
    pub shape_count: u32,
}

impl Default for BvhNode {
    fn default() -> Self {
        Self {
            bounds: Bounds::EMPTY,
            left: -1,
            right: -1,
            shape_index: 0,
            shape_count: 0,
        }
    }
}

impl BvhNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.shape_count > 0
    }
}

/// Per-shape data cached during construction.
struct BuildShape {
    bounds: Bounds,
    center: Vec3,
}

#[derive(Clone, Copy)]
struct Bin {
    bounds: Bounds,
    count: usize,
}

impl Default for Bin {
    fn default() -> Self {
        Self {
            bounds: Bounds::EMPTY,
            count: 0,
        }
    }
}

impl Bin {
    fn add(&mut self, bounds: &Bounds) {
        self.bounds.expand(bounds);
        self.count += 1;
    }
}

/// Bounding volume hierarchy over a slice of bounded shapes.
///
/// The BVH does not own the shapes; traversal takes the same slice that was
/// passed to [`Bvh::build`].
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    /// Permutation of shape indices; leaves address contiguous ranges of it
    shape_indices: Vec<usize>,
}

impl Bvh {
    /// Build the tree. An empty input yields an empty tree.
    pub fn build<S: Bounded>(shapes: &[S]) -> Self {
        let mut bvh = Bvh {
            nodes: Vec::with_capacity(shapes.len() * 2),
            shape_indices: (0..shapes.len()).collect(),
        };

        if shapes.is_empty() {
            return bvh;
        }

        let info: Vec<BuildShape> = shapes
            .iter()
            .map(|s| {
                let bounds = s.bounds();
                BuildShape {
                    bounds,
                    center: bounds.center(),
                }
            })
            .collect();

        bvh.build_recursive(&info, 0, shapes.len());
        log::debug!(
            "Built BVH: {} shapes, {} nodes",
            shapes.len(),
            bvh.nodes.len()
        );
        bvh
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn shape_indices(&self) -> &[usize] {
        &self.shape_indices
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bounds of the whole tree.
    pub fn bounds(&self) -> Bounds {
        self.nodes.first().map_or(Bounds::EMPTY, |n| n.bounds)
    }

    /// Build the subtree over `shape_indices[start..end]` and return its node index.
    fn build_recursive(&mut self, info: &[BuildShape], start: usize, end: usize) -> usize {
        let n = end - start;

        let mut node_bounds = Bounds::EMPTY;
        let mut centroid_bounds = Bounds::EMPTY;
        for &i in &self.shape_indices[start..end] {
            node_bounds.expand(&info[i].bounds);
            centroid_bounds.expand_point(info[i].center);
        }

        let node_index = self.nodes.len();
        self.nodes.push(BvhNode {
            bounds: node_bounds,
            ..Default::default()
        });

        if n <= LEAF_THRESHOLD {
            let node = &mut self.nodes[node_index];
            node.shape_index = start as u32;
            node.shape_count = n as u32;
            return node_index;
        }

        let axis = centroid_bounds.longest_axis();

        let split = Self::sah_split(
            info,
            &self.shape_indices[start..end],
            axis,
            &node_bounds,
            &centroid_bounds,
        )
        .map(|split_pos| {
            start + partition(&mut self.shape_indices[start..end], |i| {
                axis.of(info[i].center) < split_pos
            })
        })
        .filter(|&mid| mid > start && mid < end);

        let mid = match split {
            Some(mid) => mid,
            None => {
                log::debug!("SAH found no split for {n} shapes, using median");
                let half = n / 2;
                self.shape_indices[start..end].select_nth_unstable_by(half, |&a, &b| {
                    axis.of(info[a].center).total_cmp(&axis.of(info[b].center))
                });
                start + half
            }
        };

        let mut left = self.build_recursive(info, start, mid);
        let mut right = self.build_recursive(info, mid, end);

        // Smaller box on the left, so traversal visits it first
        if self.nodes[left].bounds.area() > self.nodes[right].bounds.area() {
            std::mem::swap(&mut left, &mut right);
        }

        let node = &mut self.nodes[node_index];
        node.left = left as i32;
        node.right = right as i32;
        node_index
    }

    /// Binned SAH along `axis`. Returns the centroid coordinate to split at,
    /// or `None` if no split with shapes on both sides exists.
    fn sah_split(
        info: &[BuildShape],
        indices: &[usize],
        axis: Axis,
        parent: &Bounds,
        centroids: &Bounds,
    ) -> Option<f32> {
        let c_min = axis.of(centroids.min);
        let extent = axis.of(centroids.max) - c_min;
        if !(extent > f32::EPSILON) {
            return None;
        }

        let mut bins = [Bin::default(); BIN_COUNT];
        let scale = BIN_COUNT as f32 / extent;
        for &i in indices {
            let c = axis.of(info[i].center);
            let b = (((c - c_min) * scale) as usize).min(BIN_COUNT - 1);
            bins[b].add(&info[i].bounds);
        }

        // suffix[i] aggregates bins[i..]
        let mut suffix = [Bin::default(); BIN_COUNT];
        let mut acc = Bin::default();
        for i in (0..BIN_COUNT).rev() {
            acc.bounds.expand(&bins[i].bounds);
            acc.count += bins[i].count;
            suffix[i] = acc;
        }

        let parent_area = parent.area();
        let mut best: Option<(usize, f32)> = None;
        let mut prefix = Bin::default();
        for i in 0..BIN_COUNT - 1 {
            prefix.bounds.expand(&bins[i].bounds);
            prefix.count += bins[i].count;
            let right = &suffix[i + 1];
            if prefix.count == 0 || right.count == 0 {
                continue;
            }

            let cost = TRAVERSAL_COST
                + INTERSECTION_COST
                    * (prefix.bounds.area() * prefix.count as f32
                        + right.bounds.area() * right.count as f32)
                    / parent_area;
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((i, cost));
            }
        }

        best.map(|(i, _)| c_min + (i + 1) as f32 * extent / BIN_COUNT as f32)
    }

    /// Walk every node whose box the ray enters within the current interval,
    /// handing each leaf's shape indices to `leaf`. The leaf visitor may
    /// tighten the interval or stop the walk.
    fn walk<F>(&self, ray: &Ray, ray_t: Interval, mut leaf: F)
    where
        F: FnMut(&[usize], &mut Interval) -> ControlFlow<()>,
    {
        if self.nodes.is_empty() {
            return;
        }

        let mut t = ray_t;
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.bounds.intersect(ray, t).is_none() {
                continue;
            }

            if node.is_leaf() {
                let first = node.shape_index as usize;
                let range = first..first + node.shape_count as usize;
                if leaf(&self.shape_indices[range], &mut t).is_break() {
                    return;
                }
            } else {
                // Left is popped first
                stack.push(node.right as usize);
                stack.push(node.left as usize);
            }
        }
    }

    /// Invoke `callback` on every hit with `t` inside `ray_t`.
    ///
    /// No early exit: the caller picks the hit it needs, typically the
    /// closest one.
    pub fn traverse<S, F>(
        &self,
        shapes: &[S],
        ray: &Ray,
        ray_t: Interval,
        tol: Tolerance,
        mut callback: F,
    ) where
        S: Hittable,
        F: FnMut(&HitInfo),
    {
        self.walk(ray, ray_t, |indices, t| {
            for &i in indices {
                if let Some(hit) = shapes[i].intersect(ray, tol) {
                    if t.contains(hit.t) {
                        callback(&hit);
                    }
                }
            }
            ControlFlow::Continue(())
        });
    }

    /// First hit with `t` inside `ray_t` in traversal order, not necessarily
    /// the closest. Used for occlusion queries.
    pub fn traverse_first_hit<S: Hittable>(
        &self,
        shapes: &[S],
        ray: &Ray,
        ray_t: Interval,
        tol: Tolerance,
    ) -> Option<HitInfo> {
        let mut found = None;
        self.walk(ray, ray_t, |indices, t| {
            let hit = indices
                .iter()
                .filter_map(|&i| shapes[i].intersect(ray, tol))
                .find(|hit| t.contains(hit.t));
            match hit {
                Some(hit) => {
                    found = Some(hit);
                    ControlFlow::Break(())
                }
                None => ControlFlow::Continue(()),
            }
        });
        found
    }

    /// Closest hit with `t` inside `ray_t`. Nodes beyond the closest hit found
    /// so far are pruned.
    pub fn closest_hit<S: Hittable>(
        &self,
        shapes: &[S],
        ray: &Ray,
        ray_t: Interval,
        tol: Tolerance,
    ) -> Option<HitInfo> {
        let mut closest: Option<HitInfo> = None;
        self.walk(ray, ray_t, |indices, t| {
            for &i in indices {
                if let Some(hit) = shapes[i].intersect(ray, tol) {
                    if t.contains(hit.t) {
                        t.max = hit.t;
                        closest = Some(hit);
                    }
                }
            }
            ControlFlow::Continue(())
        });
        closest
    }
}

/// Move every element matching `pred` to the front of `slice` and return how
/// many matched.
fn partition<F: Fn(usize) -> bool>(slice: &mut [usize], pred: F) -> usize {
    let mut mid = 0;
    for j in 0..slice.len() {
        if pred(slice[j]) {
            slice.swap(mid, j);
            mid += 1;
        }
    }
    mid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialId;
    use crate::shapes::{BoundedShape, Sphere, Triangle};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_point(rng: &mut StdRng, scale: f32) -> Vec3 {
        Vec3::new(
            rng.gen_range(-scale..scale),
            rng.gen_range(-scale..scale),
            rng.gen_range(-scale..scale),
        )
    }

    fn random_scene(seed: u64, count: usize) -> Vec<BoundedShape> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|i| {
                let center = random_point(&mut rng, 10.0);
                if i % 2 == 0 {
                    let radius = rng.gen_range(0.1..1.0);
                    Sphere::new(center, radius, MaterialId(0)).unwrap().into()
                } else {
                    let a = center + random_point(&mut rng, 1.0);
                    let b = center + random_point(&mut rng, 1.0);
                    Triangle::new(center, a, b, MaterialId(0)).unwrap().into()
                }
            })
            .collect()
    }

    fn brute_force_closest(shapes: &[BoundedShape], ray: &Ray) -> Option<HitInfo> {
        shapes
            .iter()
            .filter_map(|s| s.intersect(ray, Tolerance::DEFAULT))
            .min_by(|a, b| a.t.total_cmp(&b.t))
    }

    fn collect_leaf_shapes(bvh: &Bvh, node: usize, out: &mut Vec<usize>) {
        let n = &bvh.nodes()[node];
        if n.is_leaf() {
            let first = n.shape_index as usize;
            out.extend_from_slice(&bvh.shape_indices()[first..first + n.shape_count as usize]);
        } else {
            collect_leaf_shapes(bvh, n.left as usize, out);
            collect_leaf_shapes(bvh, n.right as usize, out);
        }
    }

    #[test]
    fn test_bvh_empty() {
        let shapes: Vec<BoundedShape> = Vec::new();
        let bvh = Bvh::build(&shapes);
        assert!(bvh.is_empty());

        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut calls = 0;
        bvh.traverse(&shapes, &ray, Interval::from_min(0.0), Tolerance::DEFAULT, |_| calls += 1);
        assert_eq!(calls, 0);
        assert!(bvh
            .traverse_first_hit(&shapes, &ray, Interval::from_min(0.0), Tolerance::DEFAULT)
            .is_none());
    }

    #[test]
    fn test_bvh_single_leaf() {
        let shapes = random_scene(1, 3);
        let bvh = Bvh::build(&shapes);
        assert_eq!(bvh.nodes().len(), 1);
        assert!(bvh.nodes()[0].is_leaf());
        assert_eq!(bvh.nodes()[0].shape_count, 3);
    }

    #[test]
    fn test_bvh_structure_invariants() {
        let shapes = random_scene(7, 300);
        let bvh = Bvh::build(&shapes);

        for node in bvh.nodes() {
            if node.is_leaf() {
                assert!(node.shape_count as usize <= LEAF_THRESHOLD);
                assert_eq!((node.left, node.right), (-1, -1));
                let first = node.shape_index as usize;
                for &i in &bvh.shape_indices()[first..first + node.shape_count as usize] {
                    assert!(node.bounds.contains(&shapes[i].bounds()));
                }
            } else {
                let left = &bvh.nodes()[node.left as usize];
                let right = &bvh.nodes()[node.right as usize];
                assert!(node.bounds.contains(&left.bounds));
                assert!(node.bounds.contains(&right.bounds));
                assert!(left.bounds.area() <= right.bounds.area());
            }
        }

        // Every shape is referenced by exactly one leaf
        let mut seen = Vec::new();
        collect_leaf_shapes(&bvh, 0, &mut seen);
        seen.sort_unstable();
        assert_eq!(seen, (0..shapes.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let shapes = random_scene(42, 200);
        let bvh = Bvh::build(&shapes);
        let mut rng = StdRng::seed_from_u64(1234);

        for _ in 0..500 {
            let origin = random_point(&mut rng, 15.0);
            let target = random_point(&mut rng, 8.0);
            let ray = Ray::new(origin, target - origin);

            let expected = brute_force_closest(&shapes, &ray);

            let mut via_traverse: Option<HitInfo> = None;
            bvh.traverse(&shapes, &ray, Interval::from_min(0.0), Tolerance::DEFAULT, |hit| {
                if via_traverse.map_or(true, |best| hit.t < best.t) {
                    via_traverse = Some(*hit);
                }
            });
            let via_closest =
                bvh.closest_hit(&shapes, &ray, Interval::from_min(0.0), Tolerance::DEFAULT);
            let any =
                bvh.traverse_first_hit(&shapes, &ray, Interval::from_min(0.0), Tolerance::DEFAULT);

            match expected {
                Some(e) => {
                    assert!((via_traverse.unwrap().t - e.t).abs() < 1e-4);
                    assert!((via_closest.unwrap().t - e.t).abs() < 1e-4);
                    assert!(any.is_some());
                }
                None => {
                    assert!(via_traverse.is_none());
                    assert!(via_closest.is_none());
                    assert!(any.is_none());
                }
            }
        }
    }

    #[test]
    fn test_bvh_first_hit_respects_interval() {
        // Two spheres along +X; only the far one lies beyond t = 10
        let shapes: Vec<BoundedShape> = vec![
            Sphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0, MaterialId(0)).unwrap().into(),
            Sphere::new(Vec3::new(20.0, 0.0, 0.0), 1.0, MaterialId(1)).unwrap().into(),
        ];
        let bvh = Bvh::build(&shapes);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = bvh
            .traverse_first_hit(&shapes, &ray, Interval::new(0.0, 10.0), Tolerance::DEFAULT)
            .unwrap();
        assert_eq!(hit.material, MaterialId(0));

        // An occluder beyond the interval does not count
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::X);
        assert!(bvh
            .traverse_first_hit(&shapes, &ray, Interval::new(0.0, 5.0), Tolerance::DEFAULT)
            .is_none());
    }

    #[test]
    fn test_bvh_shared_centroid_terminates() {
        // Concentric spheres: no geometric split exists
        let shapes: Vec<BoundedShape> = (1..=50)
            .map(|i| {
                Sphere::new(Vec3::splat(1.0), i as f32 * 0.1, MaterialId(0))
                    .unwrap()
                    .into()
            })
            .collect();
        let bvh = Bvh::build(&shapes);

        let mut seen = Vec::new();
        collect_leaf_shapes(&bvh, 0, &mut seen);
        assert_eq!(seen.len(), 50);
        assert!(bvh
            .nodes()
            .iter()
            .filter(|n| n.is_leaf())
            .all(|n| n.shape_count as usize <= LEAF_THRESHOLD));

        let ray = Ray::new(Vec3::new(1.0, 1.0, -20.0), Vec3::Z);
        let hit = bvh
            .closest_hit(&shapes, &ray, Interval::from_min(0.0), Tolerance::DEFAULT)
            .unwrap();
        // Outermost sphere, radius 5
        assert!((hit.t - 16.0).abs() < 1e-3);
    }
}
