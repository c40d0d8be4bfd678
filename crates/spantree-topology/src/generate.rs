//! Reproducible topology shapes.
//!
//! Every generator returns a connected graph (for `n >= 1`) with ids laid
//! out so the smallest id is at a predictable position: the start of a path,
//! the hub of a star, the corner of a grid.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{Graph, NodeId};

/// `0-1-...-n-1`.
pub fn path(n: usize) -> Graph {
    let mut g = Graph::new(n);
    for i in 1..n {
        link(&mut g, i - 1, i);
    }
    g
}

/// A path closed into a cycle (`n >= 3` for a proper ring).
pub fn ring(n: usize) -> Graph {
    let mut g = path(n);
    if n >= 3 {
        link(&mut g, n - 1, 0);
    }
    g
}

/// Hub `0` linked to every other vertex.
pub fn star(n: usize) -> Graph {
    let mut g = Graph::new(n);
    for i in 1..n {
        link(&mut g, 0, i);
    }
    g
}

/// Every pair linked.
pub fn complete(n: usize) -> Graph {
    let mut g = Graph::new(n);
    for u in 0..n {
        for v in (u + 1)..n {
            link(&mut g, u, v);
        }
    }
    g
}

/// A `width × height` lattice, row-major ids, `0` in the corner.
///
/// # Panics
///
/// Panics if `width * height` overflows or exceeds [`crate::MAX_VERTICES`].
pub fn grid(width: usize, height: usize) -> Graph {
    let count = width
        .checked_mul(height)
        .unwrap_or_else(|| panic!("grid {width}x{height} overflows the vertex count"));
    let mut g = Graph::new(count);
    for row in 0..height {
        for col in 0..width {
            let id = row * width + col;
            if col + 1 < width {
                link(&mut g, id, id + 1);
            }
            if row + 1 < height {
                link(&mut g, id, id + width);
            }
        }
    }
    g
}

/// A random spanning tree over shuffled ids plus `extra_edges` random chords.
///
/// The same `seed` always yields the same graph. Chords that would duplicate
/// an edge are skipped, so the final edge count can be lower than
/// `n - 1 + extra_edges` on small or dense graphs.
pub fn random_connected(n: usize, extra_edges: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = Graph::new(n);
    if n < 2 {
        return g;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut rng);
    for i in 1..n {
        let parent = order[rng.gen_range(0..i)];
        link(&mut g, parent, order[i]);
    }

    for _ in 0..extra_edges {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        if u != v {
            link(&mut g, u, v);
        }
    }
    g
}

fn link(g: &mut Graph, u: usize, v: usize) {
    // Generators only produce in-range, distinct endpoints.
    let _ = g.add_edge(NodeId(u as u32), NodeId(v as u32));
}
