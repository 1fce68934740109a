//! Local and world transforms of the node hierarchy.
//!
//! World matrices compose root to leaf: `world = root * ... * parent * node`.
//! All traversals are iterative and refuse dangling or repeated child
//! references, so malformed hierarchies fail with [`Error::Graph`] instead
//! of looping.

use crate::model::{Asset, Node};
use crate::util::{Error, Mat4, Result};

/// Local matrix of a node.
#[inline]
pub fn local_matrix(node: &Node) -> Mat4 {
    node.transform.matrix()
}

/// World matrix of the last node in `chain`, which lists node indices from
/// the root down.
pub fn world_matrix(asset: &Asset, chain: &[usize]) -> Result<Mat4> {
    chain.iter().try_fold(Mat4::IDENTITY, |acc, &i| Ok(acc * local_matrix(asset.node(i)?)))
}

/// Ancestor chain of `node`, root first and `node` last.
pub fn ancestor_chain(asset: &Asset, node: usize) -> Result<Vec<usize>> {
    asset.node(node)?;
    let parents = asset.parents();
    let mut chain = vec![node];
    let mut cur = node;
    while let Some(p) = parents[cur] {
        if chain.len() > asset.nodes.len() {
            return Err(Error::graph(format!("node {node} has a cyclic ancestry")));
        }
        chain.push(p);
        cur = p;
    }
    chain.reverse();
    Ok(chain)
}

/// Node reached during a walk.
#[derive(Clone, Copy, Debug)]
pub struct Visit {
    pub node: usize,
    pub parent: Option<usize>,
    pub depth: usize,
    pub world: Mat4,
}

/// Depth-first walk from `roots`, children in declaration order.
///
/// Every node may be reached at most once. A child index outside the node
/// array, or a node reached twice (shared child or cycle), is a graph error.
pub fn walk<F>(asset: &Asset, roots: &[usize], mut visit: F) -> Result<()>
where
    F: FnMut(&Visit) -> Result<()>,
{
    let mut seen = vec![false; asset.nodes.len()];
    let mut stack: Vec<(usize, Option<usize>, usize, Mat4)> = Vec::new();
    for &root in roots.iter().rev() {
        stack.push((root, None, 0, Mat4::IDENTITY));
    }

    while let Some((index, parent, depth, parent_world)) = stack.pop() {
        let node = asset.nodes.get(index).ok_or_else(|| match parent {
            Some(p) => Error::graph(format!("node {p} lists missing child {index}")),
            None => Error::graph(format!("root node {index} does not exist")),
        })?;
        if std::mem::replace(&mut seen[index], true) {
            return Err(Error::graph(format!("node {index} is reached more than once")));
        }

        let world = parent_world * local_matrix(node);
        visit(&Visit { node: index, parent, depth, world })?;

        for &child in node.children.iter().rev() {
            stack.push((child, Some(index), depth + 1, world));
        }
    }
    Ok(())
}

/// World matrix of every node reachable from `roots`.
pub fn world_matrices(asset: &Asset, roots: &[usize]) -> Result<Vec<Option<Mat4>>> {
    let mut out = vec![None; asset.nodes.len()];
    walk(asset, roots, |v| {
        out[v.node] = Some(v.world);
        Ok(())
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Transform;
    use crate::util::{mat4_approx_eq, ErrorKind, Quat, Vec3};

    fn chain_asset() -> Asset {
        // 0 -> 1 -> 2, plus a lone root 3.
        let mut nodes = vec![Node::new("a"), Node::new("b"), Node::new("c"), Node::new("d")];
        nodes[0].children = vec![1];
        nodes[1].children = vec![2];
        nodes[0].transform = Transform::trs(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE);
        nodes[1].transform = Transform::trs(Vec3::ZERO, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2), Vec3::ONE);
        nodes[2].transform = Transform::Matrix(Mat4::from_scale(Vec3::splat(2.0)));
        Asset { nodes, ..Default::default() }
    }

    #[test]
    fn test_local_trs_scales_first() {
        let node = Node {
            transform: Transform::trs(Vec3::X, Quat::IDENTITY, Vec3::splat(2.0)),
            ..Default::default()
        };
        let m = local_matrix(&node);
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(m.transform_point3(Vec3::X), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_world_matrix_order() {
        let a = chain_asset();
        let m = world_matrix(&a, &[0, 1, 2]).unwrap();
        // Scale, then rotate X onto Y, then translate.
        let p = m.transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
        assert_eq!(ancestor_chain(&a, 2).unwrap(), vec![0, 1, 2]);
        assert_eq!(ancestor_chain(&a, 3).unwrap(), vec![3]);
    }

    #[test]
    fn test_walk_matches_world_matrix() {
        let a = chain_asset();
        let worlds = world_matrices(&a, &a.root_nodes()).unwrap();
        for i in 0..4 {
            let chain = ancestor_chain(&a, i).unwrap();
            let expect = world_matrix(&a, &chain).unwrap();
            assert!(mat4_approx_eq(&worlds[i].unwrap(), &expect, 1e-6));
        }
    }

    #[test]
    fn test_walk_order_and_depth() {
        let mut a = chain_asset();
        a.nodes[0].children = vec![1, 3];
        let mut order = Vec::new();
        walk(&a, &[0], |v| {
            order.push((v.node, v.parent, v.depth));
            Ok(())
        })
        .unwrap();
        assert_eq!(order, vec![(0, None, 0), (1, Some(0), 1), (2, Some(1), 2), (3, Some(0), 1)]);
    }

    #[test]
    fn test_dangling_child() {
        let mut a = chain_asset();
        a.nodes[2].children = vec![9];
        let err = world_matrices(&a, &[0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Graph);
    }

    #[test]
    fn test_cycle_and_shared_child() {
        let mut a = chain_asset();
        a.nodes[2].children = vec![0];
        assert_eq!(world_matrices(&a, &[0]).unwrap_err().kind(), ErrorKind::Graph);

        let mut a = chain_asset();
        a.nodes[3].children = vec![2];
        assert_eq!(world_matrices(&a, &[0, 3]).unwrap_err().kind(), ErrorKind::Graph);
    }

    #[test]
    fn test_cyclic_ancestry() {
        let mut a = chain_asset();
        a.nodes[2].children = vec![0];
        assert_eq!(ancestor_chain(&a, 1).unwrap_err().kind(), ErrorKind::Graph);
    }
}
