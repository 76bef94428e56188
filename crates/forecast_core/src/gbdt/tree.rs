//! Regression tree structures for ensemble scoring

use serde::{Deserialize, Serialize};

/// One node of a regression tree
///
/// Leaves carry `leaf = Some(value)` and `-1` in `left`, `right` and
/// `feature_idx`. Split nodes send rows with
/// `features[feature_idx] <= threshold` to `left`, everything else to `right`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: i32,
    pub left: i32,
    pub right: i32,
    pub feature_idx: i32,
    pub threshold: f64,
    pub leaf: Option<f64>,
}

impl Node {
    /// Split node routing to `left` / `right` by node index
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    pub fn leaf(id: i32, value: f64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(value),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single regression tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Node 0 is the root; children always follow their parent
    pub nodes: Vec<Node>,

    /// Shrinkage applied to this tree's output
    pub weight: f64,
}

impl Tree {
    pub fn new(nodes: Vec<Node>, weight: f64) -> Self {
        Self { nodes, weight }
    }

    /// Leaf value reached by a feature vector
    ///
    /// NaN never satisfies `<=`, so missing values follow the right branch.
    /// Malformed trees evaluate to 0.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };

            if node.is_leaf() {
                return node.leaf.unwrap_or(0.0);
            }

            let Some(&value) = features.get(node.feature_idx as usize) else {
                return 0.0;
            };

            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return 0.0;
            }
            idx = next as usize;
        }
    }

    /// Number of leaves
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Validate tree structure against the expected feature count
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }
        if !self.weight.is_finite() {
            return Err(format!("Tree weight is not finite: {}", self.weight));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    Some(v) if v.is_finite() => {}
                    Some(v) => return Err(format!("Leaf node {i} has non-finite value {v}")),
                    None => return Err(format!("Leaf node {i} has no leaf value")),
                }
                continue;
            }

            // Children are always emitted after their parent, so this also rules out cycles.
            for (side, child) in [("left", node.left), ("right", node.right)] {
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }

            if node.feature_idx < 0 || node.feature_idx as usize >= feature_count {
                return Err(format!(
                    "Internal node {} has invalid feature index: {}",
                    i, node.feature_idx
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Tree {
        Tree::new(
            vec![
                Node::internal(0, 0, 50.0, 1, 2),
                Node::leaf(1, 100.0),
                Node::leaf(2, 200.0),
            ],
            1.0,
        )
    }

    #[test]
    fn test_node_creation() {
        let internal = Node::internal(0, 3, 12.5, 1, 2);
        assert_eq!(internal.feature_idx, 3);
        assert!(!internal.is_leaf());

        let leaf = Node::leaf(1, -2.5);
        assert_eq!(leaf.feature_idx, -1);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.leaf, Some(-2.5));
    }

    #[test]
    fn test_tree_evaluation() {
        let tree = stump();

        assert_eq!(tree.evaluate(&[30.0]), 100.0);
        assert_eq!(tree.evaluate(&[50.0]), 100.0); // Equal goes left
        assert_eq!(tree.evaluate(&[60.0]), 200.0);
        assert_eq!(tree.evaluate(&[f64::NAN]), 200.0);
        assert_eq!(tree.evaluate(&[]), 0.0);
        assert_eq!(tree.num_leaves(), 2);
    }

    #[test]
    fn test_tree_validation() {
        assert!(stump().validate(1).is_ok());
        assert!(stump().validate(0).is_err());

        let bad_child = Tree::new(
            vec![
                Node::internal(0, 0, 50.0, 5, 2),
                Node::leaf(1, 100.0),
                Node::leaf(2, 200.0),
            ],
            1.0,
        );
        assert!(bad_child.validate(1).is_err());

        let self_loop = Tree::new(vec![Node::internal(0, 0, 1.0, 0, 0)], 1.0);
        assert!(self_loop.validate(1).is_err());

        assert!(Tree::new(vec![], 1.0).validate(1).is_err());
        assert!(Tree::new(vec![Node::leaf(0, f64::INFINITY)], 1.0)
            .validate(1)
            .is_err());
    }
}
