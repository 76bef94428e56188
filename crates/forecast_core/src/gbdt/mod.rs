//! Gradient boosted decision tree ensemble used for scoring
//!
//! # Model Format
//!
//! Models are serialized as canonical JSON (sorted keys):
//!
//! ```json
//! {
//!   "bias": 2.31,
//!   "feature_count": 12,
//!   "link": "log",
//!   "trees": [
//!     {
//!       "nodes": [
//!         {"feature_idx":2,"id":0,"leaf":null,"left":1,"right":2,"threshold":14.0},
//!         {"feature_idx":-1,"id":1,"leaf":-0.42,"left":-1,"right":-1,"threshold":0.0},
//!         {"feature_idx":-1,"id":2,"leaf":0.37,"left":-1,"right":-1,"threshold":0.0}
//!       ],
//!       "weight": 0.2
//!     }
//!   ],
//!   "version": 1
//! }
//! ```
//!
//! # Usage
//!
//! ```rust
//! use eshop_forecast_core::gbdt::{Link, Model, Node, Tree};
//!
//! let tree = Tree::new(
//!     vec![
//!         Node::internal(0, 0, 50.0, 1, 2),
//!         Node::leaf(1, 0.5),
//!         Node::leaf(2, 1.5),
//!     ],
//!     0.2,
//! );
//! let model = Model::new(vec![tree], 1.0, Link::Log, 1);
//!
//! let units = model.predict(&[30.0]);
//! assert!((units - 1.1f64.exp()).abs() < 1e-12);
//! ```

pub mod model;
pub mod tree;

pub use model::{Link, Model, MODEL_VERSION};
pub use tree::{Node, Tree};
