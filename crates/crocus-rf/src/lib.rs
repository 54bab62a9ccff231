//! Random Forest classification: train, score, predict, cross-validate.
//!
//! A hand-rolled Random Forest classifier built on CART decision trees with
//! Gini/Entropy split criteria, optional best-first growth under a per-tree
//! leaf cap, parallel training via rayon, out-of-bag evaluation, MDI feature
//! importances, confusion-matrix metrics, and stratified k-fold
//! cross-validation.

mod config;
mod confusion;
mod error;
mod eval;
mod forest;
mod importance;
mod node;
mod oob;
mod predict;
mod result;
mod split;
mod tree;

pub use config::{MaxFeatures, OobMode, RandomForestConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use error::RfError;
pub use eval::{CrossValidation, CrossValidationResult};
pub use forest::RandomForest;
pub use importance::RankedFeature;
pub use node::{FeatureIndex, Impurity, Node};
pub use oob::OobScore;
pub use predict::ClassDistribution;
pub use result::{RandomForestResult, TrainingMetadata};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
