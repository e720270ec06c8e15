//! Archived shapes written to and read from save files.

use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};

use super::node::Node;

/// Legacy save: the grid alone. The rule set is left as it was on load.
#[derive(Clone, Debug, PartialEq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct GridCapsule {
    pub nodes: Vec<Node>,
}

/// Current save: the grid together with its activation values.
#[derive(Clone, Debug, PartialEq, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct SaveFile {
    pub nodes: Vec<Node>,
    pub activation_values: Vec<f64>,
}
