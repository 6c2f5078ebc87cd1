use crate::{error::InvalidInstance, node::Node};

/// Number of nodes in every instance.
pub const NODE_COUNT: usize = 10;

/// Nodes that repeat an earlier node by value.
pub fn count_duplicates(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .enumerate()
        .filter(|&(i, node)| nodes[..i].contains(node))
        .count()
}

/// Returns `nodes` unchanged when there are exactly [`NODE_COUNT`] of them
/// and no two are equal.
pub fn validate_nodes(nodes: Vec<Node>) -> Result<Vec<Node>, InvalidInstance> {
    let actual = nodes.len();
    let duplicates = count_duplicates(&nodes);

    match (actual == NODE_COUNT, duplicates == 0) {
        (true, true) => Ok(nodes),
        (false, true) => Err(InvalidInstance::WrongCount {
            expected: NODE_COUNT,
            actual,
        }),
        (true, false) => Err(InvalidInstance::Duplicates { actual, duplicates }),
        (false, false) => Err(InvalidInstance::WrongCountAndDuplicates {
            expected: NODE_COUNT,
            actual,
            duplicates,
        }),
    }
}
