//! The two-phase time step.
//!
//! Phase one spreads the weight of every link leaving an active node into
//! the destination's input sum. Phase two compares each completed sum with
//! the activation values. Keeping the phases apart means every activation
//! decision sees the full neighbourhood contribution regardless of the
//! order nodes are visited in.

use cellnet_data::RuleSet;

use crate::grid::Grid;
use crate::rules::RuleLogic;

impl Grid {
    /// Phase one over all nodes in index order.
    pub fn accumulate_inputs(&mut self) {
        let len = self.len();
        self.accumulate_inputs_in_order(0..len);
    }

    /// Phase one visiting sources in the given order.
    ///
    /// `order` should name each node index once. Indices outside the grid
    /// are skipped.
    pub fn accumulate_inputs_in_order<I>(&mut self, order: I)
    where
        I: IntoIterator<Item = usize>,
    {
        let nodes = self.nodes_mut();
        for source in order {
            let Some(node) = nodes.get(source) else {
                continue;
            };
            if !node.active {
                continue;
            }
            for k in 0..nodes[source].links.len() {
                let link = nodes[source].links[k];
                nodes[link.target].input_sum += link.weight;
            }
        }
    }

    /// Phase two: decide each node's state from its input sum, then reset the sum.
    ///
    /// Indices of nodes whose state flipped are appended to `changed`.
    pub fn apply_activation(&mut self, rules: &RuleSet, changed: &mut Vec<usize>) {
        for (idx, node) in self.nodes_mut().iter_mut().enumerate() {
            let fires = rules.fires(node.input_sum);
            if fires != node.active {
                node.active = fires;
                changed.push(idx);
            }
            node.input_sum = 0.0;
        }
    }

    /// Runs both phases and returns the indices of nodes that changed state.
    pub fn time_step(&mut self, rules: &RuleSet) -> Vec<usize> {
        let mut changed = Vec::new();
        self.accumulate_inputs();
        self.apply_activation(rules, &mut changed);
        changed
    }
}
