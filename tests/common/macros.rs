/// Asserts that exactly the given cells are active in a grid.
#[macro_export]
macro_rules! assert_active_set {
    ($grid:expr, [$(($x:expr, $y:expr)),* $(,)?]) => {
        let mut expected: Vec<cellnet_lib::Position> =
            vec![$(cellnet_lib::Position::new($x, $y)),*];
        expected.sort();
        let actual = $crate::common::active_positions(&$grid);
        assert_eq!(actual, expected, "Active set mismatch");
    };
}

/// Asserts that the engine's node at `position` has the given activation.
#[macro_export]
macro_rules! assert_cell {
    ($engine:expr, $height:expr, ($x:expr, $y:expr), $active:expr) => {
        let index = ($x * $height + $y) as usize;
        let node = $engine
            .node(index)
            .expect("Engine disconnected")
            .expect("Node index out of range");
        assert_eq!(node.position, cellnet_lib::Position::new($x, $y));
        assert_eq!(
            node.active, $active,
            "Cell ({}, {}) activation mismatch",
            $x, $y
        );
    };
}
