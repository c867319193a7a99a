// Cross-module tests of the planner
pub mod test_edge_cases;
pub mod test_perseus;
