//! Scenario tests driving a whole physics world

mod query_scenarios;
