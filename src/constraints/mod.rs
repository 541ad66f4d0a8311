//! Hard "must stay together" constraints.
//!
//! Entities within a distance threshold of each other are merged into
//! components with a [`UnionFind`]. Components are placed whole into groups
//! and later only exchanged whole (see
//! [`component_swap_improve`](crate::local_search::component_swap_improve)).

mod components;
mod union_find;

pub use components::{
    assign_components, build_components, check_components_intact, check_feasible, Component,
};
pub use union_find::UnionFind;
