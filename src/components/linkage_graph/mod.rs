//! Entity-linkage graph visualization component.
//!
//! Renders an investigation graph of fraud-relevant identifiers (uids,
//! devices, IPs, vendors, phones) on an HTML canvas with:
//! - Force-directed layout with weight-scaled spring lengths
//! - Pan, zoom, and node dragging interactions
//! - Edge inspection (click an edge to see the orders behind it)
//! - Type and weight filtering as a pure view over the dataset
//! - Configurable theming and visual scaling
//!
//! # Example
//!
//! ```ignore
//! use linkage_graph::{LinkageGraphCanvas, FilterState, GraphSnapshot};
//!
//! let (snapshot, _) = signal(None::<GraphSnapshot>);
//! let (filter, _) = signal(FilterState::default());
//!
//! view! { <LinkageGraphCanvas snapshot=snapshot filter=filter fullscreen=true /> }
//! ```

mod component;
pub mod filter;
mod render;
pub mod scale;
pub mod sim;
mod state;
pub mod theme;
mod types;

pub use component::LinkageGraphCanvas;
pub use filter::FilterState;
pub use sim::{DragState, SimNode, SimParams};
pub use state::{LinkageGraphState, PanState, ViewTransform};
pub use theme::Theme;
pub use types::{
	Edge, EdgeDetail, EdgeDetailRequest, EdgeDetailResponse, EdgeDetailStatus, Entity, EntityKey,
	EntityType, GraphBuildRequest, GraphCommand, GraphSnapshot, OrderRef,
};
