//! Tool System - tool definitions, catalog, arguments and routing

mod arguments;
mod catalog;
mod definition;
mod outcome;
mod router;

pub use arguments::{
    DirectionsArgs, DisplayArgs, GeocodeArgs, ReverseGeocodeArgs, SearchPlacesArgs, ToolRequest,
    TrafficIncidentsArgs,
};
pub use catalog::ToolCatalog;
pub use definition::{MapStyle, MapTool, ToolDefinition, TransportMode};
pub use outcome::{ContentBlock, ResultEnvelope, ToolOutcome};
pub use router::{MapToolRouter, ToolDispatcher};
