pub mod beams;
pub mod calib;
pub mod cfg;
pub mod constants;
pub mod error;
pub mod geom;
pub mod group_delay;
pub mod pipeline;
pub mod quantize;
pub mod scan;
pub mod station;
pub mod table;
pub mod utils;
