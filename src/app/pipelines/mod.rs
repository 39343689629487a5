pub mod nerf_pipeline;

pub use nerf_pipeline::NerfFloorplanPipeline;
