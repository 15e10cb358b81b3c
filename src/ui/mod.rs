pub mod loading;
pub mod render;

pub use loading::LoadingIndicator;
pub use render::Renderer;
