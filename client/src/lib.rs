mod actions;
mod app;
mod dom;
mod render;
mod scene;
mod state;

pub use app::run;
