pub mod appearance;
pub mod palette;
pub mod state;
