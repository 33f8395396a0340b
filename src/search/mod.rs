pub mod debounce;
pub mod resolver;
pub mod state;
