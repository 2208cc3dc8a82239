// Internal modules - all access should go through api module
pub(crate) mod bus;
pub(crate) mod event;

// Public API module - the only public interface for queue listeners
pub mod api;

#[cfg(test)]
mod tests;
