pub(crate) mod provider;

pub use provider::HoverProvider;
