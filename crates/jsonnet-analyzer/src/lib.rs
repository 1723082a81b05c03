pub mod analysis;
pub mod cache;
pub mod config;
pub mod document;
pub mod hover;
pub mod ide;
pub mod server;
pub mod syntax;
pub mod text_pos;

pub use analysis::{Analysis, AnalysisError, AnnotatedTree, Env, Resolved, Resolver};
pub use cache::{CacheError, NodeCache};
pub use config::ServerSettings;
pub use hover::HoverProvider;
pub use server::JsonnetLanguageServer;
pub use syntax::{Ast, Location, LocationRange, ParseError, parse};
