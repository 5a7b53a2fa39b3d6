//! Built-in action strategies
//!
//! HTTP requests, navigation, notifications, delays, variables and logging.

mod debug;
mod http;
mod message;
mod navigate;
mod time;
mod variable;

pub use debug::{LogParams, LogStrategy};
pub use http::{HttpRequestParams, HttpRequestStrategy};
pub use message::{ShowMessageParams, ShowMessageStrategy};
pub use navigate::{build_url, NavigateParams, NavigateStrategy};
pub use time::{DelayParams, DelayStrategy};
pub use variable::{coerce_value, SetVariableParams, SetVariableStrategy};

use actionruntime::StrategyRegistry;
use std::sync::Arc;

/// Register all built-in strategies with a registry
pub fn register_all(registry: &mut StrategyRegistry) {
    registry.register(Arc::new(HttpRequestStrategy::new()));
    registry.register(Arc::new(NavigateStrategy));
    registry.register(Arc::new(ShowMessageStrategy));
    registry.register(Arc::new(DelayStrategy));
    registry.register(Arc::new(SetVariableStrategy));
    registry.register(Arc::new(LogStrategy));
}

/// A registry holding every built-in strategy plus the default aliases
pub fn default_registry() -> StrategyRegistry {
    let mut registry = StrategyRegistry::new();
    register_all(&mut registry);
    registry
}
