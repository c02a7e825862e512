// tabhost services
// Services run alongside the tab core: background workers and settings persistence.

pub mod background;
pub mod settings_engine;
