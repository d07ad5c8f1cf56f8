

/// Breakpoints and run control.
pub mod breakpoints;

/// Event subscriptions and write guards.
pub mod events;


/// Program images.
pub mod program;
