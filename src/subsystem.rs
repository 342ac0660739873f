use crate::error::Result;

/// Lifecycle shared by the engine's managers
pub trait Subsystem {
    /// Name used in logs and startup errors
    fn name(&self) -> &'static str;

    /// Acquire whatever the subsystem needs; may be called again after `shut_down`
    fn start_up(&mut self) -> Result<()>;

    /// Release resources; must be safe to call when not started
    fn shut_down(&mut self);

    fn is_started(&self) -> bool;
}
