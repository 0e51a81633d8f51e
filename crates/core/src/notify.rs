/// Browser-style notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The user has not been asked yet.
    Undetermined,
}

/// Outbound notification capability with a tri-state permission model.
///
/// Delivery is best-effort: implementations may drop a notification but must
/// never fail — alert evaluation continues regardless of the outcome.
pub trait NotificationSink {
    fn permission(&self) -> Permission;

    /// Prompt the user once and return the resulting permission.
    fn request_permission(&mut self) -> Permission;

    fn notify(&mut self, title: &str, body: &str);
}
