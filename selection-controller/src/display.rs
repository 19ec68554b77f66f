/// The display widget the controller drives.
///
/// Called only from the controller's own context; rendering/layout details
/// stay on the other side of this trait.
pub trait PrinterDisplay {
    /// Show or hide the "awaiting sync" indicator (shown while the replica
    /// is still empty).
    fn set_awaiting_sync_indicator(&mut self, visible: bool);

    /// Show or hide the refresh affordance.
    fn set_refresh_affordance_visible(&mut self, visible: bool);

    /// Enable or disable the refresh affordance (disabled while a refresh
    /// is in flight).
    fn set_refresh_affordance_enabled(&mut self, enabled: bool);

    fn set_row_count(&mut self, rows: usize);

    fn set_row_label(&mut self, row: usize, label: &str);

    /// The checkmark marks the current default printer.
    fn set_row_checkmark(&mut self, row: usize, visible: bool);
}

/// The presentation host surrounding the controller's view.
///
/// Asked before every display push whether the view is the one the user is
/// currently looking at; driving an off-screen widget is skipped.
pub trait VisibilityHost: Send + Sync {
    fn is_currently_visible(&self) -> bool;
}
