/// Decide whether an awake screen should go to sleep.
///
/// A pending alert always keeps the screen on, however long the user has
/// been away.
pub fn screen_should_sleep(
    awake: bool,
    alert_active: bool,
    idle_ms: u64,
    timeout_ms: u64,
) -> bool {
    if !awake || alert_active {
        return false;
    }

    idle_ms > timeout_ms
}
