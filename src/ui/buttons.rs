//! GPIO button input with async debouncing.
//!
//! Three physical buttons (active-low with internal pull-up):
//!   - UP     - previous menu entry
//!   - DOWN   - next menu entry
//!   - SELECT - act on the highlighted entry
//!
//! Each button is handled by an async task that waits for a GPIO edge,
//! debounces it, and sends a `ButtonEvent` to the control loop.

use defmt::info;
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};
use homepanel::config::BUTTON_DEBOUNCE_MS;
use homepanel::ui::ButtonEvent;

/// Run a single button polling loop.
///
/// Waits for the pin to go low (pressed), debounces, sends the event,
/// then waits for release before repeating. No repeat or long-press.
pub async fn button_task(
    pin: AnyPin,
    event: ButtonEvent,
    tx: Sender<'static, CriticalSectionRawMutex, ButtonEvent, 4>,
) -> ! {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        // Active-low: pressing pulls the pin to ground.
        btn.wait_for_falling_edge().await;

        // Ignore contact bounce: only a press still held after the window counts.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            info!("Button: {}", event);
            // Blocks while the control loop is reconnecting and the channel is full.
            tx.send(event).await;

            // One event per press; holding the button does not repeat.
            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}
