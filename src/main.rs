//! homepanel firmware - nRF52840 + SSD1306 + ESP-AT Wi-Fi modem.
//!
//! A single cooperative control loop owns the [`Dashboard`]. Each cycle it
//! drains button presses, then inbound MQTT messages, then ticks the clock,
//! then flushes queued publishes to the modem. When the broker link is down
//! the loop blocks in [`reconnect`] until it is back.

#![no_std]
#![no_main]

mod net;
mod ui;

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{AnyPin, Pin};
use embassy_nrf::peripherals::{TIMER0, UARTE0};
use embassy_nrf::uarte::UarteRxWithIdle;
use embassy_nrf::{bind_interrupts, peripherals, twim, uarte};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use homepanel::catalog::Catalog;
use homepanel::config;
use homepanel::net::{ModemEvent, Outbox};
use homepanel::power::PowerState;
use homepanel::ui::ButtonEvent;
use homepanel::{Dashboard, DashboardConfig};
use net::modem::{self, Modem};
use ui::display::OledRenderer;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    UARTE0_UART0 => uarte::InterruptHandler<peripherals::UARTE0>;
});

static BUTTONS: Channel<CriticalSectionRawMutex, ButtonEvent, 4> = Channel::new();
static MODEM_EVENTS: Channel<CriticalSectionRawMutex, ModemEvent, { modem::EVENT_QUEUE }> =
    Channel::new();

#[embassy_executor::task(pool_size = 3)]
async fn button_runner(pin: AnyPin, event: ButtonEvent) {
    ui::buttons::button_task(pin, event, BUTTONS.sender()).await
}

#[embassy_executor::task]
async fn modem_rx_runner(rx: UarteRxWithIdle<'static, UARTE0, TIMER0>) {
    modem::rx_loop(rx, MODEM_EVENTS.sender()).await
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

fn modem_baudrate() -> uarte::Baudrate {
    match config::MODEM_BAUD {
        9_600 => uarte::Baudrate::BAUD9600,
        57_600 => uarte::Baudrate::BAUD57600,
        230_400 => uarte::Baudrate::BAUD230400,
        _ => uarte::Baudrate::BAUD115200,
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("homepanel starting");

    // Display
    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut display = OledRenderer::new(i2c);

    // Buttons
    unwrap!(spawner.spawn(button_runner(p.P0_11.degrade(), ButtonEvent::Previous)));
    unwrap!(spawner.spawn(button_runner(p.P0_12.degrade(), ButtonEvent::Next)));
    unwrap!(spawner.spawn(button_runner(p.P0_24.degrade(), ButtonEvent::Select)));

    // Modem link
    let mut uart_cfg = uarte::Config::default();
    uart_cfg.parity = uarte::Parity::EXCLUDED;
    uart_cfg.baudrate = modem_baudrate();
    let uart = uarte::Uarte::new(p.UARTE0, Irqs, p.P0_08, p.P0_06, uart_cfg);
    let (tx, rx) = uart.split_with_idle(p.TIMER0, p.PPI_CH0, p.PPI_CH1);
    unwrap!(spawner.spawn(modem_rx_runner(rx)));
    let mut modem = Modem::new(tx, MODEM_EVENTS.receiver());

    let mut dashboard = Dashboard::new(Catalog::default(), DashboardConfig::default(), now_ms());
    let mut outbox: Outbox<{ config::OUTBOX_CAPACITY }> = Outbox::new();

    dashboard.start(&mut display);

    loop {
        if !outbox.is_connected() {
            reconnect(&mut modem, &mut display, &dashboard).await;
            outbox.set_connected(true);
            dashboard.refresh(&mut display);
        }

        // 1. User input.
        while let Ok(event) = BUTTONS.try_receive() {
            dashboard.on_button(event, now_ms(), &mut outbox, &mut display);
        }

        // 2. Transport delivery.
        while let Some(event) = modem.next_event() {
            if event.is_link_lost() {
                warn!("Link lost: {}", event);
                outbox.set_connected(false);
                continue;
            }
            match event {
                ModemEvent::Message { topic, payload } => {
                    dashboard.on_message(&topic, &payload, &mut display);
                }
                ModemEvent::Error => warn!("Modem reported an unsolicited ERROR"),
                _ => {}
            }
        }

        // 3. Clock.
        dashboard.on_tick(now_ms(), &mut display);
        if dashboard.take_exit_request() {
            dashboard.suspend(&mut display);
        }

        while let Some(item) = outbox.pop() {
            if let Err(e) = modem.publish(&item).await {
                warn!("Publish to {} failed: {:?}", item.topic, e);
                if e.is_link_lost() {
                    // Drops the rest of the queue; the next cycle reconnects.
                    outbox.set_connected(false);
                }
            }
        }

        Timer::after(Duration::from_millis(config::LOOP_PERIOD_MS)).await;
    }
}

/// Block until Wi-Fi and the broker are up, retrying on a fixed delay.
async fn reconnect<I2C>(modem: &mut Modem, display: &mut OledRenderer<I2C>, dashboard: &Dashboard)
where
    I2C: embedded_hal::i2c::I2c,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        if dashboard.power_state() == PowerState::Awake {
            display.draw_connecting(attempt, config::MQTT_HOST);
        }

        match modem.connect(dashboard.subscriptions()).await {
            Ok(()) => {
                info!("Broker connected after {} attempt(s)", attempt);
                return;
            }
            Err(e) => {
                warn!(
                    "Connect failed: {:?}, try again in {} ms",
                    e,
                    config::RECONNECT_DELAY_MS
                );
                Timer::after(Duration::from_millis(config::RECONNECT_DELAY_MS)).await;
            }
        }
    }
}
