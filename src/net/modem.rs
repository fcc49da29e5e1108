//! ESP-AT modem driver over UARTE.
//!
//! The RX half runs in its own task and pushes [`ModemEvent`]s into a
//! channel. [`Modem`] owns the TX half and the channel receiver; it is
//! only ever used from the control loop, so command/response pairing is
//! strictly sequential.

use defmt::{debug, info, warn};
use embassy_nrf::peripherals::{TIMER0, UARTE0};
use embassy_nrf::uarte::{UarteRxWithIdle, UarteTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_time::{with_timeout, Duration};
use heapless::Deque;
use homepanel::config;
use homepanel::error::{Error, ModemError};
use homepanel::net::at::{self, Command, LineBuffer};
use homepanel::net::{retain_messages, ModemEvent, Publish};

/// Depth of the RX → control loop channel.
pub const EVENT_QUEUE: usize = 8;

/// Longest modem line we keep (an inbound message plus framing).
const MAX_LINE: usize = 160;

/// Inbound events held back while waiting for a command reply.
const STASH_DEPTH: usize = 8;

pub type EventSender = Sender<'static, CriticalSectionRawMutex, ModemEvent, EVENT_QUEUE>;
pub type EventReceiver = Receiver<'static, CriticalSectionRawMutex, ModemEvent, EVENT_QUEUE>;

/// Read UART bytes forever, forwarding every recognised line.
pub async fn rx_loop(mut rx: UarteRxWithIdle<'static, UARTE0, TIMER0>, tx: EventSender) -> ! {
    let mut lines: LineBuffer<MAX_LINE> = LineBuffer::new();
    let mut chunk = [0u8; 64];

    loop {
        let n = match rx.read_until_idle(&mut chunk).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Modem: UART read error {:?}", e);
                continue;
            }
        };

        for &byte in &chunk[..n] {
            let Some(line) = lines.push(byte) else {
                continue;
            };
            match at::parse_line(line).and_then(ModemEvent::from_at) {
                Some(event) => tx.send(event).await,
                None => debug!("Modem: ignored line ({} bytes)", line.len()),
            }
        }
    }
}

pub struct Modem {
    tx: UarteTx<'static, UARTE0>,
    events: EventReceiver,
    stash: Deque<ModemEvent, STASH_DEPTH>,
}

impl Modem {
    pub fn new(tx: UarteTx<'static, UARTE0>, events: EventReceiver) -> Self {
        Self {
            tx,
            events,
            stash: Deque::new(),
        }
    }

    /// Next unsolicited event, without blocking.
    pub fn next_event(&mut self) -> Option<ModemEvent> {
        self.stash
            .pop_front()
            .or_else(|| self.events.try_receive().ok())
    }

    /// Full bring-up: Wi-Fi join, broker connect, subscriptions.
    ///
    /// Any failure aborts the sequence; the caller retries after a delay.
    pub async fn connect<'a>(&mut self, topics: impl Iterator<Item = &'a str>) -> Result<(), Error> {
        self.stash.clear();
        self.command(at::cmd_probe()).await?;
        self.command(at::cmd_echo_off()).await?;
        self.command(at::cmd_station_mode()).await?;

        info!("Modem: joining Wi-Fi {}", config::WIFI_SSID);
        self.command_with_timeout(
            at::cmd_join_wifi(config::WIFI_SSID, config::WIFI_PASSWORD),
            config::WIFI_JOIN_TIMEOUT_MS,
        )
        .await
        .map_err(|e| match e {
            Error::Modem(_) => Error::WifiJoinFailed,
            other => other,
        })?;

        // Harmless ERROR if there was no previous session.
        let _ = self.command(at::cmd_mqtt_clean()).await;

        self.command(at::cmd_mqtt_user_config(
            config::MQTT_CLIENT_ID,
            config::MQTT_USER,
            config::MQTT_PASSWORD,
        ))
        .await?;

        let port = config::MQTT_PORT.parse::<u16>().unwrap_or(1883);
        info!("Modem: connecting to {}:{}", config::MQTT_HOST, port);
        self.command(at::cmd_mqtt_connect(config::MQTT_HOST, port))
            .await
            .map_err(|e| match e {
                Error::Modem(_) => Error::BrokerUnavailable,
                other => other,
            })?;

        for topic in topics {
            info!("Modem: subscribing {}", topic);
            self.command(at::cmd_mqtt_subscribe(topic)).await?;
        }

        // Link transitions from the bring-up itself are stale now; only
        // messages that arrived meanwhile are still worth delivering.
        while let Ok(event) = self.events.try_receive() {
            if let Err(dropped) = self.stash.push_back(event) {
                warn!("Modem: stash full, dropping {:?}", dropped);
            }
        }
        retain_messages(&mut self.stash);
        Ok(())
    }

    pub async fn publish(&mut self, item: &Publish) -> Result<(), Error> {
        self.command(at::cmd_mqtt_publish(&item.topic, &item.payload))
            .await
    }

    async fn command(&mut self, cmd: Result<Command, Error>) -> Result<(), Error> {
        self.command_with_timeout(cmd, config::MODEM_COMMAND_TIMEOUT_MS)
            .await
    }

    async fn command_with_timeout(
        &mut self,
        cmd: Result<Command, Error>,
        timeout_ms: u64,
    ) -> Result<(), Error> {
        let cmd = cmd?;
        self.tx
            .write(cmd.as_bytes())
            .await
            .map_err(|_| Error::Modem(ModemError::Malformed))?;

        match with_timeout(Duration::from_millis(timeout_ms), self.wait_reply()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Wait for `OK`/`ERROR`, keeping any unsolicited event for later.
    async fn wait_reply(&mut self) -> Result<(), Error> {
        loop {
            match self.events.receive().await {
                ModemEvent::Ok => return Ok(()),
                ModemEvent::Error => return Err(ModemError::CommandRejected.into()),
                ModemEvent::Busy => return Err(ModemError::Busy.into()),
                other => {
                    if let Err(dropped) = self.stash.push_back(other) {
                        warn!("Modem: stash full, dropping {:?}", dropped);
                    }
                }
            }
        }
    }
}
