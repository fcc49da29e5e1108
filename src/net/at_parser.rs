//! ESP-AT MQTT command builders and response-line parser.
//!
//! The Wi-Fi co-processor runs Espressif's AT firmware. We only use the
//! handful of commands needed to join Wi-Fi, connect to the broker,
//! subscribe and publish, and the unsolicited lines it sends back.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::error::Error;

/// Longest command we ever send.
pub const MAX_COMMAND_LEN: usize = 256;

/// MQTT link id; the firmware only supports 0.
const LINK_ID: u8 = 0;

pub type Command = String<MAX_COMMAND_LEN>;

/// A parsed line from the modem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtEvent<'a> {
    Ok,
    Error,
    /// `busy p...` - the previous command was dropped.
    Busy,
    WifiConnected,
    WifiGotIp,
    WifiDisconnected,
    MqttConnected,
    MqttDisconnected,
    /// `ready` - the modem rebooted and lost every session.
    Ready,
    /// `+MQTTSUBRECV:<link>,"<topic>",<len>,<data>`
    Message { topic: &'a str, payload: &'a [u8] },
}

/// Parse one line (without the trailing CR/LF). Unknown lines yield `None`.
pub fn parse_line(line: &[u8]) -> Option<AtEvent<'_>> {
    match line {
        b"OK" => return Some(AtEvent::Ok),
        b"ERROR" | b"FAIL" => return Some(AtEvent::Error),
        b"WIFI CONNECTED" => return Some(AtEvent::WifiConnected),
        b"WIFI GOT IP" => return Some(AtEvent::WifiGotIp),
        b"WIFI DISCONNECT" => return Some(AtEvent::WifiDisconnected),
        b"ready" => return Some(AtEvent::Ready),
        _ => {}
    }

    if line.starts_with(b"busy ") {
        return Some(AtEvent::Busy);
    }
    if line.starts_with(b"+MQTTCONNECTED:") {
        return Some(AtEvent::MqttConnected);
    }
    if line.starts_with(b"+MQTTDISCONNECTED:") {
        return Some(AtEvent::MqttDisconnected);
    }
    if let Some(rest) = line.strip_prefix(b"+MQTTSUBRECV:") {
        return parse_subrecv(rest);
    }
    None
}

fn parse_subrecv(rest: &[u8]) -> Option<AtEvent<'_>> {
    // <link>,"<topic>",<len>,<data>
    let comma = rest.iter().position(|&b| b == b',')?;
    let rest = rest[comma + 1..].strip_prefix(b"\"")?;
    let quote = rest.iter().position(|&b| b == b'"')?;
    let topic = core::str::from_utf8(&rest[..quote]).ok()?;

    let rest = rest[quote + 1..].strip_prefix(b",")?;
    let comma = rest.iter().position(|&b| b == b',')?;
    let len: usize = core::str::from_utf8(&rest[..comma]).ok()?.parse().ok()?;

    let data = &rest[comma + 1..];
    let payload = data.get(..len).unwrap_or(data);
    Some(AtEvent::Message { topic, payload })
}

/// Append `value` as a quoted AT string, escaping `"`, `,` and `\`.
fn push_quoted(cmd: &mut Command, value: &str) -> Result<(), Error> {
    cmd.push('"').map_err(|_| Error::BufferOverflow)?;
    for c in value.chars() {
        if matches!(c, '"' | ',' | '\\') {
            cmd.push('\\').map_err(|_| Error::BufferOverflow)?;
        }
        cmd.push(c).map_err(|_| Error::BufferOverflow)?;
    }
    cmd.push('"').map_err(|_| Error::BufferOverflow)
}

fn push_raw(cmd: &mut Command, text: &str) -> Result<(), Error> {
    cmd.push_str(text).map_err(|_| Error::BufferOverflow)
}

fn finish(mut cmd: Command) -> Result<Command, Error> {
    push_raw(&mut cmd, "\r\n")?;
    Ok(cmd)
}

fn simple(text: &str) -> Result<Command, Error> {
    let mut cmd = Command::new();
    push_raw(&mut cmd, text)?;
    finish(cmd)
}

/// `AT` liveness probe.
pub fn cmd_probe() -> Result<Command, Error> {
    simple("AT")
}

/// `ATE0` - stop echoing commands back.
pub fn cmd_echo_off() -> Result<Command, Error> {
    simple("ATE0")
}

/// `AT+CWMODE=1` - station mode.
pub fn cmd_station_mode() -> Result<Command, Error> {
    simple("AT+CWMODE=1")
}

pub fn cmd_join_wifi(ssid: &str, password: &str) -> Result<Command, Error> {
    let mut cmd = Command::new();
    push_raw(&mut cmd, "AT+CWJAP=")?;
    push_quoted(&mut cmd, ssid)?;
    push_raw(&mut cmd, ",")?;
    push_quoted(&mut cmd, password)?;
    finish(cmd)
}

/// MQTT user config over plain TCP. Empty `user` connects anonymously.
pub fn cmd_mqtt_user_config(client_id: &str, user: &str, password: &str) -> Result<Command, Error> {
    let mut cmd = Command::new();
    write!(cmd, "AT+MQTTUSERCFG={},1,", LINK_ID).map_err(|_| Error::BufferOverflow)?;
    push_quoted(&mut cmd, client_id)?;
    push_raw(&mut cmd, ",")?;
    push_quoted(&mut cmd, user)?;
    push_raw(&mut cmd, ",")?;
    push_quoted(&mut cmd, if user.is_empty() { "" } else { password })?;
    push_raw(&mut cmd, ",0,0,\"\"")?;
    finish(cmd)
}

/// `AT+MQTTCLEAN=0` - drop any half-open broker session before reconnecting.
pub fn cmd_mqtt_clean() -> Result<Command, Error> {
    let mut cmd = Command::new();
    write!(cmd, "AT+MQTTCLEAN={}", LINK_ID).map_err(|_| Error::BufferOverflow)?;
    finish(cmd)
}

pub fn cmd_mqtt_connect(host: &str, port: u16) -> Result<Command, Error> {
    let mut cmd = Command::new();
    write!(cmd, "AT+MQTTCONN={},", LINK_ID).map_err(|_| Error::BufferOverflow)?;
    push_quoted(&mut cmd, host)?;
    // Trailing 1 = let the modem auto-reconnect.
    write!(cmd, ",{},1", port).map_err(|_| Error::BufferOverflow)?;
    finish(cmd)
}

pub fn cmd_mqtt_subscribe(topic: &str) -> Result<Command, Error> {
    let mut cmd = Command::new();
    write!(cmd, "AT+MQTTSUB={},", LINK_ID).map_err(|_| Error::BufferOverflow)?;
    push_quoted(&mut cmd, topic)?;
    push_raw(&mut cmd, ",0")?;
    finish(cmd)
}

pub fn cmd_mqtt_publish(topic: &str, payload: &str) -> Result<Command, Error> {
    let mut cmd = Command::new();
    write!(cmd, "AT+MQTTPUB={},", LINK_ID).map_err(|_| Error::BufferOverflow)?;
    push_quoted(&mut cmd, topic)?;
    push_raw(&mut cmd, ",")?;
    push_quoted(&mut cmd, payload)?;
    // QoS 0, no retain.
    push_raw(&mut cmd, ",0,0")?;
    finish(cmd)
}

/// Splits the UART byte stream into lines.
pub struct LineBuffer<const N: usize> {
    buf: Vec<u8, N>,
    overflowed: bool,
    complete: bool,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflowed: false,
            complete: false,
        }
    }

    /// Feed one byte. Returns the finished line (CR stripped) on `\n`.
    ///
    /// Lines longer than `N` are dropped whole.
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        if self.complete {
            self.buf.clear();
            self.complete = false;
        }

        if byte != b'\n' {
            if self.buf.push(byte).is_err() {
                self.overflowed = true;
            }
            return None;
        }

        self.complete = true;
        if core::mem::replace(&mut self.overflowed, false) {
            return None;
        }

        let line: &[u8] = &self.buf;
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed<const N: usize>(lines: &mut LineBuffer<N>, bytes: &[u8]) -> Option<std::vec::Vec<u8>> {
        let mut out = None;
        for &b in bytes {
            if let Some(line) = lines.push(b) {
                out = Some(line.to_vec());
            }
        }
        out
    }

    #[test]
    fn parses_status_lines() {
        assert_eq!(parse_line(b"OK"), Some(AtEvent::Ok));
        assert_eq!(parse_line(b"ERROR"), Some(AtEvent::Error));
        assert_eq!(parse_line(b"busy p..."), Some(AtEvent::Busy));
        assert_eq!(parse_line(b"WIFI GOT IP"), Some(AtEvent::WifiGotIp));
        assert_eq!(parse_line(b"WIFI DISCONNECT"), Some(AtEvent::WifiDisconnected));
        assert_eq!(
            parse_line(b"+MQTTCONNECTED:0,1,\"10.0.0.2\",\"1883\",\"\",1"),
            Some(AtEvent::MqttConnected)
        );
        assert_eq!(parse_line(b"+MQTTDISCONNECTED:0"), Some(AtEvent::MqttDisconnected));
        assert_eq!(parse_line(b"ready"), Some(AtEvent::Ready));
    }

    #[test]
    fn parses_inbound_message() {
        let line = b"+MQTTSUBRECV:0,\"home/m5stack/core2/fridge_door/status\",4,OPEN";
        match parse_line(line) {
            Some(AtEvent::Message { topic, payload }) => {
                assert_eq!(topic, "home/m5stack/core2/fridge_door/status");
                assert_eq!(payload, b"OPEN");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn message_payload_is_cut_to_declared_length() {
        match parse_line(b"+MQTTSUBRECV:0,\"t\",2,ONXX") {
            Some(AtEvent::Message { payload, .. }) => assert_eq!(payload, b"ON"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn malformed_or_unknown_lines_are_ignored() {
        assert_eq!(parse_line(b"+MQTTSUBRECV:0,t,4,OPEN"), None);
        assert_eq!(parse_line(b"+MQTTSUBRECV:0,\"t\",x,OPEN"), None);
        assert_eq!(parse_line(b"ready to go"), None);
        assert_eq!(parse_line(b""), None);
    }

    #[test]
    fn builds_publish_command() {
        let cmd = cmd_mqtt_publish("home/lamp/control", "ON").unwrap();
        assert_eq!(cmd.as_str(), "AT+MQTTPUB=0,\"home/lamp/control\",\"ON\",0,0\r\n");
    }

    #[test]
    fn escapes_special_characters() {
        let cmd = cmd_join_wifi("my,net", "pa\"ss").unwrap();
        assert_eq!(cmd.as_str(), "AT+CWJAP=\"my\\,net\",\"pa\\\"ss\"\r\n");
    }

    #[test]
    fn user_config_anonymous_drops_password() {
        let cmd = cmd_mqtt_user_config("homepanel", "", "secret").unwrap();
        assert_eq!(
            cmd.as_str(),
            "AT+MQTTUSERCFG=0,1,\"homepanel\",\"\",\"\",0,0,\"\"\r\n"
        );
    }

    #[test]
    fn builds_connect_and_subscribe() {
        assert_eq!(
            cmd_mqtt_connect("10.0.0.2", 1883).unwrap().as_str(),
            "AT+MQTTCONN=0,\"10.0.0.2\",1883,1\r\n"
        );
        assert_eq!(
            cmd_mqtt_subscribe("a/b").unwrap().as_str(),
            "AT+MQTTSUB=0,\"a/b\",0\r\n"
        );
    }

    #[test]
    fn oversized_command_reports_overflow() {
        let long = [b'x'; 300];
        let topic = core::str::from_utf8(&long).unwrap();
        assert_eq!(cmd_mqtt_subscribe(topic), Err(Error::BufferOverflow));
    }

    #[test]
    fn line_buffer_splits_and_strips_cr() {
        let mut lines: LineBuffer<64> = LineBuffer::new();
        assert_eq!(feed(&mut lines, b"OK\r\n"), Some(b"OK".to_vec()));
        assert_eq!(feed(&mut lines, b"\r\n"), None);
        assert_eq!(feed(&mut lines, b"WIFI GOT IP\r\n"), Some(b"WIFI GOT IP".to_vec()));
    }

    #[test]
    fn line_buffer_drops_overlong_line() {
        let mut lines: LineBuffer<4> = LineBuffer::new();
        assert_eq!(feed(&mut lines, b"TOO LONG\r\n"), None);
        assert_eq!(feed(&mut lines, b"OK\n"), Some(b"OK".to_vec()));
    }
}
