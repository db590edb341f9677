//! Unicast tunnelling client.
//!
//! Same thread/channel substrate as [`crate::routing`] (one owning thread,
//! one socket-reader thread, a cloneable [`Handle`]) plus what a
//! connection-oriented session needs on top: the
//! `protocol::tunnel::TunnelClient` state machine for CONNECT/
//! CONNECTIONSTATE/DISCONNECT/TUNNELING framing, a single-in-flight send
//! queue, and a disconnect-reason-driven reconnect policy.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::addressing::GroupAddress;
use crate::cache::{now_unix_seconds, Cache, CacheEntry};
use crate::config::Configuration;
use crate::dpt::{self, DptValue};
use crate::error::{KnxError, Result};
use crate::protocol::cemi::{encode_group_service, Apci, CEMIFrame, ControlField1, ControlField2};
use crate::protocol::constants::{CEMIMessageCode, ServiceType};
use crate::protocol::frame::KnxnetIpFrame;
use crate::protocol::tunnel::{ConnectionState, TunnelClient as TunnelStateMachine};
use crate::telegram::{Telegram, TelegramKind};

/// Immediate reconnect after a requested disconnect, a tunnelling-ack error,
/// or a connection-state error (spec §4.7).
const BACKOFF_IMMEDIATE: Duration = Duration::ZERO;
/// Backoff after a failed CONNECT_RESPONSE (spec §4.7).
const BACKOFF_CONNECT_FAILED: Duration = Duration::from_secs(10);

const RECV_BUFFER_SIZE: usize = 640;

/// `CONNECTIONSTATE_REQUEST` keep-alive interval while connected.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

enum Command {
    Write { destination: GroupAddress, value: DptValue, reply: mpsc::Sender<Result<()>> },
    TriggerRead { destination: GroupAddress, reply: mpsc::Sender<Result<()>> },
    SendFrame { cemi: Vec<u8>, reply: mpsc::Sender<Result<()>> },
    Subscribe { sender: mpsc::Sender<Telegram>, reply: mpsc::Sender<u64> },
    Unsubscribe { id: u64 },
    AddGroupAddress { address: GroupAddress, dpt: String, reply: mpsc::Sender<Result<()>> },
    RemoveGroupAddress { address: GroupAddress },
    KnownGroupAddresses { reply: mpsc::Sender<HashMap<GroupAddress, String>> },
    Shutdown,
}

enum ClientEvent {
    Inbound(Vec<u8>),
    Reconnect,
    Heartbeat,
    Command(Command),
}

/// Why the tunnelling session dropped (spec §4.7's reconnect policy input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisconnectReason {
    Requested,
    ConnectResponseError,
    TunnelingAckError,
    ConnectionStateError,
}

impl DisconnectReason {
    const fn backoff(self) -> Duration {
        match self {
            Self::Requested | Self::TunnelingAckError | Self::ConnectionStateError => BACKOFF_IMMEDIATE,
            Self::ConnectResponseError => BACKOFF_CONNECT_FAILED,
        }
    }
}

/// Cloneable handle to a running tunnel client.
#[derive(Clone)]
pub struct Handle {
    to_client: mpsc::Sender<ClientEvent>,
    cache: Cache,
}

impl Handle {
    fn send(&self, command: Command) {
        self.to_client.send(ClientEvent::Command(command)).ok();
    }

    pub fn write_group_address(&self, destination: GroupAddress, value: DptValue) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Write { destination, value, reply });
        rx.recv().map_err(|_| KnxError::InvalidState)?
    }

    /// Send a `group_read` to `destination` and await the first matching
    /// `group_response`, up to `timeout`.
    pub fn read_group_address(&self, destination: GroupAddress, timeout: Duration) -> Result<Telegram> {
        let (tx, rx) = mpsc::channel();
        let sub_id = self.subscribe(tx);

        let (reply, ack_rx) = mpsc::channel();
        self.send(Command::TriggerRead { destination, reply });
        let sent = ack_rx.recv().map_err(|_| KnxError::InvalidState)?;

        let result = sent.and_then(|()| {
            let deadline = Instant::now() + timeout;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break Err(KnxError::Timeout);
                }
                match rx.recv_timeout(remaining) {
                    Ok(telegram) if telegram.destination == destination => break Ok(telegram),
                    Ok(_) => continue,
                    Err(_) => break Err(KnxError::Timeout),
                }
            }
        });

        self.unsubscribe(sub_id);
        result
    }

    /// Queue a pre-built cEMI frame for tunnelling; drained in send order,
    /// one frame in flight at a time (spec §4.7).
    pub fn send_telegram(&self, cemi: &[u8]) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::SendFrame { cemi: cemi.to_vec(), reply });
        rx.recv().map_err(|_| KnxError::InvalidState)?
    }

    pub fn subscribe(&self, sender: mpsc::Sender<Telegram>) -> u64 {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Subscribe { sender, reply });
        rx.recv().unwrap_or(0)
    }

    pub fn unsubscribe(&self, id: u64) {
        self.send(Command::Unsubscribe { id });
    }

    pub fn add_group_address(&self, address: GroupAddress, dpt: impl Into<String>) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::AddGroupAddress { address, dpt: dpt.into(), reply });
        rx.recv().map_err(|_| KnxError::InvalidState)?
    }

    pub fn remove_group_address(&self, address: GroupAddress) {
        self.send(Command::RemoveGroupAddress { address });
    }

    pub fn get_group_addresses(&self) -> HashMap<GroupAddress, String> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::KnownGroupAddresses { reply });
        rx.recv().unwrap_or_default()
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn get(&self, address: GroupAddress) -> Option<CacheEntry> {
        self.cache.get(address)
    }

    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }
}

struct TunnelingClient {
    socket: UdpSocket,
    gateway: SocketAddr,
    state_machine: TunnelStateMachine,
    config: Configuration,
    cache: Cache,
    events: mpsc::Receiver<ClientEvent>,
    to_self: mpsc::Sender<ClientEvent>,
    subscribers: Vec<(u64, mpsc::Sender<Telegram>)>,
    next_subscriber_id: u64,
    send_queue: VecDeque<Vec<u8>>,
    awaiting_ack: bool,
}

impl TunnelingClient {
    fn start(config: Configuration, gateway: SocketAddr) -> io::Result<Handle> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(gateway)?;
        let listen_socket = socket.try_clone()?;

        let (tx, events) = mpsc::channel();
        let cache = Cache::from_group_addresses(config.known_group_addresses());

        let gateway_octets = match gateway.ip() {
            std::net::IpAddr::V4(v4) => v4.octets(),
            std::net::IpAddr::V6(_) => [0, 0, 0, 0],
        };

        let client = Self {
            socket,
            gateway,
            state_machine: TunnelStateMachine::new(gateway_octets, gateway.port()),
            config,
            cache: cache.clone(),
            events,
            to_self: tx.clone(),
            subscribers: Vec::new(),
            next_subscriber_id: 0,
            send_queue: VecDeque::new(),
            awaiting_ack: false,
        };

        thread::spawn(move || client.run());
        Self::listen(listen_socket, tx.clone());
        Self::heartbeat_ticker(tx.clone());
        tx.send(ClientEvent::Reconnect).ok();

        Ok(Handle { to_client: tx, cache })
    }

    fn heartbeat_ticker(to_client: mpsc::Sender<ClientEvent>) {
        thread::spawn(move || loop {
            thread::sleep(HEARTBEAT_INTERVAL);
            if to_client.send(ClientEvent::Heartbeat).is_err() {
                break;
            }
        });
    }

    fn listen(socket: UdpSocket, to_client: mpsc::Sender<ClientEvent>) {
        thread::spawn(move || {
            let mut buf = [0u8; RECV_BUFFER_SIZE];
            loop {
                match socket.recv(&mut buf) {
                    Ok(len) => {
                        if to_client.send(ClientEvent::Inbound(buf[..len].to_vec())).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
    }

    fn run(mut self) {
        while let Ok(event) = self.events.recv() {
            match event {
                ClientEvent::Inbound(bytes) => self.handle_inbound(&bytes),
                ClientEvent::Reconnect => self.connect(),
                ClientEvent::Heartbeat => self.send_heartbeat(),
                ClientEvent::Command(Command::Shutdown) => break,
                ClientEvent::Command(command) => self.handle_command(command),
            }
        }
    }

    fn schedule_reconnect(&self, backoff: Duration) {
        let to_self = self.to_self.clone();
        thread::spawn(move || {
            if !backoff.is_zero() {
                thread::sleep(backoff);
            }
            to_self.send(ClientEvent::Reconnect).ok();
        });
    }

    fn connect(&mut self) {
        let Ok(request) = self.state_machine.build_connect_request() else { return };
        if self.socket.send(request).is_err() {
            self.schedule_reconnect(BACKOFF_CONNECT_FAILED);
        }
    }

    /// Send a `CONNECTIONSTATE_REQUEST` keep-alive while connected.
    fn send_heartbeat(&mut self) {
        if self.state_machine.state() != ConnectionState::Connected {
            return;
        }
        if let Ok(request) = self.state_machine.build_connectionstate_request() {
            self.socket.send(request).ok();
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Write { destination, value, reply } => {
                reply.send(self.write(destination, &value)).ok();
            }
            Command::TriggerRead { destination, reply } => {
                reply.send(self.trigger_read(destination)).ok();
            }
            Command::SendFrame { cemi, reply } => {
                self.send_queue.push_back(cemi);
                self.drain_queue();
                reply.send(Ok(())).ok();
            }
            Command::Subscribe { sender, reply } => {
                let id = self.next_subscriber_id;
                self.next_subscriber_id += 1;
                self.subscribers.push((id, sender));
                reply.send(id).ok();
            }
            Command::Unsubscribe { id } => {
                self.subscribers.retain(|(sub_id, _)| *sub_id != id);
            }
            Command::AddGroupAddress { address, dpt, reply } => {
                reply.send(self.cache.add_group_address(address, dpt)).ok();
            }
            Command::RemoveGroupAddress { address } => {
                self.cache.remove_group_address(address);
            }
            Command::KnownGroupAddresses { reply } => {
                reply.send(self.cache.known_group_addresses()).ok();
            }
            Command::Shutdown => unreachable!("handled in run()"),
        }
    }

    fn dpt_for(&self, ga: GroupAddress) -> Result<Option<String>> {
        match self.cache.get(ga) {
            Some(entry) => Ok(Some(entry.dpt)),
            None if self.config.allow_unknown_gpa_enabled() => Ok(None),
            None => Err(KnxError::unknown_group_address()),
        }
    }

    fn write(&mut self, destination: GroupAddress, value: &DptValue) -> Result<()> {
        let dpt = self.dpt_for(destination)?.ok_or_else(KnxError::unknown_group_address)?;
        let encoded = dpt::encode(value, &dpt)?;
        let cemi = self.build_group_service(destination, Apci::GroupValueWrite, &encoded);
        self.send_queue.push_back(cemi);
        self.drain_queue();
        self.cache.record_write_through(destination, value.clone(), now_unix_seconds());
        Ok(())
    }

    fn trigger_read(&mut self, destination: GroupAddress) -> Result<()> {
        let cemi = self.build_group_service(destination, Apci::GroupValueRead, &[]);
        self.send_queue.push_back(cemi);
        self.drain_queue();
        Ok(())
    }

    fn build_group_service(&self, destination: GroupAddress, apci: Apci, data: &[u8]) -> Vec<u8> {
        encode_group_service(
            CEMIMessageCode::LDataReq,
            ControlField1::default(),
            ControlField2::new(true, 6, 0),
            self.config.source_address(),
            destination.raw(),
            apci,
            data,
        )
    }

    /// Emit the queue head over the wire if the session is connected and
    /// nothing else is currently in flight (spec §4.7: only one frame in
    /// flight at any time, and the queue only drains while connected).
    fn drain_queue(&mut self) {
        if self.state_machine.state() != ConnectionState::Connected {
            return;
        }
        if self.awaiting_ack {
            return;
        }
        let Some(cemi) = self.send_queue.front() else { return };
        let Ok(request) = self.state_machine.build_tunneling_request(cemi) else { return };
        if self.socket.send(request).is_ok() {
            self.awaiting_ack = true;
        }
    }

    fn handle_inbound(&mut self, bytes: &[u8]) {
        let handled = self.try_handle_inbound(bytes).unwrap_or(false);
        if let Some(callback) = self.config.callback() {
            callback(bytes, handled);
        }
    }

    fn try_handle_inbound(&mut self, bytes: &[u8]) -> Result<bool> {
        let frame = KnxnetIpFrame::parse(bytes)?;
        match frame.service_type() {
            ServiceType::ConnectResponse => self.handle_connect_response(frame.body()),
            ServiceType::ConnectionstateResponse => self.handle_connectionstate_response(frame.body()),
            ServiceType::TunnellingRequest => self.handle_tunneling_request(frame.body()),
            ServiceType::TunnellingAck => self.handle_tunneling_ack(frame.body()),
            ServiceType::DisconnectRequest => {
                let channel_id = self.state_machine.channel_id();
                if let Ok(response) = self.state_machine.build_disconnect_response(channel_id) {
                    self.socket.send(response).ok();
                }
                self.state_machine.reset();
                self.awaiting_ack = false;
                self.schedule_reconnect(DisconnectReason::Requested.backoff());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn handle_connect_response(&mut self, body: &[u8]) -> Result<bool> {
        if self.state_machine.handle_connect_response(body).is_err() {
            self.schedule_reconnect(DisconnectReason::ConnectResponseError.backoff());
            return Ok(true);
        }
        self.drain_queue();
        Ok(true)
    }

    fn handle_connectionstate_response(&mut self, body: &[u8]) -> Result<bool> {
        if self.state_machine.handle_connectionstate_response(body).is_err() {
            self.awaiting_ack = false;
            self.schedule_reconnect(DisconnectReason::ConnectionStateError.backoff());
        }
        Ok(true)
    }

    fn handle_tunneling_ack(&mut self, body: &[u8]) -> Result<bool> {
        if self.state_machine.handle_tunneling_ack(body).is_err() {
            self.awaiting_ack = false;
            self.schedule_reconnect(DisconnectReason::TunnelingAckError.backoff());
            return Ok(true);
        }
        self.send_queue.pop_front();
        self.awaiting_ack = false;
        self.drain_queue();
        Ok(true)
    }

    fn handle_tunneling_request(&mut self, body: &[u8]) -> Result<bool> {
        let sequence = crate::protocol::services::TunnelingRequest::parse(body)?.connection_header.sequence_counter;
        let cemi_bytes = self.state_machine.handle_tunneling_request(body)?;

        if let Ok(ack) = self.state_machine.build_tunneling_ack(sequence, 0) {
            self.socket.send(ack).ok();
        }

        let cemi_frame = CEMIFrame::parse(cemi_bytes)?;
        if !cemi_frame.is_ldata() {
            return Ok(false);
        }
        let ldata = cemi_frame.as_ldata()?;
        let Some(destination) = ldata.destination_group() else {
            return Ok(false);
        };

        let kind = if ldata.is_group_write() {
            TelegramKind::GroupWrite
        } else if ldata.is_group_response() {
            TelegramKind::GroupResponse
        } else if ldata.is_group_read() {
            TelegramKind::GroupRead
        } else {
            return Ok(false);
        };

        let raw_value = ldata.value_bytes();
        let value = if kind == TelegramKind::GroupRead {
            None
        } else {
            match self.dpt_for(destination) {
                Ok(Some(dpt)) => dpt::decode(&raw_value, &dpt).ok(),
                Ok(None) => None,
                Err(_) => return Ok(false),
            }
        };

        if let Some(value) = &value {
            self.cache.record_receive(destination, value.clone(), now_unix_seconds());
        }

        let telegram = Telegram::new(kind, ldata.source, destination, value);
        self.dispatch(telegram);
        Ok(true)
    }

    fn dispatch(&self, telegram: Telegram) {
        for (_, sender) in &self.subscribers {
            let sender = sender.clone();
            let telegram = telegram.clone();
            thread::spawn(move || {
                sender.send(telegram).ok();
            });
        }
    }
}

/// Start a tunnel client against `gateway` and return a [`Handle`] to it.
///
/// # Errors
///
/// Returns `Err` if the local socket can't be bound or connected.
pub fn start(config: Configuration, gateway: SocketAddr) -> io::Result<Handle> {
    TunnelingClient::start(config, gateway)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::IndividualAddress;

    fn source() -> IndividualAddress {
        IndividualAddress::new(1, 1, 1).unwrap()
    }

    fn ga(m: u8, i: u8, s: u8) -> GroupAddress {
        GroupAddress::new(m, i, s).unwrap()
    }

    #[test]
    fn disconnect_reason_backoff_policy() {
        assert_eq!(DisconnectReason::Requested.backoff(), BACKOFF_IMMEDIATE);
        assert_eq!(DisconnectReason::TunnelingAckError.backoff(), BACKOFF_IMMEDIATE);
        assert_eq!(DisconnectReason::ConnectionStateError.backoff(), BACKOFF_IMMEDIATE);
        assert_eq!(DisconnectReason::ConnectResponseError.backoff(), BACKOFF_CONNECT_FAILED);
    }

    #[test]
    fn group_service_round_trips_through_cemi() {
        let cemi = encode_group_service(
            CEMIMessageCode::LDataReq,
            ControlField1::default(),
            ControlField2::new(true, 6, 0),
            source(),
            ga(1, 2, 3).raw(),
            Apci::GroupValueWrite,
            &dpt::encode(&DptValue::Bool(true), "1.001").unwrap(),
        );
        let frame = CEMIFrame::parse(&cemi).unwrap();
        let ldata = frame.as_ldata().unwrap();
        assert_eq!(ldata.destination_group(), Some(ga(1, 2, 3)));
        let value = dpt::decode(&ldata.value_bytes(), "1.001").unwrap();
        assert_eq!(value, DptValue::Bool(true));
    }
}
