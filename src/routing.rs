//! Multicast routing client.
//!
//! [`RoutingClient::start`] spawns the owning thread and returns a cloneable
//! [`Handle`], following the split used by `Rimpampa-pcp::client::Client`/
//! `Handle`: one thread owns the socket and all mutable state, a second
//! thread only forwards inbound datagrams into the client's event channel,
//! and every public operation goes through the channel as a `Command` (with
//! an embedded one-shot reply sender) rather than behind a mutex.

use std::collections::HashMap;
use std::io;
use std::net::{Ipv4Addr as StdIpv4Addr, SocketAddrV4, UdpSocket};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::addressing::{GroupAddress, IndividualAddress};
use crate::cache::{now_unix_seconds, Cache, CacheEntry};
use crate::config::{Configuration, DEFAULT_PORT};
use crate::dpt::{self, DptValue};
use crate::error::{KnxError, Result};
use crate::protocol::cemi::{encode_group_service, Apci, CEMIFrame, ControlField1, ControlField2};
use crate::protocol::constants::CEMIMessageCode;
use crate::protocol::frame::{encode_frame, FrameEncoder, KnxnetIpFrame, RoutingIndicationBody};
use crate::protocol::constants::ServiceType;
use crate::telegram::{Telegram, TelegramKind};

const RECV_BUFFER_SIZE: usize = 640;

/// Default timeout for [`Handle::read_group_address`].
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(3);

enum Command {
    Write {
        destination: GroupAddress,
        value: DptValue,
        reply: mpsc::Sender<Result<()>>,
    },
    TriggerRead {
        destination: GroupAddress,
        reply: mpsc::Sender<Result<()>>,
    },
    SendFrame {
        bytes: Vec<u8>,
        reply: mpsc::Sender<Result<()>>,
    },
    Subscribe {
        sender: mpsc::Sender<Telegram>,
        reply: mpsc::Sender<u64>,
    },
    Unsubscribe {
        id: u64,
    },
    AddGroupAddress {
        address: GroupAddress,
        dpt: String,
        reply: mpsc::Sender<Result<()>>,
    },
    RemoveGroupAddress {
        address: GroupAddress,
    },
    KnownGroupAddresses {
        reply: mpsc::Sender<HashMap<GroupAddress, String>>,
    },
    Shutdown,
}

enum ClientEvent {
    Inbound(Vec<u8>),
    Command(Command),
}

/// A cloneable handle to a running [`RoutingClient`].
///
/// Dropping the last `Handle` shuts the client thread down.
#[derive(Clone)]
pub struct Handle {
    to_client: mpsc::Sender<ClientEvent>,
    cache: Cache,
}

impl Handle {
    fn send(&self, command: Command) {
        // The receiving end only disappears once the client thread has
        // exited, in which case there is nothing useful to do with the
        // send error.
        self.to_client.send(ClientEvent::Command(command)).ok();
    }

    /// Send `value` to `destination` as `A_GroupValue_Write`, encoding it per
    /// the DPT configured for that address.
    ///
    /// # Errors
    ///
    /// Returns [`KnxError::Cache`] if `destination` is unknown and
    /// `allow_unknown_gpa` was not set, [`KnxError::Dpt`] if `value` doesn't
    /// match the configured DPT, or a transport error if the send fails.
    pub fn write_group_address(&self, destination: GroupAddress, value: DptValue) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Write { destination, value, reply });
        rx.recv().map_err(|_| KnxError::InvalidState)?
    }

    /// Issue an `A_GroupValue_Read` for `destination` and wait up to
    /// `timeout` for a matching `group_response`/`group_write` telegram.
    ///
    /// Internally subscribes transiently, sends the read request, then waits
    /// on the subscription filtering by `destination`; the subscription is
    /// torn down before returning either way.
    ///
    /// # Errors
    ///
    /// Returns `Err` if sending the read request itself fails. A timeout
    /// with no response is `Ok(None)`, not an error.
    /// Send a `group_read` to `destination` and await the first matching
    /// `group_response`, up to `timeout`.
    ///
    /// # Errors
    ///
    /// Fails with [`KnxError::unknown_group_address`] if `destination` is
    /// unknown and unknown GAs aren't allowed, or [`KnxError::Timeout`] if
    /// no response arrives in time.
    pub fn read_group_address(&self, destination: GroupAddress, timeout: Duration) -> Result<Telegram> {
        let (tx, rx) = mpsc::channel();
        let sub_id = self.subscribe(tx);

        let (reply, ack_rx) = mpsc::channel();
        self.send(Command::TriggerRead { destination, reply });
        let sent = ack_rx.recv().map_err(|_| KnxError::InvalidState)?;

        let result = sent.and_then(|()| {
            let deadline = std::time::Instant::now() + timeout;
            loop {
                let remaining = deadline.saturating_duration_since(std::time::Instant::now());
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

    /// Send a fully-formed frame body through the routing socket.
    ///
    /// Accepts anything implementing [`FrameEncoder`] (a structured body, or
    /// an [`crate::protocol::frame::OpaqueBody`] wrapping pre-encoded bytes).
    ///
    /// # Errors
    ///
    /// Returns `Err` if encoding or the underlying send fails.
    pub fn send_frame(&self, body: &dyn FrameEncoder) -> Result<()> {
        let mut buf = [0u8; crate::protocol::constants::MAX_FRAME_SIZE];
        let len = encode_frame(body, &mut buf)?;
        self.send_raw(&buf[..len])
    }

    /// Send already-encoded KNXnet/IP datagram bytes as-is.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the underlying send fails.
    pub fn send_raw(&self, bytes: &[u8]) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::SendFrame { bytes: bytes.to_vec(), reply });
        rx.recv().map_err(|_| KnxError::InvalidState)?
    }

    /// Subscribe to every decoded [`Telegram`]. Returns a subscriber id for
    /// later [`Handle::unsubscribe`].
    pub fn subscribe(&self, sender: mpsc::Sender<Telegram>) -> u64 {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Subscribe { sender, reply });
        rx.recv().unwrap_or(0)
    }

    /// Remove a subscription registered via [`Handle::subscribe`].
    pub fn unsubscribe(&self, id: u64) {
        self.send(Command::Unsubscribe { id });
    }

    /// Register a group address and the DPT string it carries.
    ///
    /// # Errors
    ///
    /// Returns [`KnxError::Cache`] if already configured with a different
    /// DPT.
    pub fn add_group_address(&self, address: GroupAddress, dpt: impl Into<String>) -> Result<()> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::AddGroupAddress { address, dpt: dpt.into(), reply });
        rx.recv().map_err(|_| KnxError::InvalidState)?
    }

    /// Drop a group address from the known-GA table.
    pub fn remove_group_address(&self, address: GroupAddress) {
        self.send(Command::RemoveGroupAddress { address });
    }

    /// Snapshot the currently known group-address -> DPT table.
    pub fn get_group_addresses(&self) -> HashMap<GroupAddress, String> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::KnownGroupAddresses { reply });
        rx.recv().unwrap_or_default()
    }

    /// The shared address-value cache. Reads never go through the client
    /// thread: the cache is its own lock-protected map, safe to read
    /// concurrently with writer threads.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Look up the current cached entry for `address`.
    pub fn get(&self, address: GroupAddress) -> Option<CacheEntry> {
        self.cache.get(address)
    }

    /// Signal the client thread to stop.
    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }
}

/// The routing client's owned state, running on its own thread.
struct RoutingClient {
    socket: UdpSocket,
    multicast_addr: SocketAddrV4,
    config: Configuration,
    cache: Cache,
    events: mpsc::Receiver<ClientEvent>,
    subscribers: Vec<(u64, mpsc::Sender<Telegram>)>,
    next_subscriber_id: u64,
}

impl RoutingClient {
    /// Bind a multicast routing socket and start the client and listener
    /// threads, returning a [`Handle`] to the running client.
    fn start(config: Configuration) -> io::Result<Handle> {
        let multicast_ip: StdIpv4Addr = config.multicast_address().octets().into();
        let port = DEFAULT_PORT;
        let local_ip = config.local_address().map_or(StdIpv4Addr::UNSPECIFIED, |ip| ip.octets().into());

        let socket = UdpSocket::bind(SocketAddrV4::new(StdIpv4Addr::UNSPECIFIED, port))?;
        socket.join_multicast_v4(&multicast_ip, &local_ip)?;
        socket.set_multicast_loop_v4(false)?;
        let listen_socket = socket.try_clone()?;

        let (tx, events) = mpsc::channel();
        let cache = Cache::from_group_addresses(config.known_group_addresses());

        let client = Self {
            socket,
            multicast_addr: SocketAddrV4::new(multicast_ip, port),
            config,
            cache: cache.clone(),
            events,
            subscribers: Vec::new(),
            next_subscriber_id: 0,
        };

        thread::spawn(move || client.run());
        Self::listen(listen_socket, tx.clone());

        Ok(Handle { to_client: tx, cache })
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
                ClientEvent::Command(Command::Shutdown) => break,
                ClientEvent::Command(command) => self.handle_command(command),
            }
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
            Command::SendFrame { bytes, reply } => {
                reply.send(self.send_datagram(&bytes)).ok();
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

    /// Resolve the DPT string configured for `ga`, consulting the live cache
    /// (kept current by `add_group_address`/`remove_group_address`) rather
    /// than the immutable `Configuration` snapshot it was seeded from.
    fn dpt_for(&self, ga: GroupAddress) -> Result<Option<String>> {
        match self.cache.get(ga) {
            Some(entry) => Ok(Some(entry.dpt)),
            None if self.config.allow_unknown_gpa_enabled() => Ok(None),
            None => Err(KnxError::unknown_group_address()),
        }
    }

    fn write(&self, destination: GroupAddress, value: &DptValue) -> Result<()> {
        let dpt = self.dpt_for(destination)?.ok_or_else(KnxError::unknown_group_address)?;
        let encoded = dpt::encode(value, &dpt)?;
        self.send_group_service(destination, Apci::GroupValueWrite, &encoded)?;
        self.cache.record_write_through(destination, value.clone(), now_unix_seconds());
        Ok(())
    }

    fn trigger_read(&self, destination: GroupAddress) -> Result<()> {
        self.send_group_service(destination, Apci::GroupValueRead, &[])
    }

    fn send_group_service(&self, destination: GroupAddress, apci: Apci, data: &[u8]) -> Result<()> {
        let cemi = encode_group_service(
            CEMIMessageCode::LDataReq,
            ControlField1::default(),
            ControlField2::new(true, 6, 0),
            self.config.source_address(),
            destination.raw(),
            apci,
            data,
        );
        let mut buf = [0u8; crate::protocol::constants::MAX_FRAME_SIZE];
        let len = encode_frame(&RoutingIndicationBody { cemi: &cemi }, &mut buf)?;
        self.send_datagram(&buf[..len])
    }

    fn send_datagram(&self, bytes: &[u8]) -> Result<()> {
        self.socket
            .send_to(bytes, self.multicast_addr)
            .map(|_| ())
            .map_err(|_| KnxError::send_failed())
    }

    fn handle_inbound(&self, bytes: &[u8]) {
        let handled = self.try_handle_inbound(bytes).unwrap_or(false);
        if let Some(callback) = self.config.callback() {
            callback(bytes, handled);
        }
    }

    fn try_handle_inbound(&self, bytes: &[u8]) -> Result<bool> {
        let frame = KnxnetIpFrame::parse(bytes)?;
        if frame.service_type() != ServiceType::RoutingIndication {
            return Ok(false);
        }

        let cemi_bytes = RoutingIndicationBody::parse(frame.body()).cemi;
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
            // Never let a slow or dropped subscriber hold up the socket loop.
            thread::spawn(move || {
                sender.send(telegram).ok();
            });
        }
    }
}

/// Start a routing client and return a [`Handle`] to it.
///
/// # Errors
///
/// Returns `Err` if the routing socket can't be bound or joined to the
/// multicast group.
pub fn start(config: Configuration) -> io::Result<Handle> {
    RoutingClient::start(config)
}
