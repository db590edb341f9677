//! Description Information Blocks (DIBs).
//!
//! DIBs are the self-describing, tag-length-value records carried in
//! `SEARCH_RESPONSE` and `DESCRIPTION_RESPONSE` bodies. Every DIB starts with
//! `structure_length:u8` followed by `description_type_code:u8`; unknown type
//! codes are skipped using the length byte rather than rejected, so a client
//! built against an older spec revision keeps working against a newer server.

use crate::error::{KnxError, Result};
use crate::protocol::constants::{AssignmentMethod, DibType, MediumType, ServiceFamily};

/// A single parsed DIB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dib {
    /// `DEVICE_INFO` (0x01): identity and addressing of the answering device.
    DeviceInfo(DeviceInfoDib),
    /// `SUPP_SVC_FAMILIES` (0x02): service families and versions supported.
    SupportedServiceFamilies(Vec<(ServiceFamily, u8)>),
    /// `IP_CONFIG` (0x03): static IP configuration.
    IpConfig(IpConfigDib),
    /// `IP_CUR_CONFIG` (0x04): currently active IP configuration.
    IpCurrentConfig(IpCurrentConfigDib),
    /// `KNX_ADDRESSES` (0x05): additional individual addresses served.
    KnxAddresses(Vec<u16>),
    /// `MFR_DATA` (0xFE): manufacturer-specific data, left opaque.
    ManufacturerData {
        /// KNX manufacturer ID.
        manufacturer_id: u16,
        /// Manufacturer-defined payload.
        data: Vec<u8>,
    },
}

impl Dib {
    /// Parse every DIB present in `data`, in order, stopping at the end of
    /// the slice. An unrecognised type code is skipped using its own length
    /// byte rather than causing a parse failure.
    ///
    /// # Errors
    ///
    /// Returns [`KnxError`] if a length byte describes a record that runs
    /// past the end of `data`, or if a fixed-size DIB's length does not
    /// match its expected size.
    pub fn parse_all(data: &[u8]) -> Result<Vec<Self>> {
        let mut dibs = Vec::new();
        let mut offset = 0;

        while offset < data.len() {
            let remaining = &data[offset..];
            if remaining.len() < 2 {
                return Err(KnxError::truncated_dib());
            }

            let structure_length = remaining[0] as usize;
            if structure_length < 2 || structure_length > remaining.len() {
                return Err(KnxError::truncated_dib());
            }

            let record = &remaining[..structure_length];
            if let Some(dib) = Self::parse_one(record)? {
                dibs.push(dib);
            }

            offset += structure_length;
        }

        Ok(dibs)
    }

    fn parse_one(record: &[u8]) -> Result<Option<Self>> {
        let type_code = record[1];
        let body = &record[2..];

        match DibType::from_u8(type_code) {
            Some(DibType::DeviceInfo) => DeviceInfoDib::parse(body).map(|d| Some(Self::DeviceInfo(d))),
            Some(DibType::SupportedServiceFamilies) => {
                Ok(Some(Self::SupportedServiceFamilies(parse_service_families(body)?)))
            }
            Some(DibType::IpConfig) => IpConfigDib::parse(body).map(|d| Some(Self::IpConfig(d))),
            Some(DibType::IpCurrentConfig) => {
                IpCurrentConfigDib::parse(body).map(|d| Some(Self::IpCurrentConfig(d)))
            }
            Some(DibType::KnxAddresses) => Ok(Some(Self::KnxAddresses(parse_knx_addresses(body)?))),
            Some(DibType::ManufacturerData) => {
                if body.len() < 2 {
                    return Err(KnxError::truncated_dib());
                }
                Ok(Some(Self::ManufacturerData {
                    manufacturer_id: u16::from_be_bytes([body[0], body[1]]),
                    data: body[2..].to_vec(),
                }))
            }
            // Unknown description type: skip, per the self-describing DIB contract.
            None => Ok(None),
        }
    }

    /// Encode this DIB, including its `structure_length`/`description_type_code`
    /// prefix, into `buf`. Returns the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Self::DeviceInfo(d) => d.encode(buf),
            Self::SupportedServiceFamilies(families) => encode_service_families(families, buf),
            Self::IpConfig(d) => d.encode(buf),
            Self::IpCurrentConfig(d) => d.encode(buf),
            Self::KnxAddresses(addrs) => encode_knx_addresses(addrs, buf),
            Self::ManufacturerData { manufacturer_id, data } => {
                let len = 4 + data.len();
                if buf.len() < len || len > 255 {
                    return Err(KnxError::buffer_too_small());
                }
                buf[0] = len as u8;
                buf[1] = DibType::ManufacturerData.to_u8();
                buf[2..4].copy_from_slice(&manufacturer_id.to_be_bytes());
                buf[4..len].copy_from_slice(data);
                Ok(len)
            }
        }
    }
}

/// `DEVICE_INFO` DIB body (fixed 52-byte payload past the 2-byte header).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfoDib {
    /// KNX medium this device answers on.
    pub knx_medium: MediumType,
    /// Device status byte (bit 0: programming mode).
    pub device_status: u8,
    /// Individual address of the answering device.
    pub individual_address: u16,
    /// Project installation identifier.
    pub project_installation_id: u16,
    /// Device serial number.
    pub serial_number: [u8; 6],
    /// Multicast address the device uses for routing.
    pub multicast_address: [u8; 4],
    /// MAC address of the device's network interface.
    pub mac_address: [u8; 6],
    /// Friendly name, padded with zero bytes to 30 bytes on the wire.
    pub friendly_name: [u8; 30],
}

impl DeviceInfoDib {
    /// Size of the DIB body, not counting the 2-byte `structure_length`/type header.
    pub const BODY_SIZE: usize = 52;
    /// Total on-wire size, header included.
    pub const SIZE: usize = Self::BODY_SIZE + 2;

    fn parse(body: &[u8]) -> Result<Self> {
        if body.len() < Self::BODY_SIZE {
            return Err(KnxError::truncated_dib());
        }

        let knx_medium = MediumType::from_u8(body[0]).ok_or_else(KnxError::invalid_frame)?;
        let device_status = body[1];
        let individual_address = u16::from_be_bytes([body[2], body[3]]);
        let project_installation_id = u16::from_be_bytes([body[4], body[5]]);

        let mut serial_number = [0u8; 6];
        serial_number.copy_from_slice(&body[6..12]);

        let mut multicast_address = [0u8; 4];
        multicast_address.copy_from_slice(&body[12..16]);

        let mut mac_address = [0u8; 6];
        mac_address.copy_from_slice(&body[16..22]);

        let mut friendly_name = [0u8; 30];
        friendly_name.copy_from_slice(&body[22..52]);

        Ok(Self {
            knx_medium,
            device_status,
            individual_address,
            project_installation_id,
            serial_number,
            multicast_address,
            mac_address,
            friendly_name,
        })
    }

    fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }
        buf[0] = Self::SIZE as u8;
        buf[1] = DibType::DeviceInfo.to_u8();
        buf[2] = self.knx_medium.to_u8();
        buf[3] = self.device_status;
        buf[4..6].copy_from_slice(&self.individual_address.to_be_bytes());
        buf[6..8].copy_from_slice(&self.project_installation_id.to_be_bytes());
        buf[8..14].copy_from_slice(&self.serial_number);
        buf[14..18].copy_from_slice(&self.multicast_address);
        buf[18..24].copy_from_slice(&self.mac_address);
        buf[24..54].copy_from_slice(&self.friendly_name);
        Ok(Self::SIZE)
    }
}

/// `IP_CONFIG` DIB body: static IP configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpConfigDib {
    /// Configured IP address.
    pub ip_address: [u8; 4],
    /// Configured subnet mask.
    pub subnet_mask: [u8; 4],
    /// Configured default gateway.
    pub default_gateway: [u8; 4],
    /// Capability bitmask (BootP/DHCP/AutoIP support).
    pub ip_capabilities: u8,
    /// Currently configured assignment method.
    pub assignment_method: AssignmentMethod,
}

impl IpConfigDib {
    /// Total on-wire size, header included.
    pub const SIZE: usize = 16;

    fn parse(body: &[u8]) -> Result<Self> {
        if body.len() < Self::SIZE - 2 {
            return Err(KnxError::truncated_dib());
        }
        let mut ip_address = [0u8; 4];
        ip_address.copy_from_slice(&body[0..4]);
        let mut subnet_mask = [0u8; 4];
        subnet_mask.copy_from_slice(&body[4..8]);
        let mut default_gateway = [0u8; 4];
        default_gateway.copy_from_slice(&body[8..12]);
        let ip_capabilities = body[12];
        let assignment_method =
            AssignmentMethod::from_u8(body[13]).ok_or_else(KnxError::unknown_assignment_method)?;

        Ok(Self {
            ip_address,
            subnet_mask,
            default_gateway,
            ip_capabilities,
            assignment_method,
        })
    }

    fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }
        buf[0] = Self::SIZE as u8;
        buf[1] = DibType::IpConfig.to_u8();
        buf[2..6].copy_from_slice(&self.ip_address);
        buf[6..10].copy_from_slice(&self.subnet_mask);
        buf[10..14].copy_from_slice(&self.default_gateway);
        buf[14] = self.ip_capabilities;
        buf[15] = self.assignment_method.to_u8();
        Ok(Self::SIZE)
    }
}

/// `IP_CUR_CONFIG` DIB body: the IP configuration actually in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpCurrentConfigDib {
    /// IP address currently in use.
    pub current_ip_address: [u8; 4],
    /// Subnet mask currently in use.
    pub current_subnet_mask: [u8; 4],
    /// Default gateway currently in use.
    pub current_default_gateway: [u8; 4],
    /// DHCP/BootP server that handed out the current lease, if any.
    pub dhcp_server: [u8; 4],
    /// Assignment method currently in effect.
    pub assignment_method: AssignmentMethod,
}

impl IpCurrentConfigDib {
    /// Total on-wire size, header included.
    pub const SIZE: usize = 20;

    fn parse(body: &[u8]) -> Result<Self> {
        if body.len() < Self::SIZE - 2 {
            return Err(KnxError::truncated_dib());
        }
        let mut current_ip_address = [0u8; 4];
        current_ip_address.copy_from_slice(&body[0..4]);
        let mut current_subnet_mask = [0u8; 4];
        current_subnet_mask.copy_from_slice(&body[4..8]);
        let mut current_default_gateway = [0u8; 4];
        current_default_gateway.copy_from_slice(&body[8..12]);
        let mut dhcp_server = [0u8; 4];
        dhcp_server.copy_from_slice(&body[12..16]);
        let assignment_method =
            AssignmentMethod::from_u8(body[16]).ok_or_else(KnxError::unknown_assignment_method)?;
        // body[17] is reserved.

        Ok(Self {
            current_ip_address,
            current_subnet_mask,
            current_default_gateway,
            dhcp_server,
            assignment_method,
        })
    }

    fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < Self::SIZE {
            return Err(KnxError::buffer_too_small());
        }
        buf[0] = Self::SIZE as u8;
        buf[1] = DibType::IpCurrentConfig.to_u8();
        buf[2..6].copy_from_slice(&self.current_ip_address);
        buf[6..10].copy_from_slice(&self.current_subnet_mask);
        buf[10..14].copy_from_slice(&self.current_default_gateway);
        buf[14..18].copy_from_slice(&self.dhcp_server);
        buf[18] = self.assignment_method.to_u8();
        buf[19] = 0;
        Ok(Self::SIZE)
    }
}

fn parse_service_families(body: &[u8]) -> Result<Vec<(ServiceFamily, u8)>> {
    if body.len() % 2 != 0 {
        return Err(KnxError::truncated_dib());
    }
    body.chunks_exact(2)
        .map(|pair| {
            let family = ServiceFamily::from_u8(pair[0]).ok_or_else(KnxError::invalid_frame)?;
            Ok((family, pair[1]))
        })
        .collect()
}

fn encode_service_families(families: &[(ServiceFamily, u8)], buf: &mut [u8]) -> Result<usize> {
    let len = 2 + families.len() * 2;
    if buf.len() < len || len > 255 {
        return Err(KnxError::buffer_too_small());
    }
    buf[0] = len as u8;
    buf[1] = DibType::SupportedServiceFamilies.to_u8();
    for (i, (family, version)) in families.iter().enumerate() {
        let offset = 2 + i * 2;
        buf[offset] = family.to_u8();
        buf[offset + 1] = *version;
    }
    Ok(len)
}

fn parse_knx_addresses(body: &[u8]) -> Result<Vec<u16>> {
    if body.len() % 2 != 0 {
        return Err(KnxError::truncated_dib());
    }
    Ok(body
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}

fn encode_knx_addresses(addrs: &[u16], buf: &mut [u8]) -> Result<usize> {
    let len = 2 + addrs.len() * 2;
    if buf.len() < len || len > 255 {
        return Err(KnxError::buffer_too_small());
    }
    buf[0] = len as u8;
    buf[1] = DibType::KnxAddresses.to_u8();
    for (i, addr) in addrs.iter().enumerate() {
        let offset = 2 + i * 2;
        buf[offset..offset + 2].copy_from_slice(&addr.to_be_bytes());
    }
    Ok(len)
}
