//! LLDP system capabilities and the positional BRWS code.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An LLDP system capability relevant to topology reports.
///
/// LLDP defines more capabilities (Repeater, Telephone, DOCSIS, ...); only
/// these four appear in the report code and anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Bridge,
    Router,
    Wlan,
    Station,
}

impl Capability {
    /// Canonical code order. Position `i` of a [`CapabilityCode`] describes
    /// `Capability::ORDER[i]`.
    pub const ORDER: [Capability; 4] = [
        Capability::Bridge,
        Capability::Router,
        Capability::Wlan,
        Capability::Station,
    ];

    /// Returns the name lldpcli uses in its `capability.type` field.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Capability::Bridge => "Bridge",
            Capability::Router => "Router",
            Capability::Wlan => "Wlan",
            Capability::Station => "Station",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bridge" => Ok(Capability::Bridge),
            "router" => Ok(Capability::Router),
            "wlan" => Ok(Capability::Wlan),
            "station" => Ok(Capability::Station),
            _ => Err(ParseError::InvalidCapability(s.to_string())),
        }
    }
}

/// Fixed 4-character capability summary in Bridge/Router/Wlan/Station order.
///
/// Each position is `1` when advertised, `0` when the device is known but
/// does not advertise it, and `X` for every position when the device itself
/// is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityCode([u8; 4]);

impl CapabilityCode {
    /// Code for an absent device.
    pub const UNKNOWN: CapabilityCode = CapabilityCode(*b"XXXX");

    /// Encodes a capability set.
    ///
    /// `known == false` always yields [`CapabilityCode::UNKNOWN`], whatever
    /// `tokens` holds.
    ///
    /// ```
    /// use lldp_types::{Capability, CapabilityCode};
    ///
    /// let code = CapabilityCode::encode(&[Capability::Router, Capability::Bridge], true);
    /// assert_eq!(code.as_str(), "1100");
    /// assert_eq!(CapabilityCode::encode(&[], false).as_str(), "XXXX");
    /// ```
    pub fn encode<'a, I>(tokens: I, known: bool) -> Self
    where
        I: IntoIterator<Item = &'a Capability>,
    {
        if !known {
            return Self::UNKNOWN;
        }
        let mut code = *b"0000";
        for token in tokens {
            if let Some(pos) = Capability::ORDER.iter().position(|c| c == token) {
                code[pos] = b'1';
            }
        }
        CapabilityCode(code)
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from ASCII literals.
        std::str::from_utf8(&self.0).unwrap_or("XXXX")
    }
}

impl fmt::Display for CapabilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CapabilityCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
