//! PCI vendor and device names for common server NICs.
//!
//! Names follow the PCI ID repository (<https://pci-ids.ucw.cz/>) and the
//! DPDK device tables. The list only covers NICs seen in server fleets;
//! anything else resolves to `None`.

/// Canonical form of a sysfs id: lowercase with a `0x` prefix.
pub fn normalize_id(raw: &str) -> Option<String> {
    let raw = raw.trim().to_lowercase();
    let digits = raw.strip_prefix("0x").unwrap_or(&raw);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{digits}"))
}

/// Vendor name for a PCI vendor id.
pub fn vendor_name(vendor_id: &str) -> Option<&'static str> {
    match normalize_id(vendor_id)?.as_str() {
        "0x8086" => Some("Intel"),
        "0x15b3" => Some("Mellanox"),
        "0x14e4" => Some("Broadcom"),
        _ => None,
    }
}

/// Device name for a PCI vendor/device id pair.
pub fn device_name(vendor_id: &str, device_id: &str) -> Option<&'static str> {
    let vendor = normalize_id(vendor_id)?;
    let device = normalize_id(device_id)?;
    let name = match (vendor.as_str(), device.as_str()) {
        ("0x8086", "0x10fb") => "Niantic IXGBE 82599 SFP",
        ("0x8086", "0x1016") => "e1000 82540EP_LOM",
        ("0x8086", "0x1521") => "e1000 I350 Copper",
        ("0x8086", "0x1528") => "Twinville IXGBE X540T",
        ("0x8086", "0x154d") => "Niantic IXGBE 82599 SFP_SF2",
        ("0x8086", "0x1572") => "Fortville XL710 SFP",
        ("0x8086", "0x1583") => "Fortville XL710 QSFP_A",
        ("0x8086", "0x1584") => "Fortville XL710 QSFP_B",
        ("0x8086", "0x1585") => "Fortville XL710 QSFP_C",
        ("0x8086", "0x158b") => "Fortville XXV710 for 25GbE SFP28",
        ("0x8086", "0x37d2") => "X722 for 10GBASE-T",
        ("0x15b3", "0x1015") => "MT27710 Family [ConnectX-4 Lx]",
        ("0x15b3", "0x1016") => "MT27710 Family [ConnectX-4 Lx Virtual Function]",
        ("0x15b3", "0x1019") => "MT28800 Family [ConnectX-5 Ex]",
        ("0x14e4", "0x1657") => "BCM5719",
        ("0x14e4", "0x165f") => "BCM5120",
        ("0x14e4", "0x16d6") => "BCM-57412 NextXtreme-E",
        ("0x14e4", "0x16d7") => "BCM-57414 NextXtreme-E",
        _ => return None,
    };
    Some(name)
}
