//! Device registry - USB identification of ITG-IO boards
//!
//! Every board revision shares the UltraCade vendor ID; the product ID only
//! tells revisions apart; all of them speak the same report format.

/// UltraCade vendor ID
pub const VENDOR_ID: u16 = 0x07C0;

/// Known ITG-IO product IDs
pub const PRODUCT_IDS: &[u16] = &[
    0x1501, // ITG-IO
    0x1582, // ITG-IO (later firmware)
    0x1584, // ITG-IO (PIUIO-style revision)
];

/// Check if PID is a known ITG-IO product
#[inline]
pub fn is_itgio_pid(pid: u16) -> bool {
    PRODUCT_IDS.contains(&pid)
}

/// Check if a VID/PID pair belongs to a supported board
#[inline]
pub fn is_supported(vid: u16, pid: u16) -> bool {
    vid == VENDOR_ID && is_itgio_pid(pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_pids() {
        assert!(is_itgio_pid(0x1501));
        assert!(is_itgio_pid(0x1582));
        assert!(is_itgio_pid(0x1584));
    }

    #[test]
    fn test_unknown_pids() {
        assert!(!is_itgio_pid(0x1583));
        assert!(!is_itgio_pid(0x0000));
    }

    #[test]
    fn test_vendor_must_match() {
        assert!(is_supported(0x07C0, 0x1584));
        assert!(!is_supported(0x3151, 0x1584));
    }
}
