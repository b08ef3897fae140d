//! # Frequency and Output Power Encoding
//!
//! Pure conversions between physical units and the register values the RFM95
//! expects. The driver writes the results; nothing here touches the bus.
//!
//! The carrier frequency register (FRF) counts in steps of FXOSC / 2^19
//! (61.035 Hz with the 32 MHz crystal):
//!
//! ```text
//! FRF = (f_rf << 19) / FXOSC
//! ```
//!
//! The shift is done in 64-bit arithmetic; any frequency the chip can tune to
//! stays far below the overflow bound.

use crate::radio::registers::{FRF_SHIFT, FXOSC_HZ, PA_BOOST, PA_MAX_DBM, PA_MIN_DBM};

/// Convert a carrier frequency in Hz to the 24-bit FRF register value.
///
/// The result is truncated towards zero, matching the chip's own rounding.
/// Values above 2^24 - 1 are masked to 24 bits because only three registers exist.
pub fn frf_from_hz(frequency_hz: u64) -> u32 {
    let frf = (frequency_hz << FRF_SHIFT) / FXOSC_HZ;
    (frf & 0x00FF_FFFF) as u32
}

/// Convert an FRF register value back to Hz (truncated).
pub fn hz_from_frf(frf: u32) -> u64 {
    (frf as u64 * FXOSC_HZ) >> FRF_SHIFT
}

/// Split an FRF value into the MSB, MID and LSB register bytes.
pub fn frf_bytes(frf: u32) -> [u8; 3] {
    [(frf >> 16) as u8, (frf >> 8) as u8, frf as u8]
}

/// Reassemble the three FRF register bytes.
pub fn frf_from_bytes(bytes: [u8; 3]) -> u32 {
    (bytes[0] as u32) << 16 | (bytes[1] as u32) << 8 | bytes[2] as u32
}

/// Clamp a requested output power to what PA_BOOST can deliver.
pub fn clamp_tx_power(power_dbm: i8) -> i8 {
    power_dbm.clamp(PA_MIN_DBM, PA_MAX_DBM)
}

/// `REG_PA_CONFIG` value for the requested power on the PA_BOOST pin.
///
/// Out-of-range requests are clamped to 2..=17 dBm, not rejected.
pub fn pa_config_for_dbm(power_dbm: i8) -> u8 {
    let power = clamp_tx_power(power_dbm);
    PA_BOOST | (power - PA_MIN_DBM) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_915_mhz() {
        let frf = frf_from_hz(915_000_000);
        assert_eq!(frf, 0xE4C000);
        assert_eq!(frf_bytes(frf), [0xE4, 0xC0, 0x00]);
    }

    #[test]
    fn test_868_mhz() {
        assert_eq!(frf_from_hz(868_000_000), 0xD90000);
        assert_eq!(frf_from_hz(433_000_000), 0x6C4000);
    }

    #[test]
    fn test_truncation() {
        // 61 Hz is below one FRF step
        assert_eq!(frf_from_hz(915_000_061), frf_from_hz(915_000_000));
        assert_eq!(hz_from_frf(0xE4C000), 915_000_000);
    }

    #[test]
    fn test_pa_config_boundaries() {
        assert_eq!(pa_config_for_dbm(2), 0x80);
        assert_eq!(pa_config_for_dbm(17), 0x8F);
        assert_eq!(pa_config_for_dbm(10), 0x88);
        assert_eq!(pa_config_for_dbm(1), pa_config_for_dbm(2));
        assert_eq!(pa_config_for_dbm(20), pa_config_for_dbm(17));
        assert_eq!(pa_config_for_dbm(i8::MIN), 0x80);
        assert_eq!(pa_config_for_dbm(i8::MAX), 0x8F);
    }

    proptest! {
        #[test]
        fn prop_frf_matches_floor(freq in 137_000_000u64..=1_020_000_000u64) {
            let expected = (freq as u128 * (1u128 << 19) / 32_000_000u128) as u32;
            let frf = frf_from_hz(freq);
            prop_assert_eq!(frf, expected);
            prop_assert_eq!(frf_from_bytes(frf_bytes(frf)), frf);
        }

        #[test]
        fn prop_pa_config_clamps(power in any::<i8>()) {
            let expected = 0x80 | (power.clamp(2, 17) - 2) as u8;
            prop_assert_eq!(pa_config_for_dbm(power), expected);
        }
    }
}
