//! Noise level conversion for the analog microphone front-end.
//!
//! The sensor exposes a 12-bit ADC reading of the microphone amplifier
//! output. `convert_to_decibel` maps it to a sound level in dB.

use num_traits::Float;

/// Largest value of the 12-bit ADC.
pub const ADC_FULL_SCALE: f32 = 4095.0;
/// ADC reference voltage, in volts.
pub const ADC_REFERENCE_VOLTAGE: f32 = 3.3;
/// Added to the measured voltage so that silence does not hit `log10(0)`.
pub const VOLTAGE_OFFSET: f32 = 0.001;
/// Amplifier output at 0 dB, in volts.
pub const REFERENCE_VOLTAGE: f32 = 0.00631;

/// Convert an ADC reading (0 to 4095) to decibels.
///
/// `dB = 20 * log10((adc / 4095 * 3.3 + 0.001) / 0.00631)`
///
/// Readings above full scale are not clamped.
pub fn convert_to_decibel(adc_value: u16) -> f32 {
    let voltage = adc_value as f32 / ADC_FULL_SCALE * ADC_REFERENCE_VOLTAGE;
    20.0 * Float::log10((voltage + VOLTAGE_OFFSET) / REFERENCE_VOLTAGE)
}
