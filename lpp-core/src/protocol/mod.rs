pub mod error;
pub mod field;
pub mod sensor;

pub const LPP_DIGITAL_INPUT: u8 = 0;
pub const LPP_DIGITAL_OUTPUT: u8 = 1;
pub const LPP_ANALOG_INPUT: u8 = 2;
pub const LPP_ANALOG_OUTPUT: u8 = 3;
pub const LPP_LUMINOSITY: u8 = 101;
pub const LPP_PRESENCE: u8 = 102;
pub const LPP_TEMPERATURE: u8 = 103;
pub const LPP_RELATIVE_HUMIDITY: u8 = 104;
pub const LPP_ACCELEROMETER: u8 = 113;
pub const LPP_BAROMETRIC_PRESSURE: u8 = 115;
pub const LPP_GYROMETER: u8 = 134;
pub const LPP_GPS: u8 = 136;

// record structure : channel(1) + type(1) + field_count * width
pub const RECORD_HEADER_SIZE: usize = 2;
/// Most fields carried by one record (vector sensors).
pub const MAX_FIELDS: usize = 3;
