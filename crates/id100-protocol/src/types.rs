//! Fixed-size records exchanged with the device.
//!
//! Every record has a compile-time [`Record::SIZE`]. Multi-byte integers are
//! big-endian on the wire; single-byte fields are opaque to the driver and
//! are passed through untouched.

use bytes::{Buf, BufMut};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::constants::*;

/// A fixed-size binary record.
pub trait Record: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Append the wire representation to `buf`.
    fn encode_into(&self, buf: &mut Vec<u8>);

    /// Decode from exactly [`Self::SIZE`] bytes.
    ///
    /// Returns `None` if `data` has any other length.
    fn decode(data: &[u8]) -> Option<Self>;

    /// Encode to a new buffer.
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        self.encode_into(&mut buf);
        buf
    }
}

/// Encode a flash page number in wire order.
pub fn encode_page_number(page: u16) -> [u8; PAGE_NUMBER_SIZE] {
    page.to_be_bytes()
}

/// Decode a flash page number from the first two bytes of `data`.
pub fn decode_page_number(data: &[u8]) -> Option<u16> {
    if data.len() < PAGE_NUMBER_SIZE {
        return None;
    }
    Some(u16::from_be_bytes([data[0], data[1]]))
}

/// Clamp an RTC calibration value to the range the device accepts.
///
/// Values beyond ±[`PPM_LIMIT`] saturate; NaN passes through unchanged.
pub fn clamp_calibration(ppm: f32) -> f32 {
    if ppm > PPM_LIMIT {
        PPM_LIMIT
    } else if ppm < -PPM_LIMIT {
        -PPM_LIMIT
    } else {
        ppm
    }
}

/// Encode an RTC calibration value in wire order.
pub fn encode_calibration(ppm: f32) -> [u8; CALIBRATION_VALUE_SIZE] {
    ppm.to_le_bytes()
}

fn decode_calibration(data: &[u8]) -> f32 {
    f32::from_le_bytes([data[0], data[1], data[2], data[3]])
}

// ============================================================================
// Version
// ============================================================================

/// Firmware version reported by the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
    /// Revision.
    pub revision: u16,
}

impl Version {
    /// Create a new version.
    pub fn new(major: u16, minor: u16, revision: u16) -> Self {
        Version {
            major,
            minor,
            revision,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

impl Record for Version {
    const SIZE: usize = VERSION_SIZE;

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.put_u16(self.major);
        buf.put_u16(self.minor);
        buf.put_u16(self.revision);
    }

    fn decode(mut data: &[u8]) -> Option<Self> {
        if data.len() != Self::SIZE {
            return None;
        }
        Some(Version {
            major: data.get_u16(),
            minor: data.get_u16(),
            revision: data.get_u16(),
        })
    }
}

// ============================================================================
// Date and time
// ============================================================================

/// Date and time as kept by the device RTC.
///
/// Layout: second, minute, hour, weekday (1 = Monday .. 7 = Sunday), day,
/// month, year offset from [`BASE_YEAR`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DateTime {
    /// Seconds (0-59).
    pub second: u8,
    /// Minutes (0-59).
    pub minute: u8,
    /// Hours (0-23).
    pub hour: u8,
    /// Day of week (1 = Monday .. 7 = Sunday).
    pub weekday: u8,
    /// Day of month (1-31).
    pub day: u8,
    /// Month (1-12).
    pub month: u8,
    /// Years since 2000.
    pub year: u8,
}

impl DateTime {
    /// Convert from a calendar date/time.
    ///
    /// Returns `None` for years outside 2000..=2255.
    pub fn from_naive(value: &NaiveDateTime) -> Option<Self> {
        let year = u8::try_from(value.year() - BASE_YEAR).ok()?;
        Some(DateTime {
            second: value.second() as u8,
            minute: value.minute() as u8,
            hour: value.hour() as u8,
            weekday: value.weekday().number_from_monday() as u8,
            day: value.day() as u8,
            month: value.month() as u8,
            year,
        })
    }

    /// Convert to a calendar date/time.
    ///
    /// Returns `None` if the record holds an impossible date or time. The
    /// weekday field is not checked against the date.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            BASE_YEAR + i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )?
        .and_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )
    }
}

impl Record for DateTime {
    const SIZE: usize = DATE_TIME_SIZE;

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&[
            self.second,
            self.minute,
            self.hour,
            self.weekday,
            self.day,
            self.month,
            self.year,
        ]);
    }

    fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != Self::SIZE {
            return None;
        }
        Some(DateTime {
            second: data[0],
            minute: data[1],
            hour: data[2],
            weekday: data[3],
            day: data[4],
            month: data[5],
            year: data[6],
        })
    }
}

// ============================================================================
// Preview matrix
// ============================================================================

/// Bitmap shown on the display while in preview mode.
///
/// Each of the [`MATRIX_ROWS`] rows takes [`MATRIX_ROW_SIZE`] bytes. Bit 7
/// of a row's first byte is column 0; only the first [`MATRIX_COLUMNS`] bits
/// are lit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MatrixBitmap(pub [u8; MATRIX_BITMAP_SIZE]);

impl MatrixBitmap {
    /// Create an empty (all dark) bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(row: usize, column: usize) -> Option<(usize, u8)> {
        if row >= MATRIX_ROWS || column >= MATRIX_COLUMNS {
            return None;
        }
        Some((row * MATRIX_ROW_SIZE + column / 8, 0x80 >> (column % 8)))
    }

    /// Get a single pixel. Returns `None` outside the matrix.
    pub fn pixel(&self, row: usize, column: usize) -> Option<bool> {
        Self::position(row, column).map(|(index, mask)| self.0[index] & mask != 0)
    }

    /// Set a single pixel. Returns `false` if the position is outside the matrix.
    pub fn set_pixel(&mut self, row: usize, column: usize, on: bool) -> bool {
        match Self::position(row, column) {
            Some((index, mask)) => {
                if on {
                    self.0[index] |= mask;
                } else {
                    self.0[index] &= !mask;
                }
                true
            }
            None => false,
        }
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; MATRIX_BITMAP_SIZE] {
        &self.0
    }
}

impl Record for MatrixBitmap {
    const SIZE: usize = MATRIX_BITMAP_SIZE;

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }

    fn decode(data: &[u8]) -> Option<Self> {
        let bytes: [u8; MATRIX_BITMAP_SIZE] = data.try_into().ok()?;
        Some(MatrixBitmap(bytes))
    }
}

// ============================================================================
// Intensity
// ============================================================================

/// Standard display intensity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Intensity(pub u8);

impl Record for Intensity {
    const SIZE: usize = INTENSITY_SIZE;

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.push(self.0);
    }

    fn decode(data: &[u8]) -> Option<Self> {
        match data {
            [value] => Some(Intensity(*value)),
            _ => None,
        }
    }
}

// ============================================================================
// Calibration
// ============================================================================

/// Result of the last RTC calibration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LastCalibration {
    /// When the calibration was applied.
    pub date_time: DateTime,
    /// Applied correction in PPM.
    pub ppm: f32,
}

impl Record for LastCalibration {
    const SIZE: usize = LAST_CALIBRATION_SIZE;

    fn encode_into(&self, buf: &mut Vec<u8>) {
        self.date_time.encode_into(buf);
        buf.extend_from_slice(&encode_calibration(self.ppm));
    }

    fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != Self::SIZE {
            return None;
        }
        let (date_time, ppm) = data.split_at(DATE_TIME_SIZE);
        Some(LastCalibration {
            date_time: DateTime::decode(date_time)?,
            ppm: decode_calibration(ppm),
        })
    }
}

// ============================================================================
// Standby schedule
// ============================================================================

/// Display-off window for one weekday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StandbyWindow {
    /// Hour the display switches off.
    pub off_hour: u8,
    /// Minute the display switches off.
    pub off_minute: u8,
    /// Hour the display switches back on.
    pub on_hour: u8,
    /// Minute the display switches back on.
    pub on_minute: u8,
}

impl StandbyWindow {
    /// Check if the window is empty (off and on at the same time).
    pub fn is_empty(&self) -> bool {
        self.off_hour == self.on_hour && self.off_minute == self.on_minute
    }
}

/// Weekly standby schedule, Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Standby {
    /// One window per weekday.
    pub days: [StandbyWindow; STANDBY_DAYS],
}

impl Record for Standby {
    const SIZE: usize = STANDBY_SIZE;

    fn encode_into(&self, buf: &mut Vec<u8>) {
        for day in &self.days {
            buf.extend_from_slice(&[day.off_hour, day.off_minute, day.on_hour, day.on_minute]);
        }
    }

    fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != Self::SIZE {
            return None;
        }
        let mut standby = Standby::default();
        for (day, chunk) in standby
            .days
            .iter_mut()
            .zip(data.chunks_exact(STANDBY_WINDOW_SIZE))
        {
            *day = StandbyWindow {
                off_hour: chunk[0],
                off_minute: chunk[1],
                on_hour: chunk[2],
                on_minute: chunk[3],
            };
        }
        Some(standby)
    }
}

// ============================================================================
// Flash configuration
// ============================================================================

/// One flash configuration page.
///
/// The same layout is returned by a page read and sent by a clock config
/// write. The page number is the only field the driver inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlashConfigPage {
    /// Page number.
    pub page_number: u16,
    /// Page contents.
    pub data: [u8; FLASH_PAGE_DATA_SIZE],
}

impl FlashConfigPage {
    /// Create a page filled with the erased-flash pattern.
    pub fn erased(page_number: u16) -> Self {
        FlashConfigPage {
            page_number,
            data: [0xFF; FLASH_PAGE_DATA_SIZE],
        }
    }

    /// Check if the page holds only the erased-flash pattern.
    pub fn is_erased(&self) -> bool {
        self.data.iter().all(|&b| b == 0xFF)
    }
}

impl Default for FlashConfigPage {
    fn default() -> Self {
        FlashConfigPage {
            page_number: 0,
            data: [0u8; FLASH_PAGE_DATA_SIZE],
        }
    }
}

impl Record for FlashConfigPage {
    const SIZE: usize = FLASH_CONFIG_PAGE_SIZE;

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.put_u16(self.page_number);
        buf.extend_from_slice(&self.data);
    }

    fn decode(mut data: &[u8]) -> Option<Self> {
        if data.len() != Self::SIZE {
            return None;
        }
        let page_number = data.get_u16();
        let mut page = FlashConfigPage {
            page_number,
            ..Default::default()
        };
        page.data.copy_from_slice(data);
        Some(page)
    }
}

// ============================================================================
// Appointments
// ============================================================================

/// A scheduled appointment shown on the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Appointment {
    /// Day of month (0 = unused entry).
    pub day: u8,
    /// Month.
    pub month: u8,
    /// Hour.
    pub hour: u8,
    /// Minute.
    pub minute: u8,
    /// Symbol to show.
    pub symbol: u8,
}

impl Appointment {
    /// Check if this entry is in use.
    pub fn is_used(&self) -> bool {
        self.day != 0
    }
}

/// The device's appointments table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Appointments {
    /// Table entries.
    pub entries: [Appointment; APPOINTMENT_COUNT],
}

impl Appointments {
    /// Iterate over entries that are in use.
    pub fn used(&self) -> impl Iterator<Item = &Appointment> {
        self.entries.iter().filter(|entry| entry.is_used())
    }
}

impl Record for Appointments {
    const SIZE: usize = APPOINTMENTS_SIZE;

    fn encode_into(&self, buf: &mut Vec<u8>) {
        for entry in &self.entries {
            buf.extend_from_slice(&[entry.day, entry.month, entry.hour, entry.minute, entry.symbol]);
        }
    }

    fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != Self::SIZE {
            return None;
        }
        let mut table = Appointments::default();
        for (entry, chunk) in table
            .entries
            .iter_mut()
            .zip(data.chunks_exact(APPOINTMENT_SIZE))
        {
            *entry = Appointment {
                day: chunk[0],
                month: chunk[1],
                hour: chunk[2],
                minute: chunk[3],
                symbol: chunk[4],
            };
        }
        Some(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_is_big_endian() {
        assert_eq!(encode_page_number(5), [0x00, 0x05]);
        assert_eq!(encode_page_number(0x1234), [0x12, 0x34]);
        assert_eq!(decode_page_number(&[0x00, 0x07]), Some(7));
        assert_eq!(decode_page_number(&[0x07]), None);
    }

    #[test]
    fn test_byte_swap_is_involution() {
        for value in [0u16, 1, 0x00FF, 0x1234, 0xFF00, u16::MAX] {
            assert_eq!(value.swap_bytes().swap_bytes(), value);
            let wire = encode_page_number(value);
            assert_eq!(u16::from_le_bytes(wire), value.swap_bytes());
            assert_eq!(decode_page_number(&wire), Some(value));
        }
    }

    #[test]
    fn test_clamp_calibration() {
        assert_eq!(clamp_calibration(250.0), 189.0);
        assert_eq!(clamp_calibration(-250.0), -189.0);
        assert_eq!(clamp_calibration(189.0), 189.0);
        assert_eq!(clamp_calibration(-12.5), -12.5);
        assert_eq!(clamp_calibration(0.0), 0.0);
        assert!(clamp_calibration(f32::NAN).is_nan());
        assert_eq!(clamp_calibration(f32::INFINITY), 189.0);
    }

    #[test]
    fn test_version_decode() {
        let version = Version::decode(&[0x00, 0x01, 0x00, 0x02, 0x01, 0x03]).unwrap();
        assert_eq!(version, Version::new(1, 2, 259));
        assert_eq!(version.to_string(), "1.2.259");
        assert!(Version::decode(&[0x00, 0x01]).is_none());
    }

    #[test]
    fn test_date_time_from_naive() {
        let naive = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 45, 7)
            .unwrap();
        let dt = DateTime::from_naive(&naive).unwrap();
        assert_eq!(dt.year, 24);
        assert_eq!(dt.month, 2);
        assert_eq!(dt.day, 29);
        assert_eq!(dt.weekday, 4); // Thursday
        assert_eq!(dt.encode(), vec![7, 45, 13, 4, 29, 2, 24]);
        assert_eq!(dt.to_naive(), Some(naive));
    }

    #[test]
    fn test_date_time_out_of_range() {
        let naive = NaiveDate::from_ymd_opt(1999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert!(DateTime::from_naive(&naive).is_none());

        let bogus = DateTime {
            month: 13,
            day: 1,
            ..Default::default()
        };
        assert!(bogus.to_naive().is_none());
    }

    #[test]
    fn test_matrix_pixels() {
        let mut matrix = MatrixBitmap::new();
        assert!(matrix.set_pixel(0, 0, true));
        assert!(matrix.set_pixel(1, 10, true));
        assert!(!matrix.set_pixel(10, 0, true));
        assert!(!matrix.set_pixel(0, 11, true));

        assert_eq!(matrix.as_bytes()[0], 0x80);
        assert_eq!(matrix.as_bytes()[3], 0x20);
        assert_eq!(matrix.pixel(1, 10), Some(true));
        assert_eq!(matrix.pixel(1, 9), Some(false));
        assert_eq!(matrix.pixel(0, 11), None);

        matrix.set_pixel(0, 0, false);
        assert_eq!(matrix.as_bytes()[0], 0);
    }

    #[test]
    fn test_last_calibration_decode() {
        let mut data = vec![0, 30, 12, 1, 15, 6, 23];
        data.extend_from_slice(&(-3.5f32).to_le_bytes());
        let cal = LastCalibration::decode(&data).unwrap();
        assert_eq!(cal.date_time.hour, 12);
        assert_eq!(cal.ppm, -3.5);
        assert_eq!(cal.encode(), data);
    }

    #[test]
    fn test_flash_page_layout() {
        let mut page = FlashConfigPage::erased(0x0102);
        assert!(page.is_erased());
        page.data[0] = 0xAB;
        let encoded = page.encode();
        assert_eq!(encoded.len(), FLASH_CONFIG_PAGE_SIZE);
        assert_eq!(&encoded[..3], &[0x01, 0x02, 0xAB]);
        assert_eq!(FlashConfigPage::decode(&encoded), Some(page));
        assert!(FlashConfigPage::decode(&encoded[1..]).is_none());
    }

    #[test]
    fn test_standby_and_appointments_layout() {
        let mut standby = Standby::default();
        standby.days[6] = StandbyWindow {
            off_hour: 23,
            off_minute: 0,
            on_hour: 7,
            on_minute: 30,
        };
        let encoded = standby.encode();
        assert_eq!(encoded.len(), STANDBY_SIZE);
        assert_eq!(&encoded[24..], &[23, 0, 7, 30]);
        assert!(standby.days[0].is_empty());

        let mut data = vec![0u8; APPOINTMENTS_SIZE];
        data[5..10].copy_from_slice(&[24, 12, 18, 0, 3]);
        let table = Appointments::decode(&data).unwrap();
        let used: Vec<_> = table.used().collect();
        assert_eq!(used.len(), 1);
        assert_eq!(used[0].month, 12);
        assert_eq!(used[0].symbol, 3);
    }
}
