//! Protocol constants
//!
//! These constants define the command codes, record sizes, and numeric limits
//! used by the ID100 application protocol. Every command is a single ASCII
//! byte; lower case reads from the device and upper case writes to it.

// ============================================================================
// Command Codes (host → device, echoed back in every reply)
// ============================================================================

/// Get the firmware version.
pub const CMD_GET_VERSION: u8 = b'v';
/// Get the current date and time.
pub const CMD_GET_DATE_TIME: u8 = b't';
/// Set the current date and time.
pub const CMD_SET_DATE_TIME: u8 = b'T';
/// Leave preview mode and show the clock face again.
pub const CMD_SET_NORMAL_MODE: u8 = b'A';
/// Enter preview mode (display shows the preview matrix).
pub const CMD_SET_PREVIEW_MODE: u8 = b'a';
/// Restore factory defaults.
pub const CMD_FACTORY_RESET: u8 = b'X';
/// Reboot into the bootloader.
pub const CMD_ACTIVATE_BOOTLOADER: u8 = b'!';
/// Load the preview bitmap matrix.
pub const CMD_SET_PREVIEW_MATRIX: u8 = b'D';
/// Get the standard display intensity.
pub const CMD_GET_INTENSITY: u8 = b'b';
/// Set the standard display intensity.
pub const CMD_SET_INTENSITY: u8 = b'B';
/// Get the result of the last RTC calibration.
pub const CMD_GET_LAST_CALIBRATION: u8 = b'c';
/// Set the RTC calibration value in PPM.
pub const CMD_SET_RTC_CALIBRATION: u8 = b'C';
/// Get the standby schedule.
pub const CMD_GET_STANDBY: u8 = b's';
/// Set the standby schedule.
pub const CMD_SET_STANDBY: u8 = b'S';
/// Read one flash configuration page.
pub const CMD_GET_FLASH_CONFIG_PAGE: u8 = b'f';
/// Erase the flash configuration sector starting at a page.
pub const CMD_ERASE_FLASH_CONFIG_SECTOR: u8 = b'E';
/// Write one clock configuration page to flash.
pub const CMD_SET_FLASH_CLOCK_CONFIG: u8 = b'F';
/// Get the appointments table.
pub const CMD_GET_APPOINTMENTS: u8 = b'r';
/// Set the appointments table.
pub const CMD_SET_APPOINTMENTS: u8 = b'R';

// ============================================================================
// Record Sizes
// ============================================================================

/// Size of a flash page number on the wire.
pub const PAGE_NUMBER_SIZE: usize = 2;
/// Size of the firmware version record (three big-endian u16 fields).
pub const VERSION_SIZE: usize = 6;
/// Size of the date/time record.
pub const DATE_TIME_SIZE: usize = 7;
/// Size of the intensity value.
pub const INTENSITY_SIZE: usize = 1;
/// Size of the RTC calibration value (IEEE-754 single precision).
pub const CALIBRATION_VALUE_SIZE: usize = 4;
/// Size of the last calibration record (date/time + calibration value).
pub const LAST_CALIBRATION_SIZE: usize = DATE_TIME_SIZE + CALIBRATION_VALUE_SIZE;

/// Number of rows in the display matrix.
pub const MATRIX_ROWS: usize = 10;
/// Number of columns in the display matrix.
pub const MATRIX_COLUMNS: usize = 11;
/// Bytes used to store one matrix row.
pub const MATRIX_ROW_SIZE: usize = 2;
/// Size of the preview bitmap.
pub const MATRIX_BITMAP_SIZE: usize = MATRIX_ROWS * MATRIX_ROW_SIZE;

/// Number of standby windows (one per weekday).
pub const STANDBY_DAYS: usize = 7;
/// Size of one standby window.
pub const STANDBY_WINDOW_SIZE: usize = 4;
/// Size of the standby schedule.
pub const STANDBY_SIZE: usize = STANDBY_DAYS * STANDBY_WINDOW_SIZE;

/// Number of data bytes in one flash configuration page.
pub const FLASH_PAGE_DATA_SIZE: usize = 64;
/// Size of a flash configuration page record (page number + data).
pub const FLASH_CONFIG_PAGE_SIZE: usize = PAGE_NUMBER_SIZE + FLASH_PAGE_DATA_SIZE;

/// Number of entries in the appointments table.
pub const APPOINTMENT_COUNT: usize = 20;
/// Size of one appointment entry.
pub const APPOINTMENT_SIZE: usize = 5;
/// Size of the appointments table.
pub const APPOINTMENTS_SIZE: usize = APPOINTMENT_COUNT * APPOINTMENT_SIZE;

/// Largest reply payload any command produces.
pub const MAX_REPLY_SIZE: usize = APPOINTMENTS_SIZE;

// ============================================================================
// Numeric Limits
// ============================================================================

/// Largest RTC calibration magnitude the device accepts, in PPM.
pub const PPM_LIMIT: f32 = 189.0;

/// First year representable in a date/time record.
pub const BASE_YEAR: i32 = 2000;

/// Get a human-readable name for a command byte.
pub fn command_name(command: u8) -> &'static str {
    match command {
        CMD_GET_VERSION => "get version",
        CMD_GET_DATE_TIME => "get date/time",
        CMD_SET_DATE_TIME => "set date/time",
        CMD_SET_NORMAL_MODE => "set normal mode",
        CMD_SET_PREVIEW_MODE => "set preview mode",
        CMD_FACTORY_RESET => "factory reset",
        CMD_ACTIVATE_BOOTLOADER => "activate bootloader",
        CMD_SET_PREVIEW_MATRIX => "set preview matrix",
        CMD_GET_INTENSITY => "get intensity",
        CMD_SET_INTENSITY => "set intensity",
        CMD_GET_LAST_CALIBRATION => "get last calibration",
        CMD_SET_RTC_CALIBRATION => "set RTC calibration",
        CMD_GET_STANDBY => "get standby",
        CMD_SET_STANDBY => "set standby",
        CMD_GET_FLASH_CONFIG_PAGE => "get flash config page",
        CMD_ERASE_FLASH_CONFIG_SECTOR => "erase flash config sector",
        CMD_SET_FLASH_CLOCK_CONFIG => "set flash clock config",
        CMD_GET_APPOINTMENTS => "get appointments",
        CMD_SET_APPOINTMENTS => "set appointments",
        _ => "unknown",
    }
}
