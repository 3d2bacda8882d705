//! Commands that can be sent to the device.

use crate::constants::*;
use crate::types::*;

/// Commands that can be sent to the device.
///
/// Each variant fixes the command byte, the request payload, and the length
/// of the reply the device answers with.
#[derive(Debug, Clone)]
pub enum Command {
    /// Query the firmware version.
    GetVersion,

    /// Read the RTC date and time.
    GetDateTime,

    /// Set the RTC date and time.
    SetDateTime {
        /// New date and time.
        date_time: DateTime,
    },

    /// Switch the display back to the clock face.
    SetNormalMode,

    /// Switch the display to the preview matrix.
    SetPreviewMode,

    /// Restore factory defaults.
    FactoryReset,

    /// Reboot into the bootloader.
    ActivateBootloader,

    /// Load the preview matrix.
    SetPreviewMatrix {
        /// Bitmap to show.
        matrix: MatrixBitmap,
    },

    /// Read the standard intensity.
    GetIntensity,

    /// Set the standard intensity.
    SetIntensity {
        /// New intensity.
        intensity: Intensity,
    },

    /// Read the last calibration result.
    GetLastCalibration,

    /// Set the RTC calibration.
    SetRtcCalibration {
        /// Correction in PPM. Clamped to ±[`PPM_LIMIT`] when encoded.
        ppm: f32,
    },

    /// Read the standby schedule.
    GetStandby,

    /// Set the standby schedule.
    SetStandby {
        /// New schedule.
        standby: Standby,
    },

    /// Read a flash configuration page.
    GetFlashConfigPage {
        /// Page to read.
        page_number: u16,
    },

    /// Erase the flash configuration sector starting at a page.
    EraseFlashConfigSector {
        /// First page of the sector.
        start_page: u16,
    },

    /// Write a clock configuration page to flash.
    SetFlashClockConfig {
        /// Page to write, including its page number.
        config: FlashConfigPage,
    },

    /// Read the appointments table.
    GetAppointments,

    /// Write the appointments table.
    SetAppointments {
        /// New table.
        appointments: Appointments,
    },
}

impl Command {
    /// Get the command code for this command.
    pub fn code(&self) -> u8 {
        match self {
            Command::GetVersion => CMD_GET_VERSION,
            Command::GetDateTime => CMD_GET_DATE_TIME,
            Command::SetDateTime { .. } => CMD_SET_DATE_TIME,
            Command::SetNormalMode => CMD_SET_NORMAL_MODE,
            Command::SetPreviewMode => CMD_SET_PREVIEW_MODE,
            Command::FactoryReset => CMD_FACTORY_RESET,
            Command::ActivateBootloader => CMD_ACTIVATE_BOOTLOADER,
            Command::SetPreviewMatrix { .. } => CMD_SET_PREVIEW_MATRIX,
            Command::GetIntensity => CMD_GET_INTENSITY,
            Command::SetIntensity { .. } => CMD_SET_INTENSITY,
            Command::GetLastCalibration => CMD_GET_LAST_CALIBRATION,
            Command::SetRtcCalibration { .. } => CMD_SET_RTC_CALIBRATION,
            Command::GetStandby => CMD_GET_STANDBY,
            Command::SetStandby { .. } => CMD_SET_STANDBY,
            Command::GetFlashConfigPage { .. } => CMD_GET_FLASH_CONFIG_PAGE,
            Command::EraseFlashConfigSector { .. } => CMD_ERASE_FLASH_CONFIG_SECTOR,
            Command::SetFlashClockConfig { .. } => CMD_SET_FLASH_CLOCK_CONFIG,
            Command::GetAppointments => CMD_GET_APPOINTMENTS,
            Command::SetAppointments { .. } => CMD_SET_APPOINTMENTS,
        }
    }

    /// Get the exact reply payload length for this command.
    pub fn reply_len(&self) -> usize {
        match self {
            Command::GetVersion => Version::SIZE,
            Command::GetDateTime => DateTime::SIZE,
            Command::GetIntensity => Intensity::SIZE,
            Command::GetLastCalibration => LastCalibration::SIZE,
            Command::GetStandby => Standby::SIZE,
            Command::GetFlashConfigPage { .. } => FlashConfigPage::SIZE,
            Command::EraseFlashConfigSector { .. } | Command::SetFlashClockConfig { .. } => {
                PAGE_NUMBER_SIZE
            }
            Command::GetAppointments => Appointments::SIZE,
            Command::SetDateTime { .. }
            | Command::SetNormalMode
            | Command::SetPreviewMode
            | Command::FactoryReset
            | Command::ActivateBootloader
            | Command::SetPreviewMatrix { .. }
            | Command::SetIntensity { .. }
            | Command::SetRtcCalibration { .. }
            | Command::SetStandby { .. }
            | Command::SetAppointments { .. } => 0,
        }
    }

    /// Get the page number the device must echo back, if any.
    pub fn echoed_page(&self) -> Option<u16> {
        match self {
            Command::GetFlashConfigPage { page_number } => Some(*page_number),
            Command::EraseFlashConfigSector { start_page } => Some(*start_page),
            Command::SetFlashClockConfig { config } => Some(config.page_number),
            _ => None,
        }
    }

    /// Encode the request payload (without the command byte).
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Command::GetVersion
            | Command::GetDateTime
            | Command::SetNormalMode
            | Command::SetPreviewMode
            | Command::FactoryReset
            | Command::ActivateBootloader
            | Command::GetIntensity
            | Command::GetLastCalibration
            | Command::GetStandby
            | Command::GetAppointments => {}

            Command::SetDateTime { date_time } => date_time.encode_into(&mut buf),

            Command::SetPreviewMatrix { matrix } => matrix.encode_into(&mut buf),

            Command::SetIntensity { intensity } => intensity.encode_into(&mut buf),

            Command::SetRtcCalibration { ppm } => {
                buf.extend_from_slice(&encode_calibration(clamp_calibration(*ppm)));
            }

            Command::SetStandby { standby } => standby.encode_into(&mut buf),

            Command::GetFlashConfigPage { page_number } => {
                buf.extend_from_slice(&encode_page_number(*page_number));
            }

            Command::EraseFlashConfigSector { start_page } => {
                buf.extend_from_slice(&encode_page_number(*start_page));
            }

            Command::SetFlashClockConfig { config } => config.encode_into(&mut buf),

            Command::SetAppointments { appointments } => appointments.encode_into(&mut buf),
        }

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_commands_have_empty_payload() {
        for cmd in [
            Command::GetVersion,
            Command::GetDateTime,
            Command::GetIntensity,
            Command::GetLastCalibration,
            Command::GetStandby,
            Command::GetAppointments,
        ] {
            assert!(cmd.encode().is_empty(), "{:?}", cmd);
            assert!(cmd.reply_len() > 0, "{:?}", cmd);
        }
    }

    #[test]
    fn test_mode_commands_are_bare() {
        for (cmd, code) in [
            (Command::SetNormalMode, b'A'),
            (Command::SetPreviewMode, b'a'),
            (Command::FactoryReset, b'X'),
            (Command::ActivateBootloader, b'!'),
        ] {
            assert_eq!(cmd.code(), code);
            assert!(cmd.encode().is_empty());
            assert_eq!(cmd.reply_len(), 0);
        }
    }

    #[test]
    fn test_calibration_is_clamped_on_encode() {
        let cmd = Command::SetRtcCalibration { ppm: 250.0 };
        assert_eq!(cmd.encode(), 189.0f32.to_le_bytes().to_vec());

        let cmd = Command::SetRtcCalibration { ppm: -1000.0 };
        assert_eq!(cmd.encode(), (-189.0f32).to_le_bytes().to_vec());

        let cmd = Command::SetRtcCalibration { ppm: 12.25 };
        assert_eq!(cmd.encode(), 12.25f32.to_le_bytes().to_vec());
    }

    #[test]
    fn test_flash_commands() {
        let cmd = Command::GetFlashConfigPage { page_number: 0x0203 };
        assert_eq!(cmd.code(), b'f');
        assert_eq!(cmd.encode(), vec![0x02, 0x03]);
        assert_eq!(cmd.reply_len(), FLASH_CONFIG_PAGE_SIZE);
        assert_eq!(cmd.echoed_page(), Some(0x0203));

        let cmd = Command::EraseFlashConfigSector { start_page: 5 };
        assert_eq!(cmd.encode(), vec![0x00, 0x05]);
        assert_eq!(cmd.reply_len(), PAGE_NUMBER_SIZE);

        let config = FlashConfigPage::erased(9);
        let cmd = Command::SetFlashClockConfig { config };
        assert_eq!(cmd.encode().len(), FLASH_CONFIG_PAGE_SIZE);
        assert_eq!(cmd.echoed_page(), Some(9));
        assert_eq!(cmd.reply_len(), PAGE_NUMBER_SIZE);

        assert_eq!(Command::GetVersion.echoed_page(), None);
    }
}
