//! High-level device operations.
//!
//! [`Device`] wraps a [`Link`] and exposes one method per protocol command.
//! Every method is a single blocking exchange; methods take `&mut self`, so
//! a second exchange cannot start on the same connection before the first
//! has finished.

use crate::commands::Command;
use crate::config::DriverConfig;
use crate::error::{ProtocolError, Result};
use crate::link::{Link, Transceiver};
use crate::types::*;

/// A connection to an ID100 device.
#[derive(Debug)]
pub struct Device<L> {
    transceiver: Transceiver<L>,
}

impl<L: Link> Device<L> {
    /// Wrap a link. The link is not connected yet.
    pub fn new(link: L) -> Self {
        Device {
            transceiver: Transceiver::new(link),
        }
    }

    /// Connect the link to the device named by `context`.
    pub fn connect(&mut self, context: &str) -> Result<()> {
        log::debug!("connecting to {}", context);
        self.transceiver.link_mut().connect(context)?;
        Ok(())
    }

    /// Apply `config` and connect to the configured device.
    pub fn connect_with(&mut self, config: &DriverConfig) -> Result<()> {
        self.transceiver.set_log_payloads(config.log_payloads);
        self.connect(&config.device)
    }

    /// Disconnect the link.
    pub fn disconnect(&mut self) -> Result<()> {
        log::debug!("disconnecting");
        self.transceiver.link_mut().disconnect()?;
        Ok(())
    }

    /// Get a reference to the underlying link.
    pub fn link(&self) -> &L {
        self.transceiver.link()
    }

    /// Get a mutable reference to the underlying link.
    pub fn link_mut(&mut self) -> &mut L {
        self.transceiver.link_mut()
    }

    /// Consume the device and return the link.
    pub fn into_link(self) -> L {
        self.transceiver.into_link()
    }

    /// Run `command` and return the raw reply payload.
    ///
    /// Page numbers echoed by flash commands are checked against the request.
    pub fn execute(&mut self, command: &Command) -> Result<Vec<u8>> {
        let code = command.code();
        let echoed_page = command.echoed_page();
        self.transceiver
            .transceive_with(code, &command.encode(), command.reply_len(), |reply| {
                if let Some(expected) = echoed_page {
                    check_echoed_page(code, expected, &reply)?;
                }
                Ok(reply)
            })
    }

    fn query<R: Record>(&mut self, command: Command) -> Result<R> {
        let code = command.code();
        let reply = self.execute(&command)?;
        R::decode(&reply).ok_or(ProtocolError::UnexpectedLength {
            command: code,
            expected: R::SIZE,
            received: reply.len(),
        })
    }

    fn send(&mut self, command: Command) -> Result<()> {
        self.execute(&command).map(|_| ())
    }

    /// Get the firmware version.
    pub fn get_version(&mut self) -> Result<Version> {
        self.query(Command::GetVersion)
    }

    /// Get the current date and time.
    pub fn get_date_time(&mut self) -> Result<DateTime> {
        self.query(Command::GetDateTime)
    }

    /// Set the current date and time.
    pub fn set_date_time(&mut self, date_time: &DateTime) -> Result<()> {
        self.send(Command::SetDateTime {
            date_time: *date_time,
        })
    }

    /// Switch the display back to the clock face.
    pub fn set_normal_mode(&mut self) -> Result<()> {
        self.send(Command::SetNormalMode)
    }

    /// Switch the display to the preview matrix.
    pub fn set_preview_mode(&mut self) -> Result<()> {
        self.send(Command::SetPreviewMode)
    }

    /// Restore factory defaults.
    pub fn factory_reset(&mut self) -> Result<()> {
        self.send(Command::FactoryReset)
    }

    /// Reboot the device into its bootloader.
    pub fn activate_bootloader(&mut self) -> Result<()> {
        self.send(Command::ActivateBootloader)
    }

    /// Load the bitmap shown in preview mode.
    pub fn set_preview_matrix(&mut self, matrix: &MatrixBitmap) -> Result<()> {
        self.send(Command::SetPreviewMatrix { matrix: *matrix })
    }

    /// Get the standard display intensity.
    pub fn get_intensity(&mut self) -> Result<Intensity> {
        self.query(Command::GetIntensity)
    }

    /// Set the standard display intensity.
    pub fn set_intensity(&mut self, intensity: Intensity) -> Result<()> {
        self.send(Command::SetIntensity { intensity })
    }

    /// Get the result of the last RTC calibration.
    pub fn get_last_calibration(&mut self) -> Result<LastCalibration> {
        self.query(Command::GetLastCalibration)
    }

    /// Set the RTC calibration in PPM.
    ///
    /// Values beyond ±189 PPM are saturated, not rejected.
    pub fn set_rtc_calibration(&mut self, ppm: f32) -> Result<()> {
        let clamped = clamp_calibration(ppm);
        if clamped != ppm && !ppm.is_nan() {
            log::info!("calibration {} PPM limited to {} PPM", ppm, clamped);
        }
        self.send(Command::SetRtcCalibration { ppm: clamped })
    }

    /// Get the standby schedule.
    pub fn get_standby(&mut self) -> Result<Standby> {
        self.query(Command::GetStandby)
    }

    /// Set the standby schedule.
    pub fn set_standby(&mut self, standby: &Standby) -> Result<()> {
        self.send(Command::SetStandby { standby: *standby })
    }

    /// Read one flash configuration page.
    ///
    /// Fails if the device returns a different page than requested.
    pub fn get_flash_config_page(&mut self, page_number: u16) -> Result<FlashConfigPage> {
        self.query(Command::GetFlashConfigPage { page_number })
    }

    /// Erase the flash configuration sector starting at `start_page`.
    ///
    /// Fails if the device reports a different page as erased.
    pub fn erase_flash_config_sector(&mut self, start_page: u16) -> Result<()> {
        self.send(Command::EraseFlashConfigSector { start_page })
    }

    /// Write a clock configuration page to flash.
    ///
    /// Fails if the device reports a different page as written.
    pub fn set_flash_clock_config(&mut self, config: &FlashConfigPage) -> Result<()> {
        self.send(Command::SetFlashClockConfig { config: *config })
    }

    /// Get the appointments table.
    pub fn get_appointments(&mut self) -> Result<Appointments> {
        self.query(Command::GetAppointments)
    }

    /// Set the appointments table.
    pub fn set_appointments(&mut self, appointments: &Appointments) -> Result<()> {
        self.send(Command::SetAppointments {
            appointments: *appointments,
        })
    }
}

fn check_echoed_page(command: u8, expected: u16, reply: &[u8]) -> Result<()> {
    let received = decode_page_number(reply).ok_or(ProtocolError::UnexpectedLength {
        command,
        expected: crate::constants::PAGE_NUMBER_SIZE,
        received: reply.len(),
    })?;
    if received != expected {
        log::warn!(
            "'{}' echoed page {}, expected {}",
            char::from(command),
            received,
            expected
        );
        return Err(ProtocolError::PageMismatch {
            command,
            expected,
            received,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_echoed_page() {
        assert!(check_echoed_page(b'E', 5, &[0x00, 0x05]).is_ok());

        let err = check_echoed_page(b'E', 5, &[0x00, 0x07]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::PageMismatch {
                command: b'E',
                expected: 5,
                received: 7
            }
        ));

        // Byte order matters: 0x0500 is not page 5.
        assert!(check_echoed_page(b'f', 5, &[0x05, 0x00]).is_err());
    }

    #[test]
    fn test_check_echoed_page_short_reply() {
        let err = check_echoed_page(b'F', 1, &[0x01]).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedLength { received: 1, .. }));
    }
}
