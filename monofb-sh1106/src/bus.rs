//! Two-wire bus transport
//!
//! Frames command and pixel payloads with the SH1106 control prefix and
//! issues each as one atomic I2C write transaction. Failures are logged
//! with their context and returned to the caller; nothing here retries.

use embedded_hal_async::i2c::I2c;
use heapless::Vec;
use monofb_core::WIDTH;

/// Control prefix for a single command byte
const CTRL_COMMAND: u8 = 0x00;

/// Control prefix for a pixel data payload
const CTRL_DATA: u8 = 0x40;

/// Largest transaction: control byte plus one page of columns
pub const XMIT_LEN: usize = WIDTH + 1;

/// Transport-level failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// Underlying bus rejected the transfer
    Bus(E),
    /// Payload larger than the one-page transmit scratch
    PayloadTooLarge,
}

/// Owns the bus handle and the preallocated transmit scratch.
///
/// The scratch has inline capacity for the largest payload, so framing a
/// data transfer never allocates.
pub struct Transport<BUS> {
    bus: BUS,
    address: u8,
    scratch: Vec<u8, XMIT_LEN>,
}

impl<BUS: I2c> Transport<BUS> {
    pub const fn new(bus: BUS, address: u8) -> Self {
        Self {
            bus,
            address,
            scratch: Vec::new(),
        }
    }

    /// Issue `[0x00, cmd]` as one transaction.
    pub async fn send_command(&mut self, cmd: u8) -> Result<(), TransportError<BUS::Error>> {
        if let Err(e) = self.bus.write(self.address, &[CTRL_COMMAND, cmd]).await {
            warn!("command 0x{=u8:x} rejected by bus", cmd);
            return Err(TransportError::Bus(e));
        }
        Ok(())
    }

    /// Issue `[0x40, payload...]` as one transaction.
    pub async fn send_data(&mut self, payload: &[u8]) -> Result<(), TransportError<BUS::Error>> {
        self.scratch.clear();
        self.scratch
            .push(CTRL_DATA)
            .map_err(|_| TransportError::PayloadTooLarge)?;
        self.scratch
            .extend_from_slice(payload)
            .map_err(|_| TransportError::PayloadTooLarge)?;

        if let Err(e) = self.bus.write(self.address, &self.scratch).await {
            warn!("data transfer of {=usize} bytes rejected by bus", payload.len());
            return Err(TransportError::Bus(e));
        }
        Ok(())
    }

    /// Hand the bus handle back.
    pub fn release(self) -> BUS {
        self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockBus;
    use embassy_futures::block_on;
    use std::vec;

    #[test]
    fn command_is_framed_with_zero_prefix() {
        let (bus, log) = MockBus::new();
        let mut transport = Transport::new(bus, 0x3C);

        block_on(transport.send_command(0xAE)).unwrap();
        assert_eq!(*log.borrow(), vec![vec![0x00, 0xAE]]);
    }

    #[test]
    fn data_is_framed_with_data_prefix() {
        let (bus, log) = MockBus::new();
        let mut transport = Transport::new(bus, 0x3C);

        block_on(transport.send_data(&[1, 2, 3])).unwrap();
        assert_eq!(*log.borrow(), vec![vec![0x40, 1, 2, 3]]);
    }

    #[test]
    fn oversized_payload_is_refused_before_the_bus() {
        let (bus, log) = MockBus::new();
        let mut transport = Transport::new(bus, 0x3C);

        let payload = [0u8; XMIT_LEN];
        assert_eq!(
            block_on(transport.send_data(&payload)),
            Err(TransportError::PayloadTooLarge)
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn bus_rejection_is_surfaced() {
        let (mut bus, log) = MockBus::new();
        bus.fail_transaction(0);
        let mut transport = Transport::new(bus, 0x3C);

        assert!(matches!(
            block_on(transport.send_command(0xAF)),
            Err(TransportError::Bus(_))
        ));
        assert!(log.borrow().is_empty());
    }
}
