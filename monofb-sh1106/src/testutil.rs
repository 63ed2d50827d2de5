//! Shared test support: a recording mock I2C bus.

// Links the host critical-section implementation for the embassy-sync
// primitives under test.
use critical_section as _;

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal_async::i2c::{self, ErrorKind, ErrorType, Operation};

/// Log of write transactions, each with its control prefix.
pub type TxnLog = Rc<RefCell<Vec<Vec<u8>>>>;

/// Error injected by a scripted transaction failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl i2c::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Recording bus: every accepted write transaction lands in the shared
/// log; scripted indices fail with [`MockError`] and record nothing.
pub struct MockBus {
    log: TxnLog,
    fail_on: Vec<usize>,
    seen: usize,
}

impl MockBus {
    pub fn new() -> (Self, TxnLog) {
        let log: TxnLog = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                log: log.clone(),
                fail_on: Vec::new(),
                seen: 0,
            },
            log,
        )
    }

    /// Make the `index`-th transaction (counting every attempt) fail.
    pub fn fail_transaction(&mut self, index: usize) {
        self.fail_on.push(index);
    }
}

impl ErrorType for MockBus {
    type Error = MockError;
}

impl i2c::I2c for MockBus {
    async fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), MockError> {
        let index = self.seen;
        self.seen += 1;
        if self.fail_on.contains(&index) {
            return Err(MockError);
        }

        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                self.log.borrow_mut().push(bytes.to_vec());
            }
        }
        Ok(())
    }
}

/// Payloads of data transactions (control byte 0x40), prefix stripped.
pub fn data_payloads(log: &[Vec<u8>]) -> Vec<Vec<u8>> {
    log.iter()
        .filter(|txn| txn.first() == Some(&0x40))
        .map(|txn| txn[1..].to_vec())
        .collect()
}

/// Command bytes of command transactions (control byte 0x00), in order.
pub fn command_bytes(log: &[Vec<u8>]) -> Vec<u8> {
    log.iter()
        .filter(|txn| txn.first() == Some(&0x00))
        .map(|txn| txn[1])
        .collect()
}
