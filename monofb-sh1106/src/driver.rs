//! Driver instance and refresh scheduling
//!
//! One [`Sh1106Fb`] owns the framebuffer store, the shadow copy and the
//! bus transport behind a single mutex. Foreground writes and the
//! periodic refresh pass both run under it, so the panel observes updates
//! in the order they complete under the lock. A tick that fires while a
//! pass or a write holds the lock is deferred, never overlapped.

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use embedded_hal_async::i2c::I2c;
use monofb_core::{pack_page, FrameStore, MapRegion, ShadowBuffer, StoreError, PAGES, WIDTH};

use crate::bus::{Transport, TransportError};
use crate::protocol;

/// Usual 7-bit address of SH1106 modules
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Default refresh period (about 20 Hz)
pub const REFRESH_INTERVAL_MS: u32 = 50;

/// Setup-time driver configuration.
///
/// Fixed once the driver is constructed; the refresh period in particular
/// is not runtime-adjustable.
#[derive(Debug, Clone)]
pub struct Config {
    /// 7-bit bus address of the panel
    pub address: u8,
    /// Contrast level sent during bring-up
    pub contrast: u8,
    /// First visible column. Some SH1106 modules wire the panel with a
    /// 2-column offset; leave at 0 unless yours does.
    pub column_start: u8,
    /// Refresh period in milliseconds
    pub refresh_interval_ms: u32,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            contrast: 0x7F,
            column_start: 0,
            refresh_interval_ms: REFRESH_INTERVAL_MS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Driver errors surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Foreground request rejected before touching shared memory
    Store(StoreError),
    /// Bus transaction failed; the rest of the operation was abandoned
    Transport(TransportError<E>),
}

impl<E> From<StoreError> for Error<E> {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl<E> From<TransportError<E>> for Error<E> {
    fn from(e: TransportError<E>) -> Self {
        Self::Transport(e)
    }
}

/// Refresh task states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RefreshState {
    /// Task not running
    Idle = 0,
    /// Timer pending
    Armed = 1,
    /// Pass in progress
    Running = 2,
}

impl RefreshState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Armed,
            2 => Self::Running,
            _ => Self::Idle,
        }
    }
}

/// Everything the refresh lock guards.
struct Shared<BUS> {
    store: FrameStore,
    shadow: ShadowBuffer,
    bus: Transport<BUS>,
    initialized: bool,
}

impl<BUS: I2c> Shared<BUS> {
    /// Dirty-check and, on change, reformat and push the whole frame.
    ///
    /// The shadow copy is captured before the push, so a failed transfer
    /// is not retried until the frame changes again. Returns whether
    /// anything was pushed.
    async fn push_if_dirty(
        &mut self,
        config: &Config,
    ) -> Result<bool, TransportError<BUS::Error>> {
        if !self.shadow.is_dirty(self.store.frame()) {
            return Ok(false);
        }
        self.shadow.capture(self.store.frame());

        let mut columns = [0u8; WIDTH];
        for page in 0..PAGES {
            pack_page(self.store.frame(), page, &mut columns);
            protocol::set_page_cursor(&mut self.bus, config, page as u8).await?;
            self.bus.send_data(&columns).await?;
        }

        trace!("frame pushed");
        Ok(true)
    }
}

/// Source of the inter-pass wait in the refresh loop.
///
/// Production pacing is a fixed-period [`Ticker`]; host tests tick the
/// loop through a signal instead of a clock.
trait Pacer {
    async fn next_tick(&mut self);
}

/// Fixed-period pacing.
struct PeriodicPacer(Ticker);

impl Pacer for PeriodicPacer {
    async fn next_tick(&mut self) {
        self.0.next().await;
    }
}

/// SH1106 framebuffer driver instance.
///
/// Construct once per panel, run [`Sh1106Fb::run`] as the background
/// refresh task, and call [`Sh1106Fb::shutdown`] before tearing anything
/// down so no pass is left in flight.
pub struct Sh1106Fb<BUS> {
    shared: Mutex<CriticalSectionRawMutex, Shared<BUS>>,
    config: Config,
    stop: Signal<CriticalSectionRawMutex, ()>,
    stopped: Signal<CriticalSectionRawMutex, ()>,
    state: AtomicU8,
}

impl<BUS: I2c> Sh1106Fb<BUS> {
    pub const fn new(bus: BUS, config: Config) -> Self {
        Self {
            shared: Mutex::new(Shared {
                store: FrameStore::new(),
                shadow: ShadowBuffer::new(),
                bus: Transport::new(bus, config.address),
                initialized: false,
            }),
            config,
            stop: Signal::new(),
            stopped: Signal::new(),
            state: AtomicU8::new(RefreshState::Idle as u8),
        }
    }

    /// Bring the panel up.
    ///
    /// Best effort: a failed command is logged and the script continues,
    /// since a partially configured display beats no display.
    pub async fn init(&self) {
        let mut shared = self.shared.lock().await;
        protocol::run_init_script(&mut shared.bus, &self.config).await;
        shared.initialized = true;
        info!("display initialized");
    }

    /// Whether the bring-up script has run.
    pub async fn is_ready(&self) -> bool {
        self.shared.lock().await.initialized
    }

    /// Write `data` into the frame at `offset` and synchronously push the
    /// result to the panel.
    ///
    /// The offset must lie inside the logical frame; a payload running
    /// past the end is truncated. Returns the number of bytes written.
    /// On a transport error the bytes stay in the frame and reach the
    /// panel with the next successful pass after a further change.
    pub async fn write(&self, offset: usize, data: &[u8]) -> Result<usize, Error<BUS::Error>> {
        let mut shared = self.shared.lock().await;
        let written = shared.store.write(offset, data)?;
        shared.push_if_dirty(&self.config).await?;
        Ok(written)
    }

    /// Run one refresh pass now.
    ///
    /// Mapped writers call this to flush deterministically instead of
    /// waiting for the next periodic tick. Returns whether anything was
    /// pushed.
    pub async fn refresh(&self) -> Result<bool, Error<BUS::Error>> {
        let mut shared = self.shared.lock().await;
        Ok(shared.push_if_dirty(&self.config).await?)
    }

    /// Validate a shared-mapping request against the backing region.
    ///
    /// Mapped writes bypass the refresh lock; a writer racing a pass can
    /// put a torn frame on the glass until the next pass converges.
    pub async fn map_region(&self, offset: usize, len: usize) -> Result<MapRegion, Error<BUS::Error>> {
        let shared = self.shared.lock().await;
        Ok(shared.store.map_region(offset, len)?)
    }

    /// Position cursor left by the last foreground write.
    pub async fn position(&self) -> usize {
        self.shared.lock().await.store.position()
    }

    /// Current state of the refresh task.
    pub fn refresh_state(&self) -> RefreshState {
        RefreshState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Background refresh task.
    ///
    /// Runs one pass immediately, then one per period, forever: lock,
    /// dirty-check, push on change, reschedule unconditionally whether or
    /// not anything was pushed or the push failed. Exits only through
    /// [`Sh1106Fb::shutdown`].
    pub async fn run(&self) {
        let ticker = Ticker::every(Duration::from_millis(
            self.config.refresh_interval_ms as u64,
        ));
        self.run_paced(PeriodicPacer(ticker)).await;
    }

    /// Refresh loop, generic over its pacing so tests can tick it
    /// directly.
    async fn run_paced<P: Pacer>(&self, mut pacer: P) {
        loop {
            // A stop latched before the loop got its first poll must
            // suppress the pass entirely.
            if self.stop.signaled() {
                break;
            }

            self.state.store(RefreshState::Running as u8, Ordering::Relaxed);
            {
                let mut shared = self.shared.lock().await;
                if shared.push_if_dirty(&self.config).await.is_err() {
                    warn!("refresh pass abandoned");
                }
            }
            self.state.store(RefreshState::Armed as u8, Ordering::Relaxed);

            match select(pacer.next_tick(), self.stop.wait()).await {
                Either::First(()) => {}
                Either::Second(()) => break,
            }
        }

        self.state.store(RefreshState::Idle as u8, Ordering::Relaxed);
        self.stopped.signal(());
    }

    /// Stop the refresh task and wait for any in-flight pass to finish.
    ///
    /// The stop is latched first, so a task that has not had its first
    /// poll yet exits without ever running a pass. Returns once no
    /// further pass can touch the buffers; returns immediately if the
    /// task never started.
    pub async fn shutdown(&self) {
        self.stop.signal(());
        if self.state.load(Ordering::Relaxed) == RefreshState::Idle as u8 {
            return;
        }
        self.stopped.wait().await;
    }

    /// Tear the driver down and hand the bus handle back.
    ///
    /// Drains the refresh task first, then releases the transport, so the
    /// buffers dropped with `self` can no longer be touched by a pass.
    pub async fn release(self) -> BUS {
        self.shutdown().await;
        self.shared.into_inner().bus.release()
    }
}
