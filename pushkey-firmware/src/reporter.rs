use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Ticker, Timer};
use embassy_usb::driver::Driver;

use crate::button::KeyEventChannel;
use crate::debounce::KeyEvent;
use crate::hid::HidWriter;
use crate::report::{KeyboardReport, KEYBOARD_REPORT_LEN, REPORT_ID_COUNT, REPORT_ID_KEYBOARD};
use crate::usb::DeviceState;
use crate::warn;

/// How long the key stays down within a keystroke.
pub const KEY_HOLD_MS: u64 = 10;

pub const HEARTBEAT_INTERVAL_MS: u64 = 10;

/// Orders report transmissions by report id. After the report with
/// `completed_id` has gone out, [`next`](Self::next) names the id to send
/// next, if any. With a single keyboard report the chain is one link long,
/// but the walk keeps report ordering stable if more report types are added.
pub struct ReportChain {
    profile_count: u8,
}

impl ReportChain {
    pub const fn new(profile_count: u8) -> Self {
        Self { profile_count }
    }

    pub fn next(&self, completed_id: u8) -> Option<u8> {
        let next = completed_id.saturating_add(1);
        if next < self.profile_count {
            Some(next)
        } else {
            None
        }
    }
}

pub struct Reporter<'d, D: Driver<'d>> {
    hid_writer: HidWriter<'d, D, KEYBOARD_REPORT_LEN>,
    device: &'d DeviceState,
    chain: ReportChain,
    report: KeyboardReport,
    keycode: u8,
}

impl<'d, D: Driver<'d>> Reporter<'d, D> {
    pub fn new(
        hid_writer: HidWriter<'d, D, KEYBOARD_REPORT_LEN>,
        device: &'d DeviceState,
        keycode: u8,
    ) -> Self {
        Self {
            hid_writer,
            device,
            chain: ReportChain::new(REPORT_ID_COUNT),
            report: KeyboardReport::empty(),
            keycode,
        }
    }

    async fn send_current(&mut self, id: u8) {
        debug_assert_eq!(id, REPORT_ID_KEYBOARD);
        if let Err(e) = self.hid_writer.write(&self.report.serialize()).await {
            warn!("Failed to send report: {:?}", e);
        }
    }

    /// Sends the current report for every id in the chain, in order. The
    /// interrupt write completing is the transmission-complete signal, so
    /// each id goes out only after its predecessor has been taken by the
    /// host.
    async fn sync_profiles(&mut self) {
        let mut id = REPORT_ID_KEYBOARD;
        loop {
            self.send_current(id).await;
            match self.chain.next(id) {
                Some(next) => id = next,
                None => break,
            }
        }
    }

    /// Sends one full keystroke: key down, a short hold, key up.
    pub async fn send_keystroke(&mut self) {
        if !self.device.is_ready() {
            return;
        }

        self.report = KeyboardReport::key(self.keycode);
        self.sync_profiles().await;

        Timer::after_millis(KEY_HOLD_MS).await;

        self.report = KeyboardReport::empty();
        self.sync_profiles().await;
    }

    pub async fn run<M: RawMutex, const N: usize>(
        &mut self,
        channel: &KeyEventChannel<M, N>,
    ) -> ! {
        loop {
            match channel.receive().await {
                KeyEvent::InitialPress | KeyEvent::RepeatPress => self.send_keystroke().await,
            }
        }
    }

    /// Fires a keystroke every interval regardless of any input, for boards
    /// with no button at all. The keystroke itself still waits for the
    /// device to be ready.
    pub async fn run_heartbeat(&mut self) -> ! {
        let mut ticker = Ticker::every(Duration::from_millis(HEARTBEAT_INTERVAL_MS));
        loop {
            ticker.next().await;
            self.send_keystroke().await;
        }
    }
}

#[cfg(test)]
#[path = "reporter_test.rs"]
mod test;
