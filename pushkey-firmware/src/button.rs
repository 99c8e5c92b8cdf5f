//! Button polling task: samples the GPIO at a fixed cadence, feeds the
//! debouncer and forwards clean key events to the reporter channel.

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};
use embedded_hal::digital::InputPin;

use crate::debounce::{Debouncer, KeyEvent, Timing};
use crate::usb::DeviceState;

/// Sample cadence of the polling loop.
pub const POLL_INTERVAL_MS: u64 = 10;

/// Raised by the poller when the host should be woken from bus suspend.
pub type WakeupSignal = Signal<CriticalSectionRawMutex, ()>;

pub struct KeyEventChannel<M: RawMutex, const N: usize>(Channel<M, KeyEvent, N>);

impl<M: RawMutex, const N: usize> Default for KeyEventChannel<M, N> {
    fn default() -> Self {
        Self(Channel::new())
    }
}

impl<M: RawMutex, const N: usize> KeyEventChannel<M, N> {
    pub async fn receive(&self) -> KeyEvent {
        self.0.receive().await
    }

    /// Queue an event; a full channel drops it. A lost keystroke is cheaper
    /// than stalling the poll loop, and a held button produces another one
    /// within a repeat interval anyway.
    pub fn try_send(&self, event: KeyEvent) {
        self.0.try_send(event).ok();
    }

    #[cfg(test)]
    fn try_receive(&self) -> Option<KeyEvent> {
        self.0.try_receive().ok()
    }
}

pub struct ButtonPoller<'c, I: InputPin, M: RawMutex, const N: usize> {
    pin: I,
    debouncer: Debouncer,
    channel: &'c KeyEventChannel<M, N>,
    device: &'c DeviceState,
    wakeup: &'c WakeupSignal,
    ticker: Ticker,
}

impl<'c, I: InputPin, M: RawMutex, const N: usize> ButtonPoller<'c, I, M, N> {
    pub fn new(
        pin: I,
        timing: Timing,
        channel: &'c KeyEventChannel<M, N>,
        device: &'c DeviceState,
        wakeup: &'c WakeupSignal,
    ) -> Self {
        Self {
            pin,
            debouncer: Debouncer::new(timing),
            channel,
            device,
            wakeup,
            ticker: Ticker::every(Duration::from_millis(POLL_INTERVAL_MS)),
        }
    }

    pub async fn run(&mut self) -> ! {
        loop {
            self.step().await;
        }
    }

    /// One poll cycle: wait for the tick, sample the pin, act.
    ///
    /// While the bus is suspended no reports may go out; the only permitted
    /// action is asking the host to resume when the button is held.
    pub async fn step(&mut self) {
        self.ticker.next().await;
        let raw = self.pin.is_high().unwrap_or(false);

        if self.device.is_suspended() {
            if raw {
                self.wakeup.signal(());
            }
            return;
        }

        let now = Instant::now().as_millis() as u32;
        if let Some(event) = self.debouncer.poll(raw, now) {
            crate::debug!("button event {:?}", event);
            self.channel.try_send(event);
        }
    }
}

#[cfg(test)]
#[path = "button_test.rs"]
mod test;
