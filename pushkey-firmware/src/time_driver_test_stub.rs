extern crate std;

use core::cell::RefCell;
use embassy_time_driver::{AlarmHandle, Driver};
use std::time::SystemTime;

/// Host-side time driver backing `embassy-time`'s generic queue.
///
/// While the clock is pinned with [`set_time`], `set_alarm` advances the
/// clock straight to the requested timestamp and reports it as already
/// expired, so every timer wait completes without real waiting. Unpinned,
/// the driver follows wall time.
struct TestTimeDriver;

impl Driver for TestTimeDriver {
    fn now(&self) -> u64 {
        NOW.with_borrow(|now| {
            if *now == 0 {
                SystemTime::now()
                    .duration_since(SystemTime::UNIX_EPOCH)
                    .unwrap()
                    .as_micros() as u64
            } else {
                *now
            }
        })
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        Some(AlarmHandle::new(0))
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, _callback: fn(*mut ()), _ctx: *mut ()) {}

    fn set_alarm(&self, _alarm: AlarmHandle, timestamp: u64) -> bool {
        NOW.with_borrow_mut(|now| {
            if *now != 0 && timestamp > *now {
                *now = timestamp;
            }
        });

        // Already expired; the queue dispatches the wakers itself.
        false
    }
}

std::thread_local! {
    static NOW: RefCell<u64> = const { RefCell::new(0) };
}

embassy_time_driver::time_driver_impl!(static TIME_DRIVER: TestTimeDriver = TestTimeDriver);

/// Pins the simulated clock at `t` microseconds. `0` reverts to wall time.
pub fn set_time(t: u64) {
    NOW.with_borrow_mut(|now| *now = t);
}
