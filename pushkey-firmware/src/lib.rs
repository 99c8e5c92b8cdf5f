#![no_std]
pub mod button;
pub mod debounce;
pub mod hid;
pub mod report;
pub mod reporter;
pub mod usb;

#[cfg(test)]
pub mod button_test_stub;
#[cfg(test)]
pub mod time_driver_test_stub;
#[cfg(test)]
pub mod usb_test_stub;

#[macro_use]
mod macros;
