use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_usb::control::{InResponse, OutResponse, Recipient, Request, RequestType};
use embassy_usb::driver::Driver;
use embassy_usb::types::InterfaceNumber;
use embassy_usb::{Builder, Config, Handler};

use crate::hid::HidWriter;
use crate::report::REPORT_ID_KEYBOARD;

// HID
const USB_CLASS_HID: u8 = 3;
const HID_SUBCLASS_BOOT: u8 = 1;
const HID_PROTOCOL_KEYBOARD: u8 = 1;

const HID_DESC_DESCTYPE_HID: u8 = 0x21;
const HID_DESC_DESCTYPE_HID_REPORT: u8 = 0x22;
const HID_DESC_SPEC_1_11: [u8; 2] = [0x11, 0x01];
const HID_DESC_COUNTRY_UNSPEC: u8 = 0x00;

const HID_REQ_GET_REPORT: u8 = 0x01;
const HID_REQ_GET_IDLE: u8 = 0x02;
const HID_REQ_GET_PROTOCOL: u8 = 0x03;
const HID_REQ_SET_REPORT: u8 = 0x09;
const HID_REQ_SET_IDLE: u8 = 0x0a;
const HID_REQ_SET_PROTOCOL: u8 = 0x0b;

#[rustfmt::skip]
pub const KEYBOARD_REPORT_DESC: [u8; 66] = [
    0x05, 0x01, // (GLOBAL) USAGE_PAGE         0x0001 Generic Desktop Page
    0x09, 0x06, // (LOCAL)  USAGE              0x00010006 Keyboard (Application Collection)
    0xA1, 0x01, // (MAIN) COLLECTION 0x01 Application (Usage=0x00010006: Page=Generic Desktop Page,
                // Usage=Keyboard, Type=Application Collection)
    0x85, REPORT_ID_KEYBOARD, // (GLOBAL) REPORT_ID 0x01 (1)
    0x05, 0x07, //   (GLOBAL) USAGE_PAGE         0x0007 Keyboard/Keypad Page
    0x19, 0xE0, //   (LOCAL)  USAGE_MINIMUM      0x000700E0 Keyboard LeftControl (Dynamic Value)
    0x29, 0xE7, //   (LOCAL)  USAGE_MAXIMUM      0x000700E7 Keyboard Right GUI (Dynamic Value)
    0x15, 0x00, //   (GLOBAL) LOGICAL_MINIMUM    0x00 (0)
    0x25, 0x01, //   (GLOBAL) LOGICAL_MAXIMUM    0x01 (1)
    0x95, 0x08, //   (GLOBAL) REPORT_COUNT       0x08 (8) Number of fields
    0x75, 0x01, //   (GLOBAL) REPORT_SIZE        0x01 (1) Number of bits per field
    0x81, 0x02, //   (MAIN) INPUT 0x00000002 (8 fields x 1 bit) 0=Data 1=Variable 0=Absolute
    0x95, 0x01, //   (GLOBAL) REPORT_COUNT       0x01 (1) Number of fields
    0x75, 0x08, //   (GLOBAL) REPORT_SIZE        0x08 (8) Number of bits per field
    0x81, 0x01, //   (MAIN) INPUT 0x00000001 (1 field x 8 bits) reserved byte, 1=Constant
    0x05, 0x08, //   (GLOBAL) USAGE_PAGE         0x0008 LED Page
    0x19, 0x01, //   (LOCAL)  USAGE_MINIMUM      0x00080001 Num Lock (On/Off Control)
    0x29, 0x05, //   (LOCAL)  USAGE_MAXIMUM      0x00080005 Kana (On/Off Control)
    0x95, 0x05, //   (GLOBAL) REPORT_COUNT       0x05 (5) Number of fields
    0x75, 0x01, //   (GLOBAL) REPORT_SIZE        0x01 (1) Number of bits per field
    0x91, 0x02, //   (MAIN) OUTPUT 0x00000002 (5 fields x 1 bit) 0=Data 1=Variable 0=Absolute
    0x95, 0x01, //   (GLOBAL) REPORT_COUNT       0x01 (1) Number of fields
    0x75, 0x03, //   (GLOBAL) REPORT_SIZE        0x03 (3) Number of bits per field
    0x91, 0x01, //   (MAIN) OUTPUT 0x00000001 (1 field x 3 bits) padding, 1=Constant
    0x05, 0x07, //   (GLOBAL) USAGE_PAGE         0x0007 Keyboard/Keypad Page
    0x19, 0x00, //   (LOCAL)  USAGE_MINIMUM      0x00070000 Keyboard No event indicated (Selector)
    0x29, 0xFF, //   (LOCAL)  USAGE_MAXIMUM      0x000700FF
    0x15, 0x00, //   (GLOBAL) LOGICAL_MINIMUM    0x00 (0)
    0x26, 0xFF, 0x00, // (GLOBAL) LOGICAL_MAXIMUM 0x00FF (255)
    0x95, 0x06, //   (GLOBAL) REPORT_COUNT       0x06 (6) Number of fields
    0x75, 0x08, //   (GLOBAL) REPORT_SIZE        0x08 (8) Number of bits per field
    0x81, 0x00, //   (MAIN) INPUT 0x00000000 (6 fields x 8 bits) 0=Data 0=Array
    0xC0,       // (MAIN)   END_COLLECTION     Application
];

/// Transport-level device state shared between the USB stack callbacks and
/// the polling/reporting tasks. Plain load/store atomics only; the RP2040
/// has no CAS.
pub struct DeviceState {
    configured: AtomicBool,
    suspended: AtomicBool,
}

impl DeviceState {
    pub const fn new() -> Self {
        Self {
            configured: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
        }
    }

    /// Host has completed enumeration and selected a configuration.
    pub fn is_mounted(&self) -> bool {
        self.configured.load(Ordering::Relaxed)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Relaxed)
    }

    /// Reports may be sent: mounted and the bus is not suspended.
    pub fn is_ready(&self) -> bool {
        self.is_mounted() && !self.is_suspended()
    }

    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::Relaxed);
    }

    pub fn set_suspended(&self, suspended: bool) {
        self.suspended.store(suspended, Ordering::Relaxed);
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

/// Bus event handler mirroring the stack's mount/unmount/suspend/resume
/// callbacks into a [`DeviceState`].
pub struct DeviceMonitor<'d> {
    state: &'d DeviceState,
}

impl<'d> DeviceMonitor<'d> {
    pub fn new(state: &'d DeviceState) -> Self {
        Self { state }
    }
}

impl Handler for DeviceMonitor<'_> {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            self.state.set_configured(false);
            self.state.set_suspended(false);
        }
    }

    fn reset(&mut self) {
        self.state.set_configured(false);
    }

    fn configured(&mut self, configured: bool) {
        crate::info!("usb {}", if configured { "mounted" } else { "unmounted" });
        self.state.set_configured(configured);
    }

    fn suspended(&mut self, suspended: bool) {
        self.state.set_suspended(suspended);
    }
}

/// Internal state for the HID interface.
pub struct State<'d> {
    control: MaybeUninit<Control<'d>>,
}

impl Default for State<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl State<'_> {
    pub const fn new() -> Self {
        State {
            control: MaybeUninit::uninit(),
        }
    }
}

const CONFIG_SIZE: usize = 128;
const BOS_SIZE: usize = 32;
const MSOS_SIZE: usize = 0;
const CONTROL_SIZE: usize = 64;

pub struct UsbBuffers {
    config_descriptor_buf: [u8; CONFIG_SIZE],
    bos_descriptor_buf: [u8; BOS_SIZE],
    msos_descriptor_buf: [u8; MSOS_SIZE],
    control_buf: [u8; CONTROL_SIZE],
}

impl Default for UsbBuffers {
    fn default() -> Self {
        Self {
            config_descriptor_buf: [0; CONFIG_SIZE],
            bos_descriptor_buf: [0; BOS_SIZE],
            msos_descriptor_buf: [0; MSOS_SIZE],
            control_buf: [0; CONTROL_SIZE],
        }
    }
}

pub struct Configurator<'d> {
    device_config: Option<Config<'d>>,
    max_packet_size: u16,
    poll_ms: u8,
}

impl<'d> Configurator<'d> {
    pub fn new(device_config: Config<'d>) -> Self {
        Self {
            device_config: Some(device_config),
            max_packet_size: device_config.max_packet_size_0 as u16,
            poll_ms: 1,
        }
    }

    pub fn usb_builder<D: Driver<'d>>(
        &mut self,
        driver: D,
        buffers: &'d mut UsbBuffers,
    ) -> Option<Builder<'d, D>> {
        self.device_config.take().map(|device_config| {
            Builder::new(
                driver,
                device_config,
                &mut buffers.config_descriptor_buf,
                &mut buffers.bos_descriptor_buf,
                &mut buffers.msos_descriptor_buf,
                &mut buffers.control_buf,
            )
        })
    }

    /// Adds the boot-keyboard HID interface: one interrupt IN endpoint, no
    /// OUT endpoint (LED output arrives over the control pipe and is
    /// ignored).
    pub fn add_keyboard_iface<'a, D: Driver<'d>, const WRITE_N: usize>(
        &'d self,
        builder: &'a mut Builder<'d, D>,
        descriptor: &'static [u8],
        state: &'d mut State<'d>,
    ) -> HidWriter<'d, D, WRITE_N> {
        let mut func = builder.function(USB_CLASS_HID, HID_SUBCLASS_BOOT, HID_PROTOCOL_KEYBOARD);
        let mut iface = func.interface();
        let if_num = iface.interface_number();
        let mut alt = iface.alt_setting(USB_CLASS_HID, HID_SUBCLASS_BOOT, HID_PROTOCOL_KEYBOARD, None);

        alt.descriptor(HID_DESC_DESCTYPE_HID, &hid_descriptor_body(descriptor));

        let ep_in = alt.endpoint_interrupt_in(self.max_packet_size, self.poll_ms);

        drop(func);

        let control = state.control.write(Control::new(if_num, descriptor));
        builder.handler(control);

        HidWriter::new(ep_in)
    }
}

fn hid_descriptor_body(report_descriptor: &[u8]) -> [u8; 7] {
    [
        HID_DESC_SPEC_1_11[0], // HID class spec version
        HID_DESC_SPEC_1_11[1],
        HID_DESC_COUNTRY_UNSPEC,
        1, // one descriptor follows
        HID_DESC_DESCTYPE_HID_REPORT,
        (report_descriptor.len() & 0xff) as u8,
        (report_descriptor.len() >> 8) as u8,
    ]
}

/// Control-pipe handler for the keyboard interface.
///
/// GET_REPORT is acknowledged with a zero-length response and SET_REPORT is
/// accepted and discarded; the device has no state the host can usefully
/// query or set this way.
struct Control<'d> {
    if_num: InterfaceNumber,
    report_descriptor: &'d [u8],
    hid_descriptor: [u8; 9],
}

impl<'d> Control<'d> {
    fn new(if_num: InterfaceNumber, report_descriptor: &'d [u8]) -> Self {
        let body = hid_descriptor_body(report_descriptor);
        Control {
            if_num,
            report_descriptor,
            hid_descriptor: [
                9, // length, including this prefix
                HID_DESC_DESCTYPE_HID,
                body[0],
                body[1],
                body[2],
                body[3],
                body[4],
                body[5],
                body[6],
            ],
        }
    }
}

impl Handler for Control<'_> {
    fn control_out(&mut self, req: Request, _data: &[u8]) -> Option<OutResponse> {
        if (req.request_type, req.recipient, req.index)
            != (
                RequestType::Class,
                Recipient::Interface,
                self.if_num.0 as u16,
            )
        {
            return None;
        }

        match req.request {
            // Idle rate is irrelevant for a device that only ever sends
            // momentary keystrokes.
            HID_REQ_SET_IDLE => Some(OutResponse::Accepted),
            HID_REQ_SET_REPORT => Some(OutResponse::Accepted),
            HID_REQ_SET_PROTOCOL => {
                if req.value == 1 {
                    Some(OutResponse::Accepted)
                } else {
                    crate::warn!("HID Boot Protocol is unsupported.");
                    Some(OutResponse::Rejected)
                }
            }
            _ => Some(OutResponse::Rejected),
        }
    }

    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        if req.index != self.if_num.0 as u16 {
            return None;
        }

        match (req.request_type, req.recipient) {
            (RequestType::Standard, Recipient::Interface) => match req.request {
                Request::GET_DESCRIPTOR => match (req.value >> 8) as u8 {
                    HID_DESC_DESCTYPE_HID_REPORT => {
                        Some(InResponse::Accepted(self.report_descriptor))
                    }
                    HID_DESC_DESCTYPE_HID => Some(InResponse::Accepted(&self.hid_descriptor)),
                    _ => Some(InResponse::Rejected),
                },
                _ => Some(InResponse::Rejected),
            },
            (RequestType::Class, Recipient::Interface) => match req.request {
                HID_REQ_GET_REPORT => Some(InResponse::Accepted(&buf[..0])),
                HID_REQ_GET_IDLE => {
                    buf[0] = 0;
                    Some(InResponse::Accepted(&buf[..1]))
                }
                HID_REQ_GET_PROTOCOL => {
                    buf[0] = 1;
                    Some(InResponse::Accepted(&buf[..1]))
                }
                _ => Some(InResponse::Rejected),
            },
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "usb_test.rs"]
mod test;
