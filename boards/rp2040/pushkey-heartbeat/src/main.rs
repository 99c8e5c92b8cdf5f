//! Heartbeat build: no button at all, one Enter keystroke every 10ms while
//! the host has the device mounted.

#![no_std]
#![no_main]

use panic_probe as _;

#[cfg(feature = "defmt")]
use defmt_rtt as _;

use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler};
use embassy_usb::Config;
use pushkey_firmware::hid::HidWriter;
use pushkey_firmware::report::{KEYBOARD_REPORT_LEN, KEY_ENTER};
use pushkey_firmware::reporter::Reporter;
use pushkey_firmware::usb::{
    Configurator, DeviceMonitor, DeviceState, State, UsbBuffers, KEYBOARD_REPORT_DESC,
};
use static_cell::StaticCell;

type UsbDriver = Driver<'static, USB>;

static DEVICE_STATE: DeviceState = DeviceState::new();

static USB_BUFFERS: StaticCell<UsbBuffers> = StaticCell::new();
static USB_CONFIG: StaticCell<Configurator> = StaticCell::new();
static HID_STATE: StaticCell<State> = StaticCell::new();
static MONITOR: StaticCell<DeviceMonitor> = StaticCell::new();

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

#[embassy_executor::task]
async fn heartbeat(hid_writer: HidWriter<'static, UsbDriver, KEYBOARD_REPORT_LEN>) {
    let mut reporter = Reporter::new(hid_writer, &DEVICE_STATE, KEY_ENTER);
    reporter.run_heartbeat().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let driver = Driver::new(p.USB, Irqs);

    let mut device_config = Config::new(0x1209, 0x0002);
    device_config.manufacturer = Some("Pushkey");
    device_config.product = Some("Pushkey heartbeat");
    device_config.serial_number = Some("pushkey:0002");
    device_config.max_power = 100;

    let usb_buffers = USB_BUFFERS.init(UsbBuffers::default());
    let usb_config = USB_CONFIG.init(Configurator::new(device_config));

    let mut builder = usb_config.usb_builder(driver, usb_buffers).unwrap();
    builder.handler(MONITOR.init(DeviceMonitor::new(&DEVICE_STATE)));

    let hid_state = HID_STATE.init(State::new());
    let usb_config: &'static Configurator = usb_config;
    let hid_writer = usb_config.add_keyboard_iface::<UsbDriver, KEYBOARD_REPORT_LEN>(
        &mut builder,
        &KEYBOARD_REPORT_DESC,
        hid_state,
    );

    let mut usb = builder.build();

    spawner.spawn(heartbeat(hid_writer)).unwrap();

    usb.run().await
}
