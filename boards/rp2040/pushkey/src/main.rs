//! One button wired to GP0 (active high), reported as the Enter key.

#![no_std]
#![no_main]

use panic_probe as _;

#[cfg(feature = "defmt")]
use defmt_rtt as _;

use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_usb::Config;
use pushkey_firmware::button::{ButtonPoller, KeyEventChannel, WakeupSignal};
use pushkey_firmware::debounce::Timing;
use pushkey_firmware::hid::HidWriter;
use pushkey_firmware::report::{KEYBOARD_REPORT_LEN, KEY_ENTER};
use pushkey_firmware::reporter::Reporter;
use pushkey_firmware::usb::{
    Configurator, DeviceMonitor, DeviceState, State, UsbBuffers, KEYBOARD_REPORT_DESC,
};
use static_cell::StaticCell;

const EVENT_BUFFER_SIZE: usize = 8;

type EventChannel = KeyEventChannel<NoopRawMutex, EVENT_BUFFER_SIZE>;
type UsbDriver = Driver<'static, USB>;

static KEY_EVENTS: StaticCell<EventChannel> = StaticCell::new();
static DEVICE_STATE: DeviceState = DeviceState::new();
static WAKEUP: WakeupSignal = WakeupSignal::new();

static USB_BUFFERS: StaticCell<UsbBuffers> = StaticCell::new();
static USB_CONFIG: StaticCell<Configurator> = StaticCell::new();
static HID_STATE: StaticCell<State> = StaticCell::new();
static MONITOR: StaticCell<DeviceMonitor> = StaticCell::new();

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

#[embassy_executor::task]
async fn button_poller(pin: Input<'static>, channel: &'static EventChannel) {
    let mut poller = ButtonPoller::new(pin, Timing::default(), channel, &DEVICE_STATE, &WAKEUP);
    poller.run().await
}

#[embassy_executor::task]
async fn hid_reporter(
    hid_writer: HidWriter<'static, UsbDriver, KEYBOARD_REPORT_LEN>,
    channel: &'static EventChannel,
) {
    let mut reporter = Reporter::new(hid_writer, &DEVICE_STATE, KEY_ENTER);
    reporter.run(channel).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let button = Input::new(p.PIN_0, Pull::Down);
    let driver = Driver::new(p.USB, Irqs);

    let key_events: &'static EventChannel = KEY_EVENTS.init(EventChannel::default());

    let mut device_config = Config::new(0x1209, 0x0001);
    device_config.manufacturer = Some("Pushkey");
    device_config.product = Some("Pushkey button");
    device_config.serial_number = Some("pushkey:0001");
    device_config.max_power = 100;
    device_config.supports_remote_wakeup = true;

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

    spawner.spawn(button_poller(button, key_events)).unwrap();
    spawner.spawn(hid_reporter(hid_writer, key_events)).unwrap();

    loop {
        usb.run_until_suspend().await;
        match select(usb.wait_resume(), WAKEUP.wait()).await {
            Either::First(()) => {}
            Either::Second(()) => {
                let _ = usb.remote_wakeup().await;
            }
        }
    }
}
