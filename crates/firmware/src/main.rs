//! Monovoice is [Embassy](https://embassy.dev)-based firmware for a USB-MIDI adapter that drives a monophonic analog
//! synthesizer through [CV/gate](https://en.wikipedia.org/wiki/CV/gate). The firmware runs on the [Nucleo-F767ZI
//! development board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which is powered by an F7-series
//! STM32 microcontroller.
//!
//! The board enumerates as a USB-MIDI device. Incoming messages are queued, and once per millisecond the voice task
//! drains the queue into a [`monovoice_lib::engine::Engine`] and writes the resulting pitch and gate levels to the two
//! DAC channels. The user button cycles the pitch-bend range.

#![no_std]
#![no_main]

mod bend_range;
mod midi;
mod voice;

use crate::{
    bend_range::{BEND_RANGE_SYNC, display_bend_range, select_bend_range},
    midi::{RAW_MESSAGES, midi_task},
    voice::drive_voice,
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    Config, bind_interrupts,
    dac::Dac,
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    peripherals,
    time::Hertz,
    usb,
};
use embassy_usb::{Builder, UsbDevice, class::midi::MidiClass};
use static_cell::StaticCell;

use defmt_rtt as _;
#[cfg(not(feature = "panic-probe"))]
use panic_halt as _;
#[cfg(feature = "panic-probe")]
use panic_probe as _;

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
    }
);

type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_FS>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing Monovoice");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            // per section 5.2 of RM0410: the 48MHz clock used for USB OTG FS is derived from the PLLQ clock
            divq: Some(PllQDiv::DIV9), // 8mhz / 4 * 216 / 9 = 48Mhz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.mux.clk48sel = mux::Clk48sel::PLL1_Q;
    }
    // peripherals are taken exactly once, before anything that consumes MIDI exists
    let p = embassy_stm32::init(config);

    let button = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    unwrap!(spawner.spawn(select_bend_range(button, BEND_RANGE_SYNC.sender())));

    let red_led = Output::new(p.PB14, Level::Low, Speed::Low);
    let bend_range = BEND_RANGE_SYNC
        .receiver()
        .expect("Bend range synchronizer should have a receiver available");
    unwrap!(spawner.spawn(display_bend_range(red_led, bend_range)));

    static ENDPOINT_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    let mut config = embassy_stm32::usb::Config::default();

    // USB devices which are self-powered need vbus_detection to comply with the USB spec. Per section 6.10 of the
    // Nucleo board manual (UM1974), CN13 (the USB port) cannot power the board; external power is necessary.
    config.vbus_detection = true;

    let driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        ENDPOINT_OUT_BUFFER.init([0; 256]),
        config,
    );

    // per https://pid.codes, FOSS projects can apply to be listed under the vendor ID owned by InterBiometrics
    let vendor_id = 0x1209;
    let product_id = 0x2090;

    let mut config = embassy_usb::Config::new(vendor_id, product_id);
    config.manufacturer = Some("Pawpaw Works");
    config.product = Some("Monovoice");
    config.self_powered = true;
    config.max_power = 0;

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUFFER.init([0; 64]),
    );

    let class = MidiClass::new(&mut builder, 0, 1, 64);
    let usb = builder.build();

    // per RM0410, DAC channel 1 outputs on port A, pin 4 and channel 2 on port A, pin 5
    let (pitch_dac, gate_dac) =
        Dac::new(p.DAC1, p.DMA1_CH5, p.DMA1_CH6, p.PA4, p.PA5).split();

    unwrap!(spawner.spawn(usb_task(usb)));
    unwrap!(spawner.spawn(midi_task(class, RAW_MESSAGES.sender())));
    unwrap!(spawner.spawn(drive_voice(
        pitch_dac,
        gate_dac,
        RAW_MESSAGES.receiver(),
        BEND_RANGE_SYNC.anon_receiver()
    )));
}

#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}
