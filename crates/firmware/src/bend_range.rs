//! Tasks and types related to the pitch-bend range configuration.

use embassy_stm32::{exti::ExtiInput, gpio::Output};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    watch::{AnonReceiver, Receiver, Sender, Watch},
};
use embassy_time::{Duration, Timer};
use monovoice_lib::configuration::{BendRange, CycleConfig};

const BEND_RANGE_RECEIVER_CNT: usize = 1;
/// Syncs the [`BendRange`] config across tasks.
pub static BEND_RANGE_SYNC: Watch<CriticalSectionRawMutex, BendRange, BEND_RANGE_RECEIVER_CNT> =
    Watch::new_with(BendRange::WholeTone);
pub type BendRangeSender<'a> =
    Sender<'a, CriticalSectionRawMutex, BendRange, BEND_RANGE_RECEIVER_CNT>;
pub type BendRangeReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, BendRange, BEND_RANGE_RECEIVER_CNT>;
pub type BendRangeSpy<'a> =
    AnonReceiver<'a, CriticalSectionRawMutex, BendRange, BEND_RANGE_RECEIVER_CNT>;

/// Handles button presses, cycling through the [`BendRange`] configurations.
#[embassy_executor::task]
pub async fn select_bend_range(
    mut button: ExtiInput<'static>,
    bend_range: BendRangeSender<'static>,
) -> ! {
    loop {
        button.wait_for_rising_edge().await;

        let new_state = bend_range
            .try_get()
            .expect("Bend range state should never be uninitialized")
            .cycle();
        defmt::info!(
            "Bend range is now ±{} semitones",
            new_state.semitones() as u8
        );
        bend_range.send(new_state);
    }
}

/// Shows the selected [`BendRange`] on an LED as a group of short flashes followed by a long dark gap: one flash for
/// ±2 semitones, two for ±7, and so on.
#[embassy_executor::task]
pub async fn display_bend_range(
    mut led: Output<'static>,
    mut bend_range: BendRangeReceiver<'static>,
) -> ! {
    const FLASH: Duration = Duration::from_millis(150);
    const GAP: Duration = Duration::from_millis(1_200);

    loop {
        let flashes = bend_range.get().await as u8 + 1;
        for _ in 0..flashes {
            led.set_high();
            Timer::after(FLASH).await;
            led.set_low();
            Timer::after(FLASH).await;
        }
        Timer::after(GAP).await;
    }
}
