//! Drives the synthesizer's pitch and gate inputs from the [`Engine`].

use crate::{bend_range::BendRangeSpy, midi::RawMessageReceiver};
use core::iter;
use defmt::info;
use embassy_stm32::{
    dac::{DacCh1, DacCh2, Value},
    mode::Async,
    peripherals::DAC1,
};
use embassy_time::{Duration, Ticker};
use monovoice_lib::{configuration::Configuration, engine::Engine};
use wmidi::Note;

/// Processing cycles per second.
const TICK_HZ: u64 = 1_000;

/// DAC reference voltage; the highest level either channel can produce.
const DAC_REFERENCE_VOLTS: f32 = 10.0 / 3.0;

/// Helper function to convert a voltage to a 12-bit <abbr name="digital-to-analog converter">DAC</abbr> value.
///
/// Levels outside the DAC's range are clamped. In particular, notes below the reference note produce 0V and the gate
/// level saturates at the reference voltage, which still reads as logic high.
fn voltage_to_dac_value(voltage: f64) -> Value {
    let scaled = (voltage as f32 / DAC_REFERENCE_VOLTS * 4095.0).clamp(0.0, 4095.0);
    // Casting to u16 serves as a quick and dirty rounding. The DAC resolution is high enough that it doesn't matter.
    Value::Bit12Right(scaled as u16)
}

/// Task responsible for running the [`Engine`] at a fixed rate.
///
/// Each cycle drains every queued message, applies them in arrival order, and writes the outputs to the DAC: pitch on
/// channel 1, gate on channel 2.
#[embassy_executor::task]
pub async fn drive_voice(
    mut pitch_dac: DacCh1<'static, DAC1, Async>,
    mut gate_dac: DacCh2<'static, DAC1, Async>,
    messages: RawMessageReceiver<'static>,
    mut bend_range: BendRangeSpy<'static>,
) -> ! {
    // the lowest key of the synth sits at 0V; nothing below it can be voiced
    let mut engine = Engine::new(Configuration {
        reference_note: Note::F3,
        ..Configuration::default()
    });

    let mut ticker = Ticker::every(Duration::from_hz(TICK_HZ));
    loop {
        ticker.next().await;

        if let Some(range) = bend_range.try_get() {
            engine.config_mut().bend_semitones = range.semitones();
        }

        let change = engine.update(iter::from_fn(|| messages.try_receive().ok()));
        let outputs = engine.outputs();
        if !change.is_none() {
            info!(
                "Gate {}V, pitch {}V",
                outputs.gate.as_volts(),
                outputs.pitch.as_volts()
            );
        }

        pitch_dac.set(voltage_to_dac_value(outputs.pitch.as_volts()));
        gate_dac.set(voltage_to_dac_value(outputs.gate.as_volts()));
    }
}
