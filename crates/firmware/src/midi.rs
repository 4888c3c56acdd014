//! Receives MIDI over USB and hands it to the voice task.

use crate::UsbDriver;
use defmt::{info, panic, warn};
use embassy_stm32::usb;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Receiver, Sender},
};
use embassy_usb::{class::midi::MidiClass, driver::EndpointError};
use monovoice_lib::midi::{RawMessage, usb_event_packets};

/// How many messages may wait between two voice cycles. A full USB packet holds 16.
const RAW_MESSAGE_QUEUE_LEN: usize = 64;

/// Messages waiting to be processed, in arrival order. The MIDI task is the only producer and the voice task the only
/// consumer.
pub static RAW_MESSAGES: Channel<CriticalSectionRawMutex, RawMessage, RAW_MESSAGE_QUEUE_LEN> =
    Channel::new();
pub type RawMessageSender<'a> =
    Sender<'a, CriticalSectionRawMutex, RawMessage, RAW_MESSAGE_QUEUE_LEN>;
pub type RawMessageReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, RawMessage, RAW_MESSAGE_QUEUE_LEN>;

#[embassy_executor::task]
pub async fn midi_task(
    mut class: MidiClass<'static, UsbDriver>,
    messages: RawMessageSender<'static>,
) -> ! {
    loop {
        class.wait_connection().await;
        info!("USB connected");
        let _ = receive_midi(&mut class, &messages).await;
        info!("USB disconnected");
    }
}

#[doc(hidden)]
struct Disconnected {}

impl From<EndpointError> for Disconnected {
    fn from(val: EndpointError) -> Self {
        match val {
            EndpointError::BufferOverflow => panic!("Buffer overflow"),
            EndpointError::Disabled => Disconnected {},
        }
    }
}

/// Helper function which queues the MIDI messages received over USB until the host disconnects.
async fn receive_midi<'d, T: usb::Instance + 'd>(
    class: &mut MidiClass<'d, usb::Driver<'d, T>>,
    messages: &RawMessageSender<'static>,
) -> Result<(), Disconnected> {
    let mut buf = [0; 64];
    loop {
        let n = class.read_packet(&mut buf).await?;
        for raw in usb_event_packets(&buf[..n]) {
            if messages.try_send(raw).is_err() {
                warn!(
                    "Message queue full; dropping {=u32:#x}",
                    u32::from(raw)
                );
            }
        }
    }
}
