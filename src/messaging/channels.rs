// Lock-free SPSC channels between the control thread and the engine thread

use crate::messaging::command::SequencerCommand;
use crate::messaging::notification::Notification;
use ringbuf::{HeapCons, HeapProd, HeapRb, traits::Split};

pub type CommandProducer = HeapProd<SequencerCommand>;
pub type CommandConsumer = HeapCons<SequencerCommand>;

pub type NotificationProducer = HeapProd<Notification>;
pub type NotificationConsumer = HeapCons<Notification>;

/// Fixed-size ring buffer split into its two ends. Capacity is at least one slot.
fn bounded<T>(capacity: usize) -> (HeapProd<T>, HeapCons<T>) {
    HeapRb::<T>::new(capacity.max(1)).split()
}

/// Control → engine. The engine drains it at the start of every tick.
pub fn create_command_channel(capacity: usize) -> (CommandProducer, CommandConsumer) {
    bounded(capacity)
}

/// Engine → presentation. A full buffer drops new items, it never blocks the engine.
pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    bounded(capacity)
}
