// Messaging - lock-free channels between the control thread and the engine thread
//
// - SequencerCommand: control → engine, drained at the start of every tick
// - Notification: engine → presentation (triggers, highlights, control outcomes)
// - SequencerHandle: control-side wrapper around the command producer

pub mod channels;
pub mod command;
pub mod handle;
pub mod notification;

pub use channels::{
    CommandConsumer, CommandProducer, NotificationConsumer, NotificationProducer,
    create_command_channel, create_notification_channel,
};
pub use command::SequencerCommand;
pub use handle::SequencerHandle;
pub use notification::Notification;
