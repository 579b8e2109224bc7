use polychat_types::Provider;

use crate::conversation::Message;

/// Receives conversation updates as a turn progresses.
pub trait ChatView {
    /// A message was added to the history.
    fn message_appended(&mut self, message: &Message);

    /// `delta` was appended to the open reply, now `message`.
    fn delta(&mut self, message: &Message, delta: &str);

    /// The request went out and no reply has started yet.
    fn waiting(&mut self, _provider: Provider) {}

    /// The conversation is idle again.
    fn turn_finished(&mut self) {}
}

/// A view that ignores every update.
#[derive(Debug, Default)]
pub struct NullView;

impl ChatView for NullView {
    fn message_appended(&mut self, _message: &Message) {}

    fn delta(&mut self, _message: &Message, _delta: &str) {}
}
