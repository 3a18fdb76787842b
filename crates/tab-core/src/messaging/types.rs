/// How the receiving platform should interpret the message body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Html,
}

/// Delivery options passed alongside every outbound message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendOptions {
    pub render_mode: RenderMode,
    /// Forum topic inside the destination chat.
    pub thread_id: i64,
}
